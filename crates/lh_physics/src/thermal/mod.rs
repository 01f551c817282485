// crates/lh_physics/src/thermal/mod.rs

//! 土壤热力节点模块
//!
//! - 节点参数插值 (`node_params`)
//! - 热力性质 (`properties`)
//! - 节点水分/冰分配与稳定性检查 (`distribute`)
//! - 0 °C 锋面定位 (`fronts`)
//!
//! 节点网格比水文层更细：节点深度由土柱给出，首节点位于地表，
//! 最深节点不浅于土柱底部。

pub mod distribute;
pub mod fronts;
pub mod node_params;
pub mod properties;

pub use distribute::{
    check_explicit_stability, distribute_node_moisture_properties, explicit_dt_threshold,
    NodeFields, StabilityWarning,
};
pub use fronts::{find_0_degree_fronts, FrontDepths};
pub use node_params::{
    node_thicknesses, set_node_parameters, uniform_node_depths, NodeParameters, NodePlacement,
};
pub use properties::{maximum_unfrozen_water, soil_conductivity, volumetric_heat_capacity};
