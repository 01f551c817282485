// crates/lh_physics/src/lib.rs

//! LandHydro Physics Layer (Layer 3)
//!
//! 网格单元派生状态重建，包括：
//! - 土柱描述 (soil)
//! - 瓦片状态 (state) 与瓦片迭代 (tiles)
//! - 饱和面积 (runoff) 与地下水位 (water_table) 估算
//! - 热力节点参数、节点水分/冰与锋面 (thermal)
//! - 层含冰量 (ice)
//! - 派生流程 (derivation)
//!
//! # Trait 抽象
//!
//! - [`SaturatedAreaEstimator`]: 饱和面积/产流估算
//! - [`WaterTableEstimator`]: 地下水位估算
//!
//! # 日志
//!
//! 本层只使用 `log` 门面：稳定性警告走 `warn!`，致命错误返回前走 `error!`。
//! 由应用层安装具体的日志后端。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod derivation;
pub mod error;
pub mod ice;
pub mod runoff;
pub mod soil;
pub mod state;
pub mod thermal;
pub mod tiles;
pub mod water_table;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出常用类型
pub use derivation::{
    DerivationPlan, DerivationReport, NodeMoistureMode, StateDeriver, StateDeriverBuilder,
};
pub use error::{PhysicsError, PhysicsResult};
pub use ice::{estimate_layer_ice_content, estimate_layer_ice_content_quick_flux, IceContentScheme};
pub use runoff::{ArnoSaturatedArea, SaturatedArea, SaturatedAreaEstimator};
pub use soil::{SoilColumn, SoilLayer};
pub use state::{CellState, EnergyState, GridCell, LayerState, TileState};
pub use thermal::{
    check_explicit_stability, distribute_node_moisture_properties, find_0_degree_fronts,
    set_node_parameters, FrontDepths, NodeFields, NodeParameters, StabilityWarning,
};
pub use tiles::{active_tiles, TileId};
pub use water_table::{RetentionCurveWaterTable, WaterTableEstimator};
