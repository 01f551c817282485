// crates/lh_physics/src/ice/mod.rs

//! 层含冰量估算
//!
//! 两种互斥方案，由配置的快速通量开关选定：
//!
//! - [`IceContentScheme::QuickFlux`]: 由前两个节点温度与阻尼剖面估计层温
//! - [`IceContentScheme::FullProfile`]: 由完整节点温度剖面估计层温
//!
//! 两者都先写入层平均温度，再按冻土子区覆盖 `ice`。层含水量不被修改。

pub mod frost;
pub mod layer_temperature;

pub use frost::{frost_subarea_temperatures, subarea_ice};
pub use layer_temperature::{profile_layer_temperature, quick_flux_layer_temperatures};

use serde::{Deserialize, Serialize};

use crate::constants::LAYER_MOIST_TOLERANCE;
use crate::error::{check_finite, PhysicsError, PhysicsResult};
use crate::soil::SoilColumn;
use crate::state::LayerState;
use lh_config::ModelOptions;
use lh_foundation::LhError;

/// 层含冰量估算方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IceContentScheme {
    /// 快速通量近似
    QuickFlux,
    /// 完整有限差分剖面
    FullProfile,
}

impl IceContentScheme {
    /// 由配置选择方案
    pub fn from_options(options: &ModelOptions) -> Self {
        if options.quick_flux {
            Self::QuickFlux
        } else {
            Self::FullProfile
        }
    }

    /// 失败时报告的例程名
    pub fn routine_name(&self) -> &'static str {
        match self {
            Self::QuickFlux => "estimate_layer_ice_content_quick_flux",
            Self::FullProfile => "estimate_layer_ice_content",
        }
    }

    /// 执行所选方案
    pub fn estimate(
        &self,
        layers: &mut [LayerState],
        column: &SoilColumn,
        node_temps: &[f64],
        frozen: bool,
    ) -> PhysicsResult<()> {
        match self {
            Self::QuickFlux => {
                if node_temps.len() < 2 {
                    return Err(LhError::size_mismatch("node_temperature", 2, node_temps.len()).into());
                }
                estimate_layer_ice_content_quick_flux(layers, column, node_temps[0], node_temps[1], frozen)
            }
            Self::FullProfile => estimate_layer_ice_content(layers, column, node_temps, frozen),
        }
    }
}

/// 由完整节点温度剖面估算层含冰量
pub fn estimate_layer_ice_content(
    layers: &mut [LayerState],
    column: &SoilColumn,
    node_temps: &[f64],
    frozen: bool,
) -> PhysicsResult<()> {
    if node_temps.len() != column.nnode() {
        return Err(LhError::size_mismatch("node_temperature", column.nnode(), node_temps.len()).into());
    }
    for (i, &t) in node_temps.iter().enumerate() {
        check_finite("node_temperature", i, t)?;
    }
    check_layers(layers, column)?;

    let mut top = 0.0;
    let temps: Vec<f64> = column
        .layers
        .iter()
        .map(|soil| {
            let bottom = top + soil.depth;
            let t = profile_layer_temperature(&column.node_depths, node_temps, top, bottom);
            top = bottom;
            t
        })
        .collect();

    apply_layer_temperatures(layers, column, &temps, frozen)
}

/// 快速通量方案估算层含冰量
pub fn estimate_layer_ice_content_quick_flux(
    layers: &mut [LayerState],
    column: &SoilColumn,
    t0: f64,
    t1: f64,
    frozen: bool,
) -> PhysicsResult<()> {
    check_finite("node_temperature", 0, t0)?;
    check_finite("node_temperature", 1, t1)?;
    check_layers(layers, column)?;

    let depths: Vec<f64> = column.layers.iter().map(|l| l.depth).collect();
    let temps = quick_flux_layer_temperatures(&depths, t0, t1, column.dp, column.avg_temp);
    for (i, &t) in temps.iter().enumerate() {
        check_finite("layer_temperature", i, t)?;
    }

    apply_layer_temperatures(layers, column, &temps, frozen)
}

/// 层数一致，含水量有限、非负且不超过层最大含水量
fn check_layers(layers: &[LayerState], column: &SoilColumn) -> PhysicsResult<()> {
    if layers.len() != column.nlayer() {
        return Err(LhError::size_mismatch("layers", column.nlayer(), layers.len()).into());
    }
    for (i, (state, soil)) in layers.iter().zip(&column.layers).enumerate() {
        check_finite("layer_moist", i, state.moist)?;
        if state.moist < 0.0 {
            return Err(PhysicsError::NonPhysical {
                field: "layer_moist",
                index: i,
                value: state.moist,
                reason: "含水量为负",
            });
        }
        if state.moist - soil.max_moist > LAYER_MOIST_TOLERANCE * soil.depth {
            return Err(PhysicsError::NonPhysical {
                field: "layer_moist",
                index: i,
                value: state.moist,
                reason: "含水量超过层最大含水量",
            });
        }
        if state.ice.len() != column.frost_fract.len() {
            return Err(LhError::size_mismatch("layer.ice", column.frost_fract.len(), state.ice.len()).into());
        }
    }
    Ok(())
}

fn apply_layer_temperatures(
    layers: &mut [LayerState],
    column: &SoilColumn,
    temps: &[f64],
    frozen: bool,
) -> PhysicsResult<()> {
    for ((state, soil), &t) in layers.iter_mut().zip(&column.layers).zip(temps) {
        state.temperature = t;
        let sub_temps = frost_subarea_temperatures(t, &column.frost_fract, column.frost_slope);
        for (ice, &ts) in state.ice.iter_mut().zip(&sub_temps) {
            *ice = if frozen {
                subarea_ice(ts, state.moist, soil.max_moist, soil.bubble, soil.expt)
            } else {
                0.0
            };
        }
    }
    Ok(())
}
