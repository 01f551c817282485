// crates/lh_physics/src/derivation.rs

//! 派生状态重建
//!
//! 从检查点中的最小状态（层含水量、层含冰量、节点温度）重建单个网格单元
//! 所有瓦片的派生量。分两遍执行：
//!
//! 1. 暂存层水分/冰，计算饱和面积比与地下水位
//! 2. 首个有效瓦片上计算一次节点参数；逐瓦片分配节点水分与热力性质、
//!    检查显式格式稳定性、写回暂存量、估算层含冰量、定位 0 °C 锋面
//!
//! 任一致命错误立即终止当前网格单元，错误携带例程名与瓦片位置。
//! 稳定性警告只记录，不改变状态。
//!
//! # 示例
//!
//! ```
//! use lh_config::ModelConfig;
//! use lh_physics::{GridCell, SoilColumn, SoilLayer, StateDeriver};
//!
//! let config = ModelConfig::default();
//! let layers = vec![
//!     SoilLayer::mineral(0.1, 1500.0, 11.0, 30.0, 0.5),
//!     SoilLayer::mineral(0.4, 1500.0, 11.0, 30.0, 0.5),
//!     SoilLayer::mineral(1.0, 1500.0, 11.0, 30.0, 0.5),
//! ];
//! let soil = SoilColumn::new(layers, vec![0.0, 0.5, 2.0]);
//! let mut cell = GridCell::new(soil, vec![1.0], &config.options);
//!
//! let deriver = StateDeriver::new(config).unwrap();
//! let report = deriver.derive(&mut cell).unwrap();
//! assert_eq!(report.tiles_visited, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};
use crate::ice::IceContentScheme;
use crate::runoff::{ArnoSaturatedArea, SaturatedAreaEstimator};
use crate::state::GridCell;
use crate::thermal::{
    check_explicit_stability, distribute_node_moisture_properties, find_0_degree_fronts,
    set_node_parameters, StabilityWarning,
};
use crate::tiles::TileId;
use crate::water_table::{RetentionCurveWaterTable, WaterTableEstimator};
use lh_config::{ConfigError, ModelConfig, ModelOptions};

// ============================================================
// 执行计划
// ============================================================

/// 节点水分分配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeMoistureMode {
    /// 不需要节点水分（既无完整能量平衡也无冻土）
    Skip,
    /// 分配节点水分；`frozen_soil` 为真时负温节点析出冰
    Distribute {
        /// 冻土物理是否开启
        frozen_soil: bool,
    },
}

impl NodeMoistureMode {
    /// 由配置选择模式
    pub fn from_options(options: &ModelOptions) -> Self {
        if options.needs_node_moisture() {
            Self::Distribute {
                frozen_soil: options.frozen_soil,
            }
        } else {
            Self::Skip
        }
    }

    /// 负温节点与层是否析出冰
    #[inline]
    pub fn frozen_soil(&self) -> bool {
        matches!(self, Self::Distribute { frozen_soil: true })
    }
}

/// 由配置一次性解析出的执行计划
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationPlan {
    /// 节点水分分配模式
    pub node_moisture: NodeMoistureMode,
    /// 层含冰量方案
    pub ice_scheme: IceContentScheme,
    /// 是否检查显式冻土格式的时间步长
    pub stability_check: bool,
    /// 是否定位 0 °C 锋面
    pub locate_fronts: bool,
}

impl DerivationPlan {
    /// 解析配置
    pub fn from_options(options: &ModelOptions) -> Self {
        Self {
            node_moisture: NodeMoistureMode::from_options(options),
            ice_scheme: IceContentScheme::from_options(options),
            stability_check: options.needs_stability_check(),
            locate_fronts: options.frozen_soil && !options.quick_flux,
        }
    }
}

// ============================================================
// 报告
// ============================================================

/// 单个网格单元的派生报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationReport {
    /// 访问的有效瓦片数
    pub tiles_visited: usize,
    /// 节点参数计算次数（有有效瓦片时恒为 1）
    pub node_parameter_evaluations: usize,
    /// 显式格式稳定性警告，每个超限瓦片一条
    pub stability_warnings: Vec<StabilityWarning>,
    /// 使用的层含冰量方案
    pub ice_scheme: IceContentScheme,
    /// 定位到锋面的瓦片数
    pub tiles_with_fronts: usize,
}

impl DerivationReport {
    fn new(ice_scheme: IceContentScheme) -> Self {
        Self {
            tiles_visited: 0,
            node_parameter_evaluations: 0,
            stability_warnings: Vec::new(),
            ice_scheme,
            tiles_with_fronts: 0,
        }
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.stability_warnings.is_empty()
    }
}

// ============================================================
// 派生器
// ============================================================

/// 暂存的瓦片层水分与冰
struct StagedLayers {
    id: TileId,
    moist: Vec<f64>,
    ice: Vec<Vec<f64>>,
}

/// 派生状态重建器
///
/// 不持有可变共享状态，可在多个线程上分别处理不同网格单元。
pub struct StateDeriver {
    config: ModelConfig,
    plan: DerivationPlan,
    saturated_area: Box<dyn SaturatedAreaEstimator>,
    water_table: Box<dyn WaterTableEstimator>,
}

impl std::fmt::Debug for StateDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDeriver")
            .field("config", &self.config)
            .field("plan", &self.plan)
            .field("saturated_area", &self.saturated_area.name())
            .field("water_table", &self.water_table.name())
            .finish()
    }
}

impl StateDeriver {
    /// 以默认估算器创建
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        StateDeriverBuilder::new(config).build()
    }

    /// 构建器
    pub fn builder(config: ModelConfig) -> StateDeriverBuilder {
        StateDeriverBuilder::new(config)
    }

    /// 配置
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// 执行计划
    pub fn plan(&self) -> &DerivationPlan {
        &self.plan
    }

    /// 重建网格单元所有有效瓦片的派生状态
    pub fn derive(&self, cell: &mut GridCell) -> PhysicsResult<DerivationReport> {
        let options = &self.config.options;
        cell.validate(options)?;

        let tiles: Vec<TileId> = cell.active_tiles().collect();
        let mut report = DerivationReport::new(self.plan.ice_scheme);

        // 第一遍：饱和面积与地下水位
        let mut staged = Vec::with_capacity(tiles.len());
        for &id in &tiles {
            let (soil, tile) = cell.split_tile_mut(id)?;
            let layers = &tile.cell.layers;
            let moist: Vec<f64> = layers.iter().map(|l| l.moist).collect();
            let ice: Vec<Vec<f64>> = layers.iter().map(|l| l.ice.clone()).collect();

            let sat = self.saturated_area.compute_runoff_and_asat(soil, &moist, 0.0);
            tile.cell.asat = sat.asat;
            self.water_table.compute_zwt(soil, &mut tile.cell);

            staged.push(StagedLayers { id, moist, ice });
        }

        // 第二遍：节点与冰
        let mut node_params_set = false;
        for stage in &staged {
            let id = stage.id;
            if !node_params_set {
                let soil = &mut cell.soil;
                soil.nodes = set_node_parameters(&soil.node_depths, &soil.layers, options.noflux);
                node_params_set = true;
                report.node_parameter_evaluations += 1;
            }

            let (soil, tile) = cell.split_tile_mut(id)?;
            let frozen = self.plan.node_moisture.frozen_soil() && soil.fs_active;

            if let NodeMoistureMode::Distribute { .. } = self.plan.node_moisture {
                distribute_node_moisture_properties(
                    &mut tile.energy.nodes,
                    &tile.energy.t,
                    soil,
                    &stage.moist,
                    frozen,
                )
                .map_err(|e| fatal(e, "distribute_node_moisture_properties", id))?;
            }

            if self.plan.stability_check {
                if let Some(warning) = check_explicit_stability(
                    &tile.energy.nodes,
                    &soil.nodes.dz,
                    self.config.global.dt,
                    id.veg,
                    id.band,
                ) {
                    log::warn!("{}", warning);
                    report.stability_warnings.push(warning);
                }
            }

            for ((layer, &moist), ice) in tile.cell.layers.iter_mut().zip(&stage.moist).zip(&stage.ice) {
                layer.moist = moist;
                layer.ice.clone_from(ice);
            }

            let scheme = self.plan.ice_scheme;
            scheme
                .estimate(&mut tile.cell.layers, soil, &tile.energy.t, frozen)
                .map_err(|e| fatal(e, scheme.routine_name(), id))?;

            if self.plan.locate_fronts && soil.fs_active {
                tile.energy.fronts = find_0_degree_fronts(&soil.node_depths, &tile.energy.t, options.max_fronts);
                if !tile.energy.fronts.is_empty() {
                    report.tiles_with_fronts += 1;
                }
            }

            report.tiles_visited += 1;
        }

        log::debug!(
            "派生完成: {} 个瓦片, {} 条稳定性警告, 方案 {:?}",
            report.tiles_visited,
            report.stability_warnings.len(),
            report.ice_scheme
        );

        Ok(report)
    }
}

/// 记录并包装致命错误
fn fatal(err: PhysicsError, routine: &'static str, id: TileId) -> PhysicsError {
    let err = err.in_routine(routine, id.veg, id.band);
    log::error!("{}", err);
    err
}

// ============================================================
// 构建器
// ============================================================

/// [`StateDeriver`] 构建器
pub struct StateDeriverBuilder {
    config: ModelConfig,
    saturated_area: Box<dyn SaturatedAreaEstimator>,
    water_table: Box<dyn WaterTableEstimator>,
}

impl StateDeriverBuilder {
    /// 以默认估算器开始
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            saturated_area: Box::new(ArnoSaturatedArea),
            water_table: Box::new(RetentionCurveWaterTable::default()),
        }
    }

    /// 替换饱和面积估算器
    pub fn saturated_area(mut self, estimator: impl SaturatedAreaEstimator + 'static) -> Self {
        self.saturated_area = Box::new(estimator);
        self
    }

    /// 替换地下水位估算器
    pub fn water_table(mut self, estimator: impl WaterTableEstimator + 'static) -> Self {
        self.water_table = Box::new(estimator);
        self
    }

    /// 验证配置并构建
    pub fn build(self) -> Result<StateDeriver, ConfigError> {
        self.config.validate()?;
        let plan = DerivationPlan::from_options(&self.config.options);
        log::debug!("派生计划: {:?}", plan);
        Ok(StateDeriver {
            config: self.config,
            plan,
            saturated_area: self.saturated_area,
            water_table: self.water_table,
        })
    }
}
