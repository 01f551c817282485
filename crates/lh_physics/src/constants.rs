// crates/lh_physics/src/constants.rs

//! 物理常数
//!
//! 冻土与土壤热力计算使用的自然常数和经验参数。这些值不随场景变化。

/// 冰的融化潜热 [J/kg]
pub const LATICE: f64 = 3.337e5;

/// 水的冰点 [K]
pub const TKFRZ: f64 = 273.15;

/// 重力加速度 [m/s²]
pub const G: f64 = 9.80616;

/// mm ↔ m 换算
pub const MM_PER_M: f64 = 1000.0;

/// cm ↔ m 换算（进气压力以 cm 给出）
pub const CM_PER_M: f64 = 100.0;

/// 节点含水量超过节点最大含水量的容许误差 [m³/m³]
pub const NODE_MOIST_TOLERANCE: f64 = 1e-4;

/// 层含水量超过层最大含水量的容许误差 [mm]
pub const LAYER_MOIST_TOLERANCE: f64 = 1e-4;

/// 判定节点落在层界面上的深度容差 [m]
pub const DEPTH_EPSILON: f64 = 1e-9;

/// 土壤热导率经验参数 (Johansen / Farouki)
pub mod conductivity {
    /// 冰 [W/m/K]
    pub const ICE: f64 = 2.2;
    /// 液态水 [W/m/K]
    pub const WATER: f64 = 0.57;
    /// 石英 [W/m/K]
    pub const QUARTZ: f64 = 7.7;
    /// 干燥有机质 [W/m/K]
    pub const DRY_ORGANIC: f64 = 0.05;
    /// 有机质固体 [W/m/K]
    pub const SOLID_ORGANIC: f64 = 0.25;
    /// 石英含量 < 0.2 时其余矿物 [W/m/K]
    pub const OTHER_MINERAL_LOW_QUARTZ: f64 = 3.0;
    /// 石英含量 ≥ 0.2 时其余矿物 [W/m/K]
    pub const OTHER_MINERAL: f64 = 2.0;
}

/// 体积热容 [J/m³/K]
pub mod heat_capacity {
    /// 矿物质
    pub const MINERAL: f64 = 2.0e6;
    /// 有机质
    pub const ORGANIC: f64 = 2.7e6;
    /// 液态水
    pub const WATER: f64 = 4.2e6;
    /// 冰
    pub const ICE: f64 = 1.9e6;
    /// 空气
    pub const AIR: f64 = 1.3e3;
}
