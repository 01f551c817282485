// crates/lh_physics/src/thermal/distribute.rs

//! 热力节点水分/冰分配与显式格式稳定性检查
//!
//! 把层含水量换算成节点体积含水量，按节点温度划分冰与液态水，
//! 再计算节点热导率与体积热容。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node_params::NodePlacement;
use super::properties::{maximum_unfrozen_water, soil_conductivity, volumetric_heat_capacity};
use crate::constants::{MM_PER_M, NODE_MOIST_TOLERANCE};
use crate::error::{check_finite, PhysicsError, PhysicsResult};
use crate::soil::SoilColumn;
use lh_foundation::LhError;

/// 节点水分与热力场
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFields {
    /// 节点总体积含水量 [m³/m³]
    pub moist: Vec<f64>,
    /// 节点体积含冰量 [m³/m³]
    pub ice: Vec<f64>,
    /// 节点热导率 [W/m/K]
    pub kappa: Vec<f64>,
    /// 节点体积热容 [J/m³/K]
    pub cs: Vec<f64>,
}

impl NodeFields {
    /// 创建全零节点场
    pub fn new(nnode: usize) -> Self {
        Self {
            moist: vec![0.0; nnode],
            ice: vec![0.0; nnode],
            kappa: vec![0.0; nnode],
            cs: vec![0.0; nnode],
        }
    }

    /// 节点数
    #[inline]
    pub fn len(&self) -> usize {
        self.moist.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moist.is_empty()
    }
}

/// 计算各热力节点的水分、冰、热导率与热容
///
/// 需要 `column.nodes` 已由 [`set_node_parameters`](super::set_node_parameters) 填充。
/// `frozen` 为真（冻土物理开启且土柱可冻结）时，负温节点按未冻水曲线析出冰。
pub fn distribute_node_moisture_properties(
    fields: &mut NodeFields,
    node_temps: &[f64],
    column: &SoilColumn,
    layer_moist: &[f64],
    frozen: bool,
) -> PhysicsResult<()> {
    let nodes = &column.nodes;
    let layers = &column.layers;
    let bottoms = column.layer_bottoms();

    let nnode = column.nnode();
    for (name, len) in [
        ("node_temperature", node_temps.len()),
        ("node_parameters", nodes.len()),
        ("node_fields", fields.len()),
    ] {
        if len != nnode {
            return Err(LhError::size_mismatch(name, nnode, len).into());
        }
    }
    if layer_moist.len() != layers.len() {
        return Err(LhError::size_mismatch("layer_moist", layers.len(), layer_moist.len()).into());
    }

    for (lidx, &m) in layer_moist.iter().enumerate() {
        check_finite("layer_moist", lidx, m)?;
        if m < 0.0 {
            return Err(PhysicsError::NonPhysical {
                field: "layer_moist",
                index: lidx,
                value: m,
                reason: "含水量为负",
            });
        }
    }

    for (nidx, &z) in column.node_depths.iter().enumerate() {
        let t = node_temps[nidx];
        check_finite("node_temperature", nidx, t)?;

        let place = NodePlacement::locate(z, &bottoms);
        let lidx = place.layer();
        let layer = &layers[lidx];

        let moist = place.blend(|l| layer_moist[l] / layers[l].depth / MM_PER_M);
        let max_moist = nodes.max_moist[nidx];
        if moist - max_moist > NODE_MOIST_TOLERANCE {
            return Err(PhysicsError::NodeMoistureExceedsMax {
                node: nidx,
                moist,
                max_moist,
            });
        }

        let (ice, kappa) = if frozen && t < 0.0 {
            let unfrozen = maximum_unfrozen_water(t, max_moist, nodes.bubble[nidx], nodes.expt[nidx]);
            let ice = (moist - unfrozen).max(0.0);
            (ice, soil_conductivity(moist, moist - ice, layer))
        } else {
            (0.0, soil_conductivity(moist, moist, layer))
        };

        fields.moist[nidx] = moist;
        fields.ice[nidx] = ice;
        fields.kappa[nidx] = kappa;
        fields.cs[nidx] = volumetric_heat_capacity(layer.solid_fraction(), moist - ice, ice, layer.organic);
    }

    Ok(())
}

/// 显式冻土格式时间步长超限
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityWarning {
    /// 植被类型索引
    pub veg: usize,
    /// 高程带索引
    pub band: usize,
    /// 配置的时间步长 [s]
    pub dt: f64,
    /// 节点间距 [m]
    pub dz: f64,
    /// 节点体积热容 [J/m³/K]
    pub heat_capacity: f64,
    /// 节点热导率 [W/m/K]
    pub conductivity: f64,
    /// 最大稳定时间步长 [s]
    pub dt_max: f64,
}

impl fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "瓦片 (veg={}, band={}) 以显式格式 (implicit = false) 运行冻土: 时间步长 {} s \
             对节点间距 {} m、土壤热容 {} J/m3/K、热导率 {} W/m/K 过大。\
             请开启 implicit（推荐），或将时间步长减小到 <= {:.3} s，或减少热力节点数",
            self.veg, self.band, self.dt, self.dz, self.heat_capacity, self.conductivity, self.dt_max
        )
    }
}

/// 显式格式的稳定时间步长阈值 [s]
///
/// 以第二个节点的热容、热导率和控制体厚度作为整条剖面的代表。
pub fn explicit_dt_threshold(fields: &NodeFields, dz_node: &[f64]) -> f64 {
    0.5 * fields.cs[1] / fields.kappa[1] * dz_node[1].powi(2)
}

/// 检查显式冻土格式的时间步长，超限时返回警告（不修改状态）
pub fn check_explicit_stability(
    fields: &NodeFields,
    dz_node: &[f64],
    dt: f64,
    veg: usize,
    band: usize,
) -> Option<StabilityWarning> {
    let dt_max = explicit_dt_threshold(fields, dz_node);
    (dt > dt_max).then(|| StabilityWarning {
        veg,
        band,
        dt,
        dz: dz_node[1],
        heat_capacity: fields.cs[1],
        conductivity: fields.kappa[1],
        dt_max,
    })
}
