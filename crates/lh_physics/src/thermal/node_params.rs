// crates/lh_physics/src/thermal/node_params.rs

//! 热力节点参数插值
//!
//! 把水文层的最大含水量、Brooks-Corey 指数、进气压力映射到热力节点，
//! 并计算有限差分用的节点几何系数。结果只取决于土柱，对同一网格单元的
//! 所有瓦片相同。

use serde::{Deserialize, Serialize};

use crate::constants::{DEPTH_EPSILON, MM_PER_M};
use crate::soil::SoilLayer;

/// 热力节点相对水文层的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePlacement {
    /// 位于第 `l` 层内部（或土柱以下，取最深层）
    Within(usize),
    /// 位于第 `l` 层与第 `l + 1` 层的界面上
    Boundary(usize),
}

impl NodePlacement {
    /// 根据节点深度与各层底部累积深度确定位置
    pub fn locate(depth: f64, layer_bottoms: &[f64]) -> Self {
        let n = layer_bottoms.len();
        for (l, &bottom) in layer_bottoms.iter().enumerate() {
            if l + 1 < n && depth > DEPTH_EPSILON && (depth - bottom).abs() <= DEPTH_EPSILON {
                return Self::Boundary(l);
            }
            if depth < bottom {
                return Self::Within(l);
            }
        }
        Self::Within(n.saturating_sub(1))
    }

    /// 该节点静态土壤属性所用的层（界面节点取上层）
    #[inline]
    pub fn layer(&self) -> usize {
        match *self {
            Self::Within(l) | Self::Boundary(l) => l,
        }
    }

    /// 按位置混合逐层量：层内取该层，界面取两层平均
    #[inline]
    pub fn blend(&self, per_layer: impl Fn(usize) -> f64) -> f64 {
        match *self {
            Self::Within(l) => per_layer(l),
            Self::Boundary(l) => 0.5 * (per_layer(l) + per_layer(l + 1)),
        }
    }
}

/// 热力节点参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeParameters {
    /// 节点最大体积含水量 [m³/m³]
    pub max_moist: Vec<f64>,
    /// 节点 Brooks-Corey 指数
    pub expt: Vec<f64>,
    /// 节点进气压力 [cm]
    pub bubble: Vec<f64>,
    /// 节点控制体厚度 [m]
    pub dz: Vec<f64>,
    /// `Z[i+2] - Z[i]`
    pub alpha: Vec<f64>,
    /// `Z[i+1] - Z[i]`
    pub beta: Vec<f64>,
    /// `Z[i+2] - Z[i+1]`
    pub gamma: Vec<f64>,
}

impl NodeParameters {
    /// 节点数（未计算时为 0）
    #[inline]
    pub fn len(&self) -> usize {
        self.max_moist.len()
    }

    /// 是否尚未计算
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_moist.is_empty()
    }
}

/// 计算热力节点参数
///
/// `noflux` 为真时为底部零通量边界追加一组几何系数。
pub fn set_node_parameters(node_depths: &[f64], layers: &[SoilLayer], noflux: bool) -> NodeParameters {
    let bottoms: Vec<f64> = layers
        .iter()
        .scan(0.0, |acc, layer| {
            *acc += layer.depth;
            Some(*acc)
        })
        .collect();

    let n = node_depths.len();
    let mut params = NodeParameters {
        max_moist: Vec::with_capacity(n),
        expt: Vec::with_capacity(n),
        bubble: Vec::with_capacity(n),
        ..NodeParameters::default()
    };

    for &z in node_depths {
        let place = NodePlacement::locate(z, &bottoms);
        params
            .max_moist
            .push(place.blend(|l| layers[l].max_moist / layers[l].depth / MM_PER_M));
        params.expt.push(place.blend(|l| layers[l].expt));
        params.bubble.push(place.blend(|l| layers[l].bubble));
    }

    params.dz = node_thicknesses(node_depths);

    for i in 0..n.saturating_sub(2) {
        params.alpha.push(node_depths[i + 2] - node_depths[i]);
        params.beta.push(node_depths[i + 1] - node_depths[i]);
        params.gamma.push(node_depths[i + 2] - node_depths[i + 1]);
    }
    if noflux && n >= 2 {
        let last = node_depths[n - 1] - node_depths[n - 2];
        params.alpha.push(2.0 * last);
        params.beta.push(last);
        params.gamma.push(last);
    }

    params
}

/// 节点控制体厚度：相邻节点中点之间的距离，两端取半个间距
pub fn node_thicknesses(node_depths: &[f64]) -> Vec<f64> {
    let n = node_depths.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                (node_depths[1] - node_depths[0]) / 2.0
            } else if i == n - 1 {
                (node_depths[n - 1] - node_depths[n - 2]) / 2.0
            } else {
                (node_depths[i + 1] - node_depths[i - 1]) / 2.0
            }
        })
        .collect()
}

/// 从地表到 `bottom` 均匀分布的节点深度
pub fn uniform_node_depths(nnode: usize, bottom: f64) -> Vec<f64> {
    match nnode {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| bottom * i as f64 / (n - 1) as f64).collect(),
    }
}
