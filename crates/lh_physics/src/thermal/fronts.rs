// crates/lh_physics/src/thermal/fronts.rs

//! 冻结/融化锋面定位
//!
//! 自下而上扫描节点温度剖面，记录温度穿过 0 °C 的深度。

use serde::{Deserialize, Serialize};

/// 冻结与融化锋面深度 [m]
///
/// 空列表表示没有对应锋面。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontDepths {
    /// 冻结锋面（上冷下暖）
    pub freeze: Vec<f64>,
    /// 融化锋面（上暖下冷）
    pub thaw: Vec<f64>,
}

impl FrontDepths {
    /// 是否没有任何锋面
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.freeze.is_empty() && self.thaw.is_empty()
    }

    /// 锋面总数
    #[inline]
    pub fn count(&self) -> usize {
        self.freeze.len() + self.thaw.len()
    }
}

/// 在 (x0, y0)-(x1, y1) 上线性插值求 `x` 处的 y
#[inline]
fn linear_interp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// 查找 0 °C 锋面
///
/// 每种锋面最多记录 `max_fronts` 个，按自下而上的发现顺序排列。
pub fn find_0_degree_fronts(node_depths: &[f64], node_temps: &[f64], max_fronts: usize) -> FrontDepths {
    let mut fronts = FrontDepths::default();
    let n = node_depths.len().min(node_temps.len());

    for i in (0..n.saturating_sub(1)).rev() {
        let (t0, t1) = (node_temps[i], node_temps[i + 1]);
        let (z0, z1) = (node_depths[i], node_depths[i + 1]);
        if t0 > 0.0 && t1 <= 0.0 && fronts.thaw.len() < max_fronts {
            fronts.thaw.push(linear_interp(0.0, t0, t1, z0, z1));
        } else if t0 < 0.0 && t1 >= 0.0 && fronts.freeze.len() < max_fronts {
            fronts.freeze.push(linear_interp(0.0, t0, t1, z0, z1));
        }
    }

    fronts
}
