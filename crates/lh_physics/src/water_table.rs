// crates/lh_physics/src/water_table.rs

//! 地下水位估算
//!
//! 假设水位以上为 Brooks-Corey 静水平衡剖面：
//!
//! ```text
//! θ(h) = θs                              h <= hb
//! θ(h) = θr + (θs - θr) (hb / h)^λ       h >  hb
//! ```
//!
//! 其中 `h` 为距水位的高度 [m]，`λ = 2 / (expt - 3)`。给定水位深度时层内
//! 储水量有解析积分，对储水量关于水位深度二分求逆即可得到水位深度。
//! 深度均为地表以下的米数，向下为正。

use crate::constants::{CM_PER_M, MM_PER_M};
use crate::soil::{SoilColumn, SoilLayer};
use crate::state::CellState;

/// 地下水位估算器
pub trait WaterTableEstimator: Send + Sync {
    /// 名称
    fn name(&self) -> &'static str;

    /// 由层含水量计算各层、全土柱与下部土柱的水位深度并写入 `cell`
    fn compute_zwt(&self, column: &SoilColumn, cell: &mut CellState);
}

/// 基于持水曲线反演的地下水位
#[derive(Debug, Clone, Copy)]
pub struct RetentionCurveWaterTable {
    /// 二分迭代次数
    pub iterations: usize,
}

impl Default for RetentionCurveWaterTable {
    fn default() -> Self {
        Self { iterations: 60 }
    }
}

/// 单层持水曲线参数
#[derive(Debug, Clone, Copy)]
struct Retention {
    theta_s: f64,
    theta_r: f64,
    hb: f64,
    lambda: f64,
}

impl Retention {
    fn of(layer: &SoilLayer) -> Self {
        let theta_s = layer.max_moist / (MM_PER_M * layer.depth);
        Self {
            theta_s,
            theta_r: layer.resid_moist.clamp(0.0, theta_s),
            hb: (layer.bubble / CM_PER_M).max(0.0),
            lambda: 2.0 / (layer.expt - 3.0),
        }
    }

    /// `∫_0^h θ(h') dh'` [m]
    fn cumulative(&self, h: f64) -> f64 {
        let h = h.max(0.0);
        if h <= self.hb {
            return self.theta_s * h;
        }
        let Self { theta_s, theta_r, hb, lambda } = *self;
        let capillary = theta_s * hb;
        if !(lambda.is_finite() && lambda > 0.0) || hb <= 0.0 {
            // 无毛管延伸：进气高度以上即为残余含水量
            return capillary + theta_r * (h - hb);
        }
        let drained = if (lambda - 1.0).abs() < 1e-12 {
            hb * (h / hb).ln()
        } else {
            hb.powf(lambda) * (h.powf(1.0 - lambda) - hb.powf(1.0 - lambda)) / (1.0 - lambda)
        };
        capillary + theta_r * (h - hb) + (theta_s - theta_r) * drained
    }

    /// 层 `[top, bottom]` 在水位深度 `zwt` 下的储水量 [mm]
    fn water(&self, top: f64, bottom: f64, zwt: f64) -> f64 {
        let saturated = (bottom - zwt.max(top)).max(0.0);
        let unsaturated = if zwt > top {
            self.cumulative(zwt - top) - self.cumulative((zwt - bottom).max(0.0))
        } else {
            0.0
        };
        MM_PER_M * (self.theta_s * saturated + unsaturated)
    }
}

/// 连续若干层组成的土柱片段
struct Segment {
    bounds: Vec<(f64, f64)>,
    curves: Vec<Retention>,
}

impl Segment {
    fn new(layers: &[SoilLayer], top: f64) -> Self {
        let mut z = top;
        let mut bounds = Vec::with_capacity(layers.len());
        for layer in layers {
            bounds.push((z, z + layer.depth));
            z += layer.depth;
        }
        Self {
            bounds,
            curves: layers.iter().map(Retention::of).collect(),
        }
    }

    fn top(&self) -> f64 {
        self.bounds.first().map_or(0.0, |b| b.0)
    }

    fn bottom(&self) -> f64 {
        self.bounds.last().map_or(0.0, |b| b.1)
    }

    fn water(&self, zwt: f64) -> f64 {
        self.bounds
            .iter()
            .zip(&self.curves)
            .map(|(&(top, bottom), curve)| curve.water(top, bottom, zwt))
            .sum()
    }

    /// 储水量为 `moist` [mm] 时的水位深度
    fn invert(&self, moist: f64, iterations: usize) -> f64 {
        let (mut shallow, mut deep) = (self.top(), self.bottom());
        if moist >= self.water(shallow) {
            return shallow;
        }
        if moist <= self.water(deep) {
            return deep;
        }
        // 储水量随水位加深单调减少
        for _ in 0..iterations {
            let mid = 0.5 * (shallow + deep);
            if self.water(mid) > moist {
                shallow = mid;
            } else {
                deep = mid;
            }
        }
        0.5 * (shallow + deep)
    }
}

impl WaterTableEstimator for RetentionCurveWaterTable {
    fn name(&self) -> &'static str {
        "retention_curve"
    }

    fn compute_zwt(&self, column: &SoilColumn, cell: &mut CellState) {
        let layers = &column.layers;
        let n = layers.len().min(cell.layers.len());
        if n == 0 {
            return;
        }

        let mut top = 0.0;
        for (layer, state) in layers.iter().zip(cell.layers.iter_mut()) {
            let segment = Segment::new(std::slice::from_ref(layer), top);
            state.zwt = segment.invert(state.moist, self.iterations);
            top += layer.depth;
        }

        let moist: Vec<f64> = cell.layers[..n].iter().map(|l| l.moist).collect();
        let full = Segment::new(&layers[..n], 0.0);
        cell.zwt = full.invert(moist.iter().sum(), self.iterations);

        cell.zwt_lumped = if n > 1 {
            let lower = Segment::new(&layers[1..n], layers[0].depth);
            lower.invert(moist[1..].iter().sum(), self.iterations)
        } else {
            cell.zwt
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> SoilColumn {
        let layers = vec![
            SoilLayer::mineral(0.1, 1500.0, 11.0, 30.0, 0.5),
            SoilLayer::mineral(0.4, 1500.0, 11.0, 30.0, 0.5),
            SoilLayer::mineral(1.0, 1500.0, 11.0, 30.0, 0.5),
        ];
        SoilColumn::new(layers, vec![0.0, 0.5, 2.0])
    }

    fn state(moist: &[f64]) -> CellState {
        let mut s = CellState::new(moist.len(), 1);
        for (l, &m) in s.layers.iter_mut().zip(moist) {
            l.moist = m;
        }
        s
    }

    #[test]
    fn test_saturated_column_table_at_surface() {
        let c = column();
        let max: Vec<f64> = c.layers.iter().map(|l| l.max_moist).collect();
        let mut s = state(&max);
        RetentionCurveWaterTable::default().compute_zwt(&c, &mut s);
        assert!(s.zwt.abs() < 1e-12);
        assert!((s.zwt_lumped - 0.1).abs() < 1e-12);
        assert!((s.layers[2].zwt - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_dry_column_table_at_bottom() {
        let c = column();
        let mut s = state(&[0.0, 0.0, 0.0]);
        RetentionCurveWaterTable::default().compute_zwt(&c, &mut s);
        assert!((s.zwt - 1.5).abs() < 1e-12);
        assert!((s.layers[0].zwt - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_inversion_reproduces_storage() {
        let c = column();
        let full = Segment::new(&c.layers, 0.0);
        let target = full.water(0.8);
        let zwt = full.invert(target, 60);
        assert!((zwt - 0.8).abs() < 1e-6, "zwt = {zwt}");
    }

    #[test]
    fn test_wetter_means_shallower() {
        let c = column();
        let est = RetentionCurveWaterTable::default();
        let mut dry = state(&[20.0, 100.0, 300.0]);
        let mut wet = state(&[35.0, 150.0, 400.0]);
        est.compute_zwt(&c, &mut dry);
        est.compute_zwt(&c, &mut wet);
        assert!(wet.zwt < dry.zwt);
        assert!(wet.zwt_lumped <= dry.zwt_lumped);
    }

    #[test]
    fn test_single_layer_lumped_equals_column() {
        let layer = SoilLayer::mineral(0.5, 1500.0, 11.0, 30.0, 0.5);
        let c = SoilColumn::new(vec![layer], vec![0.0, 0.25, 0.5]);
        // 水位位于底部时层内仍有约 97% 的饱和储水量
        let mut s = state(&[0.99 * c.layers[0].max_moist]);
        RetentionCurveWaterTable::default().compute_zwt(&c, &mut s);
        assert_eq!(s.zwt, s.zwt_lumped);
        assert_eq!(s.zwt, s.layers[0].zwt);
        assert!(s.zwt > 0.0 && s.zwt < 0.5);
    }
}
