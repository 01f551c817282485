// crates/lh_physics/src/ice/frost.rs

//! 冻土子区
//!
//! 子区温度在 `[T - slope/2, T + slope/2]` 上按累积面积的中点线性取样，
//! 每个子区独立按未冻水曲线析出冰。

use crate::thermal::maximum_unfrozen_water;

/// 各冻土子区的温度
pub fn frost_subarea_temperatures(layer_temp: f64, frost_fract: &[f64], frost_slope: f64) -> Vec<f64> {
    if frost_fract.len() <= 1 {
        return vec![layer_temp; frost_fract.len()];
    }

    let min_temp = layer_temp - frost_slope / 2.0;
    let mut cumulative = 0.0;
    frost_fract
        .iter()
        .map(|&f| {
            let mid = cumulative + f / 2.0;
            cumulative += f;
            min_temp + frost_slope * mid
        })
        .collect()
}

/// 单个子区的含冰量 [mm]
///
/// `moist`、`max_moist` 单位 mm，`bubble` 单位 cm。
#[inline]
pub fn subarea_ice(t: f64, moist: f64, max_moist: f64, bubble: f64, expt: f64) -> f64 {
    if t < 0.0 {
        (moist - maximum_unfrozen_water(t, max_moist, bubble, expt)).max(0.0)
    } else {
        0.0
    }
}
