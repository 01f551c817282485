// crates/lh_physics/src/ice/layer_temperature.rs

//! 层平均温度
//!
//! - 完整剖面：对节点温度的分段线性剖面在层内做深度平均
//! - 快速通量：表层取前两个节点的平均，深层取指数阻尼剖面的层内平均

/// 分段线性剖面在 `[top, bottom]` 上的深度平均温度
///
/// 最深节点以下与首节点以上按端点温度外延。
pub fn profile_layer_temperature(node_depths: &[f64], node_temps: &[f64], top: f64, bottom: f64) -> f64 {
    let at = |z: f64| interpolate(node_depths, node_temps, z);
    if bottom - top <= 0.0 {
        return at(top);
    }

    let mut breaks = Vec::with_capacity(node_depths.len() + 2);
    breaks.push(top);
    breaks.extend(node_depths.iter().copied().filter(|&z| z > top && z < bottom));
    breaks.push(bottom);

    let integral: f64 = breaks
        .windows(2)
        .map(|w| 0.5 * (at(w[0]) + at(w[1])) * (w[1] - w[0]))
        .sum();
    integral / (bottom - top)
}

/// 节点剖面在深度 `z` 处的温度
fn interpolate(node_depths: &[f64], node_temps: &[f64], z: f64) -> f64 {
    let n = node_depths.len().min(node_temps.len());
    if n == 0 {
        return 0.0;
    }
    if z <= node_depths[0] {
        return node_temps[0];
    }
    for i in 1..n {
        if z <= node_depths[i] {
            let (z0, z1) = (node_depths[i - 1], node_depths[i]);
            let w = (z - z0) / (z1 - z0);
            return node_temps[i - 1] + w * (node_temps[i] - node_temps[i - 1]);
        }
    }
    node_temps[n - 1]
}

/// 快速通量方案的层平均温度
///
/// 第一层取 `(T0 + T1) / 2`。更深的层取
/// `T(z) = Tp + (T1 - Tp) exp(-(z - D1) / dp)` 的层内平均，`D1` 为第一层厚度。
pub fn quick_flux_layer_temperatures(depths: &[f64], t0: f64, t1: f64, dp: f64, avg_temp: f64) -> Vec<f64> {
    let Some(&d1) = depths.first() else {
        return Vec::new();
    };

    let mut temps = Vec::with_capacity(depths.len());
    temps.push(0.5 * (t0 + t1));

    let mut top = d1;
    for &depth in &depths[1..] {
        let bottom = top + depth;
        let t = if dp > 0.0 && depth > 0.0 {
            avg_temp
                - dp / depth
                    * (t1 - avg_temp)
                    * ((-(bottom - d1) / dp).exp() - (-(top - d1) / dp).exp())
        } else {
            avg_temp
        };
        temps.push(t);
        top = bottom;
    }

    temps
}
