// crates/lh_physics/src/thermal/properties.rs

//! 土壤热力性质
//!
//! - 最大未冻水含量（冻结点降低曲线）
//! - 热导率（Johansen 方法，Farouki 参数）
//! - 体积热容（组分加权）

use crate::constants::{conductivity as k, heat_capacity as c, CM_PER_M, G, LATICE, TKFRZ};
use crate::soil::SoilLayer;

/// 给定温度下可保持液态的最大含水量
///
/// `max_moist` 与返回值单位相同（体积含水量或 mm 均可）；`bubble` 单位 cm。
/// `T >= 0` 时返回 `max_moist`。
pub fn maximum_unfrozen_water(t: f64, max_moist: f64, bubble: f64, expt: f64) -> f64 {
    if t >= 0.0 {
        return max_moist;
    }
    let suction_ratio = (-LATICE * t) / (t + TKFRZ) / (G * bubble / CM_PER_M);
    let unfrozen = max_moist * suction_ratio.powf(-2.0 / (expt - 3.0));
    unfrozen.clamp(0.0, max_moist)
}

/// 土壤热导率 [W/m/K]
///
/// `moist` 为总体积含水量，`unfrozen` 为其中液态部分；两者相等视为未冻结。
pub fn soil_conductivity(moist: f64, unfrozen: f64, layer: &SoilLayer) -> f64 {
    let organic = layer.organic;

    let kdry_min = (0.135 * layer.bulk_dens_min + 64.7)
        / (layer.soil_dens_min - 0.947 * layer.bulk_dens_min);
    let kdry = if organic > 0.0 {
        (1.0 - organic) * kdry_min + organic * k::DRY_ORGANIC
    } else {
        kdry_min
    };

    if moist <= 0.0 {
        return kdry;
    }

    let porosity = 1.0 - layer.bulk_density / layer.soil_density;
    let sr = moist / porosity;

    let ko = if layer.quartz < 0.2 {
        k::OTHER_MINERAL_LOW_QUARTZ
    } else {
        k::OTHER_MINERAL
    };
    let ks_min = k::QUARTZ.powf(layer.quartz) * ko.powf(1.0 - layer.quartz);
    let ks = (1.0 - organic) * ks_min + organic * k::SOLID_ORGANIC;

    let (ksat, ke) = if unfrozen == moist {
        (
            ks.powf(1.0 - porosity) * k::WATER.powf(porosity),
            0.7 * sr.log10() + 1.0,
        )
    } else {
        (
            ks.powf(1.0 - porosity) * k::ICE.powf(porosity - unfrozen) * k::WATER.powf(unfrozen),
            sr,
        )
    };

    ((ksat - kdry) * ke + kdry).max(kdry)
}

/// 体积热容 [J/m³/K]
///
/// 各参数均为体积分数：固体、液态水、冰、固体中有机质比例。
pub fn volumetric_heat_capacity(soil_fract: f64, water_fract: f64, ice_fract: f64, organic_fract: f64) -> f64 {
    c::MINERAL * soil_fract * (1.0 - organic_fract)
        + c::ORGANIC * soil_fract * organic_fract
        + c::WATER * water_fract
        + c::ICE * ice_fract
        + c::AIR * (1.0 - (soil_fract + water_fract + ice_fract))
}
