// crates/lh_physics/src/soil.rs

//! 土柱描述
//!
//! 每个网格单元共享一个 [`SoilColumn`]：水文土壤层的静态参数、热力节点深度、
//! 冻土子区划分、阻尼深度以及各高程带面积比。热力节点参数
//! ([`NodeParameters`]) 由派生流程写入，其余字段由外部加载器提供。
//!
//! # 单位约定
//!
//! - 层厚、节点深度、阻尼深度: m
//! - 层含水量、最大含水量: mm
//! - 进气压力 `bubble`: cm
//! - 密度: kg/m³

use serde::{Deserialize, Serialize};

use crate::constants::{DEPTH_EPSILON, MM_PER_M};
use crate::thermal::NodeParameters;
use lh_foundation::{ValidationError, ValidationReport, ValidationWarning};

/// ARNO 入渗形状参数的常见上限
const B_INFILT_TYPICAL_MAX: f64 = 1.0;

/// 水文土壤层静态参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// 层厚 [m]
    pub depth: f64,
    /// 最大含水量 [mm]
    pub max_moist: f64,
    /// Brooks-Corey 指数
    pub expt: f64,
    /// 进气压力 [cm]
    pub bubble: f64,
    /// 残余体积含水量 [m³/m³]
    pub resid_moist: f64,
    /// 容重 [kg/m³]
    pub bulk_density: f64,
    /// 颗粒密度 [kg/m³]
    pub soil_density: f64,
    /// 矿物部分容重 [kg/m³]
    pub bulk_dens_min: f64,
    /// 矿物部分颗粒密度 [kg/m³]
    pub soil_dens_min: f64,
    /// 石英含量 [-]
    pub quartz: f64,
    /// 有机质比例 [-]
    pub organic: f64,
}

impl SoilLayer {
    /// 纯矿物土层，最大含水量取孔隙度 × 层厚
    pub fn mineral(depth: f64, bulk_density: f64, expt: f64, bubble: f64, quartz: f64) -> Self {
        let soil_density = 2685.0;
        let porosity = 1.0 - bulk_density / soil_density;
        Self {
            depth,
            max_moist: porosity * depth * MM_PER_M,
            expt,
            bubble,
            resid_moist: 0.0,
            bulk_density,
            soil_density,
            bulk_dens_min: bulk_density,
            soil_dens_min: soil_density,
            quartz,
            organic: 0.0,
        }
    }

    /// 体积最大含水量 [m³/m³]
    #[inline]
    pub fn porosity(&self) -> f64 {
        self.max_moist / self.depth / MM_PER_M
    }

    /// 固体体积比 [-]
    #[inline]
    pub fn solid_fraction(&self) -> f64 {
        self.bulk_density / self.soil_density
    }
}

/// 网格单元共享的土柱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilColumn {
    /// 水文土壤层（自上而下）
    pub layers: Vec<SoilLayer>,
    /// 热力节点深度 [m]，严格递增，首节点位于地表
    pub node_depths: Vec<f64>,
    /// 热力节点参数（派生）
    #[serde(default)]
    pub nodes: NodeParameters,
    /// 冻土子区面积比
    pub frost_fract: Vec<f64>,
    /// 冻土子区温度分布宽度 [°C]
    pub frost_slope: f64,
    /// 温度阻尼深度 [m]
    pub dp: f64,
    /// 年平均土壤温度（阻尼深度处）[°C]
    pub avg_temp: f64,
    /// 各高程带面积比
    pub area_fract: Vec<f64>,
    /// ARNO 入渗曲线形状参数
    pub b_infilt: f64,
    /// 该土柱是否可能发生冻结
    pub fs_active: bool,
}

impl SoilColumn {
    /// 以默认附属参数创建土柱：单冻土子区、单高程带、阻尼深度取最深节点
    pub fn new(layers: Vec<SoilLayer>, node_depths: Vec<f64>) -> Self {
        let dp = node_depths.last().copied().unwrap_or(0.0);
        Self {
            layers,
            node_depths,
            nodes: NodeParameters::default(),
            frost_fract: vec![1.0],
            frost_slope: 0.0,
            dp,
            avg_temp: 0.0,
            area_fract: vec![1.0],
            b_infilt: 0.2,
            fs_active: true,
        }
    }

    /// 设置冻土子区（等分温度分布）
    pub fn with_frost_areas(mut self, nfrost: usize, frost_slope: f64) -> Self {
        self.frost_fract = Self::frost_fractions(nfrost);
        self.frost_slope = frost_slope;
        self
    }

    /// 设置高程带面积比
    pub fn with_area_fract(mut self, area_fract: Vec<f64>) -> Self {
        self.area_fract = area_fract;
        self
    }

    /// 设置阻尼深度与平均温度
    pub fn with_damping(mut self, dp: f64, avg_temp: f64) -> Self {
        self.dp = dp;
        self.avg_temp = avg_temp;
        self
    }

    /// 冻土子区面积比
    ///
    /// 单子区时为 `[1]`；多子区时两端子区各占半个间隔，内部子区各占一个间隔，
    /// 使子区温度在 `[T - slope/2, T + slope/2]` 上均匀取样。
    pub fn frost_fractions(nfrost: usize) -> Vec<f64> {
        match nfrost {
            0 => Vec::new(),
            1 => vec![1.0],
            n => {
                let step = 1.0 / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == 0 || i == n - 1 { step / 2.0 } else { step })
                    .collect()
            }
        }
    }

    /// 土壤层数
    #[inline]
    pub fn nlayer(&self) -> usize {
        self.layers.len()
    }

    /// 热力节点数
    #[inline]
    pub fn nnode(&self) -> usize {
        self.node_depths.len()
    }

    /// 各层底部累积深度 [m]
    pub fn layer_bottoms(&self) -> Vec<f64> {
        self.layers
            .iter()
            .scan(0.0, |acc, layer| {
                *acc += layer.depth;
                Some(*acc)
            })
            .collect()
    }

    /// 土柱总深度 [m]
    pub fn total_depth(&self) -> f64 {
        self.layers.iter().map(|l| l.depth).sum()
    }

    /// 检查土柱静态参数的物理一致性
    pub fn check(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.layers.is_empty() {
            report.add_error(ValidationError::ConsistencyError {
                message: "土柱没有土壤层".into(),
            });
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if report.check_range("depth", i, layer.depth, f64::MIN_POSITIVE, f64::MAX) {
                report.check_range(
                    "max_moist",
                    i,
                    layer.max_moist,
                    f64::MIN_POSITIVE,
                    layer.depth * MM_PER_M,
                );
            }
            // expt = 3 + 2/λ，必须大于 3
            report.check_range("expt", i, layer.expt, 3.0 + 1e-6, f64::MAX);
            report.check_range("bubble", i, layer.bubble, 0.0, f64::MAX);
            report.check_range("quartz", i, layer.quartz, 0.0, 1.0);
            report.check_range("organic", i, layer.organic, 0.0, 1.0);
            report.check_range("resid_moist", i, layer.resid_moist, 0.0, 1.0);
            if report.check_range("soil_density", i, layer.soil_density, f64::MIN_POSITIVE, f64::MAX) {
                report.check_range("bulk_density", i, layer.bulk_density, f64::MIN_POSITIVE, layer.soil_density);
            }
            if report.check_range("soil_dens_min", i, layer.soil_dens_min, f64::MIN_POSITIVE, f64::MAX) {
                report.check_range("bulk_dens_min", i, layer.bulk_dens_min, f64::MIN_POSITIVE, layer.soil_dens_min);
            }
        }

        if let Some(&first) = self.node_depths.first() {
            if first.abs() > DEPTH_EPSILON {
                report.add_error(ValidationError::OutOfRange {
                    field: "node_depths",
                    index: 0,
                    value: first,
                    min: 0.0,
                    max: 0.0,
                });
            }
        }
        for (i, pair) in self.node_depths.windows(2).enumerate() {
            if !(pair[1] > pair[0]) {
                report.add_error(ValidationError::ConsistencyError {
                    message: format!(
                        "热力节点深度未严格递增: node_depths[{}]={} >= node_depths[{}]={}",
                        i,
                        pair[0],
                        i + 1,
                        pair[1]
                    ),
                });
            }
        }
        if let Some(&last) = self.node_depths.last() {
            let bottom = self.total_depth();
            if last + DEPTH_EPSILON < bottom {
                report.add_error(ValidationError::ConsistencyError {
                    message: format!("最深热力节点 {} m 浅于土柱底部 {} m", last, bottom),
                });
            }
        }

        let mut area_total = 0.0;
        for (band, &af) in self.area_fract.iter().enumerate() {
            report.check_range("area_fract", band, af, 0.0, 1.0);
            area_total += af;
        }
        if area_total > 1.0 + 1e-6 {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("高程带面积比之和 {} 大于 1", area_total),
            });
        }

        let frost_total: f64 = self.frost_fract.iter().sum();
        if (frost_total - 1.0).abs() > 1e-6 {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("冻土子区面积比之和 {} 不等于 1", frost_total),
            });
        }

        if report.check_range("dp", 0, self.dp, f64::MIN_POSITIVE, f64::MAX) {
            if let Some(&last) = self.node_depths.last() {
                if self.dp < last {
                    report.add_warning(ValidationWarning::Custom {
                        message: format!("阻尼深度 {} m 浅于最深热力节点 {} m", self.dp, last),
                    });
                }
            }
        }
        if self.b_infilt > B_INFILT_TYPICAL_MAX {
            report.add_warning(ValidationWarning::HighValue {
                field: "b_infilt",
                index: 0,
                value: self.b_infilt,
                threshold: B_INFILT_TYPICAL_MAX,
            });
        }
        report.check_range("b_infilt", 0, self.b_infilt, f64::MIN_POSITIVE, f64::MAX);
        report.check_finite("avg_temp", 0, self.avg_temp);
        report.check_range("frost_slope", 0, self.frost_slope, 0.0, f64::MAX);

        report
    }
}
