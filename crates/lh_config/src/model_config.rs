// crates/lh_config/src/model_config.rs

//! ModelConfig - 模型选项与全局参数
//!
//! 对应全局参数文件中与土壤热力/冻土相关的开关、离散化规模以及模型时间步长。
//! 派生状态重建只读取本配置，从不修改。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// 模型配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 物理过程开关与离散化规模
    #[serde(default)]
    pub options: ModelOptions,

    /// 全局参数
    #[serde(default)]
    pub global: GlobalParams,
}

/// 物理过程开关与离散化规模
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// 完整能量平衡
    #[serde(default)]
    pub full_energy: bool,

    /// 冻土物理
    #[serde(default)]
    pub frozen_soil: bool,

    /// 快速地热通量近似（两节点通量方案）
    #[serde(default = "default_true")]
    pub quick_flux: bool,

    /// 隐式热传导积分
    #[serde(default = "default_true")]
    pub implicit: bool,

    /// 底部零通量边界
    #[serde(default)]
    pub noflux: bool,

    /// 水文土壤层数
    #[serde(default = "default_nlayer")]
    pub nlayer: usize,

    /// 热力节点数
    #[serde(default = "default_nnode")]
    pub nnode: usize,

    /// 冻土子区数
    #[serde(default = "default_nfrost")]
    pub nfrost: usize,

    /// 高程带数
    #[serde(default = "default_snow_band")]
    pub snow_band: usize,

    /// 每种冻结/融化锋面的最大记录数
    #[serde(default = "default_max_fronts")]
    pub max_fronts: usize,
}

fn default_true() -> bool { true }
fn default_nlayer() -> usize { 3 }
fn default_nnode() -> usize { 3 }
fn default_nfrost() -> usize { 1 }
fn default_snow_band() -> usize { 1 }
fn default_max_fronts() -> usize { 3 }

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            full_energy: false,
            frozen_soil: false,
            quick_flux: default_true(),
            implicit: default_true(),
            noflux: false,
            nlayer: default_nlayer(),
            nnode: default_nnode(),
            nfrost: default_nfrost(),
            snow_band: default_snow_band(),
            max_fronts: default_max_fronts(),
        }
    }
}

impl ModelOptions {
    /// 是否需要在热力节点上分配水分/冰
    #[inline]
    pub fn needs_node_moisture(&self) -> bool {
        self.full_energy || self.frozen_soil
    }

    /// 显式冻土求解是否需要做时间步长稳定性检查
    #[inline]
    pub fn needs_stability_check(&self) -> bool {
        self.frozen_soil && !self.quick_flux && !self.implicit
    }
}

/// 全局参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalParams {
    /// 模型时间步长 [s]
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_dt() -> f64 { 3600.0 }

impl Default for GlobalParams {
    fn default() -> Self {
        Self { dt: default_dt() }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            options: ModelOptions::default(),
            global: GlobalParams::default(),
        }
    }
}

impl ModelConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.options;

        if o.nlayer < 1 {
            return Err(ConfigError::invalid("options.nlayer", o.nlayer, "至少需要 1 个土壤层"));
        }
        if o.nnode < 3 {
            return Err(ConfigError::invalid("options.nnode", o.nnode, "至少需要 3 个热力节点"));
        }
        if o.quick_flux && o.nnode != 3 {
            return Err(ConfigError::invalid(
                "options.nnode",
                o.nnode,
                "quick_flux 方案要求恰好 3 个热力节点",
            ));
        }
        if o.nfrost < 1 {
            return Err(ConfigError::invalid("options.nfrost", o.nfrost, "至少需要 1 个冻土子区"));
        }
        if o.snow_band < 1 {
            return Err(ConfigError::invalid("options.snow_band", o.snow_band, "至少需要 1 个高程带"));
        }
        if o.max_fronts < 1 {
            return Err(ConfigError::invalid("options.max_fronts", o.max_fronts, "必须为正"));
        }
        if !(self.global.dt.is_finite() && self.global.dt > 0.0) {
            return Err(ConfigError::invalid("global.dt", self.global.dt, "时间步长必须为正"));
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}
