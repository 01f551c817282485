// crates/lh_config/src/lib.rs

//! LandHydro Config Layer (Layer 2)
//!
//! 配置层，提供模型选项与全局参数。本层无泛型，所有数值使用 f64，
//! 通过 serde 以 JSON 形式读写。
//!
//! # 模块概览
//!
//! - [`model_config`]: ModelConfig、ModelOptions、GlobalParams
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: lh_cli        ─> 读取 ModelConfig
//! Layer 3: lh_physics    ─> 按 ModelOptions 选择派生算法
//! Layer 2: lh_config     ─> ModelOptions, GlobalParams (本层)
//! Layer 1: lh_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod model_config;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use error::ConfigError;
pub use model_config::{GlobalParams, ModelConfig, ModelOptions};
