// crates/lh_foundation/src/lib.rs

//! LandHydro Foundation Layer (Layer 1)
//!
//! 基础层，提供整个项目共用的最小抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: Kahan 补偿求和
//! - [`validation`]: 验证报告、错误与警告
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: lh_cli        ─> 命令行入口
//! Layer 3: lh_physics    ─> 派生状态重建
//! Layer 2: lh_config     ─> ModelOptions, GlobalParams
//! Layer 1: lh_foundation ─> LhError, KahanSum, ValidationReport (本层)
//! ```
//!
//! # 示例
//!
//! ```
//! use lh_foundation::{KahanSum, LhError, LhResult};
//!
//! fn column_water(moist: &[f64]) -> LhResult<f64> {
//!     if moist.is_empty() {
//!         return Err(LhError::invalid_input("土壤层为空"));
//!     }
//!     Ok(KahanSum::sum_iter(moist.iter().copied()))
//! }
//!
//! assert_eq!(column_water(&[10.0, 20.0]).unwrap(), 30.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod validation;

/// 层级标识
pub const LAYER: u8 = 1;

// 重导出常用类型
pub use error::{LhError, LhResult};
pub use float::KahanSum;
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{LhError, LhResult};
    pub use crate::float::KahanSum;
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
}
