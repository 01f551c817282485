// crates/lh_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `LhError` 枚举和 `LhResult` 类型别名。物理计算相关的错误在
//! `lh_physics` 中扩展，本层只定义输入、范围与形状类的核心错误。
//!
//! # 示例
//!
//! ```
//! use lh_foundation::error::{LhError, LhResult};
//!
//! fn check_layers(n: usize) -> LhResult<()> {
//!     if n == 0 {
//!         return Err(LhError::invalid_input("至少需要一个土壤层"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_layers(0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type LhResult<T> = Result<T, LhError>;

/// LandHydro 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LhError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl LhError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 是否为形状类错误（尺寸或索引）
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. } | Self::IndexOutOfBounds { .. })
    }
}

/// 检查条件，不满足时返回错误
///
/// ```
/// use lh_foundation::{ensure, LhError, LhResult};
///
/// fn positive(x: f64) -> LhResult<f64> {
///     ensure!(x > 0.0, LhError::out_of_range("x", x, 0.0, f64::MAX));
///     Ok(x)
/// }
///
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
