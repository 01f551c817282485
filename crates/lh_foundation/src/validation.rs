// crates/lh_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于检查点数据与派生状态的检查。
//!
//! # 示例
//!
//! ```
//! use lh_foundation::validation::{ValidationReport, ValidationError};
//!
//! let area_fract = [0.7, 0.5];
//! let mut report = ValidationReport::new();
//! let total: f64 = area_fract.iter().sum();
//! if total > 1.0 {
//!     report.add_error(ValidationError::ConsistencyError {
//!         message: format!("高程带面积比之和 {} > 1", total),
//!     });
//! }
//!
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 检查数值有限，非有限时记录错误并返回 false
    pub fn check_finite(&mut self, field: &'static str, index: usize, value: f64) -> bool {
        if value.is_finite() {
            return true;
        }
        self.add_error(ValidationError::NonFinite {
            field,
            index,
            value,
        });
        false
    }

    /// 检查数值位于 [min, max]，越界时记录错误并返回 false
    pub fn check_range(
        &mut self,
        field: &'static str,
        index: usize,
        value: f64,
        min: f64,
        max: f64,
    ) -> bool {
        if !self.check_finite(field, index, value) {
            return false;
        }
        if value < min || value > max {
            self.add_error(ValidationError::OutOfRange {
                field,
                index,
                value,
                min,
                max,
            });
            return false;
        }
        true
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: &'static str,
        /// 所在层/节点/条带索引
        index: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 数据超出范围
    OutOfRange {
        /// 字段名称
        field: &'static str,
        /// 所在层/节点/条带索引
        index: usize,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                index,
                value,
            } => {
                write!(f, "{}[{}]={} (非有限值)", field, index, value)
            }
            Self::OutOfRange {
                field,
                index,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{}[{}]={} 超出范围[{}, {}]",
                    field, index, value, min, max
                )
            }
            Self::ConsistencyError { message } => {
                write!(f, "一致性错误: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 高数值
    HighValue {
        /// 字段名称
        field: &'static str,
        /// 索引
        index: usize,
        /// 实际值
        value: f64,
        /// 阈值
        threshold: f64,
    },
    /// 显式格式时间步长超过稳定阈值
    UnstableTimestep {
        /// 发生位置描述
        context: String,
        /// 配置的时间步长 [s]
        dt: f64,
        /// 最大稳定时间步长 [s]
        dt_max: f64,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighValue {
                field,
                index,
                value,
                threshold,
            } => {
                write!(f, "{}[{}]={} 高于阈值 {}", field, index, value, threshold)
            }
            Self::UnstableTimestep { context, dt, dt_max } => {
                write!(
                    f,
                    "{}: 时间步长 {} s 超过显式格式稳定上限 {:.3} s",
                    context, dt, dt_max
                )
            }
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_records_error() {
        let mut report = ValidationReport::new();
        assert!(report.check_range("quartz", 0, 0.5, 0.0, 1.0));
        assert!(!report.check_range("quartz", 1, 1.5, 0.0, 1.0));
        assert!(!report.check_range("quartz", 2, f64::NAN, 0.0, 1.0));
        assert_eq!(report.error_count(), 2);
        assert!(matches!(report.errors[1], ValidationError::NonFinite { index: 2, .. }));
    }

    #[test]
    fn test_merge_and_display() {
        let mut a = ValidationReport::new();
        a.add_warning(ValidationWarning::UnstableTimestep {
            context: "tile(0, 0)".into(),
            dt: 3600.0,
            dt_max: 120.0,
        });
        let mut b = ValidationReport::new();
        b.add_error(ValidationError::ConsistencyError {
            message: "节点深度未递增".into(),
        });
        a.merge(b);
        assert!(!a.is_valid());
        assert_eq!(a.warning_count(), 1);
        let text = a.to_string();
        assert!(text.contains("tile(0, 0)"));
        assert!(text.contains("节点深度未递增"));
    }
}
