// crates/lh_physics/src/error.rs

//! 物理层错误类型
//!
//! 派生状态重建只有一类致命错误：节点水分分配或层冰量估算报告了非物理输入。
//! 这类错误立即终止当前网格单元的处理，外层包装为 [`PhysicsError::Routine`]，
//! 携带失败例程名与所在瓦片。

use lh_foundation::LhError;
use thiserror::Error;

/// 物理层结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// 非有限输入
    #[error("{field}[{index}] 为非有限值 ({value})")]
    NonFinite {
        /// 字段名
        field: &'static str,
        /// 层或节点索引
        index: usize,
        /// 数值
        value: f64,
    },

    /// 非物理输入
    #[error("{field}[{index}]={value} 非物理: {reason}")]
    NonPhysical {
        /// 字段名
        field: &'static str,
        /// 层或节点索引
        index: usize,
        /// 数值
        value: f64,
        /// 原因
        reason: &'static str,
    },

    /// 节点含水量超过节点最大含水量
    #[error("节点 {node} 土壤含水量 {moist:.6} 超过节点最大含水量 {max_moist:.6}")]
    NodeMoistureExceedsMax {
        /// 节点索引
        node: usize,
        /// 节点体积含水量
        moist: f64,
        /// 节点最大体积含水量
        max_moist: f64,
    },

    /// 致命例程错误（包装具体原因）
    #[error("{routine} 失败 (veg={veg}, band={band}): {source}")]
    Routine {
        /// 例程名
        routine: &'static str,
        /// 植被类型索引
        veg: usize,
        /// 高程带索引
        band: usize,
        /// 具体原因
        #[source]
        source: Box<PhysicsError>,
    },

    /// 单元形状或配置不一致
    #[error(transparent)]
    Foundation(#[from] LhError),
}

impl PhysicsError {
    /// 为错误附加例程名与瓦片位置
    pub fn in_routine(self, routine: &'static str, veg: usize, band: usize) -> Self {
        Self::Routine {
            routine,
            veg,
            band,
            source: Box::new(self),
        }
    }

    /// 失败例程名（若有）
    pub fn routine(&self) -> Option<&'static str> {
        match self {
            Self::Routine { routine, .. } => Some(routine),
            _ => None,
        }
    }
}

/// 检查数值有限
#[inline]
pub(crate) fn check_finite(field: &'static str, index: usize, value: f64) -> PhysicsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::NonFinite { field, index, value })
    }
}
