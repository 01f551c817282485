// crates/lh_foundation/src/float.rs

//! 浮点工具
//!
//! 目前只包含 Kahan 补偿求和，用于土柱水量、冰量等守恒量的累加。

/// Kahan 求和器
///
/// 使用 Kahan 求和算法减少浮点累加误差。土柱水量检查会把数十个层、
/// 冻土子区的值相加，直接累加时误差会掩盖真实的守恒偏差。
///
/// # 示例
///
/// ```
/// use lh_foundation::float::KahanSum;
///
/// let mut sum = KahanSum::new();
/// for _ in 0..10000 {
///     sum.add(0.1);
/// }
/// let error = (sum.value() - 1000.0).abs();
/// assert!(error < 1e-10, "误差应该很小: {}", error);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    /// 累加和
    sum: f64,
    /// 补偿项（低位精度损失）
    compensation: f64,
}

impl KahanSum {
    /// 创建新的 Kahan 求和器
    #[inline]
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        // (t - sum) 是 y 的高位部分，减去 y 得到丢失的低位部分
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}
