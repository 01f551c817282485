// crates/lh_physics/src/tiles.rs

//! 瓦片迭代
//!
//! 瓦片是 (植被类型, 高程带) 组合。植被覆盖度为 0 或高程带面积比为 0 的
//! 组合是退化瓦片，不参与任何计算。遍历顺序固定为植被优先、高程带次之，
//! 节点参数的计算时机依赖这一顺序。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 瓦片标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    /// 植被类型索引（`Nveg` 为裸土）
    pub veg: usize,
    /// 高程带索引
    pub band: usize,
}

impl TileId {
    /// 创建瓦片标识
    #[inline]
    pub const fn new(veg: usize, band: usize) -> Self {
        Self { veg, band }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile(veg={}, band={})", self.veg, self.band)
    }
}

/// 枚举有效瓦片
///
/// `veg_cover` 含裸土在内共 `Nveg + 1` 项，`area_fract` 为各高程带面积比。
pub fn active_tiles<'a>(
    veg_cover: &'a [f64],
    area_fract: &'a [f64],
) -> impl Iterator<Item = TileId> + 'a {
    veg_cover
        .iter()
        .enumerate()
        .filter(|&(_, &cv)| cv > 0.0)
        .flat_map(move |(veg, _)| {
            area_fract
                .iter()
                .enumerate()
                .filter(|&(_, &af)| af > 0.0)
                .map(move |(band, _)| TileId::new(veg, band))
        })
}
