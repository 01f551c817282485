// crates/lh_physics/src/state.rs

//! 网格单元与瓦片状态
//!
//! 检查点只保存层含水量、层含冰量与节点温度，其余字段由派生流程写入。
//!
//! # 存储布局
//!
//! 瓦片按 `veg * n_bands + band` 稠密存储，退化瓦片同样占位（检查点中也有
//! 它们的数据），但不会被派生流程访问。

use serde::{Deserialize, Serialize};

use crate::soil::SoilColumn;
use crate::thermal::{FrontDepths, NodeFields};
use crate::tiles::{active_tiles, TileId};
use lh_config::ModelOptions;
use lh_foundation::{ensure, KahanSum, LhError, LhResult};

/// 单层水分状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    /// 总含水量（含冰）[mm]
    pub moist: f64,
    /// 各冻土子区含冰量 [mm]
    pub ice: Vec<f64>,
    /// 层平均温度 [°C]（派生）
    #[serde(default)]
    pub temperature: f64,
    /// 层内地下水位深度 [m]（派生）
    #[serde(default)]
    pub zwt: f64,
}

impl LayerState {
    /// 创建无冰的层状态
    pub fn new(moist: f64, nfrost: usize) -> Self {
        Self {
            moist,
            ice: vec![0.0; nfrost],
            temperature: 0.0,
            zwt: 0.0,
        }
    }

    /// 按冻土子区面积加权的平均含冰量 [mm]
    pub fn mean_ice(&self, frost_fract: &[f64]) -> f64 {
        KahanSum::sum_iter(self.ice.iter().zip(frost_fract).map(|(i, f)| i * f))
    }
}

/// 瓦片水文状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    /// 各土壤层
    pub layers: Vec<LayerState>,
    /// 饱和面积比 [-]（派生）
    #[serde(default)]
    pub asat: f64,
    /// 全土柱地下水位深度 [m]（派生）
    #[serde(default)]
    pub zwt: f64,
    /// 下部土柱地下水位深度 [m]（派生）
    #[serde(default)]
    pub zwt_lumped: f64,
}

impl CellState {
    /// 创建全干的水文状态
    pub fn new(nlayer: usize, nfrost: usize) -> Self {
        Self {
            layers: (0..nlayer).map(|_| LayerState::new(0.0, nfrost)).collect(),
            asat: 0.0,
            zwt: 0.0,
            zwt_lumped: 0.0,
        }
    }

    /// 各层含水量 [mm]
    pub fn layer_moist(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.moist).collect()
    }

    /// 土柱总含水量 [mm]
    pub fn total_moist(&self) -> f64 {
        KahanSum::sum_iter(self.layers.iter().map(|l| l.moist))
    }

    /// 土柱总含冰量（子区面积加权）[mm]
    pub fn total_ice(&self, frost_fract: &[f64]) -> f64 {
        KahanSum::sum_iter(self.layers.iter().map(|l| l.mean_ice(frost_fract)))
    }
}

/// 瓦片能量状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    /// 节点温度 [°C]（检查点，只读）
    pub t: Vec<f64>,
    /// 节点水分与热力场（派生）
    #[serde(default)]
    pub nodes: NodeFields,
    /// 0 °C 锋面（派生）
    #[serde(default)]
    pub fronts: FrontDepths,
}

impl EnergyState {
    /// 创建 0 °C 均匀剖面
    pub fn new(nnode: usize) -> Self {
        Self {
            t: vec![0.0; nnode],
            nodes: NodeFields::new(nnode),
            fronts: FrontDepths::default(),
        }
    }
}

/// 单个瓦片的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileState {
    /// 水文状态
    pub cell: CellState,
    /// 能量状态
    pub energy: EnergyState,
}

impl TileState {
    /// 按配置尺寸创建
    pub fn new(options: &ModelOptions) -> Self {
        Self {
            cell: CellState::new(options.nlayer, options.nfrost),
            energy: EnergyState::new(options.nnode),
        }
    }
}

/// 网格单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// 共享土柱
    pub soil: SoilColumn,
    /// 各植被类型覆盖度，最后一项为裸土
    pub veg_cover: Vec<f64>,
    /// 高程带数
    n_bands: usize,
    /// 稠密瓦片存储
    tiles: Vec<TileState>,
}

impl GridCell {
    /// 按配置分配所有瓦片
    pub fn new(soil: SoilColumn, veg_cover: Vec<f64>, options: &ModelOptions) -> Self {
        let n_bands = options.snow_band;
        let tiles = (0..veg_cover.len() * n_bands)
            .map(|_| TileState::new(options))
            .collect();
        Self {
            soil,
            veg_cover,
            n_bands,
            tiles,
        }
    }

    /// 植被类型数（不含裸土）
    #[inline]
    pub fn n_veg(&self) -> usize {
        self.veg_cover.len().saturating_sub(1)
    }

    /// 高程带数
    #[inline]
    pub fn n_bands(&self) -> usize {
        self.n_bands
    }

    #[inline]
    fn index(&self, id: TileId) -> usize {
        id.veg * self.n_bands + id.band
    }

    /// 获取瓦片
    pub fn tile(&self, id: TileId) -> Option<&TileState> {
        if id.band >= self.n_bands {
            return None;
        }
        self.tiles.get(self.index(id))
    }

    /// 获取可变瓦片
    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut TileState> {
        if id.band >= self.n_bands {
            return None;
        }
        let idx = self.index(id);
        self.tiles.get_mut(idx)
    }

    /// 同时借出共享土柱（只读）与瓦片（可变）
    pub fn split_tile_mut(&mut self, id: TileId) -> LhResult<(&SoilColumn, &mut TileState)> {
        if id.band >= self.n_bands {
            return Err(LhError::index_out_of_bounds("band", id.band, self.n_bands));
        }
        let idx = self.index(id);
        let len = self.tiles.len();
        match self.tiles.get_mut(idx) {
            Some(tile) => Ok((&self.soil, tile)),
            None => Err(LhError::index_out_of_bounds("tile", idx, len)),
        }
    }

    /// 有效瓦片（植被优先、高程带次之）
    pub fn active_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        active_tiles(&self.veg_cover, &self.soil.area_fract)
    }

    /// 检查单元各数组尺寸与配置一致
    pub fn validate(&self, options: &ModelOptions) -> LhResult<()> {
        let soil = &self.soil;
        let checks = [
            ("soil.layers", options.nlayer, soil.layers.len()),
            ("soil.node_depths", options.nnode, soil.node_depths.len()),
            ("soil.frost_fract", options.nfrost, soil.frost_fract.len()),
            ("soil.area_fract", options.snow_band, soil.area_fract.len()),
            ("tiles", self.veg_cover.len() * self.n_bands, self.tiles.len()),
        ];
        for (name, expected, actual) in checks {
            if expected != actual {
                return Err(LhError::size_mismatch(name, expected, actual));
            }
        }
        ensure!(!self.veg_cover.is_empty(), LhError::invalid_input("veg_cover 至少需要裸土一项"));
        for &cv in &self.veg_cover {
            ensure!((0.0..=1.0).contains(&cv), LhError::out_of_range("veg_cover", cv, 0.0, 1.0));
        }
        if self.n_bands != options.snow_band {
            return Err(LhError::size_mismatch("n_bands", options.snow_band, self.n_bands));
        }

        for tile in &self.tiles {
            if tile.cell.layers.len() != options.nlayer {
                return Err(LhError::size_mismatch("cell.layers", options.nlayer, tile.cell.layers.len()));
            }
            if let Some(layer) = tile.cell.layers.iter().find(|l| l.ice.len() != options.nfrost) {
                return Err(LhError::size_mismatch("layer.ice", options.nfrost, layer.ice.len()));
            }
            let e = &tile.energy;
            for (name, len) in [
                ("energy.t", e.t.len()),
                ("energy.nodes.moist", e.nodes.moist.len()),
                ("energy.nodes.ice", e.nodes.ice.len()),
                ("energy.nodes.kappa", e.nodes.kappa.len()),
                ("energy.nodes.cs", e.nodes.cs.len()),
            ] {
                if len != options.nnode {
                    return Err(LhError::size_mismatch(name, options.nnode, len));
                }
            }
        }

        Ok(())
    }
}
