// apps/lh_cli/src/commands/mod.rs

//! CLI 命令模块

pub mod derive;
pub mod info;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use lh_config::{ModelConfig, ModelOptions};
use lh_physics::soil::{SoilColumn, SoilLayer};
use lh_physics::state::GridCell;
use lh_physics::thermal::uniform_node_depths;
use lh_physics::TileId;

/// 示例网格单元参数（未提供 `--cell` 时使用）
#[derive(Args, Debug, Clone)]
pub struct DemoCellArgs {
    /// 植被类型数（另加一个裸土瓦片）
    #[arg(long, default_value = "1")]
    pub veg: usize,

    /// 层含水量占最大含水量的比例
    #[arg(long, default_value = "0.6")]
    pub moist_fraction: f64,

    /// 地表节点温度 [°C]
    #[arg(long, default_value = "2.0", allow_hyphen_values = true)]
    pub surface_temp: f64,

    /// 节点温度梯度 [°C/m]
    #[arg(long, default_value = "-4.0", allow_hyphen_values = true)]
    pub gradient: f64,

    /// 冻土子区温度分布宽度 [°C]
    #[arg(long, default_value = "1.0")]
    pub frost_slope: f64,
}

/// 读取配置文件，未指定时使用默认配置
pub fn load_config(path: Option<&PathBuf>) -> Result<ModelConfig> {
    match path {
        Some(p) => ModelConfig::from_file(p)
            .with_context(|| format!("无法加载配置文件: {}", p.display())),
        None => Ok(ModelConfig::default()),
    }
}

/// 读取 JSON 网格单元
pub fn load_cell(path: &Path) -> Result<GridCell> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取网格单元文件: {}", path.display()))?;
    serde_json::from_str(&content).context("网格单元 JSON 解析失败")
}

/// 按配置构造示例网格单元
///
/// 层厚自上而下按 3 倍递增（首层 0.1 m），节点均匀分布到土柱底部，
/// 植被与高程带均分面积，所有瓦片使用同一线性温度剖面。
pub fn demo_cell(options: &ModelOptions, args: &DemoCellArgs) -> GridCell {
    let layers: Vec<SoilLayer> = (0..options.nlayer)
        .map(|i| SoilLayer::mineral(0.1 * 3f64.powi(i as i32), 1500.0, 11.0, 30.0, 0.5))
        .collect();
    let total: f64 = layers.iter().map(|l| l.depth).sum();
    let node_depths = uniform_node_depths(options.nnode, total);
    let temps: Vec<f64> = node_depths
        .iter()
        .map(|&z| args.surface_temp + args.gradient * z)
        .collect();

    let band_fract = 1.0 / options.snow_band as f64;
    let soil = SoilColumn::new(layers, node_depths)
        .with_frost_areas(options.nfrost, args.frost_slope)
        .with_area_fract(vec![band_fract; options.snow_band])
        .with_damping(4.0, args.surface_temp + args.gradient * 4.0);

    let n_cover = args.veg + 1;
    let mut cell = GridCell::new(soil, vec![1.0 / n_cover as f64; n_cover], options);

    let max_moist: Vec<f64> = cell.soil.layers.iter().map(|l| l.max_moist).collect();
    let ids: Vec<TileId> = cell.active_tiles().collect();
    for id in ids {
        if let Some(tile) = cell.tile_mut(id) {
            for (layer, &max) in tile.cell.layers.iter_mut().zip(&max_moist) {
                layer.moist = args.moist_fraction * max;
            }
            tile.energy.t = temps.clone();
        }
    }

    cell
}
