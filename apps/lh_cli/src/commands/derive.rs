// apps/lh_cli/src/commands/derive.rs

//! 派生状态重建命令
//!
//! 对一个网格单元执行派生流程并输出摘要。网格单元来自 `--cell` 指定的
//! JSON 文件，或按配置构造的示例单元。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use lh_physics::state::GridCell;
use lh_physics::{DerivationReport, StateDeriver};

use super::{demo_cell, load_cell, load_config, DemoCellArgs};

/// 派生命令参数
#[derive(Args)]
pub struct DeriveArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 网格单元 JSON 文件路径
    #[arg(long)]
    pub cell: Option<PathBuf>,

    /// 将派生后的网格单元写入该 JSON 文件
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 以 JSON 打印派生报告
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub demo: DemoCellArgs,
}

/// 执行派生命令
pub fn execute(args: DeriveArgs) -> Result<()> {
    info!("=== LandHydro 派生状态重建 ===");

    let config = load_config(args.config.as_ref())?;
    let mut cell = match &args.cell {
        Some(path) => load_cell(path)?,
        None => {
            info!("未指定网格单元，使用示例单元");
            demo_cell(&config.options, &args.demo)
        }
    };

    let deriver = StateDeriver::new(config).context("配置无效")?;
    info!("执行计划: {:?}", deriver.plan());

    let start = Instant::now();
    let report = deriver.derive(&mut cell).context("派生状态重建失败")?;
    info!("完成，用时 {:.3} ms", start.elapsed().as_secs_f64() * 1e3);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&cell, &report);
    }

    if let Some(path) = &args.output {
        let content = serde_json::to_string_pretty(&cell)?;
        std::fs::write(path, content)
            .with_context(|| format!("无法写入输出文件: {}", path.display()))?;
        info!("派生结果已写入 {}", path.display());
    }

    Ok(())
}

fn print_summary(cell: &GridCell, report: &DerivationReport) {
    println!("\n=== 派生摘要 ===");
    println!("有效瓦片: {}", report.tiles_visited);
    println!("层含冰量方案: {:?}", report.ice_scheme);
    println!("稳定性警告: {}", report.stability_warnings.len());
    println!("含锋面瓦片: {}", report.tiles_with_fronts);

    for id in cell.active_tiles() {
        let Some(tile) = cell.tile(id) else {
            continue;
        };
        let state = &tile.cell;
        println!(
            "\n{}: asat={:.4} zwt={:.3} m zwt_lumped={:.3} m",
            id, state.asat, state.zwt, state.zwt_lumped
        );
        for (l, layer) in state.layers.iter().enumerate() {
            println!(
                "  layer {}: moist={:.2} mm T={:.3} °C ice={:?}",
                l, layer.moist, layer.temperature, layer.ice
            );
        }
        let fronts = &tile.energy.fronts;
        if !fronts.is_empty() {
            println!("  freeze={:?} thaw={:?}", fronts.freeze, fronts.thaw);
        }
    }
}
