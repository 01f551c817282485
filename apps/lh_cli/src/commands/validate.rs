// apps/lh_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证模型配置、土柱参数与网格单元尺寸，并试运行派生流程检查
//! 显式冻土格式的时间步长。

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

use lh_config::ModelConfig;
use lh_foundation::{ValidationReport, ValidationWarning};
use lh_physics::state::GridCell;
use lh_physics::StateDeriver;

use super::{demo_cell, load_cell, DemoCellArgs};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 网格单元 JSON 文件路径（未指定时检查示例单元）
    #[arg(long)]
    pub cell: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub demo: DemoCellArgs,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== LandHydro 配置验证 ===");

    let mut errors: Vec<String> = Vec::new();

    let config = match &args.config {
        Some(path) => {
            println!("\n检查配置文件: {}", path.display());
            match ModelConfig::from_file(path) {
                Ok(config) => {
                    println!("  ✓ 配置有效");
                    config
                }
                Err(e) => {
                    errors.push(e.to_string());
                    return finish(&errors, &ValidationReport::new(), args.strict);
                }
            }
        }
        None => ModelConfig::default(),
    };

    let cell = match &args.cell {
        Some(path) => {
            println!("\n检查网格单元: {}", path.display());
            load_cell(path)?
        }
        None => demo_cell(&config.options, &args.demo),
    };

    let mut report = ValidationReport::new();
    report.merge(cell.soil.check());

    match cell.validate(&config.options) {
        Ok(()) if report.is_valid() => check_timestep(config, cell, &mut report, &mut errors),
        Ok(()) => {}
        Err(e) => errors.push(format!("网格单元与配置不一致: {}", e)),
    }

    if report.has_errors() || report.has_warnings() {
        println!("{}", report);
    } else {
        println!("  ✓ 土柱参数有效");
    }

    finish(&errors, &report, args.strict)
}

/// 试运行派生流程，把显式格式稳定性警告转为验证警告
fn check_timestep(
    config: ModelConfig,
    mut cell: GridCell,
    report: &mut ValidationReport,
    errors: &mut Vec<String>,
) {
    let deriver = match StateDeriver::new(config) {
        Ok(d) => d,
        Err(e) => {
            errors.push(e.to_string());
            return;
        }
    };
    match deriver.derive(&mut cell) {
        Ok(derived) => {
            for w in derived.stability_warnings {
                report.add_warning(ValidationWarning::UnstableTimestep {
                    context: format!("veg={}, band={}", w.veg, w.band),
                    dt: w.dt,
                    dt_max: w.dt_max,
                });
            }
        }
        Err(e) => errors.push(format!("派生试运行失败: {}", e)),
    }
}

fn finish(errors: &[String], report: &ValidationReport, strict: bool) -> Result<()> {
    for e in errors {
        error!("{}", e);
    }
    if report.has_warnings() {
        warn!("土柱检查有 {} 条警告", report.warning_count());
    }

    let error_count = errors.len() + report.error_count();
    let failed = error_count > 0 || (strict && report.has_warnings());
    if failed {
        bail!("验证失败: {} 个错误, {} 个警告", error_count, report.warning_count());
    }

    println!("\n✓ 验证通过");
    Ok(())
}
