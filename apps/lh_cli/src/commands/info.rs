// apps/lh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置以及配置解析出的派生计划。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use lh_config::ModelConfig;
use lh_physics::DerivationPlan;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== LandHydro 信息 ===");

    println!("LandHydro CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "层级: foundation={} config={} physics={}",
        lh_foundation::LAYER,
        lh_config::LAYER,
        lh_physics::LAYER
    );

    if args.defaults || args.config.is_none() {
        println!("\n=== 默认配置 ===");
        let json = serde_json::to_string_pretty(&ModelConfig::default())
            .context("默认配置序列化失败")?;
        println!("{}", json);
    }

    let config = load_config(args.config.as_ref())?;
    let plan = DerivationPlan::from_options(&config.options);
    println!("\n=== 派生计划 ===");
    println!("节点水分: {:?}", plan.node_moisture);
    println!("层含冰量: {:?}", plan.ice_scheme);
    println!("显式稳定性检查: {}", plan.stability_check);
    println!("锋面定位: {}", plan.locate_fronts);

    Ok(())
}
