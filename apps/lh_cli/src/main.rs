// apps/lh_cli/src/main.rs

//! LandHydro 命令行界面
//!
//! 提供网格单元派生状态重建的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 4: Application**：读取 `ModelConfig`，构建
//! `StateDeriver`，其余逻辑全部位于物理层。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// LandHydro 派生状态重建命令行工具
#[derive(Parser)]
#[command(name = "lh_cli")]
#[command(author = "LandHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LandHydro derived soil state reconstruction", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 重建网格单元派生状态
    Derive(commands::derive::DeriveArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置与网格单元
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init 同时安装 log -> tracing 桥接，物理层的 log 记录也会输出
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Derive(args) => commands::derive::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
