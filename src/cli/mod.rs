//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `units`: 单位换算与查询
//! - `settings`: 设置文件校验、模型文档、默认值
//! - `dcs`: 截面表导出、绘图、插值
//! - `table`: 显示带单位的 CSV 表
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: units, settings, dcs, table

pub mod dcs;
pub mod settings;
pub mod table;
pub mod units;

use clap::{Parser, Subcommand};

/// CSLib - eScatter 工具链命令行
#[derive(Parser)]
#[command(name = "cslib")]
#[command(author = "eScatter developers")]
#[command(version)]
#[command(about = "Units, settings and cross-section tables for the eScatter tool chain", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert and inspect physical quantities
    Units(units::UnitsArgs),

    /// Validate settings files and document settings models
    Settings(settings::SettingsArgs),

    /// Export, plot and interpolate differential cross-sections
    Dcs(dcs::DcsArgs),

    /// Display CSV tables with unit-annotated columns
    Table(table::TableArgs),
}
