//! # units 子命令 CLI 定义
//!
//! 单位换算与物理量信息。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/units.rs`

use clap::{Args, Subcommand};

/// units 主命令参数
#[derive(Args, Debug)]
pub struct UnitsArgs {
    #[command(subcommand)]
    pub command: UnitsCommands,
}

/// units 子命令
#[derive(Subcommand, Debug)]
pub enum UnitsCommands {
    /// Convert a quantity expression to other units
    Convert(ConvertArgs),

    /// Show magnitude, units, dimensionality and base units of a quantity
    Info(InfoArgs),
}

/// 单位换算参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Quantity expression, e.g. "41 Å" or "2500 kcal"
    pub expr: String,

    /// Target units, e.g. "nm"
    pub target: String,

    /// Print abbreviated unit symbols
    #[arg(short, long, default_value_t = false)]
    pub short: bool,
}

/// 物理量信息参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Quantity expression
    pub expr: String,
}
