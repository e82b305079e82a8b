//! # table 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/table.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// table 子命令参数
#[derive(Args, Debug)]
pub struct TableArgs {
    #[command(subcommand)]
    pub command: TableCommands,
}

/// table 子命令
#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// Print the first rows of a CSV table
    Show(ShowArgs),
}

/// 显示参数
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Number of rows to show (0 = all)
    #[arg(short = 'n', long, default_value_t = 20)]
    pub rows: usize,
}
