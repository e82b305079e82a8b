//! # settings 子命令 CLI 定义
//!
//! 设置文件校验、模型文档、默认设置生成。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/settings.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// settings 主命令参数
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

/// settings 子命令
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Validate settings files against a model schema
    Check(CheckArgs),

    /// Print the documentation of a model schema
    Doc(DocArgs),

    /// Write the default settings of a model schema as YAML
    Defaults(DefaultsArgs),
}

// ─────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────

/// 设置校验参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Settings file or directory of settings files
    pub input: PathBuf,

    /// Model schema (YAML)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Comma-separated glob patterns for files in a directory (default: *.yaml, *.yml)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}

// ─────────────────────────────────────────────────────────────
// doc / defaults
// ─────────────────────────────────────────────────────────────

/// 模型文档参数
#[derive(Args, Debug)]
pub struct DocArgs {
    /// Model schema (YAML)
    #[arg(short, long)]
    pub model: PathBuf,
}

/// 默认设置参数
#[derive(Args, Debug)]
pub struct DefaultsArgs {
    /// Model schema (YAML)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
