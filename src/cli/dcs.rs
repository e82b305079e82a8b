//! # dcs 子命令 CLI 定义
//!
//! 从长格式 CSV（每行 `energy, q, cs`）读取截面表，导出、绘图或插值。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/dcs.rs`

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dcs 主命令参数
#[derive(Args, Debug)]
pub struct DcsArgs {
    #[command(subcommand)]
    pub command: DcsCommands,
}

/// dcs 子命令
#[derive(Subcommand, Debug)]
pub enum DcsCommands {
    /// Export a cross-section table as a gnuplot binary matrix
    Gnuplot(GnuplotArgs),

    /// Plot cross-section curves for selected energies
    Plot(PlotArgs),

    /// Interpolate the cross-section at one (energy, q) point
    Interpolate(InterpolateArgs),
}

/// CSV 列名
#[derive(Args, Debug, Clone)]
pub struct ColumnArgs {
    /// Name of the energy column
    #[arg(long, default_value = "energy")]
    pub energy_col: String,

    /// Name of the dependent quantity column
    #[arg(long, default_value = "q")]
    pub q_col: String,

    /// Name of the cross-section column
    #[arg(long, default_value = "cs")]
    pub cs_col: String,
}

/// 图片格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG bitmap
    Png,
    /// SVG vector graphics
    Svg,
}

// ─────────────────────────────────────────────────────────────
// gnuplot
// ─────────────────────────────────────────────────────────────

/// gnuplot 导出参数
#[derive(Args, Debug)]
pub struct GnuplotArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Output binary matrix
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

// ─────────────────────────────────────────────────────────────
// plot
// ─────────────────────────────────────────────────────────────

/// 绘图参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Output image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of curves, spread evenly over the energy axis
    #[arg(short, long, default_value_t = 5)]
    pub curves: usize,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Image format (inferred from the output extension when omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Chart title
    #[arg(short, long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

// ─────────────────────────────────────────────────────────────
// interpolate
// ─────────────────────────────────────────────────────────────

/// 插值参数
#[derive(Args, Debug)]
pub struct InterpolateArgs {
    /// Input CSV file
    pub input: PathBuf,

    /// Energy, e.g. "150 eV"
    #[arg(short, long)]
    pub energy: String,

    /// Dependent quantity, e.g. "0.3 rad"
    #[arg(short, long)]
    pub q: String,

    #[command(flatten)]
    pub columns: ColumnArgs,
}
