//! # 截面表
//!
//! 微分截面表 [`Dcs`]、通用二维表 [`GridTable`]、gnuplot 二进制矩阵导出与绘图。
//!
//! ## 依赖关系
//! - 被 `commands/dcs.rs` 使用
//! - 使用 `units/`, `dataframe/`

mod axis;
pub mod dcs;
pub mod gnuplot;
pub mod grid;
pub mod plot;

pub use dcs::Dcs;
pub use gnuplot::{read_matrix, write_matrix, GnuplotMatrix};
pub use grid::{GridTable, GridUnits, LogScale};
pub use plot::{plot_dcs, PlotOptions};
