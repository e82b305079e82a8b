//! # dcs 命令实现
//!
//! 读取长格式 CSV 截面表，导出 gnuplot 二进制矩阵、绘图或单点插值。
//!
//! ## 依赖关系
//! - 使用 `cli/dcs.rs` 定义的参数
//! - 使用 `cslib::tables`, `cslib::dataframe`
//! - 使用 `utils/output.rs`

use crate::cli::dcs::{
    ColumnArgs, DcsArgs, DcsCommands, GnuplotArgs, ImageFormat, InterpolateArgs, PlotArgs,
};
use crate::utils::output;
use cslib::dataframe::DataFrame;
use cslib::error::{CslibError, Result};
use cslib::tables::{plot_dcs, Dcs, PlotOptions};
use cslib::units::{units, Quantity};

use std::path::Path;

/// 执行 dcs 命令
pub fn execute(args: DcsArgs) -> Result<()> {
    match args.command {
        DcsCommands::Gnuplot(args) => gnuplot(&args),
        DcsCommands::Plot(args) => plot(&args),
        DcsCommands::Interpolate(args) => interpolate(&args),
    }
}

/// 读取截面表
fn load_dcs(path: &Path, columns: &ColumnArgs) -> Result<Dcs> {
    if !path.exists() {
        return Err(CslibError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let df = DataFrame::read_csv(path)?;
    let dcs = Dcs::from_dataframe(&df, &columns.energy_col, &columns.q_col, &columns.cs_col)?;
    let (n, m) = dcs.shape();
    output::print_info(&format!(
        "Loaded '{}': {} energies x {} {} values",
        path.display(),
        n,
        m,
        columns.q_col
    ));
    Ok(dcs)
}

fn gnuplot(args: &GnuplotArgs) -> Result<()> {
    let dcs = load_dcs(&args.input, &args.columns)?;
    dcs.save_gnuplot(&args.output)?;
    output::print_conversion(
        &args.input.display().to_string(),
        &args.output.display().to_string(),
    );
    Ok(())
}

/// 输出格式：显式指定优先，否则按扩展名
fn use_svg(format: Option<ImageFormat>, output: &Path) -> bool {
    match format {
        Some(f) => f == ImageFormat::Svg,
        None => output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg")),
    }
}

fn plot(args: &PlotArgs) -> Result<()> {
    let dcs = load_dcs(&args.input, &args.columns)?;

    let title = args.title.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table");
        format!("Differential cross-section: {}", stem)
    });
    let options = PlotOptions {
        curves: args.curves,
        width: args.width,
        height: args.height,
        use_svg: use_svg(args.format, &args.output),
        title,
    };

    plot_dcs(&dcs, &args.output, &options)?;
    output::print_success(&format!("Plot saved to '{}'", args.output.display()));
    Ok(())
}

/// 点是否落在网格闭区间内
fn in_domain(dcs: &Dcs, energy: &Quantity, q: &Quantity) -> Result<bool> {
    let e = energy.value_in(dcs.energy().units())?;
    let x = q.value_in(dcs.q().units())?;
    let inside = |axis: &[f64], v: f64| match (axis.first(), axis.last()) {
        (Some(lo), Some(hi)) => *lo <= v && v <= *hi,
        _ => false,
    };
    Ok(inside(dcs.energy().values(), e) && inside(dcs.q().values(), x))
}

fn interpolate(args: &InterpolateArgs) -> Result<()> {
    let dcs = load_dcs(&args.input, &args.columns)?;
    let energy = units().parse_expression(&args.energy)?;
    let q = units().parse_expression(&args.q)?;

    if !in_domain(&dcs, &energy, &q)? {
        output::print_warning("Point lies outside the table; the cross-section is zero there");
    }

    let cs = dcs.interpolate(&energy, &q)?;
    output::print_field("Energy", &energy.abbreviated());
    output::print_field(&args.columns.q_col, &q.abbreviated());
    output::print_field(&args.columns.cs_col, &cs.abbreviated());
    Ok(())
}
