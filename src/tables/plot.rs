//! # 截面表绘图
//!
//! 使用 `plotters` 画出若干能量下的 `cs(q)` 曲线，y 轴取对数。
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/dcs.rs` 调用
//! - 使用 `tables/dcs.rs` 的 Dcs

use super::Dcs;
use crate::error::{CslibError, Result};

use plotters::prelude::*;
use std::path::Path;

/// 绘图选项
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// 曲线条数（在能量轴上均匀抽取）
    pub curves: usize,
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
    pub title: String,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            curves: 5,
            width: 1200,
            height: 800,
            use_svg: false,
            title: "Differential cross-section".to_string(),
        }
    }
}

/// 一条曲线：图例与 `(q, cs)` 点
struct Curve {
    label: String,
    points: Vec<(f64, f64)>,
}

/// 均匀抽取 `count` 个下标，包含两端
fn pick_indices(n: usize, count: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![0],
        _ if count >= n => (0..n).collect(),
        _ => {
            let mut idx: Vec<usize> = (0..count)
                .map(|k| ((k * (n - 1)) as f64 / (count - 1) as f64).round() as usize)
                .collect();
            idx.dedup();
            idx
        }
    }
}

/// 取出待画曲线，丢弃非正值（对数坐标）
fn collect_curves(dcs: &Dcs, count: usize) -> Vec<Curve> {
    let (n, m) = dcs.shape();
    let energy = dcs.energy();
    let q = dcs.q().values();
    pick_indices(n, count)
        .into_iter()
        .map(|i| Curve {
            label: format!("E = {:.4e} {}", energy.values()[i], energy.units().abbreviated()),
            points: (0..m)
                .map(|j| (q[j], dcs.cs_at(i, j)))
                .filter(|(_, v)| *v > 0.0 && v.is_finite())
                .collect(),
        })
        .filter(|c| !c.points.is_empty())
        .collect()
}

/// 生成截面图
pub fn plot_dcs(dcs: &Dcs, output_path: &Path, options: &PlotOptions) -> Result<()> {
    if options.curves == 0 {
        return Err(CslibError::InvalidArgument(
            "number of curves must be at least 1".to_string(),
        ));
    }
    let curves = collect_curves(dcs, options.curves);
    if curves.is_empty() {
        return Err(CslibError::InvalidTable(
            "no positive cross-section values to plot on a log scale".to_string(),
        ));
    }

    let x_desc = format!("q ({})", dcs.q().units().abbreviated());
    let y_desc = format!("cs ({})", dcs.cs().units().abbreviated());
    let size = (options.width, options.height);

    if options.use_svg {
        let root = SVGBackend::new(output_path, size).into_drawing_area();
        draw_dcs_chart(&root, &curves, &options.title, &x_desc, &y_desc)?;
        root.present()
            .map_err(|e| CslibError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        draw_dcs_chart(&root, &curves, &options.title, &x_desc, &y_desc)?;
        root.present()
            .map_err(|e| CslibError::Other(e.to_string()))?;
    }

    tracing::debug!("Wrote {} curves to {}", curves.len(), output_path.display());
    Ok(())
}

/// 绘图核心逻辑
fn draw_dcs_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[Curve],
    title: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| CslibError::Other(format!("{:?}", e)))?;

    let points = || curves.iter().flat_map(|c| c.points.iter());
    let x_min = points().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    // 单点时给坐标轴留出宽度
    let (x_min, x_max) = if x_max > x_min {
        (x_min, x_max)
    } else {
        (x_min - 1.0, x_max + 1.0)
    };
    let (y_min, y_max) = (y_min / 2.0, y_max * 2.0);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, (y_min..y_max).log_scale())
        .map_err(|e| CslibError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .y_label_formatter(&|y| format!("{:.0e}", y))
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| CslibError::Other(format!("{:?}", e)))?;

    for (k, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| CslibError::Other(format!("{:?}", e)))?
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| CslibError::Other(format!("{:?}", e)))?;

    Ok(())
}
