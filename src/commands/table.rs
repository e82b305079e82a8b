//! # table 命令实现
//!
//! 以表格形式显示带单位的 CSV 数据表。
//!
//! ## 依赖关系
//! - 使用 `cli/table.rs` 定义的参数
//! - 使用 `cslib::dataframe`
//! - 使用 `tabled` 渲染表格

use crate::cli::table::{ShowArgs, TableArgs, TableCommands};
use crate::utils::output;
use cslib::dataframe::{format_sci, DataFrame};
use cslib::error::{CslibError, Result};

use tabled::builder::Builder;
use tabled::Table;

/// 执行 table 命令
pub fn execute(args: TableArgs) -> Result<()> {
    match args.command {
        TableCommands::Show(args) => show(&args),
    }
}

/// 前 `rows` 行（0 表示全部）组成的表格
fn build_table(df: &DataFrame, rows: usize) -> Result<Table> {
    let shown = if rows == 0 { df.len() } else { rows.min(df.len()) };

    let mut builder = Builder::default();
    builder.push_record(df.names().iter().zip(df.units()).map(|(name, unit)| {
        let abbr = unit.abbreviated();
        if abbr.is_empty() {
            name.clone()
        } else {
            format!("{} ({})", name, abbr)
        }
    }));
    let columns = (0..df.width())
        .map(|col| df.column_at(col))
        .collect::<Result<Vec<_>>>()?;
    for row in 0..shown {
        builder.push_record(columns.iter().map(|c| format_sci(c.values()[row])));
    }
    Ok(builder.build())
}

fn show(args: &ShowArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(CslibError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }
    let df = DataFrame::read_csv(&args.input)?;

    output::print_header(&format!("Table '{}'", args.input.display()));
    for comment in df.comments() {
        output::print_info(comment);
    }
    println!("{}", build_table(&df, args.rows)?);

    let shown = if args.rows == 0 { df.len() } else { args.rows.min(df.len()) };
    output::print_done(&format!(
        "Showing {} of {} rows, {} columns",
        shown,
        df.len(),
        df.width()
    ));
    Ok(())
}
