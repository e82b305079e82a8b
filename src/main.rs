//! # cslib - eScatter 工具链命令行
//!
//! 在 `cslib` 库之上提供单位换算、设置校验与截面表处理。
//!
//! ## 子命令
//! - `units`    - 单位换算与物理量信息
//! - `settings` - 设置文件校验、模型文档、默认设置
//! - `dcs`      - 截面表导出、绘图、插值
//! - `table`    - 显示带单位的 CSV 表
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── cslib (库：units, settings, tables, dataframe)
//!   ├── batch/      (文件收集与并行执行)
//!   └── utils/      (终端输出、进度条)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    // RUST_LOG 优先，其次 --verbose
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("cslib=debug")
    } else {
        EnvFilter::new("cslib=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logging initialized (verbose={})", cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
