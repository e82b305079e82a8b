//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 以及 `cslib` 库
//! - 子模块: units, settings, dcs, table

pub mod dcs;
pub mod settings;
pub mod table;
pub mod units;

use crate::cli::Commands;
use cslib::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Units(args) => units::execute(args),
        Commands::Settings(args) => settings::execute(args),
        Commands::Dcs(args) => dcs::execute(args),
        Commands::Table(args) => table::execute(args),
    }
}
