//! # 单位模块
//!
//! 提供物理单位注册表和共享实例 [`units()`]。在不同组件之间共享同一个注册表，
//! 单位比较才有意义。默认定义之外追加了几个单位：
//!
//! ```
//! use cslib::units::{approx, units};
//!
//! let d = units().parse_expression("41 angstrom").unwrap();
//! let nm = units().parse_units("nm").unwrap();
//! assert_eq!(approx(d.to(&nm).unwrap()), units().quantity(4.1, "nm").unwrap());
//!
//! let e = units().parse_expression("2500 kcal").unwrap();
//! assert_eq!(e.dimensionality().to_string(), "[length] ** 2 * [mass] / [time] ** 2");
//!
//! let t = units().parse_expression("T_room").unwrap();
//! assert_eq!(approx(t), units().quantity(297.0, "K").unwrap());
//! ```
//!
//! ## 子模块
//! - `dimension`: 量纲
//! - `unit`: 单位
//! - `quantity`: 物理量与物理量数组
//! - `parser`: 单位表达式解析
//! - `registry`: 单位注册表
//! - `approx`: 近似比较
//!
//! ## 依赖关系
//! - 被 `predicates/`, `settings/`, `tables/`, `dataframe/`, `numeric/` 使用

pub mod approx;
pub mod dimension;
mod parser;
pub mod quantity;
pub mod registry;
pub mod unit;

pub use approx::{approx, approx_abs, approx_rel, Approx};
pub use dimension::{BaseDimension, Dimensionality};
pub use quantity::{Quantity, QuantityArray};
pub use registry::UnitRegistry;
pub use unit::{Unit, UnitTerm};

use crate::error::Result;
use std::sync::LazyLock;

/// 进程内共享的单位注册表
static UNITS: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::shared);

/// 获取共享注册表
pub fn units() -> &'static UnitRegistry {
    &UNITS
}

/// 用共享注册表解析物理量表达式
pub fn quantity(expr: &str) -> Result<Quantity> {
    units().parse_expression(expr)
}
