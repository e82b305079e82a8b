//! # CSLib - eScatter 工具链共享库
//!
//! 物理单位、设置模型与校验、截面表及数值工具。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── error.rs     (错误处理)
//!   ├── units/       (单位注册表与物理量)
//!   ├── value.rs     (动态设置值)
//!   ├── predicates/  (可组合的校验谓词)
//!   ├── settings/    (设置树、模型、YAML 读写)
//!   ├── tables/      (截面表、gnuplot 导出、绘图)
//!   ├── dataframe/   (带单位的列式数据表)
//!   └── numeric/     (插值、积分、求根)
//! ```

pub mod dataframe;
pub mod error;
pub mod numeric;
pub mod predicates;
pub mod settings;
pub mod tables;
pub mod units;
pub mod value;

pub use dataframe::DataFrame;
pub use error::{CslibError, Result};
pub use predicates::Predicate;
pub use settings::{Model, ModelEntry, Settings, Type};
pub use tables::{Dcs, GridTable};
pub use units::{approx, quantity, units, Quantity, QuantityArray, Unit};
pub use value::Value;
