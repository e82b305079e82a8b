//! # 设置模块
//!
//! 有序、可按点号路径访问的设置树，以及描述设置的模型。
//! 数据流：YAML → `Value` → `parse_to_model` → `Settings` → `check_settings`
//! → `generate_settings` → YAML。
//!
//! ## 子模块
//! - `tree`: 设置树 `Settings` 与路径访问 `PathEntry`
//! - `model`: `Model`, `ModelEntry`, `Type`
//! - `ops`: 解析、生成、校验
//! - `io`: YAML 文件读写
//! - `schema`: 从 YAML 描述构建模型
//!
//! ## 依赖关系
//! - 被 `value.rs`, `commands/settings.rs` 使用
//! - 使用 `predicates/`, `units/`, `value.rs`

pub mod io;
pub mod model;
pub mod ops;
pub mod schema;
pub mod tree;

pub use io::{
    load_settings, raw_settings_from_yaml_str, save_settings, settings_from_yaml_str,
    settings_to_yaml_string,
};
pub use model::{ComputedDefault, DefaultValue, Generator, Model, ModelEntry, Parser, Type};
pub use ops::{
    check_settings, conforms, default_settings, each_value_conforms, generate_quantity,
    generate_settings, generate_settings_value, missing_obligatory, parse_quantity,
    parse_to_model, validate_settings,
};
pub use schema::{load_model, model_from_schema_str};
pub use tree::{PathEntry, Settings};
