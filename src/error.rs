//! # 统一错误处理模块
//!
//! 定义 CSLib 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// CSLib 统一错误类型
#[derive(Error, Debug)]
pub enum CslibError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 单位错误
    // ─────────────────────────────────────────────────────────────
    #[error("'{name}' is not defined in the unit registry")]
    UndefinedUnit { name: String },

    #[error("Cannot convert from '{from}' ({from_dim}) to '{to}' ({to_dim})")]
    DimensionalityMismatch {
        from: String,
        from_dim: String,
        to: String,
        to_dim: String,
    },

    #[error("Invalid unit expression '{expr}': {reason}")]
    UnitSyntax { expr: String, reason: String },

    #[error("Invalid unit definition '{line}': {reason}")]
    InvalidDefinition { line: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 设置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Key {key} doesn't match any entry in settings.")]
    MissingKey { key: String },

    #[error("Key {key} not in model.")]
    UnknownKey { key: String },

    #[error("Type-check for setting `{key}` failed: {value}")]
    CheckFailed { key: String, value: String },

    #[error("Obligatory settings missing: {}", keys.join(", "))]
    ObligatoryMissing { keys: Vec<String> },

    #[error("Cannot assign to `{path}`: `{key}` holds a value that is not a settings object")]
    NotSettings { path: String, key: String },

    #[error("Failed to parse setting `{key}`: {reason}")]
    ParseFailed { key: String, reason: String },

    #[error("Invalid schema entry `{key}`: {reason}")]
    InvalidSchema { key: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 表格错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Array dimensions do not match: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    // ─────────────────────────────────────────────────────────────
    // 数值计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("f(a) and f(b) must have different signs (f({a}) = {fa}, f({b}) = {fb})")]
    NoSignChange { a: f64, b: f64, fa: f64, fb: f64 },

    #[error("{method} did not converge after {iterations} iterations")]
    NotConverged { method: String, iterations: usize },

    #[error("Value {value} is outside the interpolation range [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CslibError>;
