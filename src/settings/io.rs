//! # 设置文件读写
//!
//! YAML 文本 → `serde_yaml::Value` → `Value` → `parse_to_model` → `Settings`，
//! 写出时经 `generate_settings` 转回 YAML。
//!
//! ## 依赖关系
//! - 被 `commands/settings.rs` 使用
//! - 使用 `settings/ops.rs`, `value.rs`

use super::model::Model;
use super::ops::{generate_settings, parse_to_model};
use super::tree::Settings;
use crate::error::{CslibError, Result};
use crate::value::Value;

use std::fs;
use std::path::Path;
use std::sync::Arc;

/// 解析 YAML 文本为原始设置（不附带模型）
pub fn raw_settings_from_yaml_str(text: &str) -> Result<Settings> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    match Value::from_yaml(&yaml)? {
        Value::Settings(s) => Ok(s),
        Value::None => Ok(Settings::new()),
        other => Err(CslibError::InvalidArgument(format!(
            "settings document must be a mapping, got {}",
            other.type_name()
        ))),
    }
}

/// 解析 YAML 文本并按模型转换
pub fn settings_from_yaml_str(text: &str, model: &Arc<Model>) -> Result<Settings> {
    parse_to_model(model, &raw_settings_from_yaml_str(text)?)
}

/// 读取设置文件
pub fn load_settings(path: &Path, model: &Arc<Model>) -> Result<Settings> {
    let text = fs::read_to_string(path).map_err(|e| CslibError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::debug!("Loaded settings from {}", path.display());
    settings_from_yaml_str(&text, model)
}

/// 生成 YAML 文本
pub fn settings_to_yaml_string(settings: &Settings) -> Result<String> {
    Ok(serde_yaml::to_string(&generate_settings(settings)?)?)
}

/// 写出设置文件
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let text = settings_to_yaml_string(settings)?;
    fs::write(path, text).map_err(|e| CslibError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::debug!("Saved settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::is_length;
    use crate::settings::{generate_quantity, parse_quantity, Type};
    use tempfile::TempDir;

    fn model() -> Arc<Model> {
        Arc::new(
            Model::new()
                .with(
                    "thickness",
                    Type::new("Layer thickness.")
                        .with_check(is_length())
                        .with_parser(parse_quantity)
                        .with_generator(generate_quantity),
                )
                .with("label", Type::new("Label.")),
        )
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        let m = model();

        let s = settings_from_yaml_str("thickness: 20 nm\nlabel: test\n", &m).unwrap();
        save_settings(&path, &s).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "thickness: 20 nm\nlabel: test\n");

        let loaded = load_settings(&path, &m).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_empty_and_invalid_documents() {
        assert!(raw_settings_from_yaml_str("{}").unwrap().is_empty());
        assert!(raw_settings_from_yaml_str("~").unwrap().is_empty());
        assert!(raw_settings_from_yaml_str("- 1\n- 2\n").is_err());
        assert!(load_settings(Path::new("/nonexistent/cslib.yaml"), &model()).is_err());
    }
}
