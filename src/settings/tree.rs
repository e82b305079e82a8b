//! # 设置树
//!
//! 有序的 `键 → 值` 映射，可附带一个共享的 [`Model`]。带点号的键访问嵌套设置：
//! `set("a.b.c", 42)` 会在缺失时创建 `a` 与 `a.b`。
//!
//! ## 依赖关系
//! - 被 `settings/ops.rs`, `settings/io.rs`, `value.rs` 使用
//! - 使用 `settings/model.rs`, `value.rs`

use super::model::{DefaultValue, Model};
use crate::error::{CslibError, Result};
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// 设置树
#[derive(Clone, Default)]
pub struct Settings {
    entries: Vec<(String, Value)>,
    model: Option<Arc<Model>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建附带模型的空设置
    pub fn with_model(model: Arc<Model>) -> Self {
        Self {
            entries: Vec::new(),
            model: Some(model),
        }
    }

    pub fn model(&self) -> Option<&Arc<Model>> {
        self.model.as_ref()
    }

    pub fn set_model(&mut self, model: Option<Arc<Model>>) {
        self.model = model;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn local(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn local_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn insert_local(&mut self, key: &str, value: Value) {
        match self.local_mut(key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// 按点号路径取值
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut keys = path.split('.');
        let mut current = self.local(keys.next()?)?;
        for key in keys {
            current = current.as_settings()?.local(key)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut keys = path.split('.');
        let mut current = self.local_mut(keys.next()?)?;
        for key in keys {
            current = current.as_settings_mut()?.local_mut(key)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// 按点号路径赋值，缺失的中间层创建为空设置
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let keys: Vec<&str> = path.split('.').collect();
        let (last, parents) = match keys.split_last() {
            Some(split) => split,
            None => return Err(CslibError::InvalidArgument("empty settings path".to_string())),
        };

        let mut current = self;
        for key in parents {
            if current.local(key).is_none() {
                current.insert_local(key, Value::Settings(Settings::new()));
            }
            current = match current.local_mut(key) {
                Some(Value::Settings(inner)) => inner,
                _ => {
                    return Err(CslibError::NotSettings {
                        path: path.to_string(),
                        key: key.to_string(),
                    })
                }
            };
        }
        current.insert_local(last, value.into());
        Ok(())
    }

    /// 按点号路径删除
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.get_mut(parent)?.as_settings_mut()?, key),
            None => (self, path),
        };
        let idx = parent.entries.iter().position(|(k, _)| k == key)?;
        Some(parent.entries.remove(idx).1)
    }

    /// 取值；缺失时用模型默认值补上
    pub fn get_or_default(&mut self, path: &str) -> Result<&Value> {
        if !self.contains(path) {
            let value = self.default_for(path)?;
            tracing::debug!("Materialising default for `{}`: {}", path, value);
            self.set(path, value)?;
        }
        self.get(path).ok_or_else(|| missing_key(path))
    }

    /// 取值或模型默认值，不修改设置
    pub fn lookup(&self, path: &str) -> Result<Value> {
        match self.get(path) {
            Some(v) => Ok(v.clone()),
            None => self.default_for(path),
        }
    }

    fn default_for(&self, path: &str) -> Result<Value> {
        let ty = self
            .model
            .as_ref()
            .and_then(|m| m.get_type(path))
            .ok_or_else(|| missing_key(path))?;
        match ty.default() {
            Some(DefaultValue::Value(v)) => Ok(v.clone()),
            Some(DefaultValue::Computed(f)) => Ok(f(self)),
            None => Err(missing_key(path)),
        }
    }

    /// 惰性路径访问
    pub fn entry(&mut self, key: &str) -> PathEntry<'_> {
        PathEntry {
            settings: self,
            path: key.to_string(),
        }
    }

    /// 转换为 YAML 映射（不经过生成器）
    pub fn to_yaml_mapping(&self) -> serde_yaml::Mapping {
        self.entries
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_yaml()))
            .collect()
    }
}

fn missing_key(path: &str) -> CslibError {
    CslibError::MissingKey {
        key: path.to_string(),
    }
}

impl PartialEq for Settings {
    fn eq(&self, other: &Settings) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// 尚未赋值的设置路径
///
/// `entry("x").at("y").set(3)` 在赋值时才创建中间层；
/// 未赋值的路径 `exists()` 为假。
pub struct PathEntry<'a> {
    settings: &'a mut Settings,
    path: String,
}

impl<'a> PathEntry<'a> {
    /// 下一级路径
    pub fn at(mut self, key: &str) -> PathEntry<'a> {
        self.path.push('.');
        self.path.push_str(key);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.settings.contains(&self.path)
    }

    pub fn get(&self) -> Option<&Value> {
        self.settings.get(&self.path)
    }

    pub fn set(self, value: impl Into<Value>) -> Result<()> {
        self.settings.set(&self.path, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Model, Type};

    #[test]
    fn test_dotted_set_creates_intermediates() {
        let mut s = Settings::new();
        s.set("a.b.c", 42).unwrap();
        assert_eq!(s.get("a.b.c"), Some(&Value::Integer(42)));
        assert!(s.get("a").unwrap().as_settings().is_some());
        assert!(s.get("a.b").unwrap().as_settings().is_some());
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_set_through_value_fails() {
        let mut s = Settings::new();
        s.set("a", 1).unwrap();
        let err = s.set("a.b", 2).unwrap_err();
        assert!(matches!(err, CslibError::NotSettings { .. }));
    }

    #[test]
    fn test_insertion_order_kept_on_overwrite() {
        let mut s = Settings::new();
        s.set("x", 1).unwrap();
        s.set("y", 2).unwrap();
        s.set("x", 3).unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(s.get("x"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_path_entry() {
        let mut s = Settings::new();
        assert!(!s.entry("x").at("y").at("z").exists());
        assert!(s.is_empty());

        s.entry("x").at("y").at("z").set(3).unwrap();
        assert!(s.entry("x").at("y").exists());
        assert_eq!(s.get("x.y.z"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_remove() {
        let mut s = Settings::new();
        s.set("a.b", 1).unwrap();
        s.set("a.c", 2).unwrap();
        assert_eq!(s.remove("a.b"), Some(Value::Integer(1)));
        assert!(!s.contains("a.b"));
        assert!(s.contains("a.c"));
        assert_eq!(s.remove("missing"), None);
    }

    #[test]
    fn test_defaults_materialised() {
        let model = Model::new()
            .with("x", Type::new("plain").with_default(3))
            .with(
                "y",
                Type::new("computed").with_computed_default(|s| {
                    let x = s.lookup("x").ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                    Value::Float(x * 2.0)
                }),
            )
            .with("z", Type::new("no default"));
        let mut s = Settings::with_model(Arc::new(model));

        assert_eq!(s.get_or_default("x").unwrap(), &Value::Integer(3));
        assert!(s.contains("x"));
        assert_eq!(s.get_or_default("y").unwrap(), &Value::Float(6.0));

        let err = s.get_or_default("z").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Key z doesn't match any entry in settings."
        );
        assert!(Settings::new().get_or_default("x").is_err());
    }

    #[test]
    fn test_clone_shares_model() {
        let model = Arc::new(Model::new().with("x", Type::new("x")));
        let mut s = Settings::with_model(model.clone());
        s.set("x", 1).unwrap();
        let copy = s.clone();
        assert!(Arc::ptr_eq(copy.model().unwrap(), &model));
        assert_eq!(copy, s);
    }
}
