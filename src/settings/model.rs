//! # 设置模型
//!
//! [`Model`] 是有序的 `键 → ModelEntry` 映射，每个条目是一个 [`Type`]
//! 或嵌套的 [`Model`]。[`Type`] 描述单个设置：说明、默认值、检查谓词、
//! 是否必填、解析器与生成器。
//!
//! ## 依赖关系
//! - 被 `settings/tree.rs`, `settings/ops.rs`, `settings/schema.rs` 使用
//! - 使用 `predicates/`, `value.rs`

use super::ops::{conforms, generate_settings_value, parse_to_model};
use super::tree::Settings;
use crate::error::{CslibError, Result};
use crate::predicates::Predicate;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// 解析器：原始值 → 设置值
pub type Parser = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// 生成器：设置值 → 原始值
pub type Generator = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// 由其它设置计算出的默认值
pub type ComputedDefault = Arc<dyn Fn(&Settings) -> Value + Send + Sync>;

/// 说明文字的换行宽度
const DOC_WIDTH: usize = 66;

/// 默认值
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Computed(ComputedDefault),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => write!(f, "{}", v),
            DefaultValue::Computed(_) => write!(f, "<computed from other settings>"),
        }
    }
}

/// 单个设置的类型
#[derive(Clone)]
pub struct Type {
    description: String,
    default: Option<DefaultValue>,
    check: Option<Predicate>,
    obligatory: bool,
    parser: Parser,
    generator: Generator,
    model: Option<Arc<Model>>,
}

impl Type {
    /// 只有说明的类型，解析器与生成器为恒等映射
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            default: None,
            check: None,
            obligatory: false,
            parser: Arc::new(|v| Ok(v.clone())),
            generator: Arc::new(|v| Ok(v.clone())),
            model: None,
        }
    }

    /// 嵌套模型类型
    ///
    /// 检查为 `conforms(model, name)`，解析器为 `parse_to_model`，
    /// 生成器为 `generate_settings`。
    pub fn nested(model: Model, name: &str, description: impl Into<String>) -> Self {
        let model = Arc::new(model);
        let parse_model = model.clone();
        let mut ty = Type::new(description)
            .with_check(conforms(model.clone(), name))
            .with_parser(move |v| match v {
                Value::Settings(s) => Ok(Value::Settings(parse_to_model(&parse_model, s)?)),
                other => Err(CslibError::InvalidArgument(format!(
                    "expected settings, got {} `{}`",
                    other.type_name(),
                    other
                ))),
            })
            .with_generator(|v| match v {
                Value::Settings(s) => Ok(Value::Settings(generate_settings_value(s)?)),
                other => Ok(other.clone()),
            });
        ty.model = Some(model);
        ty
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn with_computed_default<F>(mut self, f: F) -> Self
    where
        F: Fn(&Settings) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    pub fn with_check(mut self, check: Predicate) -> Self {
        self.check = Some(check);
        self
    }

    /// 与已有检查取与
    pub fn and_check(mut self, check: Predicate) -> Self {
        self.check = Some(match self.check.take() {
            Some(existing) => existing & check,
            None => check,
        });
        self
    }

    pub fn obligatory(mut self, obligatory: bool) -> Self {
        self.obligatory = obligatory;
        self
    }

    pub fn with_parser<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.parser = Arc::new(f);
        self
    }

    pub fn with_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.generator = Arc::new(f);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn check(&self) -> Option<&Predicate> {
        self.check.as_ref()
    }

    pub fn is_obligatory(&self) -> bool {
        self.obligatory
    }

    /// 嵌套模型（仅嵌套类型）
    pub fn model(&self) -> Option<&Arc<Model>> {
        self.model.as_ref()
    }

    /// 无检查时总是通过
    pub fn test(&self, value: &Value) -> bool {
        self.check.as_ref().map_or(true, |p| p.test(value))
    }

    pub fn parse(&self, value: &Value) -> Result<Value> {
        (self.parser)(value)
    }

    pub fn generate(&self, value: &Value) -> Result<Value> {
        (self.generator)(value)
    }

    /// 文档文本，每行带前缀
    pub fn display(&self, prefix: &str) -> String {
        let width = DOC_WIDTH.saturating_sub(prefix.chars().count()).max(1);
        let description = wrap(&self.description, width)
            .iter()
            .map(|line| format!("{}⋮ {}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(model) = &self.model {
            return format!("{}\n{}\n{}", description, prefix, model.display(prefix));
        }

        let default = self
            .default
            .as_ref()
            .map_or_else(|| "None".to_string(), |d| d.to_string());
        let check = self.check.as_ref().map_or("any", |p| p.description());
        format!(
            "{}\n{}\n{}(default) {}\n{}(type)    {}",
            description, prefix, prefix, default, prefix, check
        )
    }

    /// 与 `display` 相同
    pub fn restructured_text(&self, prefix: &str) -> String {
        self.display(prefix)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("description", &self.description)
            .field("default", &self.default.as_ref().map(|d| d.to_string()))
            .field("check", &self.check)
            .field("obligatory", &self.obligatory)
            .field("nested", &self.model.is_some())
            .finish()
    }
}

/// 贪心按词换行，超长单词按字符截断
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if line_len > 0 && line_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line_len += word.len();
        line.extend(word);
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// 模型条目
#[derive(Clone, Debug)]
pub enum ModelEntry {
    Type(Type),
    Model(Model),
}

impl ModelEntry {
    pub fn display(&self, prefix: &str) -> String {
        match self {
            ModelEntry::Type(t) => t.display(prefix),
            ModelEntry::Model(m) => m.display(prefix),
        }
    }
}

impl From<Type> for ModelEntry {
    fn from(t: Type) -> Self {
        ModelEntry::Type(t)
    }
}

impl From<Model> for ModelEntry {
    fn from(m: Model) -> Self {
        ModelEntry::Model(m)
    }
}

/// 设置模型
#[derive(Clone, Debug, Default)]
pub struct Model {
    entries: Vec<(String, ModelEntry)>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加顶层条目（同名则替换）
    pub fn with(mut self, key: &str, entry: impl Into<ModelEntry>) -> Self {
        self.insert_local(key, entry.into());
        self
    }

    fn insert_local(&mut self, key: &str, entry: ModelEntry) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((key.to_string(), entry)),
        }
    }

    /// 按点号路径插入，缺失的中间层创建为空模型
    pub fn insert(&mut self, path: &str, entry: impl Into<ModelEntry>) -> Result<()> {
        let keys: Vec<&str> = path.split('.').collect();
        let (last, parents) = match keys.split_last() {
            Some(split) => split,
            None => return Err(CslibError::InvalidArgument("empty model path".to_string())),
        };

        let mut current = self;
        for key in parents {
            if current.local(key).is_none() {
                current.insert_local(key, ModelEntry::Model(Model::new()));
            }
            current = match current.entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, ModelEntry::Model(inner))) => inner,
                _ => {
                    return Err(CslibError::NotSettings {
                        path: path.to_string(),
                        key: key.to_string(),
                    })
                }
            };
        }
        current.insert_local(last, entry.into());
        Ok(())
    }

    fn local(&self, key: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// 按点号路径查找；可穿过嵌套模型与嵌套类型
    pub fn get(&self, path: &str) -> Option<&ModelEntry> {
        let mut keys = path.split('.');
        let mut current = self.local(keys.next()?)?;
        for key in keys {
            current = match current {
                ModelEntry::Model(m) => m.local(key)?,
                ModelEntry::Type(t) => t.model()?.local(key)?,
            };
        }
        Some(current)
    }

    pub fn get_type(&self, path: &str) -> Option<&Type> {
        match self.get(path)? {
            ModelEntry::Type(t) => Some(t),
            ModelEntry::Model(_) => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全部条目的文档
    pub fn display(&self, prefix: &str) -> String {
        let child_prefix = format!("{}|   ", prefix);
        self.entries
            .iter()
            .map(|(k, e)| format!("{}+ {}\n{}", prefix, k, e.display(&child_prefix)))
            .collect::<Vec<_>>()
            .join(&format!("\n{}\n", prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{in_range, is_integer};

    #[test]
    fn test_type_display() {
        let t = Type::new("Number of iterations.")
            .with_default(10)
            .with_check(is_integer() & in_range(0, 100));
        assert_eq!(
            t.display(""),
            "⋮ Number of iterations.\n\n(default) 10\n(type)    Integer & In [0, 100>"
        );
    }

    #[test]
    fn test_type_display_without_default_or_check() {
        let t = Type::new("Free text.");
        assert_eq!(t.display("> "), "> ⋮ Free text.\n> \n> (default) None\n> (type)    any");

        let c = Type::new("Derived.").with_computed_default(|_| Value::Integer(1));
        assert!(c
            .display("")
            .contains("(default) <computed from other settings>"));
    }

    #[test]
    fn test_wrap() {
        let text = "a ".repeat(40);
        let lines = wrap(&text, 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), text.trim_end());

        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_nested_display() {
        let inner = Model::new()
            .with("a", Type::new("First.").with_default(1))
            .with("b", Type::new("Second."));
        let t = Type::nested(inner, "inner", "Nested settings.");
        let expected = "⋮ Nested settings.\n\
                        \n\
                        + a\n\
                        |   ⋮ First.\n\
                        |   \n\
                        |   (default) 1\n\
                        |   (type)    any\n\
                        \n\
                        + b\n\
                        |   ⋮ Second.\n\
                        |   \n\
                        |   (default) None\n\
                        |   (type)    any";
        assert_eq!(t.display(""), expected);
        assert_eq!(t.check().unwrap().description(), "Model <inner>");
    }

    #[test]
    fn test_and_check() {
        let t = Type::new("x").and_check(is_integer()).and_check(in_range(0, 5));
        assert_eq!(t.check().unwrap().description(), "Integer & In [0, 5>");
        assert!(t.test(&Value::Integer(4)));
        assert!(!t.test(&Value::Integer(5)));
        assert!(Type::new("any").test(&Value::None));
    }

    #[test]
    fn test_model_paths() {
        let mut m = Model::new();
        m.insert("a.b", Type::new("deep")).unwrap();
        assert!(m.contains("a"));
        assert_eq!(m.get_type("a.b").unwrap().description(), "deep");
        assert!(m.get_type("a").is_none());
        assert!(m.insert("a.b.c", Type::new("bad")).is_err());

        let nested = Model::new().with("x", Type::new("x"));
        let m = Model::new().with("n", Type::nested(nested, "n", "nested"));
        assert_eq!(m.get_type("n.x").unwrap().description(), "x");
    }
}
