//! # 动态设置值
//!
//! 设置树中的值类型。整数与浮点数之间按数值比较，物理量按单位换算后比较。
//! 与 `serde_yaml::Value` 互相转换：物理量输出为缩写字符串（如 `4.1 nm`），
//! 映射转换为 `Settings`。
//!
//! ## 依赖关系
//! - 被 `predicates/`, `settings/` 使用
//! - 使用 `units/quantity.rs`, `settings/tree.rs`

use crate::error::{CslibError, Result};
use crate::settings::Settings;
use crate::units::Quantity;

use std::cmp::Ordering;
use std::fmt;

/// 设置值
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Quantity(Quantity),
    List(Vec<Value>),
    Settings(Settings),
}

impl Value {
    /// 类型名，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Quantity(_) => "quantity",
            Value::List(_) => "list",
            Value::Settings(_) => "settings",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// 整数或浮点数的数值
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Value::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_settings(&self) -> Option<&Settings> {
        match self {
            Value::Settings(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_settings_mut(&mut self) -> Option<&mut Settings> {
        match self {
            Value::Settings(s) => Some(s),
            _ => None,
        }
    }

    /// 从 YAML 数据转换
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Result<Value> {
        let value = match yaml {
            serde_yaml::Value::Null => Value::None,
            serde_yaml::Value::Bool(b) => Value::Bool(*b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::String(s.clone()),
            serde_yaml::Value::Sequence(seq) => {
                Value::List(seq.iter().map(Value::from_yaml).collect::<Result<_>>()?)
            }
            serde_yaml::Value::Mapping(map) => {
                let mut settings = Settings::new();
                for (k, v) in map {
                    let key = match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        other => {
                            return Err(CslibError::InvalidArgument(format!(
                                "settings keys must be strings, got {:?}",
                                other
                            )))
                        }
                    };
                    settings.set(&key, Value::from_yaml(v)?)?;
                }
                Value::Settings(settings)
            }
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(&tagged.value)?,
        };
        Ok(value)
    }

    /// 转换为 YAML 数据
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Value::None => serde_yaml::Value::Null,
            Value::Bool(b) => serde_yaml::Value::Bool(*b),
            Value::Integer(i) => serde_yaml::Value::Number((*i).into()),
            Value::Float(f) => serde_yaml::Value::Number((*f).into()),
            Value::String(s) => serde_yaml::Value::String(s.clone()),
            Value::Quantity(q) => serde_yaml::Value::String(q.abbreviated()),
            Value::List(l) => serde_yaml::Value::Sequence(l.iter().map(Value::to_yaml).collect()),
            Value::Settings(s) => serde_yaml::Value::Mapping(s.to_yaml_mapping()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Quantity(q) => write!(f, "{}", q),
            Value::List(l) => {
                let items: Vec<String> = l.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Settings(s) => {
                let items: Vec<String> = s.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Quantity(a), Value::Quantity(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Settings(a), Value::Settings(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Quantity(a), Value::Quantity(b)) => a.partial_cmp(b),
            // 无量纲物理量可与普通数比较
            (Value::Quantity(q), n) if q.dimensionality().is_dimensionless() => {
                let x = q.magnitude() * q.units().factor();
                x.partial_cmp(&n.as_f64()?)
            }
            (n, Value::Quantity(q)) if q.dimensionality().is_dimensionless() => {
                let x = q.magnitude() * q.units().factor();
                n.as_f64()?.partial_cmp(&x)
            }
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Settings> for Value {
    fn from(s: Settings) -> Self {
        Value::Settings(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::quantity;

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Value::Integer(3), Value::Float(3.0));
        assert_ne!(Value::Integer(3), Value::String("3".to_string()));
        assert!(Value::Integer(2) < Value::Float(2.5));
    }

    #[test]
    fn test_quantity_ordering() {
        let a = Value::from(quantity("1 keV").unwrap());
        let b = Value::from(quantity("999 eV").unwrap());
        assert!(a > b);
        let c = Value::from(quantity("1 m").unwrap());
        assert_eq!(a.partial_cmp(&c), None);
    }

    #[test]
    fn test_yaml_roundtrip_structure() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "energy: 10 keV\ncount: 3\nratio: 0.5\nnested:\n  flag: true\n  list: [1, 2]\n",
        )
        .unwrap();
        let value = Value::from_yaml(&yaml).unwrap();
        let settings = value.as_settings().unwrap();
        assert_eq!(settings.get("count"), Some(&Value::Integer(3)));
        assert_eq!(settings.get("nested.flag"), Some(&Value::Bool(true)));
        assert_eq!(
            settings.get("nested.list"),
            Some(&Value::List(vec![Value::Integer(1), Value::Integer(2)]))
        );
        assert_eq!(value.to_yaml(), yaml);
    }

    #[test]
    fn test_non_string_key_rejected() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\n").unwrap();
        assert!(Value::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::None.to_string(), "None");
        let l = Value::List(vec![Value::Integer(1), Value::from("a")]);
        assert_eq!(l.to_string(), "[1, a]");
    }
}
