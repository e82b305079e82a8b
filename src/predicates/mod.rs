//! # 谓词模块
//!
//! 带描述的布尔检查，用于设置值的类型检查。谓词可用 `&`、`|`、`!` 组合，
//! 组合结果的描述同步生成，例如 `Integer & In [0, 10>`。
//!
//! ## 子模块
//! - `standard`: 常用谓词（整数、字符串、单位、区间、列表等）
//!
//! ## 依赖关系
//! - 被 `settings/` 使用
//! - 使用 `value.rs`, `units/`

pub mod standard;

pub use standard::{
    file_exists, has_dimensionality, has_unit, has_units, in_range, is_, is_bool, is_energy,
    is_integer, is_iterable, is_length, is_list_of, is_none, is_number, is_settings, is_string,
    is_volume,
};

use crate::value::Value;

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

/// 谓词函数
pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// 带描述的谓词
#[derive(Clone)]
pub struct Predicate {
    f: Arc<PredicateFn>,
    description: String,
}

impl Predicate {
    pub fn new<F>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            description: description.into(),
        }
    }

    /// 检查值
    pub fn test(&self, value: &Value) -> bool {
        (self.f)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// 人类可读的描述
    pub fn display(&self) -> String {
        self.description.clone()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.description)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        let (a, b) = (self.f, rhs.f);
        Predicate::new(
            format!("{} & {}", self.description, rhs.description),
            move |v| a(v) && b(v),
        )
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        let (a, b) = (self.f, rhs.f);
        Predicate::new(
            format!("{} | {}", self.description, rhs.description),
            move |v| a(v) || b(v),
        )
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        let f = self.f;
        Predicate::new(format!("!{}", self.description), move |v| !f(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinators() {
        let p = is_integer() & in_range(0, 10);
        assert_eq!(p.display(), "Integer & In [0, 10>");
        assert!(p.test(&Value::Integer(3)));
        assert!(!p.test(&Value::Integer(10)));
        assert!(!p.test(&Value::Float(3.0)));

        let q = is_none() | is_string();
        assert_eq!(q.description(), "None | String");
        assert!(q.test(&Value::None));
        assert!(q.test(&Value::from("x")));
        assert!(!q.test(&Value::Integer(1)));

        let n = !is_none();
        assert_eq!(n.to_string(), "!None");
        assert!(n.test(&Value::Integer(1)));
    }

    #[test]
    fn test_predicates_are_shareable() {
        let p = is_number();
        let handle = {
            let p = p.clone();
            std::thread::spawn(move || p.test(&Value::Float(1.5)))
        };
        assert!(handle.join().unwrap());
        assert!(p.test(&Value::Integer(1)));
    }
}
