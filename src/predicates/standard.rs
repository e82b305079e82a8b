//! # 常用谓词
//!
//! ## 依赖关系
//! - 被 `predicates/mod.rs`, `settings/schema.rs` 使用
//! - 使用 `units/` 共享注册表

use super::Predicate;
use crate::error::Result;
use crate::units::{units, BaseDimension, Dimensionality, Unit};
use crate::value::Value;

use std::path::Path;

pub fn is_integer() -> Predicate {
    Predicate::new("Integer", |v| matches!(v, Value::Integer(_)))
}

pub fn is_string() -> Predicate {
    Predicate::new("String", |v| matches!(v, Value::String(_)))
}

/// 整数或浮点数
pub fn is_number() -> Predicate {
    Predicate::new("Number", |v| matches!(v, Value::Integer(_) | Value::Float(_)))
}

pub fn is_bool() -> Predicate {
    Predicate::new("Bool", |v| matches!(v, Value::Bool(_)))
}

pub fn is_none() -> Predicate {
    Predicate::new("None", Value::is_none)
}

pub fn is_settings() -> Predicate {
    Predicate::new("Settings", |v| matches!(v, Value::Settings(_)))
}

/// 与单位表达式量纲相同的物理量
///
/// 描述形如 `[length] (e.g. m)`。
pub fn has_units(expr: &str) -> Result<Predicate> {
    Ok(has_unit(&units().parse_units(expr)?))
}

pub fn has_unit(unit: &Unit) -> Predicate {
    let dim = unit.dimensionality();
    let description = format!("{} (e.g. {})", dim.pretty(), unit.pretty());
    Predicate::new(description, move |v| match v {
        Value::Quantity(q) => q.dimensionality() == dim,
        _ => false,
    })
}

/// 只按量纲检查，描述不带示例单位
pub fn has_dimensionality(dim: Dimensionality) -> Predicate {
    Predicate::new(dim.pretty(), move |v| match v {
        Value::Quantity(q) => q.dimensionality() == dim,
        _ => false,
    })
}

fn has_units_or_dimensionality(expr: &str, dim: Dimensionality) -> Predicate {
    units()
        .parse_units(expr)
        .map(|u| has_unit(&u))
        .unwrap_or_else(|_| has_dimensionality(dim))
}

pub fn is_energy() -> Predicate {
    let length = Dimensionality::base(BaseDimension::Length);
    let mass = Dimensionality::base(BaseDimension::Mass);
    let time = Dimensionality::base(BaseDimension::Time);
    has_units_or_dimensionality("J", mass * length.powi(2) / time.powi(2))
}

pub fn is_length() -> Predicate {
    has_units_or_dimensionality("m", Dimensionality::base(BaseDimension::Length))
}

pub fn is_volume() -> Predicate {
    has_units_or_dimensionality("m³", Dimensionality::base(BaseDimension::Length).powi(3))
}

/// 半开区间 `a <= v < b`，数值与物理量均可
pub fn in_range(a: impl Into<Value>, b: impl Into<Value>) -> Predicate {
    let (a, b) = (a.into(), b.into());
    let description = format!("In [{}, {}>", a, b);
    Predicate::new(description, move |v| *v >= a && *v < b)
}

/// 等于给定值
pub fn is_(a: impl Into<Value>) -> Predicate {
    let a = a.into();
    Predicate::new(a.to_string(), move |v| *v == a)
}

/// 列表、字符串或设置
pub fn is_iterable() -> Predicate {
    Predicate::new("Seq", |v| {
        matches!(v, Value::List(_) | Value::String(_) | Value::Settings(_))
    })
}

pub fn is_list_of(p: Predicate) -> Predicate {
    let description = format!("List[{}]", p.description());
    Predicate::new(description, move |v| match v {
        Value::List(items) => items.iter().all(|x| p.test(x)),
        _ => false,
    })
}

/// 字符串指向已存在的文件
pub fn file_exists() -> Predicate {
    Predicate::new("File", |v| match v {
        Value::String(path) => Path::new(path).exists(),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::quantity;

    #[test]
    fn test_has_units_description() {
        let p = has_units("m").unwrap();
        assert_eq!(p.display(), "[length] (e.g. m)");
        assert!(p.test(&Value::from(quantity("3 nm").unwrap())));
        assert!(!p.test(&Value::from(quantity("3 s").unwrap())));
        assert!(!p.test(&Value::Float(3.0)));
        assert!(has_units("parsec").is_err());
    }

    #[test]
    fn test_energy_and_volume() {
        let e = is_energy();
        assert_eq!(e.display(), "[length]²·[mass]/[time]² (e.g. J)");
        assert!(e.test(&Value::from(quantity("10 keV").unwrap())));
        assert!(e.test(&Value::from(quantity("1 hartree").unwrap())));
        assert!(!e.test(&Value::from(quantity("1 nm").unwrap())));
        assert!(is_volume().test(&Value::from(quantity("2 liter").unwrap())));
        assert!(is_length().test(&Value::from(quantity("41 Å").unwrap())));
    }

    #[test]
    fn test_in_range_quantities() {
        let p = in_range(quantity("0 eV").unwrap(), quantity("1 MeV").unwrap());
        assert!(p.test(&Value::from(quantity("10 keV").unwrap())));
        assert!(!p.test(&Value::from(quantity("1 MeV").unwrap())));
        assert!(!p.test(&Value::from(quantity("1 m").unwrap())));
        assert!(!p.test(&Value::from("abc")));
    }

    #[test]
    fn test_is_and_list_of() {
        let p = is_("elastic") | is_("inelastic");
        assert_eq!(p.display(), "elastic | inelastic");
        assert!(p.test(&Value::from("inelastic")));
        assert!(!p.test(&Value::from("phonon")));

        let l = is_list_of(is_number());
        assert_eq!(l.display(), "List[Number]");
        assert!(l.test(&Value::List(vec![Value::Integer(1), Value::Float(2.0)])));
        assert!(!l.test(&Value::List(vec![Value::from("x")])));
        assert!(l.test(&Value::List(vec![])));
        assert!(!l.test(&Value::Integer(1)));
    }

    #[test]
    fn test_iterable_and_file() {
        assert!(is_iterable().test(&Value::from("abc")));
        assert!(!is_iterable().test(&Value::Integer(1)));

        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert!(file_exists().test(&Value::from(path)));
        assert!(!file_exists().test(&Value::from("/nonexistent/cslib/file")));
    }
}
