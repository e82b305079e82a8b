//! # 设置的解析、生成与校验
//!
//! - `parse_to_model`: 原始数据按模型解析为设置
//! - `generate_settings`: 设置按生成器转换回原始数据
//! - `check_settings` / `validate_settings`: 类型检查与必填检查
//! - `conforms` / `each_value_conforms`: 以模型为检查的谓词
//!
//! ## 依赖关系
//! - 被 `settings/model.rs`, `settings/io.rs`, `commands/settings.rs` 使用
//! - 使用 `settings/tree.rs`, `settings/model.rs`, `predicates/`, `units/`

use super::model::{DefaultValue, Model, ModelEntry};
use super::tree::Settings;
use crate::error::{CslibError, Result};
use crate::predicates::Predicate;
use crate::units::{units, Quantity};
use crate::value::Value;

use std::sync::Arc;

/// 按模型解析原始设置
///
/// 每个值经过对应类型的解析器；模型中不存在的键报错。
pub fn parse_to_model(model: &Arc<Model>, data: &Settings) -> Result<Settings> {
    let mut settings = Settings::with_model(model.clone());
    for (key, value) in data.iter() {
        let entry = model.get(key).ok_or_else(|| CslibError::UnknownKey {
            key: key.to_string(),
        })?;
        let parsed = match entry {
            ModelEntry::Type(t) => t.parse(value).map_err(|e| CslibError::ParseFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?,
            ModelEntry::Model(sub) => match value {
                Value::Settings(inner) => {
                    Value::Settings(parse_to_model(&Arc::new(sub.clone()), inner)?)
                }
                other => {
                    return Err(CslibError::ParseFailed {
                        key: key.to_string(),
                        reason: format!("expected settings, got {} `{}`", other.type_name(), other),
                    })
                }
            },
        };
        settings.set(key, parsed)?;
    }
    Ok(settings)
}

/// 生成原始设置（仍为 `Settings`，不附带模型）
///
/// 有模型时每个值经过对应类型的生成器；无模型时嵌套设置递归处理，
/// 其它值转为字符串。
pub fn generate_settings_value(settings: &Settings) -> Result<Settings> {
    let mut raw = Settings::new();
    for (key, value) in settings.iter() {
        let generated = match settings.model() {
            Some(model) => {
                let entry = model.get(key).ok_or_else(|| CslibError::UnknownKey {
                    key: key.to_string(),
                })?;
                match (entry, value) {
                    (ModelEntry::Type(t), v) => t.generate(v)?,
                    (ModelEntry::Model(_), Value::Settings(inner)) => {
                        Value::Settings(generate_settings_value(inner)?)
                    }
                    (ModelEntry::Model(_), v) => v.clone(),
                }
            }
            None => match value {
                Value::Settings(inner) => Value::Settings(generate_settings_value(inner)?),
                v => Value::String(v.to_string()),
            },
        };
        raw.set(key, generated)?;
    }
    Ok(raw)
}

/// 生成可写入 YAML 的有序映射
pub fn generate_settings(settings: &Settings) -> Result<serde_yaml::Mapping> {
    Ok(generate_settings_value(settings)?.to_yaml_mapping())
}

/// 类型检查：每个键的检查谓词都必须通过
pub fn check_settings(settings: &Settings, model: &Model) -> Result<()> {
    for (key, value) in settings.iter() {
        let entry = model.get(key).ok_or_else(|| CslibError::UnknownKey {
            key: key.to_string(),
        })?;
        let ok = match (entry, value) {
            (ModelEntry::Type(t), v) => t.test(v),
            (ModelEntry::Model(sub), Value::Settings(inner)) => {
                check_settings(inner, sub)?;
                true
            }
            (ModelEntry::Model(_), _) => false,
        };
        if !ok {
            return Err(CslibError::CheckFailed {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// 缺失且没有默认值的必填键（点号路径）
pub fn missing_obligatory(settings: &Settings, model: &Model) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing(settings, model, "", &mut missing);
    missing
}

fn collect_missing(settings: &Settings, model: &Model, prefix: &str, out: &mut Vec<String>) {
    for (key, entry) in model.iter() {
        let path = format!("{}{}", prefix, key);
        let value = settings.get(key);
        match entry {
            ModelEntry::Type(t) => {
                if t.is_obligatory() && value.is_none() && t.default().is_none() {
                    out.push(path);
                } else if let (Some(sub), Some(Value::Settings(inner))) = (t.model(), value) {
                    collect_missing(inner, sub, &format!("{}.", path), out);
                }
            }
            ModelEntry::Model(sub) => {
                let empty = Settings::new();
                let inner = value.and_then(Value::as_settings).unwrap_or(&empty);
                collect_missing(inner, sub, &format!("{}.", path), out);
            }
        }
    }
}

/// 类型检查加必填检查
pub fn validate_settings(settings: &Settings, model: &Model) -> Result<()> {
    check_settings(settings, model)?;
    let keys = missing_obligatory(settings, model);
    if keys.is_empty() {
        Ok(())
    } else {
        Err(CslibError::ObligatoryMissing { keys })
    }
}

/// 值是符合模型的设置
pub fn conforms(model: Arc<Model>, description: &str) -> Predicate {
    Predicate::new(format!("Model <{}>", description), move |v| match v {
        Value::Settings(s) => check_settings(s, &model).is_ok(),
        _ => false,
    })
}

/// 值是设置，且其中每个值都是符合模型的设置
pub fn each_value_conforms(model: Arc<Model>, description: &str) -> Predicate {
    Predicate::new(format!("{{key: Model <{}>}}", description), move |v| match v {
        Value::Settings(s) => s.values().all(|x| match x {
            Value::Settings(inner) => check_settings(inner, &model).is_ok(),
            _ => false,
        }),
        _ => false,
    })
}

/// 物理量解析器：字符串经共享注册表解析，裸数值视为无量纲量
pub fn parse_quantity(value: &Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::Quantity(units().parse_expression(s)?)),
        Value::Integer(n) => Ok(Value::Quantity(Quantity::dimensionless(*n as f64))),
        Value::Float(x) => Ok(Value::Quantity(Quantity::dimensionless(*x))),
        Value::Quantity(_) => Ok(value.clone()),
        other => Err(CslibError::InvalidArgument(format!(
            "cannot parse {} `{}` as a quantity",
            other.type_name(),
            other
        ))),
    }
}

/// 物理量生成器：输出缩写字符串
pub fn generate_quantity(value: &Value) -> Result<Value> {
    match value {
        Value::Quantity(q) => Ok(Value::String(q.abbreviated())),
        other => Ok(other.clone()),
    }
}

/// 由模型默认值组成的设置
///
/// 计算型默认值按已填入的值求得；嵌套模型递归填充。
pub fn default_settings(model: &Arc<Model>) -> Result<Settings> {
    let mut settings = Settings::with_model(model.clone());
    for (key, entry) in model.iter() {
        match entry {
            ModelEntry::Type(t) => match (t.default(), t.model()) {
                (Some(DefaultValue::Value(v)), _) => settings.set(key, v.clone())?,
                (Some(DefaultValue::Computed(f)), _) => {
                    let v = f(&settings);
                    settings.set(key, v)?;
                }
                (None, Some(sub)) => {
                    let inner = default_settings(sub)?;
                    if !inner.is_empty() {
                        settings.set(key, inner)?;
                    }
                }
                (None, None) => {}
            },
            ModelEntry::Model(sub) => {
                let inner = default_settings(&Arc::new(sub.clone()))?;
                if !inner.is_empty() {
                    settings.set(key, inner)?;
                }
            }
        }
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{in_range, is_energy, is_integer, is_string};
    use crate::settings::Type;
    use crate::units::quantity;

    fn energy_type() -> Type {
        Type::new("Energy.")
            .with_check(is_energy())
            .with_parser(parse_quantity)
            .with_generator(generate_quantity)
    }

    fn model() -> Arc<Model> {
        let geometry = Model::new()
            .with("layers", Type::new("Layer count.").with_check(is_integer()).with_default(1))
            .with("name", Type::new("Name.").with_check(is_string()));
        Arc::new(
            Model::new()
                .with("energy", energy_type().obligatory(true))
                .with(
                    "n",
                    Type::new("Count.")
                        .with_check(is_integer() & in_range(0, 10))
                        .with_default(3),
                )
                .with("geometry", Type::nested(geometry, "geometry", "Geometry.")),
        )
    }

    fn raw(yaml: &str) -> Settings {
        let v: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        Value::from_yaml(&v).unwrap().as_settings().unwrap().clone()
    }

    #[test]
    fn test_parse_to_model() {
        let m = model();
        let s = parse_to_model(&m, &raw("energy: 10 keV\ngeometry:\n  layers: 2\n")).unwrap();
        let e = s.get("energy").unwrap().as_quantity().unwrap();
        assert_eq!(*e, quantity("10000 eV").unwrap());
        assert!(Arc::ptr_eq(s.model().unwrap(), &m));
        let g = s.get("geometry").unwrap().as_settings().unwrap();
        assert!(g.model().is_some());
        assert_eq!(g.get("layers"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = parse_to_model(&model(), &raw("energie: 10 keV\n")).unwrap_err();
        assert_eq!(err.to_string(), "Key energie not in model.");

        let err = parse_to_model(&model(), &raw("geometry:\n  depth: 2\n")).unwrap_err();
        assert!(matches!(err, CslibError::ParseFailed { .. }));
    }

    #[test]
    fn test_check_settings() {
        let m = model();
        let s = parse_to_model(&m, &raw("energy: 10 keV\nn: 4\n")).unwrap();
        assert!(check_settings(&s, &m).is_ok());

        let s = parse_to_model(&m, &raw("energy: 10 keV\nn: 12\n")).unwrap();
        let err = check_settings(&s, &m).unwrap_err();
        assert_eq!(err.to_string(), "Type-check for setting `n` failed: 12");

        let s = parse_to_model(&m, &raw("energy: 10 nm\n")).unwrap();
        assert!(check_settings(&s, &m).is_err());

        let s = parse_to_model(&m, &raw("geometry:\n  layers: two\n")).unwrap();
        assert!(check_settings(&s, &m).is_err());
    }

    #[test]
    fn test_obligatory() {
        let m = model();
        let s = parse_to_model(&m, &raw("n: 2\n")).unwrap();
        assert_eq!(missing_obligatory(&s, &m), vec!["energy".to_string()]);
        assert!(matches!(
            validate_settings(&s, &m),
            Err(CslibError::ObligatoryMissing { .. })
        ));

        let s = parse_to_model(&m, &raw("energy: 1 keV\n")).unwrap();
        assert!(validate_settings(&s, &m).is_ok());
    }

    #[test]
    fn test_generate_settings() {
        let m = model();
        let s = parse_to_model(&m, &raw("energy: 10 keV\nn: 4\ngeometry:\n  name: slab\n")).unwrap();
        let mapping = generate_settings(&s).unwrap();
        let text = serde_yaml::to_string(&mapping).unwrap();
        assert_eq!(text, "energy: 10 keV\nn: 4\ngeometry:\n  name: slab\n");
    }

    #[test]
    fn test_generate_without_model() {
        let mut s = Settings::new();
        s.set("a", 1.5).unwrap();
        s.set("b.c", true).unwrap();
        let raw = generate_settings_value(&s).unwrap();
        assert_eq!(raw.get("a"), Some(&Value::from("1.5")));
        assert_eq!(raw.get("b.c"), Some(&Value::from("true")));
    }

    #[test]
    fn test_parse_quantity_numbers_are_dimensionless() {
        let parsed = parse_quantity(&Value::Integer(3)).unwrap();
        match &parsed {
            Value::Quantity(q) => {
                assert_eq!(q.magnitude(), 3.0);
                assert!(q.units().is_unitless());
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse_quantity(&Value::Float(0.25)).unwrap() {
            Value::Quantity(q) => assert_eq!(q.magnitude(), 0.25),
            other => panic!("unexpected {:?}", other),
        }
        // 无量纲量不满足能量检查
        assert!(!is_energy().test(&parsed));
        assert!(parse_quantity(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_conforms_predicates() {
        let inner = Arc::new(Model::new().with("x", Type::new("x").with_check(is_integer())));
        let p = conforms(inner.clone(), "point");
        assert_eq!(p.description(), "Model <point>");
        assert!(p.test(&Value::Settings(raw("x: 1\n"))));
        assert!(!p.test(&Value::Settings(raw("x: a\n"))));
        assert!(!p.test(&Value::Integer(1)));

        let each = each_value_conforms(inner, "point");
        assert_eq!(each.description(), "{key: Model <point>}");
        assert!(each.test(&Value::Settings(raw("p: {x: 1}\nq: {x: 2}\n"))));
        assert!(!each.test(&Value::Settings(raw("p: {x: 1}\nq: 2\n"))));
    }

    #[test]
    fn test_default_settings() {
        let s = default_settings(&model()).unwrap();
        assert_eq!(s.get("n"), Some(&Value::Integer(3)));
        assert_eq!(s.get("geometry.layers"), Some(&Value::Integer(1)));
        assert!(!s.contains("energy"));
    }
}
