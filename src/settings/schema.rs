//! # YAML 模型描述
//!
//! 用声明式 YAML 描述设置模型，供命令行使用：
//!
//! ```yaml
//! energy:
//!   description: Primary electron energy.
//!   type: energy
//!   default: 1 keV
//!   range: [0 eV, 1 MeV]
//! geometry:
//!   description: Sample geometry.
//!   model:
//!     thickness: {description: Layer thickness., type: length, default: 20 nm}
//! ```
//!
//! 支持的 `type`：`integer`, `number`, `string`, `bool`, `file`, `energy`,
//! `length`, `volume`, `quantity`（需配合 `units`）, `any`。
//!
//! ## 依赖关系
//! - 被 `commands/settings.rs` 使用
//! - 使用 `settings/model.rs`, `settings/ops.rs`, `predicates/`

use super::model::{Model, Type};
use super::ops::{generate_quantity, parse_quantity};
use crate::error::{CslibError, Result};
use crate::predicates::{
    file_exists, has_units, in_range, is_, is_bool, is_energy, is_integer, is_length, is_list_of,
    is_number, is_string, is_volume, Predicate,
};
use crate::value::Value;

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 单个条目的描述
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaEntry {
    description: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
    #[serde(default)]
    obligatory: bool,
    #[serde(default)]
    range: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    choices: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    list_of: Option<String>,
    #[serde(default)]
    model: Option<serde_yaml::Mapping>,
}

/// 类型名对应的检查谓词，以及是否为物理量
struct Kind {
    check: Option<Predicate>,
    quantity: bool,
}

fn schema_error(key: &str, reason: impl Into<String>) -> CslibError {
    CslibError::InvalidSchema {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn kind(key: &str, name: &str, units: Option<&str>) -> Result<Kind> {
    let (check, quantity) = match name {
        "integer" => (Some(is_integer()), false),
        "number" => (Some(is_number()), false),
        "string" => (Some(is_string()), false),
        "bool" => (Some(is_bool()), false),
        "file" => (Some(file_exists()), false),
        "energy" => (Some(is_energy()), true),
        "length" => (Some(is_length()), true),
        "volume" => (Some(is_volume()), true),
        "quantity" => {
            let units = units.ok_or_else(|| schema_error(key, "type `quantity` needs `units`"))?;
            let check = has_units(units).map_err(|e| schema_error(key, e.to_string()))?;
            (Some(check), true)
        }
        "any" => (None, false),
        other => return Err(schema_error(key, format!("unknown type `{}`", other))),
    };
    Ok(Kind { check, quantity })
}

fn parse_quantity_list(value: &Value) -> Result<Value> {
    match value {
        Value::List(items) => Ok(Value::List(
            items.iter().map(parse_quantity).collect::<Result<_>>()?,
        )),
        other => parse_quantity(other),
    }
}

fn generate_quantity_list(value: &Value) -> Result<Value> {
    match value {
        Value::List(items) => Ok(Value::List(
            items.iter().map(generate_quantity).collect::<Result<_>>()?,
        )),
        other => generate_quantity(other),
    }
}

/// 用类型的解析器解析 YAML 中写出的值（默认值、区间端点、候选值）
fn parse_literal(key: &str, ty: &Type, yaml: &serde_yaml::Value) -> Result<Value> {
    ty.parse(&Value::from_yaml(yaml)?)
        .map_err(|e| schema_error(key, e.to_string()))
}

fn entry_type(key: &str, entry: SchemaEntry) -> Result<Type> {
    if let Some(model) = &entry.model {
        if entry.kind.is_some() || entry.list_of.is_some() {
            return Err(schema_error(key, "a nested model cannot declare `type` or `list_of`"));
        }
        let sub = model_from_mapping(model)?;
        return Ok(Type::nested(sub, key, entry.description).obligatory(entry.obligatory));
    }

    let mut ty = Type::new(entry.description).obligatory(entry.obligatory);
    let units = entry.units.as_deref();

    match (&entry.kind, &entry.list_of) {
        (Some(_), Some(_)) => {
            return Err(schema_error(key, "`type` and `list_of` are mutually exclusive"))
        }
        (Some(name), None) => {
            let kind = kind(key, name, units)?;
            if let Some(check) = kind.check {
                ty = ty.with_check(check);
            }
            if kind.quantity {
                ty = ty
                    .with_parser(parse_quantity)
                    .with_generator(generate_quantity);
            }
        }
        (None, Some(name)) => {
            let kind = kind(key, name, units)?;
            let element = kind
                .check
                .unwrap_or_else(|| Predicate::new("any", |_| true));
            ty = ty.with_check(is_list_of(element));
            if kind.quantity {
                ty = ty
                    .with_parser(parse_quantity_list)
                    .with_generator(generate_quantity_list);
            }
        }
        (None, None) => {}
    }

    if let Some(range) = &entry.range {
        if range.len() != 2 {
            return Err(schema_error(key, "`range` needs exactly two values"));
        }
        let low = parse_literal(key, &ty, &range[0])?;
        let high = parse_literal(key, &ty, &range[1])?;
        ty = ty.and_check(in_range(low, high));
    }

    if let Some(choices) = &entry.choices {
        let mut allowed: Option<Predicate> = None;
        for choice in choices {
            let p = is_(parse_literal(key, &ty, choice)?);
            allowed = Some(match allowed {
                Some(acc) => acc | p,
                None => p,
            });
        }
        if let Some(p) = allowed {
            ty = ty.and_check(p);
        }
    }

    if let Some(default) = &entry.default {
        let value = parse_literal(key, &ty, default)?;
        if !ty.test(&value) {
            return Err(schema_error(
                key,
                format!("default `{}` does not pass the type check", value),
            ));
        }
        ty = ty.with_default(value);
    }

    Ok(ty)
}

fn model_from_mapping(mapping: &serde_yaml::Mapping) -> Result<Model> {
    let mut model = Model::new();
    for (k, v) in mapping {
        let key = k
            .as_str()
            .ok_or_else(|| schema_error(&format!("{:?}", k), "keys must be strings"))?;
        let entry: SchemaEntry =
            serde_yaml::from_value(v.clone()).map_err(|e| schema_error(key, e.to_string()))?;
        model.insert(key, entry_type(key, entry)?)?;
    }
    Ok(model)
}

/// 从 YAML 文本构建模型
pub fn model_from_schema_str(text: &str) -> Result<Model> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(text)?;
    model_from_mapping(&mapping)
}

/// 读取模型描述文件
pub fn load_model(path: &Path) -> Result<Model> {
    if !path.exists() {
        return Err(CslibError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| CslibError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let model = model_from_schema_str(&text)?;
    tracing::debug!("Loaded model with {} entries from {}", model.len(), path.display());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{check_settings, settings_from_yaml_str, validate_settings};
    use crate::units::quantity;
    use std::sync::Arc;

    const SCHEMA: &str = "\
energy:
  description: Primary electron energy.
  type: energy
  default: 1 keV
  range: [0 eV, 1 MeV]
iterations:
  description: Number of iterations.
  type: integer
  obligatory: true
  range: [1, 1000]
mode:
  description: Scattering mode.
  type: string
  choices: [elastic, inelastic]
  default: elastic
geometry:
  description: Sample geometry.
  model:
    thickness: {description: Layer thickness., type: length, default: 20 nm}
";

    #[test]
    fn test_schema_model() {
        let model = model_from_schema_str(SCHEMA).unwrap();
        assert_eq!(
            model.keys().collect::<Vec<_>>(),
            vec!["energy", "iterations", "mode", "geometry"]
        );

        let energy = model.get_type("energy").unwrap();
        assert_eq!(
            energy.check().unwrap().description(),
            "[length]²·[mass]/[time]² (e.g. J) & In [0 electron_volt, 1 megaelectron_volt>"
        );
        assert!(model.get_type("iterations").unwrap().is_obligatory());
        assert_eq!(
            model.get_type("mode").unwrap().check().unwrap().description(),
            "String & elastic | inelastic"
        );
        assert!(model.get_type("geometry.thickness").is_some());
    }

    #[test]
    fn test_schema_parses_and_checks_settings() {
        let model = Arc::new(model_from_schema_str(SCHEMA).unwrap());

        let s = settings_from_yaml_str(
            "energy: 10 keV\niterations: 5\ngeometry:\n  thickness: 5 nm\n",
            &model,
        )
        .unwrap();
        assert!(validate_settings(&s, &model).is_ok());
        assert_eq!(
            *s.get("geometry.thickness").unwrap().as_quantity().unwrap(),
            quantity("5 nm").unwrap()
        );

        let s = settings_from_yaml_str("energy: 2 MeV\niterations: 5\n", &model).unwrap();
        assert!(check_settings(&s, &model).is_err());

        let s = settings_from_yaml_str("mode: phonon\niterations: 5\n", &model).unwrap();
        assert!(check_settings(&s, &model).is_err());

        let s = settings_from_yaml_str("energy: 10 keV\n", &model).unwrap();
        assert!(validate_settings(&s, &model).is_err());
    }

    #[test]
    fn test_list_of_quantities() {
        let model = Arc::new(
            model_from_schema_str(
                "energies:\n  description: Energies.\n  list_of: energy\n",
            )
            .unwrap(),
        );
        let s = settings_from_yaml_str("energies: [1 keV, 2 keV]\n", &model).unwrap();
        assert!(check_settings(&s, &model).is_ok());
        let list = s.get("energies").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].as_quantity().is_some());
    }

    #[test]
    fn test_schema_errors() {
        assert!(model_from_schema_str("x:\n  description: X.\n  type: complex\n").is_err());
        assert!(model_from_schema_str("x:\n  description: X.\n  type: quantity\n").is_err());
        assert!(model_from_schema_str("x:\n  description: X.\n  colour: red\n").is_err());
        assert!(
            model_from_schema_str("x:\n  description: X.\n  type: integer\n  default: 1.5\n")
                .is_err()
        );
        assert!(model_from_schema_str("x:\n  type: integer\n").is_err());
    }
}
