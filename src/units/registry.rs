//! # 单位注册表
//!
//! 保存前缀与单位定义，负责单位名称解析、表达式求值和新单位定义。
//! 定义文本采用 pint 风格：
//!
//! ```text
//! meter = [length] = m = metre
//! kilo- = 1e3 = k-
//! joule = newton * meter = J
//! ```
//!
//! ## 名称解析顺序
//! 1. 完整名称、符号或别名
//! 2. 前缀（全名或符号，长者优先）+ 单位
//! 3. 去掉复数词尾 `s` 后重复 1、2
//!
//! ## 依赖关系
//! - 被 `units/mod.rs` 的共享实例使用
//! - 使用 `units/parser.rs` 求值表达式

use crate::error::{CslibError, Result};
use crate::units::dimension::{BaseDimension, Dimensionality};
use crate::units::parser;
use crate::units::quantity::Quantity;
use crate::units::unit::{Unit, UnitTerm};

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, error, warn};

/// 内置单位定义
pub const DEFAULT_DEFINITIONS: &str = include_str!("default_units.txt");

/// CSLib 在默认定义之外追加的单位
pub const CSLIB_DEFINITIONS: &str = "\
ε_0 = epsilon_0
bohr_radius = 4 π ħ**2 ε_0 / (m_e e**2) = a0 = a_0
G = gauss
T_room = 297 K = room_temperature
";

/// 单位定义
#[derive(Debug, Clone)]
struct UnitDef {
    name: String,
    symbol: String,
    aliases: Vec<String>,
    factor: f64,
    dimensionality: Dimensionality,
}

impl UnitDef {
    fn term(&self) -> UnitTerm {
        UnitTerm {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            factor: self.factor,
            dimensionality: self.dimensionality,
        }
    }
}

/// 前缀定义
#[derive(Debug, Clone)]
struct PrefixDef {
    name: String,
    symbol: String,
    aliases: Vec<String>,
    factor: f64,
}

#[derive(Debug, Default)]
struct RegistryData {
    /// 全名 -> 定义
    units: HashMap<String, UnitDef>,
    /// 全名/符号/别名 -> 全名
    lookup: HashMap<String, String>,
    prefixes: Vec<PrefixDef>,
}

/// 单位注册表，可在线程间共享
#[derive(Debug, Default)]
pub struct UnitRegistry {
    data: RwLock<RegistryData>,
}

impl UnitRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载内置定义的注册表，任何一行失败都返回错误
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::new();
        registry.load_definitions(DEFAULT_DEFINITIONS)?;
        Ok(registry)
    }

    /// 共享实例使用的注册表：内置定义加 CSLib 定义，失败的行记录日志后跳过
    pub(crate) fn shared() -> Self {
        let registry = Self::new();
        for text in [DEFAULT_DEFINITIONS, CSLIB_DEFINITIONS] {
            for line in definition_lines(text) {
                if let Err(e) = registry.define(line) {
                    error!("skipping unit definition: {}", e);
                }
            }
        }
        registry
    }

    /// 逐行加载定义文本
    pub fn load_definitions(&self, text: &str) -> Result<()> {
        for line in definition_lines(text) {
            self.define(line)?;
        }
        Ok(())
    }

    /// 添加一条定义；同名定义会被替换
    pub fn define(&self, line: &str) -> Result<()> {
        let invalid = |reason: &str| CslibError::InvalidDefinition {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = line.split('=').map(str::trim).collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("expected 'name = value [= symbol] [= alias ...]'"));
        }
        let name = parts[0];
        let value = parts[1];
        let extra = &parts[2..];

        if let Some(prefix) = name.strip_suffix('-') {
            let factor: f64 = value
                .parse()
                .map_err(|_| invalid("prefix value must be a number"))?;
            let mut names = extra.iter().map(|s| s.trim_end_matches('-').to_string());
            let symbol = names.next().unwrap_or_default();
            let def = PrefixDef {
                name: prefix.to_string(),
                symbol,
                aliases: names.collect(),
                factor,
            };
            self.write().add_prefix(def);
            debug!(prefix, factor, "defined prefix");
            return Ok(());
        }

        let (factor, dimensionality) = if value.starts_with('[') {
            if value == "[]" {
                (1.0, Dimensionality::dimensionless())
            } else {
                let dim = BaseDimension::from_name(value)
                    .ok_or_else(|| invalid("unknown base dimension"))?;
                (1.0, Dimensionality::base(dim))
            }
        } else {
            let q = self.parse_expression(value)?;
            (q.magnitude() * q.units().factor(), q.dimensionality())
        };

        let symbol = match extra.first() {
            Some(&"_") | None => name.to_string(),
            Some(s) => s.to_string(),
        };
        let aliases = extra
            .iter()
            .skip(1)
            .map(|s| s.to_string())
            .filter(|s| s != "_")
            .collect();

        let def = UnitDef {
            name: name.to_string(),
            symbol,
            aliases,
            factor,
            dimensionality,
        };
        let mut data = self.write();
        if data.units.contains_key(name) {
            warn!(unit = name, "redefining unit");
        }
        data.add_unit(def);
        debug!(unit = name, factor, "defined unit");
        Ok(())
    }

    /// 名称是否可以解析为单位
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// 所有单位全名（排序）
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().units.keys().cloned().collect();
        names.sort();
        names
    }

    /// 把单个名称解析为单位
    pub fn resolve(&self, token: &str) -> Result<Unit> {
        let data = self.read();
        if let Some(term) = data.resolve_term(token) {
            return Ok(Unit::from_term(term));
        }
        if let Some(singular) = token.strip_suffix('s').filter(|s| !s.is_empty()) {
            if let Some(term) = data.resolve_term(singular) {
                return Ok(Unit::from_term(term));
            }
        }
        Err(CslibError::UndefinedUnit {
            name: token.to_string(),
        })
    }

    /// 解析单位表达式，不允许数值系数
    pub fn parse_units(&self, expr: &str) -> Result<Unit> {
        let q = self.parse_expression(expr)?;
        if q.magnitude() != 1.0 {
            return Err(CslibError::UnitSyntax {
                expr: expr.to_string(),
                reason: "unit expression cannot have a scaling factor".to_string(),
            });
        }
        Ok(q.units().clone())
    }

    /// 解析物理量表达式，例如 `41 Å`
    pub fn parse_expression(&self, expr: &str) -> Result<Quantity> {
        parser::evaluate(expr, &|name| self.resolve(name))
    }

    /// 由数值和单位表达式构造物理量
    pub fn quantity(&self, magnitude: f64, units: &str) -> Result<Quantity> {
        Ok(Quantity::new(magnitude, self.parse_units(units)?))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RegistryData {
    fn add_prefix(&mut self, def: PrefixDef) {
        self.prefixes.retain(|p| p.name != def.name);
        self.prefixes.push(def);
    }

    fn add_unit(&mut self, def: UnitDef) {
        self.lookup.insert(def.name.clone(), def.name.clone());
        self.lookup.insert(def.symbol.clone(), def.name.clone());
        for alias in &def.aliases {
            self.lookup.insert(alias.clone(), def.name.clone());
        }
        self.units.insert(def.name.clone(), def);
    }

    fn exact(&self, token: &str) -> Option<&UnitDef> {
        self.lookup.get(token).and_then(|name| self.units.get(name))
    }

    fn resolve_term(&self, token: &str) -> Option<UnitTerm> {
        if let Some(def) = self.exact(token) {
            return Some(def.term());
        }

        let mut candidates: Vec<(&str, &PrefixDef)> = Vec::new();
        for p in &self.prefixes {
            candidates.push((p.name.as_str(), p));
            if !p.symbol.is_empty() {
                candidates.push((p.symbol.as_str(), p));
            }
            for alias in &p.aliases {
                candidates.push((alias.as_str(), p));
            }
        }
        // 长前缀优先匹配（da 先于 d）
        candidates.sort_by_key(|(text, _)| std::cmp::Reverse(text.chars().count()));

        for (text, prefix) in candidates {
            let Some(rest) = token.strip_prefix(text) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            if let Some(def) = self.exact(rest) {
                let mut term = def.term();
                term.name = format!("{}{}", prefix.name, def.name);
                term.symbol = format!("{}{}", prefix.symbol, def.symbol);
                term.factor *= prefix.factor;
                return Some(term);
            }
        }
        None
    }
}

/// 去除注释和空行后的定义行
fn definition_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
}
