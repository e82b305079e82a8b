//! # 单位
//!
//! 单位是若干命名单位项的整数幂之积。每个单位项自带换算到 SI 基本单位的
//! 系数和量纲，因此 `Unit` 的运算不需要访问注册表。
//!
//! ## 依赖关系
//! - 被 `units/quantity.rs`, `units/registry.rs` 使用
//! - 使用 `units/dimension.rs`

use crate::error::{CslibError, Result};
use crate::units::dimension::{superscript, BaseDimension, Dimensionality};

use std::fmt;
use std::ops::{Div, Mul};

/// 单位项：一个可能带前缀的已命名单位
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTerm {
    /// 全名，例如 `nanometer`
    pub name: String,
    /// 符号，例如 `nm`
    pub symbol: String,
    /// 换算到 SI 基本单位的系数
    pub factor: f64,
    /// 量纲
    pub dimensionality: Dimensionality,
}

/// 单位
#[derive(Debug, Clone, Default)]
pub struct Unit {
    terms: Vec<(UnitTerm, i32)>,
}

impl Unit {
    /// 无量纲单位
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// 由单个单位项构成的单位
    pub fn from_term(term: UnitTerm) -> Self {
        Self {
            terms: vec![(term, 1)],
        }
    }

    /// 与量纲对应的 SI 基本单位组合（kg 而不是 g），按 kg、m、s 的惯用顺序排列
    pub fn base_units(dim: &Dimensionality) -> Self {
        const ORDER: [BaseDimension; 7] = [
            BaseDimension::Mass,
            BaseDimension::Length,
            BaseDimension::Time,
            BaseDimension::Current,
            BaseDimension::Temperature,
            BaseDimension::Substance,
            BaseDimension::Luminosity,
        ];
        let mut unit = Unit::dimensionless();
        for base in ORDER {
            let p = dim.exponent(base);
            if p == 0 {
                continue;
            }
            let (name, symbol) = match base {
                BaseDimension::Current => ("ampere", "A"),
                BaseDimension::Length => ("meter", "m"),
                BaseDimension::Luminosity => ("candela", "cd"),
                BaseDimension::Mass => ("kilogram", "kg"),
                BaseDimension::Substance => ("mole", "mol"),
                BaseDimension::Temperature => ("kelvin", "K"),
                BaseDimension::Time => ("second", "s"),
            };
            let term = UnitTerm {
                name: name.to_string(),
                symbol: symbol.to_string(),
                factor: 1.0,
                dimensionality: Dimensionality::base(base),
            };
            unit.push_term(term, p);
        }
        unit
    }

    pub fn terms(&self) -> &[(UnitTerm, i32)] {
        &self.terms
    }

    /// 换算到 SI 基本单位的系数
    pub fn factor(&self) -> f64 {
        self.terms
            .iter()
            .map(|(t, p)| t.factor.powi(*p))
            .product()
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.terms
            .iter()
            .fold(Dimensionality::dimensionless(), |acc, (t, p)| {
                acc * t.dimensionality.powi(*p)
            })
    }

    /// 没有任何单位项
    pub fn is_unitless(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensionality().is_dimensionless()
    }

    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        self.dimensionality() == other.dimensionality()
    }

    /// 从 self 换算到 target 的乘法系数
    pub fn conversion_factor(&self, target: &Unit) -> Result<f64> {
        let from_dim = self.dimensionality();
        let to_dim = target.dimensionality();
        if from_dim != to_dim {
            return Err(CslibError::DimensionalityMismatch {
                from: self.to_string(),
                from_dim: from_dim.to_string(),
                to: target.to_string(),
                to_dim: to_dim.to_string(),
            });
        }
        Ok(self.factor() / target.factor())
    }

    /// 整数次幂
    pub fn powi(&self, n: i32) -> Unit {
        if n == 0 {
            return Unit::dimensionless();
        }
        Unit {
            terms: self.terms.iter().map(|(t, p)| (t.clone(), p.saturating_mul(n))).collect(),
        }
    }

    /// 合并单位项，幂为零时移除
    fn push_term(&mut self, term: UnitTerm, power: i32) {
        if let Some(idx) = self.terms.iter().position(|(t, _)| t.name == term.name) {
            self.terms[idx].1 = self.terms[idx].1.saturating_add(power);
            if self.terms[idx].1 == 0 {
                self.terms.remove(idx);
            }
        } else if power != 0 {
            self.terms.push((term, power));
        }
    }

    /// 缩写形式，例如 `kg * m ** 2 / s ** 2`
    pub fn abbreviated(&self) -> String {
        self.render(false, " * ", " / ", operator_power, "")
    }

    /// 紧凑形式，例如 `kg·m²/s²`
    pub fn pretty(&self) -> String {
        self.render(false, "·", "/", superscript_power, "")
    }

    fn render(
        &self,
        long: bool,
        sep: &str,
        div: &str,
        power: fn(i32) -> String,
        empty: &str,
    ) -> String {
        if self.terms.is_empty() {
            return empty.to_string();
        }
        let render_term = |t: &UnitTerm, p: i32| {
            let name = if long { &t.name } else { &t.symbol };
            if p == 1 {
                name.clone()
            } else {
                format!("{}{}", name, power(p))
            }
        };
        let num: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, p)| *p > 0)
            .map(|(t, p)| render_term(t, *p))
            .collect();
        let den: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, p)| *p < 0)
            .map(|(t, p)| render_term(t, p.saturating_neg()))
            .collect();

        let mut out = if num.is_empty() {
            "1".to_string()
        } else {
            num.join(sep)
        };
        for d in den {
            out.push_str(div);
            out.push_str(&d);
        }
        out
    }
}

fn superscript_power(p: i32) -> String {
    superscript(p)
}

fn operator_power(p: i32) -> String {
    format!(" ** {}", p)
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let long = self.render(true, " * ", " / ", operator_power, "dimensionless");
        write!(f, "{}", long)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Unit) -> bool {
        self.terms.len() == other.terms.len()
            && self.terms.iter().all(|(t, p)| {
                other
                    .terms
                    .iter()
                    .any(|(ot, op)| ot.name == t.name && op == p)
            })
    }
}

impl Mul for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Unit {
        let mut out = self.clone();
        for (t, p) in &rhs.terms {
            out.push_term(t.clone(), *p);
        }
        out
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        &self * &rhs
    }
}

impl Div for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Unit {
        self * &rhs.powi(-1)
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        &self / &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(name: &str, symbol: &str, factor: f64, dim: BaseDimension) -> Unit {
        Unit::from_term(UnitTerm {
            name: name.to_string(),
            symbol: symbol.to_string(),
            factor,
            dimensionality: Dimensionality::base(dim),
        })
    }

    #[test]
    fn test_render_forms() {
        let kg = term("kilogram", "kg", 1.0, BaseDimension::Mass);
        let m = term("meter", "m", 1.0, BaseDimension::Length);
        let s = term("second", "s", 1.0, BaseDimension::Time);
        let joule = &(&kg * &m.powi(2)) / &s.powi(2);

        assert_eq!(joule.to_string(), "kilogram * meter ** 2 / second ** 2");
        assert_eq!(joule.abbreviated(), "kg * m ** 2 / s ** 2");
        assert_eq!(joule.pretty(), "kg·m²/s²");
    }

    #[test]
    fn test_base_units_order() {
        let dim = Dimensionality::base(BaseDimension::Length).powi(2)
            * Dimensionality::base(BaseDimension::Mass)
            * Dimensionality::base(BaseDimension::Time).powi(-3)
            * Dimensionality::base(BaseDimension::Current).powi(-1);
        let unit = Unit::base_units(&dim);
        assert_eq!(unit.abbreviated(), "kg * m ** 2 / s ** 3 / A");
        assert_eq!(unit.dimensionality(), dim);
    }

    #[test]
    fn test_powi_saturates() {
        let m = term("meter", "m", 1.0, BaseDimension::Length);
        let huge = m.powi(2_000_000_000).powi(2);
        assert_eq!(huge.terms()[0].1, i32::MAX);
        assert_eq!(
            huge.dimensionality().exponent(BaseDimension::Length),
            i32::MAX
        );
    }

    #[test]
    fn test_terms_cancel() {
        let m = term("meter", "m", 1.0, BaseDimension::Length);
        let ratio = &m / &m;
        assert!(ratio.is_unitless());
        assert_eq!(ratio.to_string(), "dimensionless");
    }

    #[test]
    fn test_conversion_factor() {
        let nm = term("nanometer", "nm", 1e-9, BaseDimension::Length);
        let mm = term("millimeter", "mm", 1e-3, BaseDimension::Length);
        let f = nm.conversion_factor(&mm).unwrap();
        assert!((f - 1e-6).abs() < 1e-18);

        let s = term("second", "s", 1.0, BaseDimension::Time);
        assert!(matches!(
            nm.conversion_factor(&s),
            Err(CslibError::DimensionalityMismatch { .. })
        ));
    }

    #[test]
    fn test_equality_ignores_order() {
        let m = term("meter", "m", 1.0, BaseDimension::Length);
        let s = term("second", "s", 1.0, BaseDimension::Time);
        assert_eq!(&m * &s, &s * &m);
        assert_ne!(&m * &s, &m / &s);
    }
}
