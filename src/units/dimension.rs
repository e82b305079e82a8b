//! # 量纲
//!
//! 以七个 SI 基本量纲的整数幂表示物理量纲。角度视为无量纲。
//!
//! ## 依赖关系
//! - 被 `units/unit.rs`, `units/registry.rs` 使用
//! - 无外部模块依赖

use std::fmt;
use std::ops::{Div, Mul};

/// SI 基本量纲（按名称字母序排列，决定显示顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDimension {
    Current,
    Length,
    Luminosity,
    Mass,
    Substance,
    Temperature,
    Time,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 7] = [
        BaseDimension::Current,
        BaseDimension::Length,
        BaseDimension::Luminosity,
        BaseDimension::Mass,
        BaseDimension::Substance,
        BaseDimension::Temperature,
        BaseDimension::Time,
    ];

    /// 量纲名称（不含方括号）
    pub fn name(&self) -> &'static str {
        match self {
            BaseDimension::Current => "current",
            BaseDimension::Length => "length",
            BaseDimension::Luminosity => "luminosity",
            BaseDimension::Mass => "mass",
            BaseDimension::Substance => "substance",
            BaseDimension::Temperature => "temperature",
            BaseDimension::Time => "time",
        }
    }

    /// 从 `[length]` 形式的名称解析
    pub fn from_name(name: &str) -> Option<Self> {
        let inner = name.trim().trim_start_matches('[').trim_end_matches(']');
        BaseDimension::ALL
            .iter()
            .copied()
            .find(|d| d.name() == inner)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// 量纲：各基本量纲的整数幂
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensionality {
    exponents: [i32; 7],
}

impl Dimensionality {
    /// 无量纲
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// 单个基本量纲
    pub fn base(dim: BaseDimension) -> Self {
        let mut exponents = [0; 7];
        exponents[dim.index()] = 1;
        Self { exponents }
    }

    pub fn exponent(&self, dim: BaseDimension) -> i32 {
        self.exponents[dim.index()]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    /// 整数次幂
    pub fn powi(&self, n: i32) -> Self {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e = e.saturating_mul(n);
        }
        Self { exponents }
    }

    /// 非零幂的 (量纲, 幂) 列表，正幂在前
    fn split(&self) -> (Vec<(BaseDimension, i32)>, Vec<(BaseDimension, i32)>) {
        let mut num = Vec::new();
        let mut den = Vec::new();
        for dim in BaseDimension::ALL {
            let e = self.exponent(dim);
            if e > 0 {
                num.push((dim, e));
            } else if e < 0 {
                den.push((dim, e.saturating_neg()));
            }
        }
        (num, den)
    }

    /// 紧凑显示，例如 `[length]²·[mass]/[time]²`
    pub fn pretty(&self) -> String {
        if self.is_dimensionless() {
            return "dimensionless".to_string();
        }
        let (num, den) = self.split();
        let render = |items: &[(BaseDimension, i32)]| {
            items
                .iter()
                .map(|(d, e)| format!("[{}]{}", d.name(), superscript(*e)))
                .collect::<Vec<_>>()
                .join("·")
        };
        let mut out = if num.is_empty() {
            "1".to_string()
        } else {
            render(&num)
        };
        if !den.is_empty() {
            out.push('/');
            out.push_str(&render(&den));
        }
        out
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let (num, den) = self.split();
        let render = |items: &[(BaseDimension, i32)]| {
            items
                .iter()
                .map(|(d, e)| {
                    if *e == 1 {
                        format!("[{}]", d.name())
                    } else {
                        format!("[{}] ** {}", d.name(), e)
                    }
                })
                .collect::<Vec<_>>()
                .join(" * ")
        };
        if num.is_empty() {
            write!(f, "1")?;
        } else {
            write!(f, "{}", render(&num))?;
        }
        if !den.is_empty() {
            write!(f, " / {}", render(&den))?;
        }
        Ok(())
    }
}

impl Mul for Dimensionality {
    type Output = Dimensionality;

    fn mul(self, rhs: Dimensionality) -> Dimensionality {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents.iter()) {
            *e = e.saturating_add(*r);
        }
        Dimensionality { exponents }
    }
}

impl Div for Dimensionality {
    type Output = Dimensionality;

    fn div(self, rhs: Dimensionality) -> Dimensionality {
        self * rhs.powi(-1)
    }
}

/// 整数转上标数字，幂为 1 时返回空串
pub(crate) fn superscript(n: i32) -> String {
    if n == 1 {
        return String::new();
    }
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy() -> Dimensionality {
        let length = Dimensionality::base(BaseDimension::Length);
        let mass = Dimensionality::base(BaseDimension::Mass);
        let time = Dimensionality::base(BaseDimension::Time);
        length.powi(2) * mass / time.powi(2)
    }

    #[test]
    fn test_display_energy() {
        assert_eq!(
            energy().to_string(),
            "[length] ** 2 * [mass] / [time] ** 2"
        );
        assert_eq!(energy().pretty(), "[length]²·[mass]/[time]²");
    }

    #[test]
    fn test_dimensionless() {
        let d = energy() / energy();
        assert!(d.is_dimensionless());
        assert_eq!(d.to_string(), "dimensionless");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            BaseDimension::from_name("[length]"),
            Some(BaseDimension::Length)
        );
        assert_eq!(BaseDimension::from_name("[charm]"), None);
    }

    #[test]
    fn test_inverse_only() {
        let per_time = Dimensionality::base(BaseDimension::Time).powi(-1);
        assert_eq!(per_time.to_string(), "1 / [time]");
    }
}
