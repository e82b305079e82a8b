//! # 物理量
//!
//! `Quantity` 为带单位的标量，`QuantityArray` 为共享同一单位的一维数组。
//!
//! ## 依赖关系
//! - 被 `predicates/`, `settings/`, `tables/`, `dataframe/`, `numeric/` 使用
//! - 使用 `units/unit.rs`

use crate::error::{CslibError, Result};
use crate::units::dimension::Dimensionality;
use crate::units::unit::Unit;

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul, Neg};

/// 带单位的标量
#[derive(Debug, Clone)]
pub struct Quantity {
    magnitude: f64,
    units: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, units: Unit) -> Self {
        Self { magnitude, units }
    }

    /// 无量纲数
    pub fn dimensionless(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::dimensionless())
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn units(&self) -> &Unit {
        &self.units
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.units.dimensionality()
    }

    pub fn is_compatible_with(&self, other: &Quantity) -> bool {
        self.dimensionality() == other.dimensionality()
    }

    /// 换算到目标单位
    pub fn to(&self, target: &Unit) -> Result<Quantity> {
        let factor = self.units.conversion_factor(target)?;
        Ok(Quantity::new(self.magnitude * factor, target.clone()))
    }

    /// 以目标单位表示的数值
    pub fn value_in(&self, target: &Unit) -> Result<f64> {
        Ok(self.magnitude * self.units.conversion_factor(target)?)
    }

    /// 换算到 SI 基本单位
    pub fn to_base_units(&self) -> Quantity {
        let base = Unit::base_units(&self.dimensionality());
        Quantity::new(self.magnitude * self.units.factor() / base.factor(), base)
    }

    pub fn powi(&self, n: i32) -> Quantity {
        Quantity::new(self.magnitude.powi(n), self.units.powi(n))
    }

    pub fn abs(&self) -> Quantity {
        Quantity::new(self.magnitude.abs(), self.units.clone())
    }

    /// 加法，右操作数换算到左操作数的单位
    pub fn try_add(&self, other: &Quantity) -> Result<Quantity> {
        let rhs = other.value_in(&self.units)?;
        Ok(Quantity::new(self.magnitude + rhs, self.units.clone()))
    }

    /// 减法，右操作数换算到左操作数的单位
    pub fn try_sub(&self, other: &Quantity) -> Result<Quantity> {
        let rhs = other.value_in(&self.units)?;
        Ok(Quantity::new(self.magnitude - rhs, self.units.clone()))
    }

    /// 缩写形式，例如 `4.1 nm`
    pub fn abbreviated(&self) -> String {
        if self.units.is_unitless() {
            format!("{}", self.magnitude)
        } else {
            format!("{} {}", self.magnitude, self.units.abbreviated())
        }
    }

    /// 紧凑形式，例如 `4.1 nm²`
    pub fn pretty(&self) -> String {
        if self.units.is_unitless() {
            format!("{}", self.magnitude)
        } else {
            format!("{} {}", self.magnitude, self.units.pretty())
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.units)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Quantity) -> bool {
        match other.value_in(&self.units) {
            Ok(v) => v == self.magnitude,
            Err(_) => false,
        }
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Quantity) -> Option<Ordering> {
        let v = other.value_in(&self.units).ok()?;
        self.magnitude.partial_cmp(&v)
    }
}

impl Mul for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude * rhs.magnitude, &self.units * &rhs.units)
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        &self * &rhs
    }
}

impl Div for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude / rhs.magnitude, &self.units / &rhs.units)
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        &self / &rhs
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude * rhs, self.units)
    }
}

impl Mul<Quantity> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        rhs * self
    }
}

impl Mul<Unit> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Unit) -> Quantity {
        Quantity::new(self, rhs)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude / rhs, self.units)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity::new(-self.magnitude, self.units)
    }
}

/// 共享单位的一维物理量数组
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityArray {
    values: Vec<f64>,
    units: Unit,
}

impl QuantityArray {
    pub fn new(values: Vec<f64>, units: Unit) -> Self {
        Self { values, units }
    }

    /// 由物理量列表构建，统一换算到第一个元素的单位
    pub fn from_quantities(quantities: &[Quantity]) -> Result<Self> {
        let first = quantities
            .first()
            .ok_or_else(|| CslibError::InvalidArgument("empty quantity list".to_string()))?;
        let units = first.units().clone();
        let values = quantities
            .iter()
            .map(|q| q.value_in(&units))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values, units })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn units(&self) -> &Unit {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.units.dimensionality()
    }

    pub fn get(&self, idx: usize) -> Option<Quantity> {
        self.values
            .get(idx)
            .map(|v| Quantity::new(*v, self.units.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.values
            .iter()
            .map(move |v| Quantity::new(*v, self.units.clone()))
    }

    /// 换算到目标单位
    pub fn to(&self, target: &Unit) -> Result<QuantityArray> {
        let factor = self.units.conversion_factor(target)?;
        Ok(QuantityArray::new(
            self.values.iter().map(|v| v * factor).collect(),
            target.clone(),
        ))
    }

    /// 以目标单位表示的数值
    pub fn values_in(&self, target: &Unit) -> Result<Vec<f64>> {
        Ok(self.to(target)?.values)
    }

    /// 数值乘以常数
    pub fn scale(&self, factor: f64) -> QuantityArray {
        QuantityArray::new(
            self.values.iter().map(|v| v * factor).collect(),
            self.units.clone(),
        )
    }
}
