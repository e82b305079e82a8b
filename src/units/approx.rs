//! # 近似比较
//!
//! 带单位的近似值，用于测试和数值校验。量纲不同的值永不相等。
//!
//! ## 依赖关系
//! - 使用 `units/quantity.rs`

use crate::units::quantity::Quantity;

/// 默认相对误差
pub const DEFAULT_REL_ERR: f64 = 1e-6;

/// 近似物理量
#[derive(Debug, Clone)]
pub struct Approx {
    value: Quantity,
    abs_err: Quantity,
}

impl Approx {
    pub fn value(&self) -> &Quantity {
        &self.value
    }

    pub fn abs_err(&self) -> &Quantity {
        &self.abs_err
    }
}

/// 相对误差 1e-6 的近似值
pub fn approx(value: Quantity) -> Approx {
    approx_rel(value, DEFAULT_REL_ERR)
}

/// 给定相对误差的近似值
pub fn approx_rel(value: Quantity, rel_err: f64) -> Approx {
    let abs_err = value.abs() * rel_err;
    Approx { value, abs_err }
}

/// 给定绝对误差的近似值
pub fn approx_abs(value: Quantity, abs_err: Quantity) -> Approx {
    Approx { value, abs_err }
}

impl PartialEq<Quantity> for Approx {
    fn eq(&self, other: &Quantity) -> bool {
        if !self.value.is_compatible_with(other) {
            return false;
        }
        let diff = match self.value.try_sub(other) {
            Ok(d) => d.abs(),
            Err(_) => return false,
        };
        diff < self.abs_err
    }
}

impl PartialEq<Approx> for Quantity {
    fn eq(&self, other: &Approx) -> bool {
        other == self
    }
}
