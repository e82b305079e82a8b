//! # 数值工具
//!
//! 函数组合、两个函数之间的平滑过渡、对数-对数插值、Romberg 积分、
//! Brent 求根以及逆累积分布表。
//!
//! ## 子模块
//! - `interpolate`: 对数-对数插值
//! - `integrate`: Romberg 积分
//! - `roots`: Brent 求根
//! - `icdf`: 逆累积分布表
//!
//! ## 依赖关系
//! - 被 `tables/` 使用
//! - 使用 `units/quantity.rs`

pub mod icdf;
pub mod integrate;
pub mod interpolate;
pub mod roots;

pub use icdf::inverse_cdf_table;
pub use integrate::{romberg, RombergOptions};
pub use interpolate::{loglog_interpolate, LogLogInterpolator, OutOfBounds};
pub use roots::{brentq, BrentOptions};

use crate::error::Result;
use crate::units::Quantity;

/// 实函数
pub type RealFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;

pub fn identity<T>(x: T) -> T {
    x
}

/// 从右到左组合：`compose(vec![f, g])(x) == f(g(x))`
pub fn compose(fs: Vec<RealFn>) -> impl Fn(f64) -> f64 {
    move |x| fs.iter().rev().fold(x, |acc, f| f(acc))
}

fn blend(
    y1: &Quantity,
    y2: &Quantity,
    u: f64,
    below: bool,
    above: bool,
    h: &dyn Fn(f64) -> f64,
) -> Result<Quantity> {
    let units = y1.units().clone();
    let v1 = y1.magnitude();
    let v2 = y2.value_in(&units)?;
    let value = if below {
        v1
    } else if above {
        v2
    } else {
        let w = h(u.clamp(0.0, 1.0));
        (1.0 - w) * v1 + w * v2
    };
    Ok(Quantity::new(value, units))
}

/// 在 `[a, b]` 上由 `f1` 线性过渡到 `f2`
///
/// 权重为 `h(clip((x - a) / (b - a)))`；`x < a` 取 `f1`，`x > b` 取 `f2`。
/// 结果使用 `f1` 的单位。
pub fn interpolate_f<F1, F2, H>(
    f1: F1,
    f2: F2,
    h: H,
    a: f64,
    b: f64,
) -> impl Fn(f64) -> Result<Quantity>
where
    F1: Fn(f64) -> Quantity,
    F2: Fn(f64) -> Quantity,
    H: Fn(f64) -> f64,
{
    move |x| blend(&f1(x), &f2(x), (x - a) / (b - a), x < a, x > b, &h)
}

/// 与 [`interpolate_f`] 相同，但权重按 `ln(x / a) / ln(b / a)` 计算
pub fn log_interpolate_f<F1, F2, H>(
    f1: F1,
    f2: F2,
    h: H,
    a: f64,
    b: f64,
) -> impl Fn(f64) -> Result<Quantity>
where
    F1: Fn(f64) -> Quantity,
    F2: Fn(f64) -> Quantity,
    H: Fn(f64) -> f64,
{
    move |x| blend(&f1(x), &f2(x), (x / a).ln() / (b / a).ln(), x < a, x > b, &h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::units;

    #[test]
    fn test_compose_order() {
        let fs: Vec<RealFn> = vec![Box::new(|x: f64| x + 1.0), Box::new(|x: f64| x * 2.0)];
        let f = compose(fs);
        assert_eq!(f(3.0), 7.0);
        let id = compose(vec![]);
        assert_eq!(id(3.0), 3.0);
        assert_eq!(identity(5), 5);
    }

    #[test]
    fn test_interpolate_f() {
        let f1 = |_: f64| units().quantity(1.0, "m").unwrap();
        let f2 = |_: f64| units().quantity(300.0, "cm").unwrap();
        let g = interpolate_f(f1, f2, identity, 1.0, 3.0);

        assert_eq!(g(0.0).unwrap().magnitude(), 1.0);
        assert!((g(2.0).unwrap().magnitude() - 2.0).abs() < 1e-12);
        assert!((g(4.0).unwrap().magnitude() - 3.0).abs() < 1e-12);
        assert_eq!(g(2.0).unwrap().units().abbreviated(), "m");
    }

    #[test]
    fn test_log_interpolate_f() {
        let f1 = |_: f64| units().quantity(0.0, "eV").unwrap();
        let f2 = |_: f64| units().quantity(1.0, "eV").unwrap();
        let g = log_interpolate_f(f1, f2, identity, 10.0, 1000.0);
        assert!((g(100.0).unwrap().magnitude() - 0.5).abs() < 1e-12);
        assert_eq!(g(5.0).unwrap().magnitude(), 0.0);
        assert_eq!(g(2000.0).unwrap().magnitude(), 1.0);
    }

    #[test]
    fn test_incompatible_units() {
        let f1 = |_: f64| units().quantity(1.0, "m").unwrap();
        let f2 = |_: f64| units().quantity(1.0, "s").unwrap();
        let g = interpolate_f(f1, f2, identity, 0.0, 1.0);
        assert!(g(0.5).is_err());
    }
}
