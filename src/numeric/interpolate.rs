//! # 对数-对数插值
//!
//! 对数据点 `(x, y)` 在 `ln x`-`ln y` 平面做分段线性插值。
//!
//! ## 依赖关系
//! - 被 `numeric/mod.rs` 使用
//! - 使用 `units/quantity.rs`

use crate::error::{CslibError, Result};
use crate::units::{Quantity, QuantityArray, Unit};

/// 越界处理方式
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutOfBounds {
    /// 沿端点线段外推
    #[default]
    Extrapolate,
    /// 填充固定值（y 的单位）
    Fill(f64),
    /// 报错
    Error,
}

/// 对数-对数插值器
#[derive(Debug, Clone)]
pub struct LogLogInterpolator {
    log_x: Vec<f64>,
    log_y: Vec<f64>,
    x_units: Unit,
    y_units: Unit,
    bounds: OutOfBounds,
}

/// 构建插值器
///
/// `x` 与 `y` 长度相同且至少两个点，所有值为正；`x` 会被排序。
pub fn loglog_interpolate(
    x: &QuantityArray,
    y: &QuantityArray,
    bounds: OutOfBounds,
) -> Result<LogLogInterpolator> {
    if x.len() != y.len() {
        return Err(CslibError::ShapeMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(CslibError::InvalidArgument(
            "log-log interpolation needs at least two points".to_string(),
        ));
    }
    if x.values().iter().chain(y.values()).any(|v| *v <= 0.0) {
        return Err(CslibError::InvalidArgument(
            "log-log interpolation needs positive values".to_string(),
        ));
    }

    let mut points: Vec<(f64, f64)> = x
        .values()
        .iter()
        .zip(y.values())
        .map(|(a, b)| (a.ln(), b.ln()))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(LogLogInterpolator {
        log_x: points.iter().map(|p| p.0).collect(),
        log_y: points.iter().map(|p| p.1).collect(),
        x_units: x.units().clone(),
        y_units: y.units().clone(),
        bounds,
    })
}

impl LogLogInterpolator {
    pub fn y_units(&self) -> &Unit {
        &self.y_units
    }

    fn eval_log(&self, lx: f64) -> Result<f64> {
        let n = self.log_x.len();
        let (lo, hi) = (self.log_x[0], self.log_x[n - 1]);
        if lx < lo || lx > hi {
            match self.bounds {
                OutOfBounds::Extrapolate => {}
                OutOfBounds::Fill(v) => return Ok(v),
                OutOfBounds::Error => {
                    return Err(CslibError::OutOfBounds {
                        value: lx.exp(),
                        min: lo.exp(),
                        max: hi.exp(),
                    })
                }
            }
        }

        // 所在线段；越界时取端点线段
        let i = self.log_x.partition_point(|v| *v <= lx).clamp(1, n - 1);
        let (x0, x1) = (self.log_x[i - 1], self.log_x[i]);
        let (y0, y1) = (self.log_y[i - 1], self.log_y[i]);
        let t = if x1 == x0 { 0.0 } else { (lx - x0) / (x1 - x0) };
        Ok((y0 + t * (y1 - y0)).exp())
    }

    /// 在单点求值
    pub fn eval(&self, x: &Quantity) -> Result<Quantity> {
        let v = x.value_in(&self.x_units)?;
        Ok(Quantity::new(self.eval_log(v.ln())?, self.y_units.clone()))
    }

    /// 在多点求值
    pub fn eval_many(&self, x: &QuantityArray) -> Result<QuantityArray> {
        let values = x
            .values_in(&self.x_units)?
            .into_iter()
            .map(|v| self.eval_log(v.ln()))
            .collect::<Result<Vec<_>>>()?;
        Ok(QuantityArray::new(values, self.y_units.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::units;

    fn power_law() -> (QuantityArray, QuantityArray) {
        let ev = units().parse_units("eV").unwrap();
        let cm2 = units().parse_units("cm²").unwrap();
        let x = vec![10.0, 1.0, 100.0];
        let y = x.iter().map(|v: &f64| v.powi(-2)).collect();
        (QuantityArray::new(x, ev), QuantityArray::new(y, cm2))
    }

    #[test]
    fn test_power_law_is_exact() {
        let (x, y) = power_law();
        let f = loglog_interpolate(&x, &y, OutOfBounds::Extrapolate).unwrap();
        let q = f.eval(&units().quantity(30.0, "eV").unwrap()).unwrap();
        assert!((q.magnitude() - 30f64.powi(-2)).abs() < 1e-15);

        // 外推与单位换算
        let q = f.eval(&units().quantity(1.0, "keV").unwrap()).unwrap();
        assert!((q.magnitude() - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_bounds() {
        let (x, y) = power_law();
        let fill = loglog_interpolate(&x, &y, OutOfBounds::Fill(0.0)).unwrap();
        let q = fill.eval(&units().quantity(0.5, "eV").unwrap()).unwrap();
        assert_eq!(q.magnitude(), 0.0);

        let strict = loglog_interpolate(&x, &y, OutOfBounds::Error).unwrap();
        let err = strict.eval(&units().quantity(500.0, "eV").unwrap()).unwrap_err();
        assert!(matches!(err, CslibError::OutOfBounds { .. }));
        assert!(strict.eval(&units().quantity(100.0, "eV").unwrap()).is_ok());
    }

    #[test]
    fn test_invalid_input() {
        let (x, _) = power_law();
        let m = units().parse_units("m").unwrap();
        let bad = QuantityArray::new(vec![1.0, 0.0, 2.0], m.clone());
        assert!(loglog_interpolate(&x, &bad, OutOfBounds::Extrapolate).is_err());
        let short = QuantityArray::new(vec![1.0], m);
        assert!(loglog_interpolate(&short, &short, OutOfBounds::Extrapolate).is_err());
    }
}
