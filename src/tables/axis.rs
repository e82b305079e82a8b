//! # 表格坐标轴工具
//!
//! 单调性检查与插值定位。
//!
//! ## 依赖关系
//! - 被 `tables/dcs.rs`, `tables/grid.rs` 使用

use crate::error::{CslibError, Result};

/// 检查严格递增且至少两个点
pub(crate) fn check_axis(name: &str, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(CslibError::InvalidTable(format!(
            "{} axis needs at least two points, got {}",
            name,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CslibError::InvalidTable(format!(
            "{} axis contains non-finite values",
            name
        )));
    }
    if values.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CslibError::InvalidTable(format!(
            "{} axis must be strictly increasing",
            name
        )));
    }
    Ok(())
}

/// 检查全部为正（对数坐标轴）
pub(crate) fn check_positive(name: &str, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| *v <= 0.0) {
        return Err(CslibError::InvalidTable(format!(
            "{} axis must be positive",
            name
        )));
    }
    Ok(())
}

/// 定位 `v` 所在区间 `[i, i+1]` 及权重；超出闭区间返回 `None`
///
/// `log` 为真时权重按 `ln(v / a_i) / ln(a_{i+1} / a_i)` 计算。
pub(crate) fn locate(axis: &[f64], v: f64, log: bool) -> Option<(usize, f64)> {
    let n = axis.len();
    if n < 2 || v.is_nan() || v < axis[0] || v > axis[n - 1] {
        return None;
    }
    let i = axis.partition_point(|a| *a <= v).clamp(1, n - 1) - 1;
    let (a, b) = (axis[i], axis[i + 1]);
    let w = if log {
        (v / a).ln() / (b / a).ln()
    } else {
        (v - a) / (b - a)
    };
    Some((i, w))
}

/// 同 [`locate`]，但超出范围时夹到最近的端点
pub(crate) fn locate_clamped(axis: &[f64], v: f64, log: bool) -> (usize, f64) {
    let n = axis.len();
    let v = if v.is_nan() { axis[0] } else { v.clamp(axis[0], axis[n - 1]) };
    locate(axis, v, log).unwrap_or((0, 0.0))
}

/// 两坐标轴在相对误差 1e-12 内相同
pub(crate) fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= 1e-12 * x.abs().max(y.abs()))
}

/// 双线性插值，`z(i, j)` 为网格值
pub(crate) fn bilinear<F: Fn(usize, usize) -> f64>(
    (i, wi): (usize, f64),
    (j, wj): (usize, f64),
    z: F,
) -> f64 {
    (1.0 - wi) * (1.0 - wj) * z(i, j)
        + wi * (1.0 - wj) * z(i + 1, j)
        + (1.0 - wi) * wj * z(i, j + 1)
        + wi * wj * z(i + 1, j + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_axis() {
        assert!(check_axis("q", &[0.0, 1.0, 2.0]).is_ok());
        assert!(check_axis("q", &[0.0]).is_err());
        assert!(check_axis("q", &[0.0, 1.0, 1.0]).is_err());
        assert!(check_axis("q", &[0.0, f64::NAN]).is_err());
        assert!(check_positive("energy", &[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_locate() {
        let axis = [1.0, 10.0, 100.0];
        assert_eq!(locate(&axis, 1.0, false), Some((0, 0.0)));
        assert_eq!(locate(&axis, 100.0, false), Some((1, 1.0)));
        let (i, w) = locate(&axis, 10f64.sqrt(), true).unwrap();
        assert_eq!(i, 0);
        assert!((w - 0.5).abs() < 1e-12);
        assert_eq!(locate(&axis, 0.5, false), None);
        assert_eq!(locate(&axis, 101.0, false), None);
    }

    #[test]
    fn test_locate_clamped() {
        let axis = [0.0, 1.0, 2.0];
        assert_eq!(locate_clamped(&axis, -5.0, false), (0, 0.0));
        assert_eq!(locate_clamped(&axis, 7.0, false), (1, 1.0));
    }
}
