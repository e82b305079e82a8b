//! # 逆累积分布表
//!
//! 对非负分布函数 `f`，求 `y_i` 使得 `∫_a^{y_i} f = x_i ∫_a^b f`，
//! 其中 `x_i = i / (n - 1)`。蒙特卡罗抽样时用于把均匀随机数映射到分布。
//!
//! ## 依赖关系
//! - 使用 `numeric/integrate.rs`, `numeric/roots.rs`

use super::integrate::{romberg, RombergOptions};
use super::roots::{brentq, BrentOptions};
use crate::error::{CslibError, Result};

const INTEGRATION: RombergOptions = RombergOptions {
    tol: 1e-13,
    rtol: 1e-13,
    divmax: 16,
};

const ROOT_FINDING: BrentOptions = BrentOptions {
    xtol: 1e-14,
    rtol: 4.0 * f64::EPSILON,
    maxiter: 200,
};

/// 计算 `n` 个点 `(x_i, y_i)` 的逆累积分布表
pub fn inverse_cdf_table<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    n: usize,
) -> Result<Vec<(f64, f64)>> {
    if n < 2 {
        return Err(CslibError::InvalidArgument(format!(
            "inverse CDF table needs at least two points, got {}",
            n
        )));
    }
    if a.is_nan() || b.is_nan() || a >= b {
        return Err(CslibError::InvalidArgument(format!(
            "invalid interval [{}, {}]",
            a, b
        )));
    }

    let total = romberg(&f, a, b, INTEGRATION);
    if total.is_nan() || total <= 0.0 {
        return Err(CslibError::InvalidArgument(format!(
            "distribution integrates to {} on [{}, {}]",
            total, a, b
        )));
    }

    let mut table = Vec::with_capacity(n);
    for i in 0..n {
        let x = i as f64 / (n - 1) as f64;
        let y = if i == 0 {
            a
        } else if i == n - 1 {
            b
        } else {
            let target = x * total;
            brentq(|y| romberg(&f, a, y, INTEGRATION) - target, a, b, ROOT_FINDING)?
        };
        table.push((x, y));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sine_distribution() {
        let table = inverse_cdf_table(f64::sin, 0.0, PI, 33).unwrap();
        assert_eq!(table.len(), 33);
        let error: f64 = table
            .iter()
            .map(|(x, y)| (y - (1.0 - 2.0 * x).acos()).powi(2))
            .sum();
        assert!(error < 1e-16, "error = {}", error);
    }

    #[test]
    fn test_uniform_distribution() {
        let table = inverse_cdf_table(|_| 1.0, 2.0, 4.0, 5).unwrap();
        for (x, y) in table {
            assert!((y - (2.0 + 2.0 * x)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(inverse_cdf_table(f64::sin, 0.0, PI, 1).is_err());
        assert!(inverse_cdf_table(f64::sin, PI, 0.0, 10).is_err());
        assert!(inverse_cdf_table(|_| 0.0, 0.0, 1.0, 10).is_err());
    }
}
