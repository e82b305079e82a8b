//! # Romberg 积分
//!
//! 逐次加倍梯形公式并做 Richardson 外推，直到相邻两次外推结果之差
//! 小于绝对或相对容差。
//!
//! ## 依赖关系
//! - 被 `numeric/icdf.rs` 使用

/// Romberg 积分参数
#[derive(Debug, Clone, Copy)]
pub struct RombergOptions {
    /// 绝对容差
    pub tol: f64,
    /// 相对容差
    pub rtol: f64,
    /// 最大加倍次数
    pub divmax: usize,
}

impl Default for RombergOptions {
    fn default() -> Self {
        Self {
            tol: 1.48e-8,
            rtol: 1.48e-8,
            divmax: 10,
        }
    }
}

/// 第 n 级新增的中点之和（n = 1 时为端点平均）
fn trapezoid_increment<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, n: usize) -> f64 {
    if n == 1 {
        return 0.5 * (f(a) + f(b));
    }
    let count = n / 2;
    let h = (b - a) / count as f64;
    let lo = a + 0.5 * h;
    (0..count).map(|i| f(lo + h * i as f64)).sum()
}

/// 在 `[a, b]` 上积分
///
/// 达到 `divmax` 仍未收敛时记录警告并返回最后的估计值。
pub fn romberg<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, options: RombergOptions) -> f64 {
    let range = b - a;
    let mut n = 1;
    let mut ordsum = trapezoid_increment(&f, a, b, n);
    let mut last_row = vec![range * ordsum];
    let mut result = last_row[0];

    for i in 1..=options.divmax {
        n *= 2;
        ordsum += trapezoid_increment(&f, a, b, n);
        let mut row = Vec::with_capacity(i + 1);
        row.push(range * ordsum / n as f64);
        for k in 0..i {
            let p = 4f64.powi(k as i32 + 1);
            row.push((p * row[k] - last_row[k]) / (p - 1.0));
        }
        result = row[i];
        let err = (result - last_row[i - 1]).abs();
        if err < options.tol || err < options.rtol * result.abs() {
            return result;
        }
        last_row = row;
    }

    tracing::warn!(
        "Romberg integration on [{}, {}] did not reach tolerance after {} divisions",
        a,
        b,
        options.divmax
    );
    result
}
