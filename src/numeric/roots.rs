//! # Brent 求根
//!
//! 在变号区间上结合二分、割线与反二次插值求根。
//!
//! ## 依赖关系
//! - 被 `numeric/icdf.rs` 使用
//! - 使用 `error.rs`

use crate::error::{CslibError, Result};

/// Brent 求根参数
#[derive(Debug, Clone, Copy)]
pub struct BrentOptions {
    pub xtol: f64,
    pub rtol: f64,
    pub maxiter: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            maxiter: 100,
        }
    }
}

/// 求 `f` 在 `[a, b]` 上的根，要求 `f(a)` 与 `f(b)` 异号
pub fn brentq<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, options: BrentOptions) -> Result<f64> {
    let (mut xpre, mut xcur) = (a, b);
    let (mut fpre, mut fcur) = (f(xpre), f(xcur));

    if fpre * fcur > 0.0 {
        return Err(CslibError::NoSignChange {
            a,
            b,
            fa: fpre,
            fb: fcur,
        });
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    for _ in 0..options.maxiter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // 割线
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // 反二次插值
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(CslibError::NotConverged {
        method: "brentq".to_string(),
        iterations: options.maxiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_two() {
        let root = brentq(|x| x * x - 2.0, 0.0, 2.0, BrentOptions::default()).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-11);
    }

    #[test]
    fn test_cosine_root() {
        let root = brentq(f64::cos, 0.0, 3.0, BrentOptions::default()).unwrap();
        assert!((root - std::f64::consts::FRAC_PI_2).abs() < 1e-11);
    }

    #[test]
    fn test_endpoint_root() {
        assert_eq!(brentq(|x| x, 0.0, 1.0, BrentOptions::default()).unwrap(), 0.0);
    }

    #[test]
    fn test_no_sign_change() {
        let err = brentq(|x| x * x + 1.0, -1.0, 1.0, BrentOptions::default()).unwrap_err();
        assert!(matches!(err, CslibError::NoSignChange { .. }));
    }
}
