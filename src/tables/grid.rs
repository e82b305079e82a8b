//! # 通用二维表
//!
//! x 轴 (M) × y 轴 (N) 上的值 z (N×M，行优先)。x 与 y 可分别取对数坐标，
//! 双线性插值在（对数）坐标中进行，定义域以外夹到最近的边界。
//!
//! ## 依赖关系
//! - 使用 `tables/axis.rs`, `tables/gnuplot.rs`, `units/`

use super::axis::{bilinear, check_axis, check_positive, locate_clamped, same_axis};
use super::gnuplot;
use crate::error::{CslibError, Result};
use crate::units::{Quantity, QuantityArray, Unit};

use std::path::Path;

/// 对数坐标标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogScale {
    pub x: bool,
    pub y: bool,
}

impl LogScale {
    pub const NONE: LogScale = LogScale { x: false, y: false };

    /// 由 `"x"`, `"y"`, `"xy"` 这类标志解析
    pub fn from_flags(flags: &str) -> Self {
        LogScale {
            x: flags.contains('x'),
            y: flags.contains('y'),
        }
    }
}

impl Default for LogScale {
    /// 默认仅 y 轴取对数
    fn default() -> Self {
        LogScale { x: false, y: true }
    }
}

/// 目标单位，`None` 表示保持原单位
#[derive(Debug, Clone, Default)]
pub struct GridUnits {
    pub x: Option<Unit>,
    pub y: Option<Unit>,
    pub z: Option<Unit>,
}

/// 通用二维表
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable {
    x: QuantityArray,
    y: QuantityArray,
    z: QuantityArray,
    log: LogScale,
}

fn convert(values: QuantityArray, target: Option<&Unit>) -> Result<QuantityArray> {
    match target {
        Some(u) => values.to(u),
        None => Ok(values),
    }
}

impl GridTable {
    pub fn new(x: QuantityArray, y: QuantityArray, z: QuantityArray, log: LogScale) -> Result<Self> {
        Self::with_units(x, y, z, log, &GridUnits::default())
    }

    /// 创建并换算到目标单位
    pub fn with_units(
        x: QuantityArray,
        y: QuantityArray,
        z: QuantityArray,
        log: LogScale,
        target: &GridUnits,
    ) -> Result<Self> {
        let x = convert(x, target.x.as_ref())?;
        let y = convert(y, target.y.as_ref())?;
        let z = convert(z, target.z.as_ref())?;

        check_axis("x", x.values())?;
        check_axis("y", y.values())?;
        if log.x {
            check_positive("x", x.values())?;
        }
        if log.y {
            check_positive("y", y.values())?;
        }
        if z.len() != x.len() * y.len() {
            return Err(CslibError::ShapeMismatch {
                expected: x.len() * y.len(),
                actual: z.len(),
            });
        }
        Ok(Self { x, y, z, log })
    }

    pub fn x(&self) -> &QuantityArray {
        &self.x
    }

    pub fn y(&self) -> &QuantityArray {
        &self.y
    }

    pub fn z(&self) -> &QuantityArray {
        &self.z
    }

    pub fn log(&self) -> LogScale {
        self.log
    }

    /// 以原始数值求值（x、y 为表中单位）
    pub fn eval_raw(&self, x: f64, y: f64) -> f64 {
        let m = self.x.len();
        let z = self.z.values();
        let xi = locate_clamped(self.x.values(), x, self.log.x);
        let yi = locate_clamped(self.y.values(), y, self.log.y);
        bilinear(yi, xi, |i, j| z[i * m + j])
    }

    pub fn eval(&self, x: &Quantity, y: &Quantity) -> Result<Quantity> {
        let xv = x.value_in(self.x.units())?;
        let yv = y.value_in(self.y.units())?;
        Ok(Quantity::new(self.eval_raw(xv, yv), self.z.units().clone()))
    }

    pub fn scale(&self, factor: f64) -> GridTable {
        GridTable {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.scale(factor),
            log: self.log,
        }
    }

    /// 相加；两表的坐标轴必须完全一致
    pub fn try_add(&self, other: &GridTable) -> Result<GridTable> {
        let mismatch = || CslibError::InvalidTable("to add tables, axes should match".to_string());
        let ox = other.x.values_in(self.x.units()).map_err(|_| mismatch())?;
        let oy = other.y.values_in(self.y.units()).map_err(|_| mismatch())?;
        if !same_axis(&ox, self.x.values()) || !same_axis(&oy, self.y.values()) {
            return Err(mismatch());
        }
        let oz = other.z.values_in(self.z.units())?;
        let z = self.z.values().iter().zip(&oz).map(|(a, b)| a + b).collect();
        Ok(GridTable {
            x: self.x.clone(),
            y: self.y.clone(),
            z: QuantityArray::new(z, self.z.units().clone()),
            log: self.log,
        })
    }

    /// 写出 gnuplot 二进制矩阵（原始数值）
    pub fn save_gnuplot(&self, path: &Path) -> Result<()> {
        let m = self.x.len();
        let z = self.z.values();
        gnuplot::write_matrix(path, self.y.values(), self.x.values(), |i, j| z[i * m + j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::gnuplot::read_matrix;
    use crate::units::units;
    use tempfile::TempDir;

    fn unit(expr: &str) -> Unit {
        units().parse_units(expr).unwrap()
    }

    /// z = x + y，y 为对数轴
    fn table() -> GridTable {
        let x = QuantityArray::new(vec![0.0, 1.0, 2.0], unit("rad"));
        let y = QuantityArray::new(vec![1.0, 100.0], unit("eV"));
        let z = QuantityArray::new(vec![1.0, 2.0, 3.0, 100.0, 101.0, 102.0], unit("nm²"));
        GridTable::new(x, y, z, LogScale::default()).unwrap()
    }

    #[test]
    fn test_log_flags() {
        assert_eq!(LogScale::from_flags("xy"), LogScale { x: true, y: true });
        assert_eq!(LogScale::from_flags(""), LogScale::NONE);
        assert_eq!(LogScale::default(), LogScale::from_flags("y"));
    }

    #[test]
    fn test_eval() {
        let t = table();
        assert!((t.eval_raw(1.0, 1.0) - 2.0).abs() < 1e-12);
        // y = 10 位于对数轴中点
        assert!((t.eval_raw(0.0, 10.0) - 50.5).abs() < 1e-9);
        let q = t
            .eval(&units().quantity(0.5, "rad").unwrap(), &units().quantity(0.1, "keV").unwrap())
            .unwrap();
        assert!((q.magnitude() - 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_outside_domain() {
        let t = table();
        assert!((t.eval_raw(-3.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((t.eval_raw(5.0, 1000.0) - 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_units() {
        let x = QuantityArray::new(vec![1.0, 2.0], unit("nm"));
        let y = QuantityArray::new(vec![1.0, 2.0], unit("keV"));
        let z = QuantityArray::new(vec![1.0; 4], unit("m"));
        let target = GridUnits {
            x: Some(unit("angstrom")),
            y: Some(unit("eV")),
            z: None,
        };
        let t = GridTable::with_units(x, y, z, LogScale::NONE, &target).unwrap();
        assert!((t.x().values()[1] - 20.0).abs() < 1e-9);
        assert!((t.y().values()[0] - 1000.0).abs() < 1e-9);

        let bad = GridUnits {
            x: Some(unit("s")),
            ..GridUnits::default()
        };
        let x = QuantityArray::new(vec![1.0, 2.0], unit("nm"));
        let y = QuantityArray::new(vec![1.0, 2.0], unit("eV"));
        let z = QuantityArray::new(vec![1.0; 4], unit("m"));
        assert!(GridTable::with_units(x, y, z, LogScale::NONE, &bad).is_err());
    }

    #[test]
    fn test_validation() {
        let x = QuantityArray::new(vec![0.0, 1.0], unit("m"));
        let y = QuantityArray::new(vec![0.0, 1.0], unit("m"));
        let z = QuantityArray::new(vec![1.0; 4], unit("m"));
        // y 为对数轴时不能含 0
        assert!(GridTable::new(x.clone(), y.clone(), z.clone(), LogScale::default()).is_err());
        assert!(GridTable::new(x.clone(), y.clone(), z, LogScale::NONE).is_ok());
        let short = QuantityArray::new(vec![1.0; 3], unit("m"));
        assert!(GridTable::new(x, y, short, LogScale::NONE).is_err());
    }

    #[test]
    fn test_scale_add_and_export() {
        let t = table();
        let sum = t.try_add(&t.scale(2.0)).unwrap();
        assert_eq!(sum.z().values()[4], 303.0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.bin");
        t.save_gnuplot(&path).unwrap();
        let m = read_matrix(&path).unwrap();
        assert_eq!(m.rows, vec![1.0, 100.0]);
        assert_eq!(m.columns, vec![0.0, 1.0, 2.0]);
        assert_eq!(m.body[3], 100.0);
    }
}
