//! # 微分截面表
//!
//! 能量 (N) × 因变量 q (M) 的截面表，截面按行优先存储 (N×M)。
//! 插值在能量上为对数线性、在 q 上为线性；网格闭区间以外为零。
//!
//! ## 依赖关系
//! - 被 `tables/plot.rs`, `commands/dcs.rs` 使用
//! - 使用 `tables/axis.rs`, `tables/gnuplot.rs`, `dataframe/`, `units/`

use super::axis::{bilinear, check_axis, check_positive, locate, same_axis};
use super::gnuplot;
use crate::dataframe::DataFrame;
use crate::error::{CslibError, Result};
use crate::units::{units, BaseDimension, Dimensionality, Quantity, QuantityArray, Unit};

use std::ops::Mul;
use std::path::Path;

/// 微分截面表
#[derive(Debug, Clone, PartialEq)]
pub struct Dcs {
    energy: QuantityArray,
    q: QuantityArray,
    cs: QuantityArray,
}

fn energy_dimensionality() -> Dimensionality {
    let length = Dimensionality::base(BaseDimension::Length);
    let mass = Dimensionality::base(BaseDimension::Mass);
    let time = Dimensionality::base(BaseDimension::Time);
    mass * length.powi(2) / time.powi(2)
}

fn axes_mismatch() -> CslibError {
    CslibError::InvalidTable("to add DCS, axes should match".to_string())
}

impl Dcs {
    /// 创建并校验截面表
    pub fn new(energy: QuantityArray, q: QuantityArray, cs: QuantityArray) -> Result<Self> {
        if energy.dimensionality() != energy_dimensionality() {
            return Err(CslibError::InvalidTable(format!(
                "energy axis has dimensionality {}",
                energy.dimensionality()
            )));
        }
        check_axis("energy", energy.values())?;
        check_positive("energy", energy.values())?;
        check_axis("q", q.values())?;

        let area = Dimensionality::base(BaseDimension::Length).powi(2);
        let expected = area / q.dimensionality();
        if cs.dimensionality() != expected {
            return Err(CslibError::InvalidTable(format!(
                "cross-section has dimensionality {}, expected {}",
                cs.dimensionality(),
                expected
            )));
        }
        if cs.len() != energy.len() * q.len() {
            return Err(CslibError::ShapeMismatch {
                expected: energy.len() * q.len(),
                actual: cs.len(),
            });
        }
        Ok(Self { energy, q, cs })
    }

    /// 由函数 `f(E, q)` 生成；截面单位取第一个结果的单位
    pub fn from_fn<F>(energy: QuantityArray, q: QuantityArray, f: F) -> Result<Self>
    where
        F: Fn(&Quantity, &Quantity) -> Quantity,
    {
        let mut values = Vec::with_capacity(energy.len() * q.len());
        let mut cs_units: Option<Unit> = None;
        for e in energy.iter() {
            for x in q.iter() {
                let v = f(&e, &x);
                let target = cs_units.get_or_insert_with(|| v.units().clone());
                values.push(v.value_in(target)?);
            }
        }
        let cs_units = cs_units.unwrap_or_else(Unit::dimensionless);
        Self::new(energy, q, QuantityArray::new(values, cs_units))
    }

    pub fn energy(&self) -> &QuantityArray {
        &self.energy
    }

    pub fn q(&self) -> &QuantityArray {
        &self.q
    }

    pub fn cs(&self) -> &QuantityArray {
        &self.cs
    }

    /// `(N, M)`
    pub fn shape(&self) -> (usize, usize) {
        (self.energy.len(), self.q.len())
    }

    /// 网格值 `cs[i][j]`（截面单位）
    pub fn cs_at(&self, i: usize, j: usize) -> f64 {
        self.cs.values()[i * self.q.len() + j]
    }

    /// q 为角度时返回 q
    pub fn angle(&self) -> Result<&QuantityArray> {
        if self.q.dimensionality().is_dimensionless() {
            Ok(&self.q)
        } else {
            Err(CslibError::InvalidTable(format!(
                "dependent quantity has dimensionality {}, not an angle",
                self.q.dimensionality()
            )))
        }
    }

    /// 截面乘以常数
    pub fn scale(&self, factor: f64) -> Dcs {
        Dcs {
            energy: self.energy.clone(),
            q: self.q.clone(),
            cs: self.cs.scale(factor),
        }
    }

    /// 相加；坐标轴换算到同一单位后必须一致
    pub fn try_add(&self, other: &Dcs) -> Result<Dcs> {
        let energy = other
            .energy
            .values_in(self.energy.units())
            .map_err(|_| axes_mismatch())?;
        let q = other.q.values_in(self.q.units()).map_err(|_| axes_mismatch())?;
        if !same_axis(&energy, self.energy.values()) || !same_axis(&q, self.q.values()) {
            return Err(axes_mismatch());
        }
        let cs = other.cs.values_in(self.cs.units())?;
        let sum = self.cs.values().iter().zip(&cs).map(|(a, b)| a + b).collect();
        Ok(Dcs {
            energy: self.energy.clone(),
            q: self.q.clone(),
            cs: QuantityArray::new(sum, self.cs.units().clone()),
        })
    }

    fn interpolate_raw(&self, e: f64, q: f64) -> f64 {
        let m = self.q.len();
        let cs = self.cs.values();
        let ei = locate(self.energy.values(), e, true);
        let qi = locate(self.q.values(), q, false);
        match (ei, qi) {
            (Some(ei), Some(qi)) => bilinear(ei, qi, |i, j| cs[i * m + j]),
            _ => 0.0,
        }
    }

    /// 在 `(E, q)` 处插值
    pub fn interpolate(&self, energy: &Quantity, q: &Quantity) -> Result<Quantity> {
        let e = energy.value_in(self.energy.units())?;
        let x = q.value_in(self.q.units())?;
        Ok(Quantity::new(self.interpolate_raw(e, x), self.cs.units().clone()))
    }

    /// 在网格上插值，结果行优先 (能量 × q)
    pub fn interpolate_grid(
        &self,
        energies: &QuantityArray,
        qs: &QuantityArray,
    ) -> Result<QuantityArray> {
        let es = energies.values_in(self.energy.units())?;
        let xs = qs.values_in(self.q.units())?;
        let values = es
            .iter()
            .flat_map(|e| xs.iter().map(move |x| (*e, *x)))
            .map(|(e, x)| self.interpolate_raw(e, x))
            .collect();
        Ok(QuantityArray::new(values, self.cs.units().clone()))
    }

    /// 写出 gnuplot 二进制矩阵：能量为 eV，截面为 cm²/q 单位
    pub fn save_gnuplot(&self, path: &Path) -> Result<()> {
        let ev = units().parse_units("eV")?;
        let cm2 = units().parse_units("cm²")?;
        let cs_units = &cm2 / self.q.units();
        let energy = self.energy.values_in(&ev)?;
        let cs = self.cs.values_in(&cs_units)?;
        let m = self.q.len();
        gnuplot::write_matrix(path, &energy, self.q.values(), |i, j| cs[i * m + j])
    }

    /// 由长格式数据表构建（每行一个 `(E, q, cs)`）
    pub fn from_dataframe(
        df: &DataFrame,
        energy_col: &str,
        q_col: &str,
        cs_col: &str,
    ) -> Result<Self> {
        let energy = df.column(energy_col)?;
        let q = df.column(q_col)?;
        let cs = df.column(cs_col)?;

        let e_axis = unique_sorted(energy.values());
        let q_axis = unique_sorted(q.values());
        let (n, m) = (e_axis.len(), q_axis.len());

        let mut grid: Vec<Option<f64>> = vec![None; n * m];
        for ((e, x), v) in energy.values().iter().zip(q.values()).zip(cs.values()) {
            let i = position(&e_axis, *e);
            let j = position(&q_axis, *x);
            let slot = &mut grid[i * m + j];
            if slot.is_some() {
                return Err(CslibError::InvalidTable(format!(
                    "duplicate entry for {} = {}, {} = {}",
                    energy_col, e, q_col, x
                )));
            }
            *slot = Some(*v);
        }

        let values = grid
            .into_iter()
            .enumerate()
            .map(|(k, v)| {
                v.ok_or_else(|| {
                    CslibError::InvalidTable(format!(
                        "missing entry for {} = {}, {} = {}",
                        energy_col,
                        e_axis[k / m],
                        q_col,
                        q_axis[k % m]
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            QuantityArray::new(e_axis, energy.units().clone()),
            QuantityArray::new(q_axis, q.units().clone()),
            QuantityArray::new(values, cs.units().clone()),
        )
    }

    /// 转换为长格式数据表，列为 `energy`, `q`, `cs`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let (n, m) = self.shape();
        let mut energy = Vec::with_capacity(n * m);
        let mut q = Vec::with_capacity(n * m);
        for e in self.energy.values() {
            for x in self.q.values() {
                energy.push(*e);
                q.push(*x);
            }
        }
        DataFrame::new(
            vec!["energy".to_string(), "q".to_string(), "cs".to_string()],
            vec![
                self.energy.units().clone(),
                self.q.units().clone(),
                self.cs.units().clone(),
            ],
            vec![energy, q, self.cs.values().to_vec()],
        )
    }
}

fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

fn position(axis: &[f64], v: f64) -> usize {
    axis.partition_point(|a| a.total_cmp(&v).is_lt())
}

impl Mul<Dcs> for f64 {
    type Output = Dcs;

    fn mul(self, rhs: Dcs) -> Dcs {
        rhs.scale(self)
    }
}

impl Mul<f64> for Dcs {
    type Output = Dcs;

    fn mul(self, rhs: f64) -> Dcs {
        self.scale(rhs)
    }
}
