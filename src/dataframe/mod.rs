//! # 带单位的数据表
//!
//! 按列存储的数据表，每列带一个单位。支持按列名或下标取列、按行取值、
//! 行列切片，以及 CSV 读写。
//!
//! ## CSV 格式
//! ```text
//! # 注释行（表头之前）
//! energy (eV),angle (rad),dcs (cm ** 2 / rad)
//! 100,0.1,1.5e-17
//! ```
//!
//! ## 依赖关系
//! - 被 `tables/dcs.rs`, `commands/table.rs`, `commands/dcs.rs` 使用
//! - 使用 `units/`, `csv`, `regex`

use crate::error::{CslibError, Result};
use crate::units::{units, Quantity, QuantityArray, Unit};

use regex::Regex;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

/// 表头 `name (unit)`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>.*?)\s*(?:\((?P<unit>.*)\))?\s*$").expect("valid header regex")
});

/// 带单位的数据表
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    names: Vec<String>,
    units: Vec<Unit>,
    columns: Vec<Vec<f64>>,
    comments: Vec<String>,
}

impl DataFrame {
    /// 创建数据表，列数与列长度必须一致
    pub fn new(names: Vec<String>, units: Vec<Unit>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if units.len() != names.len() {
            return Err(CslibError::ShapeMismatch {
                expected: names.len(),
                actual: units.len(),
            });
        }
        if columns.len() != names.len() {
            return Err(CslibError::ShapeMismatch {
                expected: names.len(),
                actual: columns.len(),
            });
        }
        let rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(CslibError::ShapeMismatch {
                expected: rows,
                actual: bad.len(),
            });
        }
        Ok(Self {
            names,
            units,
            columns,
            comments: Vec::new(),
        })
    }

    /// 单位用字符串给出，经共享注册表解析
    pub fn from_strs(
        names: &[&str],
        unit_exprs: &[&str],
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let parsed = unit_exprs
            .iter()
            .map(|u| units().parse_units(u))
            .collect::<Result<Vec<_>>>()?;
        Self::new(names.iter().map(|s| s.to_string()).collect(), parsed, columns)
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| CslibError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<QuantityArray> {
        self.column_at(self.column_index(name)?)
    }

    pub fn column_at(&self, idx: usize) -> Result<QuantityArray> {
        let values = self
            .columns
            .get(idx)
            .ok_or_else(|| CslibError::ColumnNotFound(format!("#{}", idx)))?;
        Ok(QuantityArray::new(values.clone(), self.units[idx].clone()))
    }

    /// 单个值
    pub fn value(&self, row: usize, col: usize) -> Result<Quantity> {
        let v = self
            .columns
            .get(col)
            .ok_or_else(|| CslibError::ColumnNotFound(format!("#{}", col)))?
            .get(row)
            .ok_or_else(|| {
                CslibError::InvalidArgument(format!("row {} out of range ({} rows)", row, self.len()))
            })?;
        Ok(Quantity::new(*v, self.units[col].clone()))
    }

    /// 一整行
    pub fn row(&self, row: usize) -> Result<Vec<Quantity>> {
        (0..self.width()).map(|col| self.value(row, col)).collect()
    }

    /// 行列切片
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Result<DataFrame> {
        if rows.end > self.len() || rows.start > rows.end {
            return Err(CslibError::InvalidArgument(format!(
                "row range {:?} out of bounds ({} rows)",
                rows,
                self.len()
            )));
        }
        if cols.end > self.width() || cols.start > cols.end {
            return Err(CslibError::InvalidArgument(format!(
                "column range {:?} out of bounds ({} columns)",
                cols,
                self.width()
            )));
        }
        let columns = self.columns[cols.clone()]
            .iter()
            .map(|c| c[rows.clone()].to_vec())
            .collect();
        DataFrame::new(
            self.names[cols.clone()].to_vec(),
            self.units[cols].to_vec(),
            columns,
        )
    }

    /// 读取 CSV 文件
    pub fn read_csv(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CslibError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let df = Self::from_csv_str(&text)?;
        tracing::debug!(
            "Read {} rows x {} columns from {}",
            df.len(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// 从 CSV 文本解析
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut comments = Vec::new();
        let mut body_start = 0;
        for line in text.split_inclusive('\n') {
            match line.trim_start().strip_prefix('#') {
                Some(comment) => comments.push(comment.trim().to_string()),
                None if line.trim().is_empty() => {}
                None => break,
            }
            body_start += line.len();
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text[body_start..].as_bytes());

        let mut names = Vec::new();
        let mut column_units = Vec::new();
        for header in reader.headers()?.iter() {
            let (name, unit) = parse_header(header)?;
            names.push(name);
            column_units.push(unit);
        }

        let mut columns = vec![Vec::new(); names.len()];
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                let v = field.parse::<f64>().map_err(|_| {
                    CslibError::InvalidTable(format!(
                        "invalid number '{}' in row {}, column {}",
                        field,
                        line + 1,
                        col + 1
                    ))
                })?;
                columns[col].push(v);
            }
        }

        Ok(Self::new(names, column_units, columns)?.with_comments(comments))
    }

    /// 写出 CSV 文件
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let write_err = |e: std::io::Error| CslibError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        };

        let mut file = File::create(path).map_err(write_err)?;
        for comment in &self.comments {
            writeln!(file, "# {}", comment).map_err(write_err)?;
        }

        let mut wtr = csv::Writer::from_writer(file);
        let headers: Vec<String> = self
            .names
            .iter()
            .zip(&self.units)
            .map(|(n, u)| format!("{} ({})", n, u.abbreviated()))
            .collect();
        wtr.write_record(&headers)?;
        for row in 0..self.len() {
            wtr.write_record(self.columns.iter().map(|c| c[row].to_string()))?;
        }
        wtr.flush().map_err(write_err)?;

        tracing::debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

fn parse_header(header: &str) -> Result<(String, Unit)> {
    let caps = HEADER
        .captures(header)
        .ok_or_else(|| CslibError::InvalidTable(format!("invalid column header '{}'", header)))?;
    let name = caps.name("name").map_or("", |m| m.as_str()).to_string();
    let unit = match caps.name("unit") {
        Some(m) => units().parse_units(m.as_str())?,
        None => Unit::dimensionless(),
    };
    Ok((name, unit))
}

/// C 风格的 `%.4e`，例如 `1.2346e+03`
pub fn format_sci(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.4e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self
            .names
            .iter()
            .zip(&self.units)
            .map(|(n, u)| format!("{} ({})", n, u.abbreviated()))
            .collect();
        writeln!(f, "# {}", header.join(", "))?;
        for row in 0..self.len() {
            let cells: Vec<String> = self.columns.iter().map(|c| format_sci(c[row])).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
