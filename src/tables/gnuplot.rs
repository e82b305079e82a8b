//! # gnuplot 二进制矩阵
//!
//! `(N+1)×(M+1)` 矩阵 `[[N, x…], [y_i, z_i…]]`，以 float32 小端序
//! 按列写出（即写出转置矩阵）。
//!
//! ## 依赖关系
//! - 被 `tables/dcs.rs`, `tables/grid.rs` 使用

use crate::error::{CslibError, Result};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 读回的矩阵
#[derive(Debug, Clone, PartialEq)]
pub struct GnuplotMatrix {
    /// 行坐标（长度 N）
    pub rows: Vec<f32>,
    /// 列坐标（长度 M）
    pub columns: Vec<f32>,
    /// 行优先的 N×M 数据
    pub body: Vec<f32>,
}

/// 写出矩阵；`body(i, j)` 为第 i 行第 j 列
pub fn write_matrix<F>(path: &Path, rows: &[f64], columns: &[f64], body: F) -> Result<()>
where
    F: Fn(usize, usize) -> f64,
{
    let write_err = |e: std::io::Error| CslibError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    let (n, m) = (rows.len(), columns.len());
    let mut out = BufWriter::new(File::create(path).map_err(write_err)?);

    for col in 0..=m {
        for row in 0..=n {
            let v = match (row, col) {
                (0, 0) => n as f64,
                (0, j) => columns[j - 1],
                (i, 0) => rows[i - 1],
                (i, j) => body(i - 1, j - 1),
            };
            out.write_all(&(v as f32).to_le_bytes()).map_err(write_err)?;
        }
    }
    out.flush().map_err(write_err)?;

    tracing::debug!("Wrote {}x{} gnuplot matrix to {}", n + 1, m + 1, path.display());
    Ok(())
}

/// 读回矩阵
pub fn read_matrix(path: &Path) -> Result<GnuplotMatrix> {
    let bytes = fs::read(path).map_err(|e| CslibError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if bytes.len() % 4 != 0 || bytes.is_empty() {
        return Err(CslibError::InvalidTable(format!(
            "{} is not a float32 matrix",
            path.display()
        )));
    }
    let data: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    // 表头必须是小于数据长度的正整数
    let header = data[0];
    if !header.is_finite()
        || header < 1.0
        || header.fract() != 0.0
        || header as usize >= data.len()
    {
        return Err(CslibError::InvalidTable(format!(
            "{} has an invalid matrix header {}",
            path.display(),
            header
        )));
    }
    let n = header as usize;
    if data.len() % (n + 1) != 0 {
        return Err(CslibError::InvalidTable(format!(
            "{} has an inconsistent matrix size",
            path.display()
        )));
    }
    let m = data.len() / (n + 1) - 1;
    // 按列存储：元素 (row, col) 位于 col * (n + 1) + row
    let at = |row: usize, col: usize| data[col * (n + 1) + row];

    Ok(GnuplotMatrix {
        rows: (1..=n).map(|i| at(i, 0)).collect(),
        columns: (1..=m).map(|j| at(0, j)).collect(),
        body: (1..=n)
            .flat_map(|i| (1..=m).map(move |j| (i, j)))
            .map(|(i, j)| at(i, j))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_malformed_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.bin");
        for header in [1e30_f32, f32::NAN, -2.0, 0.0, 1.5, 4.0] {
            let bytes: Vec<u8> = [header, 1.0, 2.0, 3.0]
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect();
            fs::write(&path, bytes).unwrap();
            assert!(
                matches!(read_matrix(&path), Err(CslibError::InvalidTable(_))),
                "header {}",
                header
            );
        }
    }

    #[test]
    fn test_layout_is_column_major() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.bin");
        write_matrix(&path, &[10.0, 20.0], &[1.0, 2.0, 3.0], |i, j| (i * 3 + j) as f64).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 3 * 4 * 4);
        let first: Vec<f32> = bytes
            .chunks_exact(4)
            .take(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        // 第一列：N, y_0, y_1；然后是第二列的 x_0
        assert_eq!(first, vec![2.0, 10.0, 20.0, 1.0]);

        let m = read_matrix(&path).unwrap();
        assert_eq!(m.rows, vec![10.0, 20.0]);
        assert_eq!(m.columns, vec![1.0, 2.0, 3.0]);
        assert_eq!(m.body, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
