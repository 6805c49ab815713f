//! Point tables on disk: CSV (default) or Parquet, chosen by file extension.
//!
//! Tables carry `x`, `y`, `z` columns; other columns are ignored on read.

use anyhow::{bail, Context, Result};
use gamut::Point3;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("parquet"))
}

fn scan(path: &Path) -> Result<LazyFrame> {
    if is_parquet(path) {
        Ok(LazyFrame::scan_parquet(path, ScanArgsParquet::default())?)
    } else {
        Ok(LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .finish()?)
    }
}

/// Read the `x,y,z` columns of a table as points, in row order.
pub fn read_points(path: &Path) -> Result<Vec<Point3>> {
    let df = scan(path)?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let column = |name: &str| -> Result<Vec<f64>> {
        let s = df
            .column(name)
            .with_context(|| format!("{}: missing column {name:?}", path.display()))?
            .cast(&DataType::Float64)?;
        s.f64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.with_context(|| format!("{}: null {name} in row {row}", path.display()))
            })
            .collect()
    };
    let (xs, ys, zs) = (column("x")?, column("y")?, column("z")?);
    tracing::debug!(path = %path.display(), rows = xs.len(), "points read");
    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(zs)
        .map(|((x, y), z)| Point3::new(x, y, z))
        .collect())
}

fn points_frame(points: &[Point3]) -> Result<DataFrame> {
    let axis = |k: usize| -> Vec<f64> { points.iter().map(|p| p[k]).collect() };
    Ok(DataFrame::new(vec![
        Series::new("x".into(), axis(0)),
        Series::new("y".into(), axis(1)),
        Series::new("z".into(), axis(2)),
    ])?)
}

fn write_frame(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if is_parquet(path) {
        ParquetWriter::new(file).finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }
    tracing::debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}

pub fn write_points(path: &Path, points: &[Point3]) -> Result<()> {
    let mut df = points_frame(points)?;
    write_frame(path, &mut df)
}

/// Points with an extra boolean `inside` column.
pub fn write_mask(path: &Path, points: &[Point3], inside: &[bool]) -> Result<()> {
    if points.len() != inside.len() {
        bail!("{} points but {} mask values", points.len(), inside.len());
    }
    let mut df = points_frame(points)?;
    df.with_column(Series::new("inside".into(), inside.to_vec()))?;
    write_frame(path, &mut df)
}

/// The `inside` column of a table written by [`write_mask`].
#[cfg(test)]
pub fn read_mask(path: &Path) -> Result<Vec<bool>> {
    let df = scan(path)?.collect()?;
    df.column("inside")?
        .bool()?
        .into_iter()
        .map(|v| v.context("null mask value"))
        .collect()
}
