use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use ndarray::{Array2, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::error::LoadError;

/// `count` points of `dims` components, each drawn uniformly from `[low, high)`.
/// `high - low` must be positive and finite.
pub fn generate_points<R: Rng + ?Sized>(
    count: usize,
    dims: usize,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Array2<f64>, LoadError> {
    let width = high - low;
    if !(width.is_finite() && width > 0.0) {
        return Err(LoadError::InvalidRange { low, high });
    }
    Ok(Array2::random_using((count, dims), Uniform::new(low, high), rng))
}

/// Reads whitespace separated floats, one point per line. Blank lines are skipped.
pub fn load_points(path: &Path) -> Result<Array2<f64>, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|value| value.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LoadError::Parse {
                line: idx + 1,
                source,
            })?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(LoadError::Ragged {
                    line: idx + 1,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    let dims = rows.first().map_or(0, |row| row.len());
    log::info!(
        "Loaded {} points of dimension {} from {}",
        rows.len(),
        dims,
        path.display()
    );
    Ok(Array2::from_shape_fn((rows.len(), dims), |(i, j)| rows[i][j]))
}

/// One line per point: its components followed by its cluster label.
pub fn save_labeled_points(
    path: &Path,
    data: ArrayView2<f64>,
    labels: &[usize],
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (point, label) in data.rows().into_iter().zip(labels) {
        writeln!(out, "{} {}", point.iter().join(" "), label)?;
    }
    out.flush()
}

pub fn save_centroids(path: &Path, centroids: ArrayView2<f64>) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for centroid in centroids.rows() {
        writeln!(out, "{}", centroid.iter().join(" "))?;
    }
    out.flush()
}

pub fn save_labels(path: &Path, labels: &[usize]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for label in labels {
        writeln!(out, "{}", label)?;
    }
    out.flush()
}
