//! Per-worker result files and their reassembly.
//!
//! Worker `k` writes `{prefix}{k}.dat`: a single line holding its owned
//! values in increasing global-index order, each printed with six decimals
//! and followed by a space.
//!
//! ```text
//! -0.012345 -0.023456 -0.031234 \n
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::OdeError;

/// `{prefix}{rank}.dat`
pub fn output_path(prefix: &str, rank: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}{rank}.dat"))
}

/// One output line for `values`, newline included.
pub fn format_values(values: &[f64]) -> String {
    let mut line = String::with_capacity(values.len() * 10 + 1);
    for v in values {
        line.push_str(&format!("{v:.6} "));
    }
    line.push('\n');
    line
}

/// Output file of one worker, opened before the solve starts so that a bad
/// prefix fails the run before any iteration is spent.
pub struct ResultWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ResultWriter {
    pub fn create(prefix: &str, rank: usize) -> Result<Self, OdeError> {
        let path = output_path(prefix, rank);
        let file = File::create(&path).map_err(|e| OdeError::io(&path, e))?;
        Ok(Self { path, out: BufWriter::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the line and flush it to disk.
    pub fn write(mut self, values: &[f64]) -> Result<PathBuf, OdeError> {
        self.out
            .write_all(format_values(values).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| OdeError::io(&self.path, e))?;
        Ok(self.path)
    }
}

/// Parse a worker file back into its values.
pub fn read_worker_values(path: &Path) -> Result<Vec<f64>, OdeError> {
    let file = File::open(path).map_err(|e| OdeError::io(path, e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| OdeError::io(path, e))?;
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|e| {
                OdeError::Config(format!("{}: bad value {tok:?}: {e}", path.display()))
            })
        })
        .collect()
}

/// Concatenate the files of `workers` workers in rank order and pad with the
/// boundary values, returning `(x, u)` over the whole closed interval.
pub fn assemble_curve(prefix: &str, workers: usize) -> Result<Vec<(f64, f64)>, OdeError> {
    let mut values = vec![0.0];
    for rank in 0..workers {
        values.extend(read_worker_values(&output_path(prefix, rank))?);
    }
    values.push(0.0);

    let last = (values.len() - 1) as f64;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(j, u)| (j as f64 / last, u))
        .collect())
}
