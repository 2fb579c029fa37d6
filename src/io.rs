//! Loads `matrix.in`/`vector.in` and writes `result.out`, all read/written
//! only at the root. The input files are whitespace-separated decimal
//! doubles — the reader tokenizes across the whole stream rather than
//! assuming one value per line, matching the original C loader's use of
//! `fscanf("%lf", ...)` in a loop.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Reads `n * n` whitespace-separated doubles in row-major order from `path`.
pub fn read_matrix(path: impl AsRef<Path>, n: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let values = read_doubles(path)?;
    let expected = n * n;
    if values.len() != expected {
        bail!(
            "{}: expected {expected} values ({n}x{n}), found {}",
            path.display(),
            values.len()
        );
    }
    Ok(values)
}

/// Reads `n` whitespace-separated doubles from `path`.
pub fn read_vector(path: impl AsRef<Path>, n: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let values = read_doubles(path)?;
    if values.len() != n {
        bail!("{}: expected {n} values, found {}", path.display(), values.len());
    }
    Ok(values)
}

fn read_doubles(path: &Path) -> Result<Vec<f64>> {
    let mut text = String::new();
    File::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .read_to_string(&mut text)
        .with_context(|| format!("read {}", path.display()))?;

    text.split_ascii_whitespace()
        .map(|tok| tok.parse::<f64>().with_context(|| format!("{}: invalid number {tok:?}", path.display())))
        .collect()
}

/// Writes `x` to `path`, one value per line, each with exactly six fractional digits.
pub fn write_result(path: impl AsRef<Path>, x: &[f64]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for v in x {
        writeln!(w, "{v:.6}").with_context(|| format!("write {}", path.display()))?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
