use super::SimulationState;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Names of the array files within a results directory
pub const RESULT_FILES: [&str; 7] = ["Gamma_s", "Gamma_h", "x_left", "x_right", "X", "t", "lake_vol"];

/// Holds the time series of snapshots exported as parallel arrays
///
/// The surfaces are stored per snapshot (time-major) and written as `NX × NT` tables
/// (one row per column of the mesh, one column per snapshot).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultSeries {
    /// Abscissae of the mesh columns (NX)
    pub xx: Vec<f64>,

    /// Times of the snapshots (NT)
    pub tt: Vec<f64>,

    /// Lower surface at each snapshot (NT × NX)
    pub lower: Vec<Vec<f64>>,

    /// Upper surface at each snapshot (NT × NX)
    pub upper: Vec<Vec<f64>>,

    /// Left grounding line at each snapshot (NT)
    pub x_left: Vec<f64>,

    /// Right grounding line at each snapshot (NT)
    pub x_right: Vec<f64>,

    /// Lake volume at each snapshot (NT)
    pub lake_vol: Vec<f64>,
}

impl ResultSeries {
    /// Allocates a new (empty) instance
    pub fn new(xx: &[f64]) -> Self {
        ResultSeries {
            xx: xx.to_vec(),
            ..Default::default()
        }
    }

    /// Returns the number of columns NX
    pub fn nx(&self) -> usize {
        self.xx.len()
    }

    /// Returns the number of snapshots NT
    pub fn nt(&self) -> usize {
        self.tt.len()
    }

    /// Appends a snapshot
    pub fn push(&mut self, state: &SimulationState) -> Result<(), StrError> {
        if state.lower.len() != self.nx() || state.upper.len() != self.nx() {
            return Err("the surfaces of the state must have length equal to NX");
        }
        if let Some(last) = self.tt.last() {
            if state.t <= *last {
                return Err("snapshots must be appended in increasing time order");
            }
        }
        self.tt.push(state.t);
        self.lower.push(state.lower.clone());
        self.upper.push(state.upper.clone());
        self.x_left.push(state.x_left);
        self.x_right.push(state.x_right);
        self.lake_vol.push(state.lake_vol);
        Ok(())
    }

    /// Checks the shape contract: surfaces are NX × NT and scalar series have NT entries
    pub fn check(&self) -> Result<(), StrError> {
        let (nx, nt) = (self.nx(), self.nt());
        if self.lower.len() != nt || self.upper.len() != nt {
            return Err("the number of surface snapshots must equal NT");
        }
        if self.lower.iter().chain(self.upper.iter()).any(|s| s.len() != nx) {
            return Err("the surface snapshots must have length equal to NX");
        }
        if self.x_left.len() != nt || self.x_right.len() != nt || self.lake_vol.len() != nt {
            return Err("the scalar series must have length equal to NT");
        }
        Ok(())
    }

    /// Writes all arrays to a directory (created if needed)
    ///
    /// The files are plain text with whitespace-separated values in `%.18e` format.
    pub fn write<P>(&self, directory: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        self.check()?;
        let dir = Path::new(directory);
        fs::create_dir_all(dir).map_err(|_| "cannot create results directory")?;
        write_table(&dir.join("Gamma_s"), &transpose(&self.lower, self.nx()))?;
        write_table(&dir.join("Gamma_h"), &transpose(&self.upper, self.nx()))?;
        write_column(&dir.join("x_left"), &self.x_left)?;
        write_column(&dir.join("x_right"), &self.x_right)?;
        write_column(&dir.join("X"), &self.xx)?;
        write_column(&dir.join("t"), &self.tt)?;
        write_column(&dir.join("lake_vol"), &self.lake_vol)?;
        Ok(())
    }

    /// Reads all arrays from a directory
    pub fn read<P>(directory: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let dir = Path::new(directory);
        let xx = read_column(&dir.join("X"))?;
        let tt = read_column(&dir.join("t"))?;
        let gamma_s = read_table(&dir.join("Gamma_s"))?;
        let gamma_h = read_table(&dir.join("Gamma_h"))?;
        if gamma_s.len() != xx.len() || gamma_h.len() != xx.len() {
            return Err("the number of rows of Gamma_s and Gamma_h must equal len(X)");
        }
        if gamma_s.iter().chain(gamma_h.iter()).any(|row| row.len() != tt.len()) {
            return Err("the number of columns of Gamma_s and Gamma_h must equal len(t)");
        }
        let res = ResultSeries {
            lower: transpose(&gamma_s, tt.len()),
            upper: transpose(&gamma_h, tt.len()),
            x_left: read_column(&dir.join("x_left"))?,
            x_right: read_column(&dir.join("x_right"))?,
            lake_vol: read_column(&dir.join("lake_vol"))?,
            xx,
            tt,
        };
        res.check()?;
        Ok(res)
    }
}

/// Transposes a table whose rows have length `ncol`
fn transpose(table: &[Vec<f64>], ncol: usize) -> Vec<Vec<f64>> {
    (0..ncol).map(|j| table.iter().map(|row| row[j]).collect()).collect()
}

fn write_table(path: &Path, rows: &[Vec<f64>]) -> Result<(), StrError> {
    let file = File::create(path).map_err(|_| "cannot create file")?;
    let mut buffer = BufWriter::new(file);
    for row in rows {
        let line: Vec<_> = row.iter().map(|v| format!("{:.18e}", v)).collect();
        writeln!(&mut buffer, "{}", line.join(" ")).map_err(|_| "cannot write file")?;
    }
    buffer.flush().map_err(|_| "cannot write file")?;
    Ok(())
}

fn write_column(path: &Path, values: &[f64]) -> Result<(), StrError> {
    let rows: Vec<_> = values.iter().map(|v| vec![*v]).collect();
    write_table(path, &rows)
}

fn read_table(path: &Path) -> Result<Vec<Vec<f64>>, StrError> {
    let file = File::open(path).map_err(|_| "cannot open file")?;
    let mut rows = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|_| "cannot read file")?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|s| s.parse::<f64>().map_err(|_| "cannot parse number"))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_column(path: &Path) -> Result<Vec<f64>, StrError> {
    let rows = read_table(path)?;
    if rows.iter().any(|row| row.len() != 1) {
        return Err("a one-dimensional array must have one value per line");
    }
    Ok(rows.into_iter().map(|row| row[0]).collect())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
