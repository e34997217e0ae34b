use crate::StrError;

/// Calculates the upwind slope of f at column i given the horizontal velocity
fn upwind_slope(xx: &[f64], ff: &[f64], i: usize, ux: f64) -> f64 {
    let n = xx.len();
    let backward = i > 0 && (ux >= 0.0 || i == n - 1);
    if backward {
        (ff[i] - ff[i - 1]) / (xx[i] - xx[i - 1])
    } else {
        (ff[i + 1] - ff[i]) / (xx[i + 1] - xx[i])
    }
}

/// Advances a surface z = f(x) with the kinematic equation (explicit upwind scheme)
///
/// ```text
/// ∂f/∂t + u ∂f/∂x = w
/// ```
///
/// # Input
///
/// * `xx` -- (nx) abscissae in increasing order
/// * `ff` -- (nx) elevations at time t
/// * `ux` -- (nx) horizontal velocity at the surface
/// * `uz` -- (nx) vertical velocity at the surface
/// * `dt` -- time increment
pub fn advect_surface(xx: &[f64], ff: &[f64], ux: &[f64], uz: &[f64], dt: f64) -> Result<Vec<f64>, StrError> {
    let n = xx.len();
    if n < 2 {
        return Err("at least two columns are required to advect a surface");
    }
    if ff.len() != n || ux.len() != n || uz.len() != n {
        return Err("the surface arrays must have the same length as the abscissae");
    }
    Ok((0..n)
        .map(|i| ff[i] + dt * (uz[i] - ux[i] * upwind_slope(xx, ff, i, ux[i])))
        .collect())
}

/// Finds the left and right grounding lines
///
/// The grounding lines are the leftmost and rightmost abscissae where the lower surface
/// is more than `tol` above the bed. Returns `(length/2, length/2)` if nothing floats.
pub fn grounding_lines(xx: &[f64], lower: &[f64], bed: &[f64], tol: f64, length: f64) -> (f64, f64) {
    let mut floating = xx
        .iter()
        .zip(lower.iter().zip(bed.iter()))
        .filter(|(_, (s, b))| *s - *b > tol)
        .map(|(x, _)| *x);
    match floating.next() {
        Some(first) => {
            let last = floating.last().unwrap_or(first);
            (first, last)
        }
        None => (0.5 * length, 0.5 * length),
    }
}

/// Calculates the lake volume (area per unit width) with the trapezoidal rule
///
/// Only the positive part of the water depth `s - b` contributes.
pub fn lake_volume(xx: &[f64], lower: &[f64], bed: &[f64]) -> f64 {
    let depth: Vec<_> = lower.iter().zip(bed).map(|(s, b)| f64::max(0.0, s - b)).collect();
    let mut vol = 0.0;
    for i in 1..xx.len() {
        vol += 0.5 * (depth[i] + depth[i - 1]) * (xx[i] - xx[i - 1]);
    }
    vol
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
