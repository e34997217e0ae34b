use super::Config;
use serde::{Deserialize, Serialize};

/// Holds the parameters of Glen's flow law for ice
///
/// The effective viscosity is
///
/// ```text
/// η = ½ A^(-1/n) (ε̇ₑ² + ε̇ᵣ)^((1-n)/(2n))
/// ```
///
/// where `ε̇ₑ² = ½ ε̇:ε̇` is the squared effective strain rate and `ε̇ᵣ` a small regularization.
/// With `n = 1` the ice behaves as a Newtonian fluid with `η = 1/(2A)`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ParamIce {
    /// Glen's law exponent n
    pub glen_n: f64,

    /// Rate factor A
    pub rate_factor: f64,

    /// Regularization of the squared effective strain rate
    pub strain_rate_reg: f64,
}

impl ParamIce {
    /// Allocates a new instance with the parameters from the configuration
    pub fn from_config(config: &Config) -> Self {
        ParamIce {
            glen_n: config.glen_n,
            rate_factor: config.rate_factor,
            strain_rate_reg: config.strain_rate_reg,
        }
    }

    /// Returns the squared effective strain rate ½ ε̇:ε̇ (2D)
    pub fn effective_strain_rate_sq(exx: f64, ezz: f64, exz: f64) -> f64 {
        0.5 * (exx * exx + ezz * ezz) + exz * exz
    }

    /// Returns the effective viscosity given the squared effective strain rate
    pub fn viscosity(&self, eps_e_sq: f64) -> f64 {
        let n = self.glen_n;
        let exponent = (1.0 - n) / (2.0 * n);
        0.5 * f64::powf(self.rate_factor, -1.0 / n) * f64::powf(eps_e_sq + self.strain_rate_reg, exponent)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
