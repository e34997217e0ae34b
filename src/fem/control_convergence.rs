use crate::base::Config;
use crate::StrError;

/// Controls the convergence of the Picard (fixed-point) iterations on the viscosity
///
/// The iterations converge when the velocity update is small,
///
/// ```text
/// ‖u_k - u_{k-1}‖∞ ≤ tol_rel ‖u_k‖∞  or  ‖u_k - u_{k-1}‖∞ ≤ tol_abs
/// ```
///
/// and no bed facet has been released from contact during the iteration.
pub struct ControlConvergence<'a> {
    config: &'a Config,
    iteration: usize,
    norm_du: f64,
    norm_u: f64,
    rel_du: f64,
    rel_du_prev: f64,
    n_released: usize,
    converged: bool,
    diverging: bool,
    n_iterations_total: usize,
}

impl<'a> ControlConvergence<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        ControlConvergence {
            config,
            iteration: 0,
            norm_du: 0.0,
            norm_u: 0.0,
            rel_du: 0.0,
            rel_du_prev: 0.0,
            n_released: 0,
            converged: false,
            diverging: false,
            n_iterations_total: 0,
        }
    }

    /// Resets the flags for a new time step
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.converged = false;
        self.diverging = false;
        self.rel_du_prev = 0.0;
    }

    /// Returns whether the iterations have converged
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Returns the number of iterations performed at the current time step
    pub fn n_iterations(&self) -> usize {
        self.iteration + 1
    }

    /// Returns the total number of iterations performed so far
    pub fn n_iterations_total(&self) -> usize {
        self.n_iterations_total
    }

    /// Analyzes the velocity update
    ///
    /// # Input
    ///
    /// * `iteration` -- current iteration number
    /// * `norm_du` -- max norm of the velocity update
    /// * `norm_u` -- max norm of the new velocity
    /// * `n_released` -- number of bed facets released from contact during this iteration
    pub fn analyze(&mut self, iteration: usize, norm_du: f64, norm_u: f64, n_released: usize) -> Result<(), StrError> {
        self.iteration = iteration;
        self.n_iterations_total += 1;
        self.norm_du = norm_du;
        self.norm_u = norm_u;
        self.n_released = n_released;

        // check for NaN or Inf
        if !norm_du.is_finite() || !norm_u.is_finite() {
            self.converged = false;
            return Err("found NaN or Inf in the velocity");
        }

        // relative update
        self.rel_du = if norm_u > 0.0 { norm_du / norm_u } else { norm_du };

        // convergence
        let small = norm_du <= self.config.tol_rel_picard * norm_u || norm_du <= self.config.tol_abs_picard;
        self.converged = small && n_released == 0;

        // divergence (informative only)
        self.diverging = iteration > 1 && self.rel_du > self.rel_du_prev;
        self.rel_du_prev = self.rel_du;
        Ok(())
    }

    /// Prints the header of the convergence table
    pub fn print_header(&self) {
        if self.config.verbose_timesteps || self.config.verbose_iterations {
            println!("\nLAKESIM === TIME STEPPING AND CONVERGENCE STATISTICS ==========================");
            println!("\nLegend:");
            println!("✅ ─ converged");
            println!("🔹 ─ converging");
            println!("🎈 ─ diverging");
            println!("\"iter\" means Picard iteration");
            println!("\"rel\" means number of bed facets released from contact\n");
            println!("{}", "─".repeat(79));
            println!(
                "{:8} {:>11} {:>11} {:>5} {:>9} {:>9} {:>4} {:>12}",
                "timestep", "t", "Δt", "iter", "‖Δu‖∞", "rel(Δu)", "rel", "lake volume"
            );
            println!("{}", "─".repeat(79));
        }
    }

    /// Prints time step information
    pub fn print_timestep(&self, timestep: usize, t: f64, dt: f64, lake_vol: f64) {
        if self.config.verbose_timesteps {
            println!(
                "{:>8} {:>11.6e} {:>11.6e} {:>5} {:>9} {:>9} {:>4} {:>12.5e}",
                timestep + 1,
                t,
                dt,
                self.n_iterations(),
                "·",
                "·",
                "·",
                lake_vol
            );
        }
    }

    /// Prints iteration information
    pub fn print_iteration(&self) {
        if self.config.verbose_iterations {
            let icon = if self.converged {
                "✅"
            } else if self.diverging {
                "🎈"
            } else {
                "🔹"
            };
            println!(
                "{:>8} {:>11} {:>11} {:>5} {:>9.2e} {:>9.2e} {:>4} {}",
                "·", "·", "·", self.iteration, self.norm_du, self.rel_du, self.n_released, icon
            );
        }
    }

    /// Prints the horizontal line at the end of the analysis
    pub fn print_footer(&self) {
        if self.config.verbose_timesteps || self.config.verbose_iterations {
            println!("{}", "─".repeat(79));
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
