use super::{advect_surface, ResultSeries, SimulationState, SolverStokes};
use crate::base::{BedProfile, BoundaryMarkers, Config, Essential, IceMesh};
use crate::StrError;

/// Advances the velocity, pressure, and geometry of the ice slab in time
///
/// Each step deforms the mesh to the current surfaces, classifies the boundary facets,
/// rebuilds the wall constraints, solves the Stokes problem, and moves the surfaces
/// with the kinematic equations.
pub struct TimeStepper<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Bed topography
    pub bed: BedProfile,

    /// Bed elevation at the columns
    pub bed_columns: Vec<f64>,

    /// Holds the wall constraints
    pub essential: Essential,

    /// Holds the mesh of the current step
    pub ice_mesh: IceMesh,

    /// Holds the markers of the current step
    pub markers: BoundaryMarkers,

    /// Holds the nonlinear Stokes solver
    pub solver: SolverStokes<'a>,
}

impl<'a> TimeStepper<'a> {
    /// Allocates a new instance with the geometry of the given state
    pub fn new(config: &'a Config, state: &SimulationState) -> Result<Self, StrError> {
        let bed = BedProfile::from_config(config);
        let ice_mesh = IceMesh::from_config(config, &state.lower, &state.upper)?;
        let markers = BoundaryMarkers::new(config, &bed, &ice_mesh)?;
        let solver = SolverStokes::new(config, &ice_mesh)?;
        if state.uu.dim() != solver.equations.n_equation {
            return Err("the state is incompatible with the mesh");
        }
        Ok(TimeStepper {
            config,
            bed,
            bed_columns: bed.bed_vec(&ice_mesh.xx),
            essential: Essential::new(config.wall_bcs),
            ice_mesh,
            markers,
            solver,
        })
    }

    /// Performs one time step of size dt
    ///
    /// The state is modified only if the step succeeds.
    pub fn step(&mut self, state: &mut SimulationState, dt: f64) -> Result<(), StrError> {
        if !(dt > 0.0) {
            return Err("the time increment must be positive");
        }

        // geometry and boundaries of the current state
        self.ice_mesh.deform(&state.lower, &state.upper)?;
        self.markers = BoundaryMarkers::new(self.config, &self.bed, &self.ice_mesh)?;
        self.essential = Essential::new(self.config.wall_bcs);

        // velocity and pressure (the volume constraint uses the mid-step inflow)
        let mut uu = state.uu.clone();
        let t_mid = state.t + 0.5 * dt;
        self.solver
            .solve(&self.ice_mesh, &self.markers, &self.essential, t_mid, &mut uu)?;

        // surface velocities
        let nx = self.ice_mesh.nx;
        let (mut ux_bot, mut uz_bot) = (vec![0.0; nx], vec![0.0; nx]);
        let (mut ux_top, mut uz_top) = (vec![0.0; nx], vec![0.0; nx]);
        for i in 0..nx {
            (ux_bot[i], uz_bot[i]) = self.solver.velocity(&uu, self.ice_mesh.bottom(i));
            (ux_top[i], uz_top[i]) = self.solver.velocity(&uu, self.ice_mesh.top(i));
        }

        // kinematic update
        let xx = &self.ice_mesh.xx;
        let upper = advect_surface(xx, &state.upper, &ux_top, &uz_top, dt)?;
        let mut lower = advect_surface(xx, &state.lower, &ux_bot, &uz_bot, dt)?;
        let contact = self.solver.contact_points(&self.ice_mesh, &self.markers);
        for i in 0..nx {
            if contact.contains(&self.ice_mesh.bottom(i)) {
                lower[i] = self.bed_columns[i];
            } else {
                lower[i] = f64::max(lower[i], self.bed_columns[i]);
            }
            if !(upper[i] > lower[i]) {
                return Err("the ice thickness must remain positive");
            }
        }

        // accept
        state.uu = uu;
        state.lower = lower;
        state.upper = upper;
        state.update_lake(self.config, xx, &self.bed_columns);
        state.t += dt;
        state.dt = dt;
        state.timestep += 1;
        Ok(())
    }

    /// Runs the time loop until t_final, appending every accepted snapshot to the results
    ///
    /// On error, the results hold the snapshots accepted so far.
    pub fn run(&mut self, state: &mut SimulationState, results: &mut ResultSeries) -> Result<(), StrError> {
        self.solver.control.print_header();
        let t_final = self.config.t_final;
        let dt_max = self.config.dt();
        while state.t < t_final - 1e-8 * dt_max {
            let dt = f64::min(dt_max, t_final - state.t);
            self.step(state, dt)?;
            results.push(state)?;
            self.solver
                .control
                .print_timestep(state.timestep - 1, state.t, dt, state.lake_vol);
        }
        self.solver.control.print_footer();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::TimeStepper;
    use crate::base::{Config, Tag};
    use crate::fem::{ResultSeries, SimulationState};
    use crate::StrError;
    use std::f64::consts::PI;

    fn small_config() -> Config {
        let mut config = Config::new();
        config.volume_amplitude = 0.0;
        config.set_resolution(41, 4).unwrap();
        config.set_rheology(1.0, 5e-14).unwrap();
        config.set_verbose(false, false);
        config
    }

    #[test]
    fn new_works() -> Result<(), StrError> {
        let config = small_config();
        let state = SimulationState::new(&config)?;
        let stepper = TimeStepper::new(&config, &state)?;
        assert_eq!(stepper.ice_mesh.nx, 41);
        assert_eq!(stepper.bed_columns.len(), 41);
        assert!(stepper.markers.count(Tag::Water) > 0);
        assert_eq!(stepper.essential.all.len(), 2);
        Ok(())
    }

    #[test]
    fn step_captures_errors() -> Result<(), StrError> {
        let config = small_config();
        let mut state = SimulationState::new(&config)?;
        let mut stepper = TimeStepper::new(&config, &state)?;
        assert_eq!(
            stepper.step(&mut state, 0.0).err(),
            Some("the time increment must be positive")
        );
        let mut other = config.clone();
        other.set_resolution(11, 4)?;
        let other_state = SimulationState::new(&other)?;
        assert_eq!(
            TimeStepper::new(&config, &other_state).err(),
            Some("the surface arrays must have length equal to nx")
        );
        Ok(())
    }

    #[test]
    fn one_step_works() -> Result<(), StrError> {
        let config = small_config();
        let mut state = SimulationState::new(&config)?;
        let initial = state.clone();
        let mut stepper = TimeStepper::new(&config, &state)?;
        let mut results = ResultSeries::new(&config.columns());
        results.push(&state)?;
        let dt = config.dt();
        stepper.step(&mut state, dt)?;
        results.push(&state)?;
        assert_eq!(state.timestep, 1);
        assert_eq!(state.t, dt);
        assert_eq!(results.nt(), 2);

        // the lower surface never goes below the bed
        for i in 0..config.nx {
            assert!(state.lower[i] >= stepper.bed_columns[i]);
        }

        // without forcing, the geometry barely changes in one step
        for i in 0..config.nx {
            assert!(f64::abs(state.lower[i] - initial.lower[i]) < 0.1);
            assert!(f64::abs(state.upper[i] - initial.upper[i]) < 0.1);
        }
        Ok(())
    }

    #[test]
    fn forced_steps_fill_the_lake() -> Result<(), StrError> {
        let mut config = small_config();
        config.volume_amplitude = 1.0e5;
        let mut state = SimulationState::new(&config)?;
        let initial = state.clone();
        let mut stepper = TimeStepper::new(&config, &state)?;
        let dt = config.dt();
        let omega = 2.0 * PI / config.t_period;
        let mut lake_vol_prev = state.lake_vol;
        for _ in 0..3 {
            stepper.step(&mut state, dt)?;

            // the lake volume follows V₀ + ΔV sin(ω t)
            let correct = config.volume_amplitude * f64::sin(omega * state.t);
            let dv = state.lake_vol - initial.lake_vol;
            assert!(f64::abs(dv - correct) < 0.1 * correct);
            assert!(state.lake_vol > lake_vol_prev);
            lake_vol_prev = state.lake_vol;

            // while filling, the grounding lines do not retreat
            assert!(state.x_left <= initial.x_left);
            assert!(state.x_right >= initial.x_right);

            // the ice never penetrates the bed
            for i in 0..config.nx {
                assert!(state.lower[i] >= stepper.bed_columns[i]);
            }
        }
        Ok(())
    }

    #[test]
    fn failed_step_leaves_the_state_unchanged() -> Result<(), StrError> {
        let mut config = small_config();
        config.volume_amplitude = 1.0e5;
        config.set_rheology(3.0, 2.24e-24)?;
        config.n_max_iterations = 1;
        let mut state = SimulationState::new(&config)?;
        let initial = state.clone();
        let mut stepper = TimeStepper::new(&config, &state)?;
        assert_eq!(
            stepper.step(&mut state, config.dt()).err(),
            Some("Picard iterations did not converge")
        );
        assert_eq!(state.t, 0.0);
        assert_eq!(state.timestep, 0);
        assert_eq!(state.lower, initial.lower);
        assert_eq!(state.upper, initial.upper);
        assert_eq!(state.uu.as_data(), initial.uu.as_data());
        Ok(())
    }
}
