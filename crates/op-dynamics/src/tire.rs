//! Static tire model based on TMEasy by Rill et al: maps longitudinal/
//! lateral slip to tangential force through adhesion, semi-slide, and slide
//! regimes, and inverts applied torque back into longitudinal slip.

use op_core::saturate;

/// Fixed tire rotational inertia, matching the reference model's constant
/// (not exposed as a configuration parameter upstream either).
pub const TIRE_INERTIA: f64 = 1.2;

const FRICTION_ROLL: f64 = 0.01;
const STIFFNESS_ROLL: f64 = 0.3;
const VELOCITY_LIMIT: f64 = 0.27; // ~1 km/h, below which roll friction ramps to zero

#[derive(Clone, Debug)]
pub struct Tire {
    pub radius: f64,
    force_z_static: f64,
    force_z: f64,
    force_peak_static: f64,
    force_sat_static: f64,
    force_peak: f64,
    force_sat: f64,
    slip_peak: f64,
    slip_sat: f64,
}

impl Tire {
    /// `force_z_ref` is this tire's static vertical load, `force_peak_max`/
    /// `force_slide`/`slip_peak_max` the model's peak/slide force and
    /// slip-at-peak constants, `radius` the tire radius, `friction_scale`
    /// the per-agent road/tire friction coefficient. `slip_sat` (slip at
    /// full slide) is derived the way the original scales it: the same
    /// `friction_scale` applied to a slide-slip constant one tick beyond
    /// peak slip.
    pub fn new(force_z_ref: f64, force_peak_max: f64, force_slide: f64, slip_peak_max: f64, radius: f64, friction_scale: f64) -> Self {
        let mut tire = Self {
            radius,
            force_z_static: force_z_ref,
            force_z: force_z_ref,
            force_peak_static: force_peak_max * friction_scale,
            force_sat_static: force_slide * friction_scale,
            force_peak: 0.0,
            force_sat: 0.0,
            slip_peak: slip_peak_max * friction_scale,
            slip_sat: (slip_peak_max * 1.5) * friction_scale,
        };
        tire.rescale(force_z_ref);
        tire
    }

    /// Longitudinal (or combined) tangential force for a given slip value,
    /// signed the same as `slip`.
    pub fn get_force(&self, slip: f64) -> f64 {
        if slip == 0.0 {
            return 0.0;
        }
        let slip_abs = slip.abs();
        let slip_abs_norm = saturate(slip_abs, 0.0, 1.0) / self.slip_peak;

        let force = if slip_abs_norm <= 1.0 {
            self.force_peak * STIFFNESS_ROLL * slip_abs_norm
                / (1.0 + slip_abs_norm * (slip_abs_norm + STIFFNESS_ROLL - 2.0))
        } else if slip_abs < self.slip_sat {
            let slip_slide_force_norm = self.slip_sat / self.slip_peak;
            let ratio = (slip_abs_norm - 1.0) / (slip_slide_force_norm - 1.0);
            self.force_peak * (1.0 - (1.0 - self.force_sat / self.force_peak) * ratio * ratio * (3.0 - 2.0 * ratio))
        } else {
            self.force_sat
        };

        if slip > 0.0 { force } else { -force }
    }

    /// Invert the applied wheel torque into the longitudinal slip that
    /// would produce it, via the closed-form TMeasy adhesion-regime
    /// quadratic, saturating to slip-at-slide beyond peak force.
    pub fn get_long_slip(&self, torque: f64) -> f64 {
        let force = torque / self.radius;
        let force_abs = force.abs();

        if force == 0.0 {
            return 0.0;
        }
        if force_abs <= self.force_peak {
            let p_half = 0.5 * (STIFFNESS_ROLL * (1.0 - self.force_peak / force_abs) - 2.0);
            let slip = self.slip_peak * (-p_half - (p_half * p_half - 1.0).sqrt());
            if force > 0.0 { slip } else { -slip }
        } else if force > 0.0 {
            self.slip_sat
        } else {
            -self.slip_sat
        }
    }

    /// Lateral slip from longitudinal slip and tire-frame velocity
    /// components. Non-ISO sign convention, matching the reference model.
    pub fn calc_slip_y(&self, slip_x: f64, vx: f64, vy: f64) -> f64 {
        if vy == 0.0 || (vx.abs() < VELOCITY_LIMIT && vy.abs() < VELOCITY_LIMIT) {
            0.0
        } else if vx == 0.0 {
            saturate(-vy, -1.0, 1.0)
        } else {
            saturate((slip_x.abs() - 1.0) * vy / vx.abs(), -1.0, 1.0)
        }
    }

    /// Rolling-friction force opposing tire-frame longitudinal velocity,
    /// ramped linearly to zero below [`VELOCITY_LIMIT`].
    pub fn get_roll_friction(&self, velocity_tire_x: f64) -> f64 {
        let mut force_friction = self.force_z * FRICTION_ROLL;
        if velocity_tire_x < 0.0 {
            force_friction = -force_friction;
        }
        if velocity_tire_x.abs() < VELOCITY_LIMIT {
            force_friction *= velocity_tire_x / VELOCITY_LIMIT;
        }
        force_friction
    }

    /// Rescale peak/slide force against a new vertical load, clamping the
    /// load ratio to `[0.1, 2.0]` as the numerical stability contract
    /// requires.
    pub fn rescale(&mut self, force_z_update: f64) {
        self.force_z = force_z_update;
        let scaling = saturate(self.force_z / self.force_z_static, 0.1, 2.0);
        self.force_peak = self.force_peak_static * scaling;
        self.force_sat = self.force_sat_static * scaling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tire() -> Tire {
        Tire::new(-4000.0, 5000.0, 4000.0, 0.1, 0.3, 1.0)
    }

    #[test]
    fn zero_slip_gives_zero_force() {
        assert_eq!(tire().get_force(0.0), 0.0);
    }

    #[test]
    fn force_sign_matches_slip_sign() {
        let tire = tire();
        assert!(tire.get_force(0.05) > 0.0);
        assert!(tire.get_force(-0.05) < 0.0);
    }

    #[test]
    fn slide_region_saturates_to_slide_force() {
        let tire = tire();
        let force = tire.get_force(1.0);
        assert!((force - tire.force_sat).abs() < 1e-9);
    }

    #[test]
    fn roll_friction_ramps_below_velocity_limit() {
        let tire = tire();
        let full = tire.get_roll_friction(5.0);
        let ramped = tire.get_roll_friction(0.1);
        assert!(ramped.abs() < full.abs());
    }

    #[test]
    fn rescale_clamps_load_ratio() {
        let mut tire = tire();
        tire.rescale(tire.force_z_static * 10.0);
        assert!((tire.force_peak / tire.force_peak_static - 2.0).abs() < 1e-9);
    }
}
