//! AlgorithmLongitudinal: turns a desired acceleration and the current
//! velocity into a gear choice and throttle/brake pedal positions.

use op_core::saturate;

const ONE_G: f64 = 9.81;
/// Width of the engine-speed band, at each end of the envelope, over which
/// the torque limit ramps linearly toward its boundary value rather than
/// clamping abruptly.
const ENGINE_ENVELOPE_RAMP_RPM: f64 = 1000.0;

#[derive(Clone, Debug)]
pub struct VehicleModelParameters {
    pub weight: f64,
    pub static_wheel_radius: f64,
    pub axle_ratio: f64,
    /// Gear ratios indexed `1..=gear_ratios.len()`; `gear_ratios[0]`
    /// corresponds to gear 1.
    pub gear_ratios: Vec<f64>,
    pub minimum_engine_speed: f64,
    pub maximum_engine_speed: f64,
    pub maximum_engine_torque: f64,
}

impl VehicleModelParameters {
    fn gear_ratio(&self, gear: i32) -> f64 {
        self.gear_ratios[(gear - 1) as usize]
    }

    fn number_of_gears(&self) -> i32 {
        self.gear_ratios.len() as i32
    }
}

/// Result of solving for a feasible gear given a desired acceleration: the
/// chosen gear, the engine speed it implies, and the acceleration actually
/// achievable (equal to the wish unless it had to be clamped).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GearSolution {
    pub gear: i32,
    pub engine_speed: f64,
    pub acceleration: f64,
}

/// Pedal positions implementing a chosen gear/acceleration pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PedalPositions {
    pub accelerator: f64,
    pub brake: f64,
}

fn engine_torque_max(params: &VehicleModelParameters, engine_speed: f64) -> f64 {
    let lower_border = params.minimum_engine_speed;
    let upper_border = params.maximum_engine_speed;

    if engine_speed < lower_border + ENGINE_ENVELOPE_RAMP_RPM {
        let speed = engine_speed.max(lower_border);
        (ENGINE_ENVELOPE_RAMP_RPM - (speed - lower_border)) * -0.1 + params.maximum_engine_torque
    } else if engine_speed > upper_border - ENGINE_ENVELOPE_RAMP_RPM {
        let speed = engine_speed.min(upper_border);
        (speed - upper_border + ENGINE_ENVELOPE_RAMP_RPM) * -0.04 + params.maximum_engine_torque
    } else {
        params.maximum_engine_torque
    }
}

fn engine_torque_min(params: &VehicleModelParameters, engine_speed: f64) -> f64 {
    engine_torque_max(params, engine_speed) * -0.1
}

fn engine_speed_by_velocity(params: &VehicleModelParameters, velocity: f64, gear: i32) -> f64 {
    (velocity * params.axle_ratio * params.gear_ratio(gear) * 60.0) / (params.static_wheel_radius * 2.0 * std::f64::consts::PI)
}

fn engine_torque_at_gear(params: &VehicleModelParameters, gear: i32, acceleration: f64) -> f64 {
    if acceleration == 0.0 || gear == 0 {
        return 0.0;
    }
    let wheel_set_torque = params.weight * params.static_wheel_radius * acceleration;
    wheel_set_torque / (params.axle_ratio * params.gear_ratio(gear))
}

fn acceleration_from_engine_torque(params: &VehicleModelParameters, engine_torque: f64, gear: i32) -> f64 {
    let wheel_set_torque = engine_torque * (params.axle_ratio * params.gear_ratio(gear));
    let wheel_set_force = wheel_set_torque / params.static_wheel_radius;
    wheel_set_force / params.weight
}

fn within_engine_limits(params: &VehicleModelParameters, gear: i32, engine_speed: f64, acceleration: f64) -> bool {
    if !(engine_speed >= params.minimum_engine_speed && engine_speed <= params.maximum_engine_speed) {
        return false;
    }
    let wish_torque = engine_torque_at_gear(params, gear, acceleration);
    wish_torque <= engine_torque_max(params, engine_speed)
}

/// Search gears `1..=G`; for each, compute engine speed and the torque
/// required for `acceleration_wish`. Pick the smallest gear whose (speed,
/// torque) lies inside the engine envelope. If none fits, pick the gear
/// minimizing `|wish - achievable|` and clamp the wish to what it can do.
pub fn calculate_gear_and_engine_speed(params: &VehicleModelParameters, velocity: f64, acceleration_wish: f64) -> GearSolution {
    let mut best_fit: Option<(f64, GearSolution)> = None;

    for gear in 1..=params.number_of_gears() {
        let engine_speed = engine_speed_by_velocity(params, velocity, gear);

        let limit_wheel_acc = if acceleration_wish >= 0.0 {
            acceleration_from_engine_torque(params, engine_torque_max(params, engine_speed), gear)
        } else {
            acceleration_from_engine_torque(params, engine_torque_min(params, engine_speed), gear)
        };
        let delta = (acceleration_wish - limit_wheel_acc).abs();

        if within_engine_limits(params, gear, engine_speed, acceleration_wish) {
            return GearSolution { gear, engine_speed, acceleration: acceleration_wish };
        }

        let candidate = GearSolution { gear, engine_speed, acceleration: limit_wheel_acc };
        if best_fit.as_ref().is_none_or(|(best_delta, _)| delta < *best_delta) {
            best_fit = Some((delta, candidate));
        }
    }

    let (_, mut fallback) = best_fit.expect("at least one gear exists");
    fallback.acceleration = acceleration_wish.min(fallback.acceleration);
    fallback
}

/// Given a solved gear and engine speed, compute throttle/brake pedal
/// positions implementing `acceleration_wish`.
pub fn calculate_pedal_positions(params: &VehicleModelParameters, solution: &GearSolution, acceleration_wish: f64) -> PedalPositions {
    let drag_max = engine_torque_min(params, solution.engine_speed);

    if acceleration_wish < 0.0 {
        let engine_torque = engine_torque_at_gear(params, solution.gear, acceleration_wish);
        if engine_torque < drag_max {
            let acc_drag_max = acceleration_from_engine_torque(params, drag_max, solution.gear);
            return PedalPositions {
                accelerator: 0.0,
                brake: saturate(-(acceleration_wish - acc_drag_max) / ONE_G, 0.0, 1.0),
            };
        }
    }

    let torque_max = engine_torque_max(params, solution.engine_speed);
    let wish_torque = engine_torque_at_gear(params, solution.gear, acceleration_wish);

    PedalPositions {
        accelerator: saturate((wish_torque - drag_max) / (torque_max - drag_max), 0.0, 1.0),
        brake: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> VehicleModelParameters {
        VehicleModelParameters {
            weight: 1500.0,
            static_wheel_radius: 0.3,
            axle_ratio: 4.1,
            gear_ratios: vec![3.6, 2.1, 1.4, 1.0, 0.8],
            minimum_engine_speed: 900.0,
            maximum_engine_speed: 6500.0,
            maximum_engine_torque: 250.0,
        }
    }

    #[test]
    fn moderate_acceleration_finds_a_feasible_gear() {
        let params = params();
        let solution = calculate_gear_and_engine_speed(&params, 15.0, 1.0);
        assert!(solution.gear >= 1 && solution.gear <= params.number_of_gears());
        assert!((solution.acceleration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn negative_acceleration_uses_brake_when_below_drag() {
        let params = params();
        let solution = calculate_gear_and_engine_speed(&params, 15.0, -5.0);
        let pedals = calculate_pedal_positions(&params, &solution, -5.0);
        assert!(pedals.brake > 0.0);
        assert_eq!(pedals.accelerator, 0.0);
    }

    #[test]
    fn positive_acceleration_uses_throttle_only() {
        let params = params();
        let solution = calculate_gear_and_engine_speed(&params, 15.0, 1.5);
        let pedals = calculate_pedal_positions(&params, &solution, 1.5);
        assert_eq!(pedals.brake, 0.0);
        assert!(pedals.accelerator > 0.0);
    }
}
