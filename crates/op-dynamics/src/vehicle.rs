//! Simple static two-track vehicle model: four tires hung off a rigid body,
//! producing a combined force and yaw moment each step.

use op_core::Vector2d;

use crate::tire::Tire;

const NUMBER_OF_WHEELS: usize = 4;

// Front-left, front-right, rear-left, rear-right.
const FRONT_LEFT: usize = 0;
const FRONT_RIGHT: usize = 1;
const REAR_LEFT: usize = 2;
const REAR_RIGHT: usize = 3;

const COEFF_DRAG: f64 = 0.34;
const AREA_FACE: f64 = 1.94;
const DENSITY_AIR: f64 = 1.29;
const ANGLE_PRE_SET: f64 = 0.0;
const BRAKE_BALANCE: f64 = 0.67;
const TORQUE_ENGINE_LIMIT: f64 = 10_000.0;

#[derive(Clone, Debug)]
pub struct VehicleSimpleTT {
    power_engine_limit: f64,
    torque_brake_limit: f64,
    mass_total: f64,

    position_tire: [Vector2d; NUMBER_OF_WHEELS],
    pub force_tire_vertical_static: [f64; NUMBER_OF_WHEELS],

    rotation_velocity_tire_x: [f64; NUMBER_OF_WHEELS],
    rotation_velocity_grad_tire_x: [f64; NUMBER_OF_WHEELS],
    torque_tire_x_throttle: [f64; NUMBER_OF_WHEELS],
    torque_tire_x_brake: [f64; NUMBER_OF_WHEELS],
    force_tire: [Vector2d; NUMBER_OF_WHEELS],
    slip_tire: [Vector2d; NUMBER_OF_WHEELS],
    moment_tire_z: [f64; NUMBER_OF_WHEELS],

    yaw_velocity: f64,
    velocity_car: Vector2d,

    tires: Vec<Tire>,

    pub force_total_xy: Vector2d,
    pub moment_total_z: f64,
}

impl VehicleSimpleTT {
    pub fn new() -> Self {
        Self {
            power_engine_limit: 0.0,
            torque_brake_limit: 0.0,
            mass_total: 0.0,
            position_tire: [Vector2d::ZERO; NUMBER_OF_WHEELS],
            force_tire_vertical_static: [0.0; NUMBER_OF_WHEELS],
            rotation_velocity_tire_x: [0.0; NUMBER_OF_WHEELS],
            rotation_velocity_grad_tire_x: [0.0; NUMBER_OF_WHEELS],
            torque_tire_x_throttle: [0.0; NUMBER_OF_WHEELS],
            torque_tire_x_brake: [0.0; NUMBER_OF_WHEELS],
            force_tire: [Vector2d::ZERO; NUMBER_OF_WHEELS],
            slip_tire: [Vector2d::ZERO; NUMBER_OF_WHEELS],
            moment_tire_z: [0.0; NUMBER_OF_WHEELS],
            yaw_velocity: 0.0,
            velocity_car: Vector2d::ZERO,
            tires: Vec::new(),
            force_total_xy: Vector2d::ZERO,
            moment_total_z: 0.0,
        }
    }

    pub fn init_set_engine(&mut self, weight: f64, power_engine: f64, torque_brake_limit: f64) {
        self.power_engine_limit = power_engine.abs();
        self.torque_brake_limit = torque_brake_limit.abs();
        self.mass_total = weight;
    }

    /// `wheelbase`, `distance_cog_to_front_axle`, `track_width`: standard
    /// vehicle geometry. COG height isn't used by this planar model.
    pub fn init_set_geometry(&mut self, wheelbase: f64, distance_cog_to_front_axle: f64, track_width: f64, gravity: f64) {
        let x_cog = wheelbase / 2.0 - distance_cog_to_front_axle;

        self.position_tire[FRONT_LEFT].x = x_cog;
        self.position_tire[FRONT_RIGHT].x = x_cog;
        self.position_tire[REAR_LEFT].x = x_cog - wheelbase;
        self.position_tire[REAR_RIGHT].x = self.position_tire[REAR_LEFT].x;

        self.position_tire[FRONT_LEFT].y = track_width / 2.0;
        self.position_tire[FRONT_RIGHT].y = -self.position_tire[FRONT_LEFT].y;
        self.position_tire[REAR_LEFT].y = track_width / 2.0;
        self.position_tire[REAR_RIGHT].y = -self.position_tire[REAR_LEFT].y;

        self.force_tire_vertical_static[FRONT_LEFT] = self.mass_total * gravity / 2.0 * x_cog / wheelbase;
        self.force_tire_vertical_static[FRONT_RIGHT] = self.force_tire_vertical_static[FRONT_LEFT];
        self.force_tire_vertical_static[REAR_LEFT] = self.mass_total * gravity / 2.0 * (wheelbase - x_cog) / wheelbase;
        self.force_tire_vertical_static[REAR_RIGHT] = self.force_tire_vertical_static[REAR_LEFT];

        // Rear-wheel drive: no throttle torque on the front axle.
        self.torque_tire_x_throttle[FRONT_LEFT] = 0.0;
        self.torque_tire_x_throttle[FRONT_RIGHT] = 0.0;
    }

    pub fn init_set_tire(&mut self, initial_velocity: f64, force_peak_max: f64, force_slide: f64, slip_peak_max: f64, radius: f64, friction_scale: f64) {
        self.tires = (0..NUMBER_OF_WHEELS)
            .map(|i| Tire::new(self.force_tire_vertical_static[i], force_peak_max, force_slide, slip_peak_max, radius, friction_scale))
            .collect();
        for i in 0..NUMBER_OF_WHEELS {
            self.rotation_velocity_tire_x[i] = initial_velocity / radius;
            self.rotation_velocity_grad_tire_x[i] = 0.0;
        }
    }

    pub fn set_velocity(&mut self, velocity_car: Vector2d, yaw_velocity: f64) {
        self.velocity_car = velocity_car;
        self.yaw_velocity = yaw_velocity;
    }

    /// Rear-wheel drive with an open differential between the rear tires;
    /// engine torque capped by `P/ω`, with `ω` the mean rear wheel
    /// rotational velocity (substituting a small epsilon at a standstill to
    /// avoid a 0 rad/s singularity).
    pub fn drive_train(&mut self, throttle_pedal: f64, brake_pedal: f64, brake_superpose: &[f64; NUMBER_OF_WHEELS]) {
        let rot_vel_mean = 0.5 * (self.rotation_velocity_tire_x[REAR_LEFT] + self.rotation_velocity_tire_x[REAR_RIGHT]);
        let torque_engine_max = if rot_vel_mean != 0.0 {
            self.power_engine_limit / rot_vel_mean
        } else {
            self.power_engine_limit / 0.001
        }
        .clamp(0.0, TORQUE_ENGINE_LIMIT);

        for i in 0..NUMBER_OF_WHEELS {
            let mut brake_pedal_mod = if i < 2 {
                BRAKE_BALANCE * 2.0 * brake_pedal
            } else {
                (1.0 - BRAKE_BALANCE) * 2.0 * brake_pedal
            };
            brake_pedal_mod += brake_superpose[i];

            self.torque_tire_x_brake[i] = brake_pedal_mod.clamp(0.0, 1.0) * self.torque_brake_limit;

            if i > 1 {
                self.torque_tire_x_throttle[i] = throttle_pedal * torque_engine_max / 2.0;
            }
        }
    }

    /// Per-tire slip and local force from the applied drivetrain torque,
    /// steer angle (front tires only), and vertical load.
    pub fn force_local(&mut self, time_step: f64, angle_tire_front: f64, force_vertical: &[f64; NUMBER_OF_WHEELS]) {
        let angle_tire = [
            angle_tire_front + ANGLE_PRE_SET,
            angle_tire_front - ANGLE_PRE_SET,
            -ANGLE_PRE_SET,
            ANGLE_PRE_SET,
        ];

        for i in 0..NUMBER_OF_WHEELS {
            self.tires[i].rescale(force_vertical[i]);

            // Tire-frame velocity: body velocity plus the yaw-rate cross arm
            // at this tire's position, rotated into the (steered) tire frame.
            let mut velocity_tire = self.position_tire[i];
            velocity_tire.rotate(std::f64::consts::FRAC_PI_2);
            velocity_tire.scale(self.yaw_velocity);
            velocity_tire = velocity_tire + self.velocity_car;
            velocity_tire = velocity_tire.rotated(-angle_tire[i]);

            let mut torque_sum = if velocity_tire.x == 0.0 {
                0.0
            } else if velocity_tire.x < 0.0 {
                self.torque_tire_x_brake[i]
            } else {
                -self.torque_tire_x_brake[i]
            };
            torque_sum += self.torque_tire_x_throttle[i];

            let slip_x = self.tires[i].get_long_slip(torque_sum);
            let slip_y = self.tires[i].calc_slip_y(slip_x, velocity_tire.x, velocity_tire.y);
            self.slip_tire[i] = Vector2d::new(slip_x, slip_y);

            let slip_length = self.slip_tire[i].length();
            let force_abs = self.tires[i].get_force(slip_length);
            let mut force_tire = self.slip_tire[i];
            force_tire.normalize();
            force_tire.scale(force_abs);

            let positive_before = force_tire.x > 0.0;
            force_tire.x += self.tires[i].get_roll_friction(velocity_tire.x);
            if (force_tire.x < 0.0 && positive_before) || (force_tire.x > 0.0 && !positive_before) {
                force_tire.x = 0.0;
            }

            self.force_tire[i] = force_tire.rotated(angle_tire[i]);
            self.moment_tire_z[i] = self.position_tire[i].cross(self.force_tire[i]);

            let rot_vel_new = velocity_tire.x / (1.0 - self.slip_tire[i].x) / self.tires[i].radius;
            self.rotation_velocity_grad_tire_x[i] = (rot_vel_new - self.rotation_velocity_tire_x[i]) / time_step;
            self.rotation_velocity_tire_x[i] = rot_vel_new;
        }
    }

    /// Sum tire forces and moments, add aerodynamic drag along the
    /// velocity direction.
    pub fn force_global(&mut self) {
        self.force_total_xy = Vector2d::ZERO;
        self.moment_total_z = 0.0;
        for i in 0..NUMBER_OF_WHEELS {
            self.force_total_xy = self.force_total_xy + self.force_tire[i];
            self.moment_total_z += self.moment_tire_z[i];
        }

        let speed = self.velocity_car.length();
        let force_air_drag = -0.5 * DENSITY_AIR * COEFF_DRAG * AREA_FACE * speed * speed;
        let angle_slide = self.velocity_car.angle();

        let mut rotated = self.force_total_xy.rotated(-angle_slide);
        rotated.x += force_air_drag;
        self.force_total_xy = rotated.rotated(angle_slide);
    }
}

impl Default for VehicleSimpleTT {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleSimpleTT {
        let mut vehicle = VehicleSimpleTT::new();
        vehicle.init_set_engine(1500.0, 100_000.0, 6000.0);
        vehicle.init_set_geometry(2.7, 1.3, 1.6, -9.81);
        vehicle.init_set_tire(10.0, 5000.0, 4000.0, 0.1, 0.3, 1.0);
        vehicle
    }

    #[test]
    fn rear_axle_carries_no_throttle_torque_before_drive_train() {
        let vehicle = vehicle();
        assert_eq!(vehicle.torque_tire_x_throttle[FRONT_LEFT], 0.0);
        assert_eq!(vehicle.torque_tire_x_throttle[FRONT_RIGHT], 0.0);
    }

    #[test]
    fn drive_train_splits_throttle_between_rear_tires_only() {
        let mut vehicle = vehicle();
        vehicle.drive_train(1.0, 0.0, &[0.0; NUMBER_OF_WHEELS]);
        assert_eq!(vehicle.torque_tire_x_throttle[FRONT_LEFT], 0.0);
        assert!(vehicle.torque_tire_x_throttle[REAR_LEFT] > 0.0);
        assert_eq!(vehicle.torque_tire_x_throttle[REAR_LEFT], vehicle.torque_tire_x_throttle[REAR_RIGHT]);
    }

    #[test]
    fn forward_motion_produces_forward_force_under_throttle() {
        let mut vehicle = vehicle();
        vehicle.set_velocity(Vector2d::new(10.0, 0.0), 0.0);
        vehicle.drive_train(1.0, 0.0, &[0.0; NUMBER_OF_WHEELS]);
        let vertical = vehicle.force_tire_vertical_static;
        vehicle.force_local(0.1, 0.0, &vertical);
        vehicle.force_global();
        assert!(vehicle.force_total_xy.x > 0.0);
    }
}
