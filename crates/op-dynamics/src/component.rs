//! The dynamics component: wraps [`VehicleSimpleTT`] in the `Component`
//! trait, reading driver intentions each tick and writing back the agent's
//! authoritative pose.

use op_core::{normalize_angle, saturate, ComponentId, Tick, Vector2d};
use op_component::{Component, ComponentKind, ComponentMeta, ComponentResult, KinematicState, Signal};

use crate::vehicle::VehicleSimpleTT;

/// Input port: normalized throttle pedal position, `[0, 1]`.
pub const PORT_THROTTLE: u8 = 0;
/// Input port: normalized brake pedal position, `[0, 1]`.
pub const PORT_BRAKE: u8 = 1;
/// Input port: front tire steer angle, radians.
pub const PORT_STEERING_ANGLE: u8 = 2;

/// Output port: the agent's full pose after this step's integration.
pub const PORT_KINEMATIC_STATE: u8 = 0;
/// Output port: the negated net vehicle-frame force, for a chassis/inertia
/// consumer.
pub const PORT_INERTIA_FORCE: u8 = 1;

/// Fixed parameters a dynamics component is constructed with; everything
/// else is per-tick state carried inside the component.
#[derive(Clone, Debug)]
pub struct VehicleGeometry {
    pub mass: f64,
    pub power_engine: f64,
    pub torque_brake_limit: f64,
    pub wheelbase: f64,
    pub distance_cog_to_front_axle: f64,
    pub track_width: f64,
    pub moment_inertia_yaw: f64,
    pub tire_force_peak_max: f64,
    pub tire_force_slide: f64,
    pub tire_slip_peak_max: f64,
    pub tire_radius: f64,
    pub tire_friction_scale: f64,
    pub gravity: f64,
}

/// Two-track dynamics component: the sole writer of an agent's kinematic
/// state, per the one-writer rule in the concurrency model.
pub struct DynamicsComponent {
    meta: ComponentMeta,
    vehicle: VehicleSimpleTT,
    mass: f64,
    moment_inertia_yaw: f64,

    position: Vector2d,
    yaw: f64,
    velocity_car: Vector2d,
    yaw_velocity: f64,
    acceleration_car: Vector2d,
    yaw_acceleration: f64,

    throttle: f64,
    brake: f64,
    steering_angle: f64,
    brake_superpose: [f64; 4],
}

impl DynamicsComponent {
    pub fn new(meta: ComponentMeta, geometry: &VehicleGeometry, initial_velocity: f64) -> Self {
        let mut vehicle = VehicleSimpleTT::new();
        vehicle.init_set_engine(geometry.mass, geometry.power_engine, geometry.torque_brake_limit);
        vehicle.init_set_geometry(geometry.wheelbase, geometry.distance_cog_to_front_axle, geometry.track_width, geometry.gravity);
        vehicle.init_set_tire(
            initial_velocity,
            geometry.tire_force_peak_max,
            geometry.tire_force_slide,
            geometry.tire_slip_peak_max,
            geometry.tire_radius,
            geometry.tire_friction_scale,
        );

        Self {
            meta,
            vehicle,
            mass: geometry.mass,
            moment_inertia_yaw: geometry.moment_inertia_yaw,
            position: Vector2d::ZERO,
            yaw: 0.0,
            velocity_car: Vector2d::new(initial_velocity, 0.0),
            yaw_velocity: 0.0,
            acceleration_car: Vector2d::ZERO,
            yaw_acceleration: 0.0,
            throttle: 0.0,
            brake: 0.0,
            steering_angle: 0.0,
            brake_superpose: [0.0; 4],
        }
    }

    pub fn id(&self) -> ComponentId {
        self.meta.id
    }

    pub fn kinematic_state(&self) -> KinematicState {
        KinematicState {
            position: self.position,
            yaw: self.yaw,
            velocity: self.velocity_car,
            yaw_rate: self.yaw_velocity,
            acceleration: self.acceleration_car,
            yaw_acceleration: self.yaw_acceleration,
        }
    }

    pub fn set_pose(&mut self, position: Vector2d, yaw: f64) {
        self.position = position;
        self.yaw = yaw;
    }

    fn step(&mut self, dt_s: f64) {
        self.vehicle.set_velocity(self.velocity_car, self.yaw_velocity);
        self.vehicle.drive_train(self.throttle, self.brake, &self.brake_superpose);

        let vertical = self.vehicle.force_tire_vertical_static;
        self.vehicle.force_local(dt_s, self.steering_angle, &vertical);
        self.vehicle.force_global();

        let mut velocity_new = self.velocity_car + self.acceleration_car * dt_s;
        let mut acceleration_new = self.vehicle.force_total_xy * (1.0 / self.mass);

        if velocity_new.x * self.velocity_car.x < 0.0 {
            velocity_new.x = 0.0;
            acceleration_new.x = 0.0;
        }
        if velocity_new.y * self.velocity_car.y < 0.0 {
            velocity_new.y = 0.0;
            acceleration_new.y = 0.0;
        }

        let position_new = self.position + self.velocity_car.rotated(self.yaw) * dt_s;

        let mut yaw_velocity_new = self.yaw_velocity + self.yaw_acceleration * dt_s;
        let mut yaw_acceleration_new = self.vehicle.moment_total_z / self.moment_inertia_yaw;
        if yaw_velocity_new * self.yaw_velocity < 0.0 {
            yaw_velocity_new = 0.0;
            yaw_acceleration_new = 0.0;
        }
        let yaw_new = normalize_angle(self.yaw + self.yaw_velocity * dt_s);

        self.position = position_new;
        self.yaw = yaw_new;
        self.velocity_car = velocity_new;
        self.yaw_velocity = yaw_velocity_new;
        self.acceleration_car = acceleration_new;
        self.yaw_acceleration = yaw_acceleration_new;
    }

}

impl Component for DynamicsComponent {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn update_input(&mut self, port_id: u8, signal: &Signal, _t: Tick) -> ComponentResult<()> {
        let value = signal
            .as_scalar()
            .ok_or(op_component::ComponentError::InvalidSignalType(self.meta.id, port_id))?;

        match port_id {
            PORT_THROTTLE => self.throttle = saturate(value, 0.0, 1.0),
            PORT_BRAKE => self.brake = saturate(value, 0.0, 1.0),
            PORT_STEERING_ANGLE => self.steering_angle = value,
            _ => return Err(op_component::ComponentError::InvalidLink(self.meta.id, port_id)),
        }
        Ok(())
    }

    fn update_output(&mut self, port_id: u8, _t: Tick) -> ComponentResult<Signal> {
        match port_id {
            PORT_KINEMATIC_STATE => Ok(Signal::KinematicState(self.kinematic_state())),
            PORT_INERTIA_FORCE => Ok(Signal::Vector(self.vehicle.force_total_xy * -1.0)),
            _ => Err(op_component::ComponentError::InvalidLink(self.meta.id, port_id)),
        }
    }

    fn trigger(&mut self, _t: Tick) -> ComponentResult<()> {
        let dt_s = self.meta.cycle_time_ms as f64 / 1000.0;
        self.step(dt_s);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> VehicleGeometry {
        VehicleGeometry {
            mass: 1500.0,
            power_engine: 100_000.0,
            torque_brake_limit: 6000.0,
            wheelbase: 2.7,
            distance_cog_to_front_axle: 1.3,
            track_width: 1.6,
            moment_inertia_yaw: 2500.0,
            tire_force_peak_max: 5000.0,
            tire_force_slide: 4000.0,
            tire_slip_peak_max: 0.1,
            tire_radius: 0.3,
            tire_friction_scale: 1.0,
            gravity: 9.81,
        }
    }

    fn meta() -> ComponentMeta {
        ComponentMeta {
            id: ComponentId(0),
            kind: ComponentKind::Dynamics,
            priority: 0,
            cycle_time_ms: 100,
            offset_ms: 0,
            response_time_ms: 0,
            init: false,
        }
    }

    #[test]
    fn throttle_accelerates_a_standing_vehicle_forward() {
        // Velocity integrates against the *previous* tick's acceleration
        // (still zero right after construction), so the first trigger only
        // populates that acceleration; the second is where it shows up.
        let mut component = DynamicsComponent::new(meta(), &geometry(), 0.0);
        component.update_input(PORT_THROTTLE, &Signal::Scalar(1.0), Tick::ZERO).unwrap();
        component.trigger(Tick::ZERO).unwrap();
        component.trigger(Tick::ZERO).unwrap();
        assert!(component.velocity_car.x > 0.0);
    }

    #[test]
    fn brake_decelerates_a_moving_vehicle() {
        let mut component = DynamicsComponent::new(meta(), &geometry(), 15.0);
        component.update_input(PORT_BRAKE, &Signal::Scalar(1.0), Tick::ZERO).unwrap();
        component.trigger(Tick::ZERO).unwrap();
        component.trigger(Tick::ZERO).unwrap();
        assert!(component.velocity_car.x < 15.0);
    }

    #[test]
    fn full_brake_never_reverses_velocity_sign() {
        let mut component = DynamicsComponent::new(meta(), &geometry(), 0.05);
        component.update_input(PORT_BRAKE, &Signal::Scalar(1.0), Tick::ZERO).unwrap();
        for _ in 0..50 {
            component.trigger(Tick::ZERO).unwrap();
        }
        assert!(component.velocity_car.x >= 0.0);
    }

    #[test]
    fn unknown_input_port_is_rejected() {
        let mut component = DynamicsComponent::new(meta(), &geometry(), 0.0);
        let err = component.update_input(9, &Signal::Scalar(1.0), Tick::ZERO).unwrap_err();
        assert!(matches!(err, op_component::ComponentError::InvalidLink(_, 9)));
    }
}
