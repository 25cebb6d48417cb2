use serde::Serialize;

/// Control identifiers held this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControlInput {
    pub forward: bool,
    pub reverse: bool,
    pub nitro: bool,
}

impl ControlInput {
    pub fn drive_intent(&self) -> DriveIntent {
        match (self.forward, self.reverse) {
            (true, false) => DriveIntent::Accelerate,
            (false, true) => DriveIntent::Reverse,
            _ => DriveIntent::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveIntent {
    Accelerate,
    Reverse,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

/// Single owned aggregate mutated only by `VehicleSimulator::tick`.
/// `y` is the body centre in screen space (down is positive).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    pub grounded: bool,
    pub nitro_fuel: f32,
    pub nitro_active: bool,
    pub current_air_time: f32,
    pub max_air_time: f32,
    pub landing_bounce: f32,
}

impl VehicleState {
    pub fn at_rest(x: f32, y: f32, nitro_fuel: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            rotation: 0.0,
            grounded: true,
            nitro_fuel,
            nitro_active: false,
            current_air_time: 0.0,
            max_air_time: 0.0,
            landing_bounce: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vx.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_pedals_resolve_to_idle() {
        let both = ControlInput {
            forward: true,
            reverse: true,
            nitro: true,
        };
        assert_eq!(both.drive_intent(), DriveIntent::Idle);
        assert_eq!(ControlInput::default().drive_intent(), DriveIntent::Idle);
        assert_eq!(
            ControlInput {
                forward: true,
                ..ControlInput::default()
            }
            .drive_intent(),
            DriveIntent::Accelerate
        );
        assert_eq!(
            ControlInput {
                reverse: true,
                ..ControlInput::default()
            }
            .drive_intent(),
            DriveIntent::Reverse
        );
    }
}
