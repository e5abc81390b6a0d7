//! Motion flags inferred from consecutive position snapshots. Velocities are
//! in blocks per second; thresholds are tuned for vanilla movement speeds.

use bevy::prelude::Vec3;

const GROUNDED_VERTICAL_SPEED: f32 = 0.05;
const AIRBORNE_VERTICAL_SPEED: f32 = 0.5;
const GLIDE_MIN_SINK: f32 = 0.5;
const GLIDE_MAX_SINK: f32 = 8.0;
const GLIDE_MIN_HORIZONTAL_SPEED: f32 = 6.0;

/// Airborne modes read from the estimate. Whether an entity is walking is
/// judged by the animation driver from its per-tick velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionFlags {
    pub is_flying: bool,
    pub is_gliding: bool,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KinematicEstimate {
    pub last_position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
}

impl KinematicEstimate {
    pub fn new(position: Vec3) -> Self {
        Self {
            last_position: position,
            velocity: Vec3::ZERO,
            on_ground: true,
        }
    }

    /// Feeds the next position. A non-positive `dt` keeps the previous velocity.
    pub fn observe(&mut self, position: Vec3, dt: f32) {
        if dt > 0.0 {
            self.velocity = (position - self.last_position) / dt;

            // Between the two thresholds the previous answer sticks. Only a
            // descent clears it, so a straight climb off the ground keeps
            // reporting ground contact.
            if self.velocity.y.abs() < GROUNDED_VERTICAL_SPEED {
                self.on_ground = true;
            } else if self.velocity.y < -AIRBORNE_VERTICAL_SPEED {
                self.on_ground = false;
            }
        }
        self.last_position = position;
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.x.hypot(self.velocity.z)
    }

    pub fn flags(&self) -> MotionFlags {
        let horizontal = self.horizontal_speed();
        let vy = self.velocity.y;
        let sink = -vy;
        MotionFlags {
            is_flying: vy > AIRBORNE_VERTICAL_SPEED && !self.on_ground,
            is_gliding: (GLIDE_MIN_SINK..=GLIDE_MAX_SINK).contains(&sink)
                && horizontal > GLIDE_MIN_HORIZONTAL_SPEED,
            on_ground: self.on_ground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_block_per_second_along_x() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        estimate.observe(Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(estimate.velocity, Vec3::new(1.0, 0.0, 0.0));

        let flags = estimate.flags();
        assert!(flags.on_ground);
        assert!(!flags.is_flying && !flags.is_gliding);
    }

    #[test]
    fn zero_dt_keeps_velocity_but_moves_position() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        estimate.observe(Vec3::new(2.0, 0.0, 0.0), 0.5);
        estimate.observe(Vec3::new(10.0, 5.0, 0.0), 0.0);
        assert_eq!(estimate.velocity, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(estimate.last_position, Vec3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn ground_contact_has_hysteresis() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        // Climbing at 0.3 b/s: neither threshold, stays grounded.
        estimate.observe(Vec3::new(0.0, 0.3, 0.0), 1.0);
        assert!(estimate.on_ground);

        estimate.observe(Vec3::new(0.0, -0.7, 0.0), 1.0);
        assert!(!estimate.on_ground);

        // Slow descent is ambiguous, so the entity stays airborne.
        estimate.observe(Vec3::new(0.0, -1.0, 0.0), 1.0);
        assert!(!estimate.on_ground);

        estimate.observe(Vec3::new(0.0, -1.0, 0.0), 1.0);
        assert!(estimate.on_ground);
    }

    #[test]
    fn flying_requires_leaving_the_ground() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        estimate.observe(Vec3::new(0.0, 2.0, 0.0), 1.0);
        // Still latched on the ground from the initial state.
        assert!(!estimate.flags().is_flying);

        estimate.on_ground = false;
        assert!(estimate.flags().is_flying);
    }

    #[test]
    fn climbing_off_the_ground_is_not_flight() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        for step in 1..=10 {
            estimate.observe(Vec3::new(0.0, step as f32 * 2.0, 0.0), 0.5);
            let flags = estimate.flags();
            assert!(flags.on_ground, "step {step}");
            assert!(!flags.is_flying, "step {step}");
        }

        // A single descent unlatches the ground; climbing after that is flight.
        estimate.observe(Vec3::new(0.0, 18.0, 0.0), 1.0);
        estimate.observe(Vec3::new(0.0, 20.0, 0.0), 1.0);
        assert!(estimate.flags().is_flying);
    }

    #[test]
    fn gliding_is_fast_and_shallow() {
        let mut estimate = KinematicEstimate::new(Vec3::ZERO);
        estimate.observe(Vec3::new(10.0, -2.0, 0.0), 1.0);
        let flags = estimate.flags();
        assert!(flags.is_gliding);
        assert!(!flags.on_ground);

        estimate.observe(Vec3::new(10.0, -22.0, 0.0), 1.0);
        assert!(!estimate.flags().is_gliding);
    }
}
