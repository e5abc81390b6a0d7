//! Short linear interpolations that hide the gap between 20 Hz snapshots and
//! the render rate.

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::prelude::Vec3;

pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Signed angle to add to `from` to reach `to` the short way round, in
/// `[-PI, PI]`.
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from) % TAU;
    (2.0 * delta) % TAU - delta
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    elapsed: Duration,
    duration: Duration,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp_to(self.to, t)
    }
}

/// Rendered position and yaw of one entity. At most one tween per property is
/// in flight; a new target restarts it from wherever the entity is drawn now.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenedTransform {
    position: Vec3,
    yaw: f32,
    position_tween: Option<Tween<Vec3>>,
    yaw_tween: Option<Tween<f32>>,
    duration: Duration,
}

impl TweenedTransform {
    pub fn new(position: Vec3, yaw: f32, duration: Duration) -> Self {
        Self {
            position,
            yaw,
            position_tween: None,
            yaw_tween: None,
            duration,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unwrapped; may drift outside `[-PI, PI]` after many turns.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_animating(&self) -> bool {
        self.position_tween.is_some() || self.yaw_tween.is_some()
    }

    pub fn retarget_position(&mut self, target: Vec3) {
        if self.duration.is_zero() {
            self.position = target;
            self.position_tween = None;
            return;
        }
        self.position_tween = Some(Tween::new(self.position, target, self.duration));
    }

    pub fn retarget_yaw(&mut self, target: f32) {
        let end = self.yaw + shortest_angle_delta(self.yaw, target);
        if self.duration.is_zero() {
            self.yaw = end;
            self.yaw_tween = None;
            return;
        }
        self.yaw_tween = Some(Tween::new(self.yaw, end, self.duration));
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Some(tween) = &mut self.position_tween {
            tween.advance(dt);
            self.position = tween.value();
            if tween.is_finished() {
                self.position_tween = None;
            }
        }
        if let Some(tween) = &mut self.yaw_tween {
            tween.advance(dt);
            self.yaw = tween.value();
            if tween.is_finished() {
                self.yaw_tween = None;
            }
        }
    }
}
