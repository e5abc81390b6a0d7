//! Procedural posing. Every evaluation starts from the bind pose and layers
//! walk, fly/swim, glide, sneak and attack contributions in that order; a
//! later layer that sets an axis replaces whatever an earlier one put there.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

use bevy::prelude::Vec3;

use crate::registry::{
    BIPED_BODY, BIPED_HEAD, BIPED_LEFT_ARM, BIPED_LEFT_LEG, BIPED_RIGHT_ARM, BIPED_RIGHT_LEG,
    QUADRUPED_LEGS,
};
use crate::skeleton::{Bone, Skeleton};

pub const ATTACK_DURATION_TICKS: u32 = 6;

/// Horizontal speed (blocks per tick) below which an entity counts as standing.
pub const MOVING_THRESHOLD: f32 = 0.01;

const WALK_RATE: f32 = 0.15;
const FLY_RATE: f32 = 0.3;
const SNEAK_RATE: f32 = 0.08;

const LEG_SWING: f32 = 0.6;
const ARM_SWING_FACTOR: f32 = 0.6;
const BODY_BOB_FACTOR: f32 = 0.3;
const SWIM_SWING: f32 = 0.3;
const GLIDE_ARM_SPREAD: f32 = 0.3;
const SNEAK_LEAN: f32 = 0.5;
const SNEAK_DROP: f32 = -2.0;
const ATTACK_TWIST: f32 = 0.5;

/// What the animation driver is told about an entity's motion this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionInput {
    /// Blocks per tick.
    pub velocity: Vec3,
    pub is_flying: bool,
    pub is_sneaking: bool,
    pub is_swimming: bool,
    pub is_gliding: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    pub is_moving: bool,
    pub is_flying: bool,
    pub is_sneaking: bool,
    pub is_swimming: bool,
    pub is_gliding: bool,
    pub is_attacking: bool,
    /// Limb-swing phase. Only advances while moving.
    pub walk_cycle: f32,
    pub attack_time: u32,
    pub velocity: Vec3,
}

impl AnimationState {
    /// Latches `input`, advances the walk cycle and counts the attack down.
    pub fn update(&mut self, input: &MotionInput) {
        let speed = input.velocity.x.hypot(input.velocity.z);
        self.is_moving = speed > MOVING_THRESHOLD;
        self.velocity = input.velocity;
        self.is_flying = input.is_flying;
        self.is_sneaking = input.is_sneaking;
        self.is_swimming = input.is_swimming;
        self.is_gliding = input.is_gliding;

        if self.is_moving {
            let rate = if self.is_flying {
                FLY_RATE
            } else if self.is_sneaking {
                SNEAK_RATE
            } else {
                WALK_RATE
            };
            self.walk_cycle += rate * speed * 10.0;
        }

        if self.attack_time > 0 {
            self.attack_time -= 1;
        }
        if self.attack_time == 0 {
            self.is_attacking = false;
        }
    }

    pub fn attack(&mut self) {
        self.is_attacking = true;
        self.attack_time = ATTACK_DURATION_TICKS;
    }

    /// 1.0 right after `attack()`, falling towards 0.0; `None` once finished.
    pub fn attack_progress(&self) -> Option<f32> {
        (self.attack_time > 0).then(|| self.attack_time as f32 / ATTACK_DURATION_TICKS as f32)
    }
}

fn pose(skeleton: &mut Skeleton, name: &str, f: impl FnOnce(&mut Bone)) {
    if let Some(bone) = skeleton.get_mut(name) {
        f(bone);
    }
}

/// Resets `skeleton` to its bind pose and applies the layered pose for `state`.
/// Bones a model does not have are skipped.
pub fn apply_pose(state: &AnimationState, skeleton: &mut Skeleton) {
    skeleton.reset_to_bind();
    let attacking = state.attack_time > 0;

    if state.is_moving && !state.is_flying {
        let swing = state.walk_cycle.sin() * LEG_SWING;
        let bob = swing.abs() * BODY_BOB_FACTOR;

        pose(skeleton, BIPED_LEFT_LEG, |b| b.rotation.x += swing);
        pose(skeleton, BIPED_RIGHT_LEG, |b| b.rotation.x -= swing);
        pose(skeleton, BIPED_LEFT_ARM, |b| b.rotation.x -= swing * ARM_SWING_FACTOR);
        if !attacking {
            pose(skeleton, BIPED_RIGHT_ARM, |b| b.rotation.x += swing * ARM_SWING_FACTOR);
        }
        pose(skeleton, BIPED_BODY, |b| b.offset.y = bob * 0.5);

        // Diagonal pairs: leg0 with leg3, leg1 with leg2.
        for (idx, leg) in QUADRUPED_LEGS.iter().enumerate() {
            let sign = if idx == 0 || idx == 3 { 1.0 } else { -1.0 };
            pose(skeleton, leg, |b| b.rotation.x += swing * sign);
        }
    }

    if state.is_flying || state.is_swimming {
        let swim = (state.walk_cycle * 2.0).sin() * SWIM_SWING;

        pose(skeleton, BIPED_LEFT_LEG, |b| b.rotation.x = swim);
        pose(skeleton, BIPED_RIGHT_LEG, |b| b.rotation.x = -swim);
        pose(skeleton, BIPED_LEFT_ARM, |b| b.rotation.x = -swim);
        if !attacking {
            pose(skeleton, BIPED_RIGHT_ARM, |b| b.rotation.x = swim);
        }
    }

    if state.is_gliding {
        pose(skeleton, BIPED_LEFT_ARM, |b| {
            b.rotation.x = -FRAC_PI_2;
            b.rotation.z = -GLIDE_ARM_SPREAD;
        });
        pose(skeleton, BIPED_RIGHT_ARM, |b| {
            b.rotation.x = -FRAC_PI_2;
            b.rotation.z = GLIDE_ARM_SPREAD;
        });
        pose(skeleton, BIPED_LEFT_LEG, |b| b.rotation.x = FRAC_PI_4);
        pose(skeleton, BIPED_RIGHT_LEG, |b| b.rotation.x = FRAC_PI_4);
    }

    if state.is_sneaking && !state.is_flying {
        pose(skeleton, BIPED_BODY, |b| {
            b.rotation.x = SNEAK_LEAN;
            b.offset.y = SNEAK_DROP;
        });
        pose(skeleton, BIPED_HEAD, |b| b.rotation.x = -SNEAK_LEAN);
        pose(skeleton, BIPED_LEFT_LEG, |b| b.rotation.x += SNEAK_LEAN);
        pose(skeleton, BIPED_RIGHT_LEG, |b| b.rotation.x += SNEAK_LEAN);
    }

    if let Some(progress) = state.attack_progress() {
        pose(skeleton, BIPED_RIGHT_ARM, |b| {
            b.rotation.x = -FRAC_PI_2 + (1.0 - progress) * FRAC_PI_3;
            b.rotation.y = progress * ATTACK_TWIST;
        });
    }
}
