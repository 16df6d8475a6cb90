use ql::prelude::StateVector;

use crate::algebra_2d::{clamp_length, Vec2};
use crate::mechanics::action::PlayerAction;
use crate::mechanics::ball::Ball;
use crate::mechanics::pitch::Side;
use crate::mechanics::policy::Policy;
use crate::mechanics::role::Role;

/// Position of a player within a match: team index and index within the team
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerId {
    pub team: usize,
    pub index: usize,
}

pub struct Player {
    pub name: String,
    pub side: Side,
    pub role: Role,
    pub position: Vec2,
    pub velocity: Vec2,
    pub start_position: Vec2,
    /// save / pass success ability (0..=1)
    pub skill: f32,
    /// (0..=1); a kick deviates by up to ±(1 - kick_accuracy) · 90°
    pub kick_accuracy: f32,
    pub policy: Policy,
    /// state and action of the last tick, awaiting their reward
    pub last_transition: Option<(StateVector, PlayerAction)>,
}

impl Player {
    pub fn new(
        name: String,
        side: Side,
        role: Role,
        start_position: Vec2,
        skill: f32,
        kick_accuracy: f32,
        policy: Policy,
    ) -> Self {
        Self {
            name,
            side,
            role,
            position: start_position,
            velocity: Vec2::zeros(),
            start_position,
            skill,
            kick_accuracy,
            policy,
            last_transition: None,
        }
    }

    pub fn reset_position(&mut self) {
        self.position = self.start_position;
        self.velocity = Vec2::zeros();
    }

    pub fn distance_to(
        &self,
        pos: Vec2,
    ) -> f32 {
        (pos - self.position).norm()
    }

    pub fn can_reach(
        &self,
        ball: &Ball,
        contact_range: f32,
    ) -> bool {
        self.distance_to(ball.position) <= contact_range
    }

    /// moves by `displacement`, limited to `max_speed`
    pub fn move_by(
        &mut self,
        displacement: Vec2,
        max_speed: f32,
    ) {
        self.velocity = clamp_length(displacement, max_speed);
        self.position += self.velocity;
    }

    pub fn stand(&mut self) { self.velocity = Vec2::zeros(); }
}
