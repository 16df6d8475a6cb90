use crate::algebra_2d::{clamp_length, reflected_vector, Vec2};
use crate::config::MatchParameter;
use crate::mechanics::pitch::{Pitch, Side};

#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(
        position: Vec2,
        radius: f32,
    ) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            radius,
        }
    }

    pub fn reset(
        &mut self,
        position: Vec2,
    ) {
        self.position = position;
        self.velocity = Vec2::zeros();
    }

    pub fn speed(&self) -> f32 { self.velocity.norm() }

    /// Replaces the ball's velocity by `direction` with `power` speed (capped at `max_speed`)
    pub fn kick(
        &mut self,
        direction: Vec2,
        power: f32,
        max_speed: f32,
    ) {
        let direction = direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros);
        self.velocity = clamp_length(direction * power, max_speed);
    }

    /// physically move one time step forward
    ///
    /// # Returns
    ///   the side that scored, when the ball crossed a goal line inside the goal mouth
    pub fn proceed(
        &mut self,
        pitch: &Pitch,
        param: &MatchParameter,
    ) -> Option<Side> {
        self.velocity = clamp_length(self.velocity, param.ball_max_speed);
        self.position += self.velocity;
        self.velocity *= param.ball_friction;
        if self.velocity.norm() < param.ball_stop_threshold {
            self.velocity = Vec2::zeros();
        }

        let r = self.radius;
        if pitch.in_goal_mouth(self.position.y) {
            if self.position.x - r <= 0.0 {
                return Some(Side::Right);
            }
            if self.position.x + r >= pitch.width {
                return Some(Side::Left);
            }
        }

        if self.position.x - r < 0.0 {
            self.position.x = r;
            self.bounce(Vec2::new(1.0, 0.0), param.restitution);
        } else if self.position.x + r > pitch.width {
            self.position.x = pitch.width - r;
            self.bounce(Vec2::new(-1.0, 0.0), param.restitution);
        }
        if self.position.y - r < 0.0 {
            self.position.y = r;
            self.bounce(Vec2::new(0.0, 1.0), param.restitution);
        } else if self.position.y + r > pitch.height {
            self.position.y = pitch.height - r;
            self.bounce(Vec2::new(0.0, -1.0), param.restitution);
        }
        None
    }

    fn bounce(
        &mut self,
        surface_normal: Vec2,
        restitution: f32,
    ) {
        // only reflect a ball moving into the wall
        if self.velocity.dot(&surface_normal) < 0.0 {
            self.velocity = reflected_vector(self.velocity, surface_normal) * restitution;
        }
    }
}
