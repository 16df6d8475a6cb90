use crate::algebra_2d::{min_distance, Vec2};
use crate::config::MatchParameter;
use crate::mechanics::pitch::{Pitch, Side};
use crate::mechanics::role::Role;

/// What a player perceives of the match at one instant
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub side: Side,
    pub role: Role,
    pub position: Vec2,
    pub ball_position: Vec2,
    pub ball_velocity: Vec2,
    /// all teammates except the observing player
    pub teammates: Vec<(Role, Vec2)>,
    pub opponents: Vec<Vec2>,
}

impl Observation {
    pub fn distance_to_ball(&self) -> f32 { (self.ball_position - self.position).norm() }

    /// distance to the nearest teammate with `role`
    pub fn nearest_teammate_with_role(
        &self,
        role: Role,
    ) -> f32 {
        min_distance(
            self.position,
            self.teammates.iter().filter(|(r, _)| *r == role).map(|(_, pos)| *pos),
        )
    }
}

/// Encodes an observation into the role-specific feature vector fed to the player's model.
///
/// Common features (all roles):
///   own x, own y, ball x, ball y (scaled by the pitch extent),
///   ball velocity x, y (scaled by the maximum ball speed)
///
/// Role-specific features (distances scaled by the pitch diagonal):
/// - Goalkeeper: nearest teammate, ball in contact range
/// - Defender: nearest opponent, ball to own goal, own distance to ball, ball in contact range
/// - Midfielder / Forward: nearest teammate of the same role, own distance to ball, ball in contact range
pub fn encode_state(
    observation: &Observation,
    pitch: &Pitch,
    param: &MatchParameter,
) -> Vec<f32> {
    let o = observation;
    let diagonal = pitch.diagonal();
    let in_range = if o.distance_to_ball() <= param.contact_range() { 1.0 } else { 0.0 };

    let mut state = Vec::with_capacity(o.role.state_dim());
    state.extend_from_slice(&[
        o.position.x / pitch.width,
        o.position.y / pitch.height,
        o.ball_position.x / pitch.width,
        o.ball_position.y / pitch.height,
        o.ball_velocity.x / param.ball_max_speed,
        o.ball_velocity.y / param.ball_max_speed,
    ]);

    match o.role {
        Role::Goalkeeper => {
            state.push(min_distance(o.position, o.teammates.iter().map(|(_, pos)| *pos)) / diagonal);
        }
        Role::Defender => {
            state.push(min_distance(o.position, o.opponents.iter().copied()) / diagonal);
            state.push((pitch.goal_center(o.side) - o.ball_position).norm() / diagonal);
            state.push(o.distance_to_ball() / diagonal);
        }
        Role::Midfielder | Role::Forward => {
            state.push(o.nearest_teammate_with_role(o.role) / diagonal);
            state.push(o.distance_to_ball() / diagonal);
        }
    }
    state.push(in_range);

    debug_assert_eq!(state.len(), o.role.state_dim());
    state
}
