use crate::mechanics::pitch::{Pitch, Side};
use crate::mechanics::role::Role;
use crate::mechanics::state_encoder::Observation;

pub const GOAL_REWARD: f32 = 5.0;

const BOUNDARY_PENALTY: f32 = -0.09;
const BOUNDARY_DISTANCE: f32 = 5.0;

const MIDFIELD_CROWDING_PENALTY: f32 = -0.2;
const MIDFIELD_SPACING_BONUS: f32 = 0.05;
const MIDFIELD_SPACING: f32 = 75.0;

const BALL_REACHABLE_REWARD: f32 = 0.3;
const BALL_NEAR_REWARD: f32 = 0.2;
const BALL_NEAR_DISTANCE: f32 = 150.0;
const BALL_FAR_PENALTY: f32 = -0.02;

/// Reward of the previous tick's outcome for the observing player.
///
/// `goal_for` is the side that scored during the tick, if any.
/// A goal replaces the ball proximity term.
pub fn reward(
    observation: &Observation,
    pitch: &Pitch,
    contact_range: f32,
    goal_for: Option<Side>,
) -> f32 {
    let mut reward = 0.0;

    if pitch.distance_to_boundary(observation.position) <= BOUNDARY_DISTANCE {
        reward += BOUNDARY_PENALTY;
    }

    if observation.role == Role::Midfielder {
        reward += if observation.nearest_teammate_with_role(Role::Midfielder) < MIDFIELD_SPACING {
            MIDFIELD_CROWDING_PENALTY
        } else {
            MIDFIELD_SPACING_BONUS
        };
    }

    let distance_to_ball = observation.distance_to_ball();
    reward += match goal_for {
        Some(side) if side == observation.side => GOAL_REWARD,
        Some(_) => -GOAL_REWARD,
        None if distance_to_ball <= contact_range => BALL_REACHABLE_REWARD,
        None if distance_to_ball < BALL_NEAR_DISTANCE => BALL_NEAR_REWARD,
        None => BALL_FAR_PENALTY,
    };
    reward
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::algebra_2d::Vec2;
    use crate::config::MatchParameter;

    use super::*;

    fn observation(
        role: Role,
        position: Vec2,
        ball_position: Vec2,
    ) -> Observation {
        Observation {
            side: Side::Left,
            role,
            position,
            ball_position,
            ball_velocity: Vec2::zeros(),
            teammates: vec![(Role::Midfielder, Vec2::new(200.0, 100.0)), (Role::Defender, Vec2::new(300.0, 600.0))],
            opponents: vec![Vec2::new(900.0, 340.0)],
        }
    }

    fn approx(
        a: f32,
        b: f32,
    ) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_center_player_far_from_ball() {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        let o = observation(Role::Defender, pitch.center(), pitch.center() + Vec2::new(200.0, 0.0));
        assert!(approx(reward(&o, &pitch, param.contact_range(), None), -0.02));
    }

    #[rstest]
    #[case(Vec2::new(20.0, 0.0), 0.3)]
    #[case(Vec2::new(32.0, 0.0), 0.3)]
    #[case(Vec2::new(100.0, 0.0), 0.2)]
    #[case(Vec2::new(150.0, 0.0), -0.02)]
    fn test_ball_proximity(
        #[case] offset: Vec2,
        #[case] expected: f32,
    ) {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        let o = observation(Role::Forward, pitch.center(), pitch.center() + offset);
        assert!(approx(reward(&o, &pitch, param.contact_range(), None), expected));
    }

    #[rstest]
    #[case(Some(Side::Left), 5.0)]
    #[case(Some(Side::Right), -5.0)]
    fn test_goal_overrides_ball_proximity(
        #[case] goal_for: Option<Side>,
        #[case] expected: f32,
    ) {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        let o = observation(Role::Defender, pitch.center(), pitch.center() + Vec2::new(10.0, 0.0));
        assert!(approx(reward(&o, &pitch, param.contact_range(), goal_for), expected));
    }

    #[test]
    fn test_boundary_penalty() {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        let o = observation(Role::Defender, Vec2::new(3.0, 340.0), Vec2::new(525.0, 340.0));
        assert!(approx(reward(&o, &pitch, param.contact_range(), None), -0.09 - 0.02));
    }

    #[rstest]
    #[case(Vec2::new(250.0, 100.0), -0.2 - 0.02)]
    #[case(Vec2::new(500.0, 100.0), 0.05 - 0.02)]
    fn test_midfielder_spacing(
        #[case] position: Vec2,
        #[case] expected: f32,
    ) {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        let o = observation(Role::Midfielder, position, Vec2::new(900.0, 600.0));
        assert!(approx(reward(&o, &pitch, param.contact_range(), None), expected));
    }
}
