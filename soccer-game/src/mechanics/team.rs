use ql::learn::Parameter;
use rand::rngs::StdRng;

use crate::algebra_2d::Vec2;
use crate::config::TeamSetup;
use crate::mechanics::pitch::{Pitch, Side};
use crate::mechanics::player::Player;
use crate::mechanics::policy::Policy;
use crate::mechanics::role::Role;

pub const TEAM_SIZE: usize = 11;

pub struct Team {
    pub name: String,
    pub color: String,
    pub side: Side,
    /// kick accuracy of all players
    pub accuracy: f32,
    /// save-ability of all players
    pub saves: f32,
    pub players: Vec<Player>,
    pub score: u32,
}

/// Kickoff positions of a left-side team in creation order: GK, D1, M1, D2, M2, .. D4, M4, F1, F2
fn formation(pitch: &Pitch) -> Vec<(Role, String, Vec2)> {
    let (w, h) = (pitch.width, pitch.height);
    let mut formation = vec![(Role::Goalkeeper, Role::Goalkeeper.label().to_string(), Vec2::new(w / 10.0, h / 2.0))];
    for k in 1..=4 {
        let y = h * k as f32 / 5.0;
        formation.push((Role::Defender, format!("{}{}", Role::Defender.label(), k), Vec2::new(w / 5.0, y)));
        formation.push((Role::Midfielder, format!("{}{}", Role::Midfielder.label(), k), Vec2::new(w / 2.0 - w / 8.0, y)));
    }
    for k in 1..=2 {
        formation.push((Role::Forward, format!("{}{}", Role::Forward.label(), k), Vec2::new(w / 2.0 - w / 6.0, h * k as f32 / 3.0)));
    }
    formation
}

impl Team {
    pub fn new(
        setup: &TeamSetup,
        side: Side,
        pitch: &Pitch,
        learning: &Parameter,
        rng: &mut StdRng,
    ) -> Self {
        let players = formation(pitch)
            .into_iter()
            .map(|(role, label, pos)| {
                let start = Vec2::new(pitch.mirror_x(pos.x, side), pos.y);
                Player::new(
                    format!("{} {}", setup.name, label),
                    side,
                    role,
                    start,
                    setup.saves,
                    setup.accuracy,
                    Policy::for_role(role, learning, rng),
                )
            })
            .collect();

        Self {
            name: setup.name.clone(),
            color: setup.color.clone(),
            side,
            accuracy: setup.accuracy,
            saves: setup.saves,
            players,
            score: 0,
        }
    }

    pub fn reset_positions(&mut self) {
        self.players.iter_mut().for_each(|p| p.reset_position());
    }

    /// drops the pending transitions of all players
    pub fn forget_transitions(&mut self) {
        self.players.iter_mut().for_each(|p| p.last_transition = None);
    }

    /// Sets each player's skill to the value `skill_of` knows for the player's name
    pub fn update_skills<F>(
        &mut self,
        skill_of: F,
    ) where
        F: Fn(&str) -> Option<f32>,
    {
        for player in self.players.iter_mut() {
            if let Some(skill) = skill_of(&player.name) {
                log::debug!("{} skill {:.3} -> {:.3}", player.name, player.skill, skill);
                player.skill = skill;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use crate::config::MatchParameter;

    use super::*;

    fn team(side: Side) -> Team {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        Team::new(&param.teams[0], side, &pitch, &param.learning, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_roster() {
        let team = team(Side::Left);
        assert_eq!(team.players.len(), TEAM_SIZE);
        let count = |role: Role| team.players.iter().filter(|p| p.role == role).count();
        assert_eq!(count(Role::Goalkeeper), 1);
        assert_eq!(count(Role::Defender), 4);
        assert_eq!(count(Role::Midfielder), 4);
        assert_eq!(count(Role::Forward), 2);
        let labels: Vec<&str> = team.players.iter().map(|p| p.name.trim_start_matches("Real Madrid ")).collect();
        assert_eq!(labels, ["GK", "D1", "M1", "D2", "M2", "D3", "M3", "D4", "M4", "F1", "F2"]);
    }

    #[test]
    fn test_formation_is_mirrored() {
        let left = team(Side::Left);
        let right = team(Side::Right);
        assert_eq!(left.players[0].start_position, Vec2::new(105.0, 340.0));
        assert_eq!(right.players[0].start_position, Vec2::new(945.0, 340.0));
        for (l, r) in left.players.iter().zip(right.players.iter()) {
            assert!((l.start_position.x + r.start_position.x - 1050.0).abs() < 1e-3);
            assert_eq!(l.start_position.y, r.start_position.y);
        }
    }

    #[test]
    fn test_players_start_inside_their_zone() {
        let param = MatchParameter::default();
        let pitch = Pitch::new(&param);
        for side in [Side::Left, Side::Right] {
            for p in team(side).players {
                let (min, max) = p.role.zone(side, &pitch);
                assert!((min..=max).contains(&p.start_position.x), "{} at {}", p.name, p.start_position);
            }
        }
    }

    #[test]
    fn test_update_skills() {
        let mut team = team(Side::Left);
        team.update_skills(|name| if name == "Real Madrid M2" { Some(0.25) } else { None });
        assert_eq!(team.players[4].skill, 0.25);
        assert_eq!(team.players[3].skill, 0.7);
    }

    #[test]
    fn test_reset_positions() {
        let mut team = team(Side::Right);
        team.players[3].position = Vec2::new(1.0, 2.0);
        team.players[3].velocity = Vec2::new(1.0, 1.0);
        team.reset_positions();
        assert_eq!(team.players[3].position, team.players[3].start_position);
        assert_eq!(team.players[3].velocity, Vec2::zeros());
    }
}
