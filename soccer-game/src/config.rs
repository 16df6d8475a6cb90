use std::path::Path;

use anyhow::{Context, Result};
use ql::learn::Parameter;
use serde::{Deserialize, Serialize};

use crate::mechanics::role::Role;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    pub name: String,
    pub color: String,
    /// kick accuracy of the team's players (0..=1)
    pub accuracy: f32,
    /// save-ability of the team's players (0..=1)
    pub saves: f32,
}

/// All tunable constants of a match.
/// TOP / LEFT corner of the pitch is 0/0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParameter {
    pub pitch_width: f32,
    pub pitch_height: f32,
    pub goal_mouth_height: f32,
    pub penalty_area_width: f32,
    /// ticks per second
    pub fps: u64,
    pub round_duration_secs: u64,
    pub rounds: u32,
    pub countdown_secs: u64,

    pub player_radius: f32,
    pub ball_radius: f32,
    pub kick_range: f32,

    /// ball velocity factor per tick
    pub ball_friction: f32,
    pub restitution: f32,
    pub ball_max_speed: f32,
    /// ball speeds below are zeroed
    pub ball_stop_threshold: f32,

    pub goalkeeper_max_speed: f32,
    pub defender_max_speed: f32,
    pub midfielder_max_speed: f32,
    pub forward_max_speed: f32,
    pub outfield_move_speed: f32,
    pub defender_hold_speed: f32,

    pub shot_power: f32,
    pub tackle_power: f32,
    pub clear_pass_power: f32,
    pub punt_power: f32,

    pub midfielder_separation_distance: f32,
    pub midfielder_separation_strength: f32,
    pub teammate_separation_distance: f32,
    pub teammate_separation_strength: f32,

    /// passes shorter than this are classified as short
    pub short_pass_distance: f32,

    pub learning: Parameter,
    pub teams: [TeamSetup; 2],
}

impl Default for MatchParameter {
    fn default() -> Self {
        Self {
            pitch_width: 1050.0,
            pitch_height: 680.0,
            goal_mouth_height: 150.0,
            penalty_area_width: 150.0,
            fps: 60,
            round_duration_secs: 45,
            rounds: 2,
            countdown_secs: 3,
            player_radius: 10.0,
            ball_radius: 7.0,
            kick_range: 15.0,
            ball_friction: 0.98,
            restitution: 0.8,
            ball_max_speed: 25.0,
            ball_stop_threshold: 0.1,
            goalkeeper_max_speed: 3.0,
            defender_max_speed: 2.5,
            midfielder_max_speed: 2.8,
            forward_max_speed: 3.0,
            outfield_move_speed: 3.0,
            defender_hold_speed: 1.8,
            shot_power: 20.0,
            tackle_power: 10.0,
            clear_pass_power: 12.0,
            punt_power: 15.0,
            midfielder_separation_distance: 120.0,
            midfielder_separation_strength: 2.0,
            teammate_separation_distance: 40.0,
            teammate_separation_strength: 1.0,
            short_pass_distance: 200.0,
            learning: Parameter::default(),
            teams: [
                TeamSetup {
                    name: "Real Madrid".to_string(),
                    color: "red".to_string(),
                    accuracy: 0.8,
                    saves: 0.7,
                },
                TeamSetup {
                    name: "Kairat".to_string(),
                    color: "yellow".to_string(),
                    accuracy: 0.6,
                    saves: 0.5,
                },
            ],
        }
    }
}

impl MatchParameter {
    /// Reads a JSON file; absent fields keep their default value
    pub fn load(file: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(file).with_context(|| format!("failed to read config file {}", file.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid config file {}", file.display()))
    }

    pub fn round_ticks(&self) -> u64 { self.fps * self.round_duration_secs }

    pub fn countdown_ticks(&self) -> u64 { self.fps * self.countdown_secs }

    /// length of one training episode: a full match without countdowns
    pub fn training_tick_budget(&self) -> u64 { self.round_ticks() * self.rounds as u64 }

    /// distance within which a player may act on the ball
    pub fn contact_range(&self) -> f32 { self.player_radius + self.ball_radius + self.kick_range }

    /// keeps players completely on the pitch
    pub fn boundary_margin(&self) -> f32 { self.player_radius }

    pub fn max_speed(
        &self,
        role: Role,
    ) -> f32 {
        match role {
            Role::Goalkeeper => self.goalkeeper_max_speed,
            Role::Defender => self.defender_max_speed,
            Role::Midfielder => self.midfielder_max_speed,
            Role::Forward => self.forward_max_speed,
        }
    }
}
