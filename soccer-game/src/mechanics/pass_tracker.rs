use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mechanics::player::PlayerId;
use crate::mechanics::role::Role;

const HIGH_PRESSURE_DISTANCE: f32 = 50.0;
const MEDIUM_PRESSURE_DISTANCE: f32 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassType {
    Short,
    Long,
}

impl PassType {
    pub fn classify(
        distance: f32,
        short_pass_distance: f32,
    ) -> Self {
        if distance < short_pass_distance {
            PassType::Short
        } else {
            PassType::Long
        }
    }
}

/// How closely the receiver is marked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pressure {
    Low,
    Medium,
    High,
}

impl Pressure {
    /// from the distance of the nearest opponent to the receiver
    pub fn classify(defender_proximity: f32) -> Self {
        if defender_proximity < HIGH_PRESSURE_DISTANCE {
            Pressure::High
        } else if defender_proximity < MEDIUM_PRESSURE_DISTANCE {
            Pressure::Medium
        } else {
            Pressure::Low
        }
    }
}

/// A pass on its way, captured at the moment of the kick
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPass {
    pub passer: PlayerId,
    pub target: PlayerId,
    pub passer_name: String,
    pub target_name: String,
    pub passer_role: Role,
    pub target_role: Role,
    pub distance: f32,
    /// heading of the pass in degrees
    pub angle: f32,
    pub defender_proximity: f32,
    pub passer_speed: f32,
    pub target_speed: f32,
    pub passer_skill: f32,
    pub pass_type: PassType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassEvent {
    pub passer: String,
    pub passer_role: Role,
    pub target: String,
    pub target_role: Role,
    /// the player who got the ball first
    pub receiver: String,
    pub distance: f32,
    pub angle: f32,
    pub defender_proximity: f32,
    pub passer_speed: f32,
    pub target_speed: f32,
    pub pass_type: PassType,
    pub pressure: Pressure,
    pub passer_skill: f32,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl Display for PassEvent {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{:?} pass {} -> {} ({:.0}, {:?} pressure): ",
            self.pass_type, self.passer, self.target, self.distance, self.pressure,
        )?;
        if self.success {
            write!(f, "success")
        } else {
            write!(f, "received by {}", self.receiver)
        }
    }
}

/// Follows at most one pass at a time until someone gets the ball
#[derive(Default)]
pub struct PassTracker {
    pending: Option<PendingPass>,
    events: Vec<PassEvent>,
}

impl PassTracker {
    pub fn new() -> Self { Self::default() }

    /// starts tracking `pass`, replacing a pass still under way
    pub fn open(
        &mut self,
        pass: PendingPass,
    ) {
        self.pending = Some(pass);
    }

    pub fn pending(&self) -> Option<&PendingPass> { self.pending.as_ref() }

    pub fn passer(&self) -> Option<PlayerId> { self.pending.as_ref().map(|p| p.passer) }

    /// Resolves the pending pass with the first player other than the passer in contact with the ball.
    /// Returns the produced event.
    pub fn resolve(
        &mut self,
        receiver: PlayerId,
        receiver_name: &str,
    ) -> Option<&PassEvent> {
        match &self.pending {
            Some(pass) if pass.passer != receiver => {}
            _ => return None,
        }
        let pass = self.pending.take()?;
        let success = pass.target == receiver;
        let event = PassEvent {
            passer: pass.passer_name,
            passer_role: pass.passer_role,
            target: pass.target_name,
            target_role: pass.target_role,
            receiver: receiver_name.to_string(),
            distance: pass.distance,
            angle: pass.angle,
            defender_proximity: pass.defender_proximity,
            passer_speed: pass.passer_speed,
            target_speed: pass.target_speed,
            pass_type: pass.pass_type,
            pressure: Pressure::classify(pass.defender_proximity),
            passer_skill: pass.passer_skill,
            success,
            timestamp: Utc::now(),
        };
        log::debug!("{}", event);
        self.events.push(event);
        self.events.last()
    }

    /// drops a pass under way
    pub fn reset(&mut self) { self.pending = None; }

    pub fn take_events(&mut self) -> Vec<PassEvent> { std::mem::take(&mut self.events) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn id(
        team: usize,
        index: usize,
    ) -> PlayerId {
        PlayerId { team, index }
    }

    fn pass() -> PendingPass {
        PendingPass {
            passer: id(0, 0),
            target: id(0, 2),
            passer_name: "A GK".to_string(),
            target_name: "A D2".to_string(),
            passer_role: Role::Goalkeeper,
            target_role: Role::Defender,
            distance: 150.0,
            angle: -30.0,
            defender_proximity: 120.0,
            passer_speed: 0.0,
            target_speed: 1.5,
            passer_skill: 0.7,
            pass_type: PassType::classify(150.0, 200.0),
        }
    }

    #[rstest]
    #[case(10.0, Pressure::High)]
    #[case(50.0, Pressure::Medium)]
    #[case(149.0, Pressure::Medium)]
    #[case(150.0, Pressure::Low)]
    fn test_pressure(
        #[case] proximity: f32,
        #[case] expected: Pressure,
    ) {
        assert_eq!(Pressure::classify(proximity), expected);
    }

    #[test]
    fn test_pass_type() {
        assert_eq!(PassType::classify(199.0, 200.0), PassType::Short);
        assert_eq!(PassType::classify(200.0, 200.0), PassType::Long);
    }

    #[test]
    fn test_passer_does_not_resolve() {
        let mut tracker = PassTracker::new();
        tracker.open(pass());
        assert!(tracker.resolve(id(0, 0), "A GK").is_none());
        assert_eq!(tracker.passer(), Some(id(0, 0)));
    }

    #[test]
    fn test_target_receives() {
        let mut tracker = PassTracker::new();
        tracker.open(pass());
        let event = tracker.resolve(id(0, 2), "A D2").cloned().unwrap();
        assert!(event.success);
        assert_eq!(event.pass_type, PassType::Short);
        assert_eq!(event.pressure, Pressure::Medium);
        assert!(tracker.pending().is_none());
        assert!(tracker.resolve(id(0, 2), "A D2").is_none());
        assert_eq!(tracker.take_events().len(), 1);
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn test_interception_fails_the_pass() {
        let mut tracker = PassTracker::new();
        tracker.open(pass());
        let event = tracker.resolve(id(1, 9), "B F1").cloned().unwrap();
        assert!(!event.success);
        assert_eq!(event.receiver, "B F1");
    }

    #[test]
    fn test_reset_drops_pending_pass() {
        let mut tracker = PassTracker::new();
        tracker.open(pass());
        tracker.reset();
        assert!(tracker.resolve(id(0, 2), "A D2").is_none());
        assert!(tracker.take_events().is_empty());
    }
}
