use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::mechanics::pitch::{Pitch, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    /// short label used in player names
    pub fn label(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "D",
            Role::Midfielder => "M",
            Role::Forward => "F",
        }
    }

    /// number of features the state encoder produces for this role
    pub fn state_dim(&self) -> usize {
        match self {
            Role::Goalkeeper => 8,
            Role::Defender => 10,
            Role::Midfielder | Role::Forward => 9,
        }
    }

    /// Permitted x range for a player of this role on `side`
    pub fn zone(
        &self,
        side: Side,
        pitch: &Pitch,
    ) -> (f32, f32) {
        let w = pitch.width;
        let left_zone = match self {
            Role::Goalkeeper => (pitch.margin, pitch.penalty_area_width),
            Role::Defender => (pitch.margin, 0.6 * w),
            Role::Midfielder => (0.15 * w, 0.85 * w),
            Role::Forward => (0.3 * w, w - pitch.margin),
        };
        pitch.mirror_range(left_zone, side)
    }
}

impl Display for Role {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::config::MatchParameter;

    use super::*;

    #[rstest]
    #[case(Role::Goalkeeper, Side::Left, (10.0, 150.0))]
    #[case(Role::Goalkeeper, Side::Right, (900.0, 1040.0))]
    #[case(Role::Defender, Side::Left, (10.0, 630.0))]
    #[case(Role::Defender, Side::Right, (420.0, 1040.0))]
    #[case(Role::Forward, Side::Left, (315.0, 1040.0))]
    #[case(Role::Forward, Side::Right, (10.0, 735.0))]
    fn test_zone(
        #[case] role: Role,
        #[case] side: Side,
        #[case] expected: (f32, f32),
    ) {
        let pitch = Pitch::new(&MatchParameter::default());
        let (min, max) = role.zone(side, &pitch);
        assert!((min - expected.0).abs() < 1e-3, "{} != {}", min, expected.0);
        assert!((max - expected.1).abs() < 1e-3, "{} != {}", max, expected.1);
    }
}
