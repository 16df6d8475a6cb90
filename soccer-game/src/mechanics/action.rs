use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt::{Display, Formatter};

use anyhow::Result;
use ql::prelude::{Action, ModelActionType, QlError};

use crate::algebra_2d::Vec2;
use crate::mechanics::role::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoalkeeperAction {
    /// move to the point of the goal box in line with the ball
    Intercept,
    /// absorb the ball's momentum
    Block,
    /// pass to a defender (or midfielder) or punt towards midfield
    ClearKick,
}

impl Action for GoalkeeperAction {
    const ACTION_SPACE: ModelActionType = 3;

    fn numeric(&self) -> ModelActionType {
        use GoalkeeperAction::*;
        match self {
            Intercept => 0,
            Block => 1,
            ClearKick => 2,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        use GoalkeeperAction::*;
        match value {
            0 => Ok(Intercept),
            1 => Ok(Block),
            2 => Ok(ClearKick),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Display for GoalkeeperAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefenderAction {
    TackleClear,
    InterceptApproach,
    MoveToBall,
    HoldPosition,
}

impl Action for DefenderAction {
    const ACTION_SPACE: ModelActionType = 4;

    fn numeric(&self) -> ModelActionType {
        use DefenderAction::*;
        match self {
            TackleClear => 0,
            InterceptApproach => 1,
            MoveToBall => 2,
            HoldPosition => 3,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        use DefenderAction::*;
        match value {
            0 => Ok(TackleClear),
            1 => Ok(InterceptApproach),
            2 => Ok(MoveToBall),
            3 => Ok(HoldPosition),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Display for DefenderAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Midfielder and forward actions.
/// North points to y = 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutfieldAction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    /// shoot towards the opponent's goal
    Kick,
    Stay,
}

impl OutfieldAction {
    /// unit vector of a move action
    pub fn direction(&self) -> Option<Vec2> {
        use OutfieldAction::*;
        let d = FRAC_1_SQRT_2;
        match self {
            North => Some(Vec2::new(0.0, -1.0)),
            NorthEast => Some(Vec2::new(d, -d)),
            East => Some(Vec2::new(1.0, 0.0)),
            SouthEast => Some(Vec2::new(d, d)),
            South => Some(Vec2::new(0.0, 1.0)),
            SouthWest => Some(Vec2::new(-d, d)),
            West => Some(Vec2::new(-1.0, 0.0)),
            NorthWest => Some(Vec2::new(-d, -d)),
            Kick | Stay => None,
        }
    }
}

impl Action for OutfieldAction {
    const ACTION_SPACE: ModelActionType = 10;

    fn numeric(&self) -> ModelActionType {
        use OutfieldAction::*;
        match self {
            North => 0,
            NorthEast => 1,
            East => 2,
            SouthEast => 3,
            South => 4,
            SouthWest => 5,
            West => 6,
            NorthWest => 7,
            Kick => 8,
            Stay => 9,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        use OutfieldAction::*;
        match value {
            0 => Ok(North),
            1 => Ok(NorthEast),
            2 => Ok(East),
            3 => Ok(SouthEast),
            4 => Ok(South),
            5 => Ok(SouthWest),
            6 => Ok(West),
            7 => Ok(NorthWest),
            8 => Ok(Kick),
            9 => Ok(Stay),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Display for OutfieldAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An action of any role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Goalkeeper(GoalkeeperAction),
    Defender(DefenderAction),
    Outfield(OutfieldAction),
}

impl PlayerAction {
    /// an action that never touches the ball
    pub fn no_op(role: Role) -> Self {
        match role {
            Role::Goalkeeper => PlayerAction::Goalkeeper(GoalkeeperAction::Block),
            Role::Defender => PlayerAction::Defender(DefenderAction::HoldPosition),
            Role::Midfielder | Role::Forward => PlayerAction::Outfield(OutfieldAction::Stay),
        }
    }

    pub fn fits(
        &self,
        role: Role,
    ) -> bool {
        matches!(
            (self, role),
            (PlayerAction::Goalkeeper(_), Role::Goalkeeper)
                | (PlayerAction::Defender(_), Role::Defender)
                | (PlayerAction::Outfield(_), Role::Midfielder | Role::Forward)
        )
    }
}

impl Display for PlayerAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            PlayerAction::Goalkeeper(a) => write!(f, "{}", a),
            PlayerAction::Defender(a) => write!(f, "{}", a),
            PlayerAction::Outfield(a) => write!(f, "{}", a),
        }
    }
}
