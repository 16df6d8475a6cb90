use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::algebra_2d::Vec2;
use crate::config::MatchParameter;

/// The half a team defends at kickoff
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// index of this side's team within a match
    pub fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl Display for Side {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Pitch geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pitch {
    pub width: f32,
    pub height: f32,
    pub goal_mouth_height: f32,
    pub penalty_area_width: f32,
    pub margin: f32,
}

impl Pitch {
    pub fn new(param: &MatchParameter) -> Self {
        Self {
            width: param.pitch_width,
            height: param.pitch_height,
            goal_mouth_height: param.goal_mouth_height,
            penalty_area_width: param.penalty_area_width,
            margin: param.boundary_margin(),
        }
    }

    pub fn center(&self) -> Vec2 { Vec2::new(self.width / 2.0, self.height / 2.0) }

    pub fn diagonal(&self) -> f32 { self.width.hypot(self.height) }

    /// (upper, lower) y of the goal mouth
    pub fn goal_mouth(&self) -> (f32, f32) {
        (
            (self.height - self.goal_mouth_height) / 2.0,
            (self.height + self.goal_mouth_height) / 2.0,
        )
    }

    pub fn in_goal_mouth(
        &self,
        y: f32,
    ) -> bool {
        let (upper, lower) = self.goal_mouth();
        (upper..=lower).contains(&y)
    }

    /// center of the goal defended by `side`
    pub fn goal_center(
        &self,
        side: Side,
    ) -> Vec2 {
        match side {
            Side::Left => Vec2::new(0.0, self.height / 2.0),
            Side::Right => Vec2::new(self.width, self.height / 2.0),
        }
    }

    /// maps an x coordinate given for the left side to `side`
    pub fn mirror_x(
        &self,
        x: f32,
        side: Side,
    ) -> f32 {
        match side {
            Side::Left => x,
            Side::Right => self.width - x,
        }
    }

    /// maps an x range given for the left side to `side`
    pub fn mirror_range(
        &self,
        (min, max): (f32, f32),
        side: Side,
    ) -> (f32, f32) {
        match side {
            Side::Left => (min, max),
            Side::Right => (self.width - max, self.width - min),
        }
    }

    pub fn distance_to_boundary(
        &self,
        pos: Vec2,
    ) -> f32 {
        pos.x.min(self.width - pos.x).min(pos.y).min(self.height - pos.y)
    }

    /// clamps `pos` into the x range `zone` and the vertical playing area
    pub fn clamp_into(
        &self,
        pos: Vec2,
        zone: (f32, f32),
    ) -> Vec2 {
        Vec2::new(
            pos.x.clamp(zone.0, zone.1),
            pos.y.clamp(self.margin, self.height - self.margin),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let pitch = Pitch::new(&MatchParameter::default());
        assert_eq!(pitch.center(), Vec2::new(525.0, 340.0));
        assert_eq!(pitch.goal_mouth(), (265.0, 415.0));
        assert!(pitch.in_goal_mouth(265.0));
        assert!(pitch.in_goal_mouth(415.0));
        assert!(!pitch.in_goal_mouth(416.0));
        assert_eq!(pitch.goal_center(Side::Right), Vec2::new(1050.0, 340.0));
    }

    #[test]
    fn test_mirroring() {
        let pitch = Pitch::new(&MatchParameter::default());
        assert_eq!(pitch.mirror_x(105.0, Side::Left), 105.0);
        assert_eq!(pitch.mirror_x(105.0, Side::Right), 945.0);
        assert_eq!(pitch.mirror_range((10.0, 150.0), Side::Right), (900.0, 1040.0));
    }

    #[test]
    fn test_clamp_into() {
        let pitch = Pitch::new(&MatchParameter::default());
        assert_eq!(pitch.clamp_into(Vec2::new(-20.0, 700.0), (10.0, 150.0)), Vec2::new(10.0, 670.0));
        assert_eq!(pitch.distance_to_boundary(Vec2::new(30.0, 340.0)), 30.0);
    }
}
