use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::rc::Rc;

use anyhow::Result;

/// Data type we use to encode an `Action` to feed the model.
pub type ModelActionType = u8;

/// Feature vector describing what an agent observes.
/// Shared between the `state` of one experience and the `next_state` of its predecessor.
pub type StateVector = Rc<[f32]>;

pub trait Action: Display + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    fn try_from_numeric(value: ModelActionType) -> Result<Self>;
}

#[derive(Debug)]
pub struct QlError(pub String);

impl QlError {
    pub fn from(msg: &str) -> Self { QlError(msg.to_string()) }
}

impl Display for QlError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for QlError {}
