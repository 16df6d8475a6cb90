pub mod agent;
pub mod replay_buffer;

pub use agent::{Parameter, QAgent, updated_q_values};
pub use replay_buffer::{Experience, ReplayBuffer};
