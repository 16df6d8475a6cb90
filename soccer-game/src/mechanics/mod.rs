pub mod action;
pub mod ball;
pub mod match_engine;
pub mod pass_tracker;
pub mod pitch;
pub mod player;
pub mod policy;
pub mod reward;
pub mod role;
pub mod state_encoder;
pub mod team;
