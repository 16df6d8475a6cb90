pub mod algebra_2d;
pub mod config;
pub mod log;
pub mod mechanics;
pub mod persistence;
pub mod runner;
