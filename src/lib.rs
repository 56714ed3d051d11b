pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod high_score;
pub mod maze;
pub mod mover;
pub mod rng;
pub mod server_protocol;
pub mod types;
