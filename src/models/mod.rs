pub mod args;
pub mod artifact;
pub mod config;
pub mod patient;
pub mod prediction;
