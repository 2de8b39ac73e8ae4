pub mod artifacts;
pub mod commands;
pub mod config;
pub mod node;
pub mod orchestrator;
pub mod phase;
pub mod scripts;
pub mod topology;
pub mod validation;
