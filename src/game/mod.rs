pub mod animation;
pub mod entity;
pub mod layout;
pub mod orchestrator;
pub mod sink;
