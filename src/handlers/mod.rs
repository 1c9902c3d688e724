// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod groups;
pub mod health;
pub mod uploads;

pub use groups::config as groups_config;
pub use health::config as health_config;
pub use uploads::config as uploads_config;
