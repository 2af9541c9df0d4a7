pub mod events;
pub mod findings;
pub mod models;
pub mod regions;
pub mod reports;
