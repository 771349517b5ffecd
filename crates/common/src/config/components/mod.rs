pub mod connections;
pub mod models;
pub mod project;
pub mod replication;
pub mod resources;
