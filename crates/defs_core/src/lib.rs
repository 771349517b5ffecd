pub mod assets;
pub mod automation;
pub mod bundle;
pub mod context;
pub mod elt;
pub mod entry;
pub mod error;
pub mod freshness;
pub mod grouping;
pub mod lineage;
pub mod models;
pub mod partitions;
pub mod platform;
pub mod replication;
