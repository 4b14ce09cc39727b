// Adapters layer: concrete implementations for external systems.
// Object-store backends live next to their entry-point config (config::cli, config::lambda).

pub mod mongo;

pub use mongo::MongoRunStore;
