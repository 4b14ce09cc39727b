pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::S3Storage;

pub use adapters::MongoRunStore;
pub use config::IngestConfig;
pub use self::core::{
    etl::{EtlEngine, InvocationResponse},
    pipeline::ComplaintPipeline,
};
pub use utils::error::{EtlError, Result};
