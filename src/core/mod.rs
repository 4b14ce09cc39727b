pub mod bootstrap;
pub mod etl;
pub mod fetcher;
pub mod pipeline;
pub mod watermark;

pub use crate::domain::model::{
    BootstrapStatus, DateWindow, InsertReceipt, Record, RunOutcome, RunRecord, RunSummary,
};
pub use crate::domain::ports::{Clock, ConfigProvider, Pipeline, RunStore, Storage, SystemClock};
pub use crate::utils::error::Result;
