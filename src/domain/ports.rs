use crate::domain::model::{BootstrapStatus, DateWindow, InsertReceipt, Record, RunRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Object store for archived batches.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Document database holding one document per run.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn database_exists(&self) -> Result<bool>;
    async fn collection_exists(&self) -> Result<bool>;
    /// Largest `to_date` over all stored runs, `None` when there are none.
    async fn max_to_date(&self) -> Result<Option<NaiveDate>>;
    async fn insert_run(&self, run: &RunRecord) -> Result<InsertReceipt>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn bucket_name(&self) -> &str;
    fn default_from_date(&self) -> NaiveDate;
    fn request_timeout_seconds(&self) -> Option<u64>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn bootstrap(&self) -> Result<BootstrapStatus>;
    async fn resolve_window(&self) -> Result<DateWindow>;
    async fn extract(&self, window: &DateWindow) -> Result<Vec<Record>>;
    async fn persist(&self, run: &RunRecord) -> Result<InsertReceipt>;
    /// Uploads the batch and returns the object key.
    async fn archive(&self, window: &DateWindow, records: &[Record]) -> Result<String>;
}
