use crate::core::fetcher::ComplaintFetcher;
use crate::core::{
    bootstrap, watermark, BootstrapStatus, Clock, ConfigProvider, DateWindow, InsertReceipt,
    Pipeline, Record, RunRecord, RunStore, Storage, SystemClock,
};
use crate::utils::error::Result;

/// Watermark-driven ingestion of consumer complaints.
///
/// The database handle, object store and configuration are all injected; the
/// pipeline holds no process-wide state.
pub struct ComplaintPipeline<R: RunStore, S: Storage, C: ConfigProvider> {
    store: R,
    storage: S,
    config: C,
    fetcher: ComplaintFetcher,
    clock: Box<dyn Clock>,
}

impl<R: RunStore, S: Storage, C: ConfigProvider> ComplaintPipeline<R, S, C> {
    pub fn new(store: R, storage: S, config: C) -> Result<Self> {
        let fetcher = match config.request_timeout_seconds() {
            Some(timeout) => ComplaintFetcher::with_timeout(config.api_endpoint(), timeout)?,
            None => ComplaintFetcher::new(config.api_endpoint()),
        };

        Ok(Self {
            store,
            storage,
            config,
            fetcher,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Releases the injected collaborators, e.g. to shut down the database client.
    pub fn into_parts(self) -> (R, S, C) {
        (self.store, self.storage, self.config)
    }
}

#[async_trait::async_trait]
impl<R: RunStore, S: Storage, C: ConfigProvider> Pipeline for ComplaintPipeline<R, S, C> {
    async fn bootstrap(&self) -> Result<BootstrapStatus> {
        bootstrap::ensure_database(&self.store).await
    }

    async fn resolve_window(&self) -> Result<DateWindow> {
        watermark::resolve_window(
            &self.store,
            self.config.default_from_date(),
            self.clock.today(),
        )
        .await
    }

    async fn extract(&self, window: &DateWindow) -> Result<Vec<Record>> {
        self.fetcher.fetch(window).await
    }

    async fn persist(&self, run: &RunRecord) -> Result<InsertReceipt> {
        self.store.insert_run(run).await
    }

    async fn archive(&self, window: &DateWindow, records: &[Record]) -> Result<String> {
        let key = window.object_key();
        let body = serde_json::to_vec(records)?;

        tracing::debug!(
            "Writing {} bytes to {}/{}",
            body.len(),
            self.config.bucket_name(),
            key
        );
        self.storage.write_file(&key, &body).await?;

        Ok(key)
    }
}
