use crate::core::{Pipeline, RunOutcome, RunRecord, RunSummary};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

pub const UP_TO_DATE_MESSAGE: &str = "Pipeline has already downloaded all the data till date!!";

/// `{status_code, body}` returned to the invoker; `body` is a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(message: &str) -> Result<Self> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(message)?,
        })
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }

    /// Runs bootstrap, watermark, fetch, insert and upload in order.
    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🗄️  Checking database and collection");
        match self.pipeline.bootstrap().await {
            Ok(status) => tracing::info!("{}", status.message()),
            Err(e) => tracing::warn!("⚠️  Bootstrap check failed, continuing: {}", e),
        }

        let window = self.pipeline.resolve_window().await?;
        tracing::info!("📅 Resolved window {}", window);
        if window.is_caught_up() {
            tracing::info!("✅ {}", UP_TO_DATE_MESSAGE);
            return Ok(RunOutcome::UpToDate(window));
        }

        // 抓取失敗時整次執行中止，不寫入任何資料
        tracing::info!("🌐 Fetching complaint data");
        let records = self.pipeline.extract(&window).await?;
        tracing::info!("Fetched {} records", records.len());

        let run = RunRecord::new(window, records);
        tracing::info!("💾 Inserting run record into database");
        let persisted = match self.pipeline.persist(&run).await {
            Ok(receipt) if receipt.acknowledged => {
                tracing::info!("Record entered successfully ({:?})", receipt.inserted_id);
                true
            }
            Ok(_) => {
                tracing::error!("❌ Insert was not acknowledged by the database");
                false
            }
            Err(e) => {
                tracing::error!("❌ Error occurred while inserting data: {}", e);
                false
            }
        };

        tracing::info!("📦 Archiving records to object store");
        let object_key = self.pipeline.archive(&window, &run.complaint_data).await?;
        tracing::info!("📁 Archived to {}", object_key);

        Ok(RunOutcome::Completed(RunSummary {
            window,
            records: run.complaint_data.len(),
            persisted,
            object_key,
        }))
    }

    pub async fn invoke(&self) -> Result<InvocationResponse> {
        match self.run().await? {
            RunOutcome::UpToDate(_) => InvocationResponse::ok(UP_TO_DATE_MESSAGE),
            RunOutcome::Completed(summary) => InvocationResponse::ok(&format!(
                "Ingested {} records for {}",
                summary.records, summary.window
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::ComplaintPipeline;
    use crate::core::testing::{FixedClock, MockConfig, MockRunStore, MockStorage};
    use crate::core::{DateWindow, RunStore};
    use crate::utils::error::EtlError;
    use httpmock::prelude::*;

    fn engine(
        endpoint: String,
        store: &MockRunStore,
        storage: &MockStorage,
        today: &str,
    ) -> EtlEngine<ComplaintPipeline<MockRunStore, MockStorage, MockConfig>> {
        let pipeline =
            ComplaintPipeline::new(store.clone(), storage.clone(), MockConfig::new(endpoint))
                .unwrap()
                .with_clock(FixedClock::parse(today));
        EtlEngine::new(pipeline)
    }

    #[tokio::test]
    async fn test_first_run_ingests_from_default_date() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/")
                .query_param("date_received_min", "2023-02-08")
                .query_param("date_received_max", "2023-03-01");
            then.status(200)
                .json_body(serde_json::json!([{"_source": {"a": 1}}, {"no_source": true}]));
        });
        let store = MockRunStore::new();
        let storage = MockStorage::new();

        let outcome = engine(server.url("/"), &store, &storage, "2023-03-01")
            .run()
            .await
            .unwrap();

        api_mock.assert();
        let expected_window = DateWindow::parse("2023-02-08", "2023-03-01").unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                window: expected_window,
                records: 1,
                persisted: true,
                object_key: "2023_02_08_2023_03_01_compliant_data".to_string(),
            })
        );

        let runs = store.runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].window(), expected_window);
        assert_eq!(
            serde_json::to_value(&runs[0].complaint_data).unwrap(),
            serde_json::json!([{"a": 1}])
        );
        assert!(storage
            .get_file("2023_02_08_2023_03_01_compliant_data")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_second_run_same_day_is_noop() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .json_body(serde_json::json!([{"_source": {"a": 1}}]));
        });
        let store = MockRunStore::new();
        let storage = MockStorage::new();
        let engine = engine(server.url("/"), &store, &storage, "2023-03-01");

        engine.invoke().await.unwrap();
        let response = engine.invoke().await.unwrap();

        api_mock.assert_hits(1);
        assert_eq!(store.insert_count().await, 1);
        assert_eq!(storage.file_count().await, 1);
        assert_eq!(response.status_code, 200);
        assert_eq!(
            serde_json::from_str::<String>(&response.body).unwrap(),
            UP_TO_DATE_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_watermark_advances_across_runs() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).json_body(serde_json::json!([]));
        });
        let store = MockRunStore::new();
        let storage = MockStorage::new();

        for today in ["2023-03-01", "2023-03-02", "2023-03-05", "2023-03-09"] {
            engine(server.url("/"), &store, &storage, today)
                .run()
                .await
                .unwrap();
        }

        let runs = store.runs().await;
        assert_eq!(runs.len(), 4);
        for pair in runs.windows(2) {
            assert_eq!(pair[1].from_date, pair[0].to_date);
        }
        assert!(runs.iter().all(|run| run.to_date >= run.from_date));
        assert_eq!(
            store.max_to_date().await.unwrap(),
            Some(chrono::NaiveDate::from_ymd_opt(2023, 3, 9).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_without_side_effects() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        });
        let store = MockRunStore::new();
        let storage = MockStorage::new();

        let result = engine(server.url("/"), &store, &storage, "2023-03-01")
            .invoke()
            .await;

        assert!(matches!(result, Err(EtlError::ApiError(_))));
        assert_eq!(store.insert_count().await, 0);
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_unacknowledged_insert_still_archives() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .json_body(serde_json::json!([{"_source": {"a": 1}}]));
        });
        let store = MockRunStore::new();
        store.acknowledge_inserts(false).await;
        let storage = MockStorage::new();

        let outcome = engine(server.url("/"), &store, &storage, "2023-03-01")
            .run()
            .await
            .unwrap();

        match outcome {
            RunOutcome::Completed(summary) => {
                assert!(!summary.persisted);
                assert_eq!(summary.records, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(storage.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_error_still_archives() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).json_body(serde_json::json!([]));
        });
        let store = MockRunStore::new();
        store.fail_inserts(true).await;
        let storage = MockStorage::new();

        let outcome = engine(server.url("/"), &store, &storage, "2023-03-01")
            .run()
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Completed(RunSummary { persisted: false, .. })
        ));
        assert_eq!(storage.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_upload_failure_propagates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).json_body(serde_json::json!([]));
        });
        let store = MockRunStore::new();
        let storage = MockStorage::failing();

        let result = engine(server.url("/"), &store, &storage, "2023-03-01")
            .run()
            .await;

        assert!(matches!(result, Err(EtlError::ObjectStoreError { .. })));
        assert_eq!(store.insert_count().await, 1);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_not_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).json_body(serde_json::json!([]));
        });
        let store = MockRunStore::new();
        store.fail_database_listing(true).await;
        let storage = MockStorage::new();

        let response = engine(server.url("/"), &store, &storage, "2023-03-01")
            .invoke()
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(
            serde_json::from_str::<String>(&response.body).unwrap(),
            "Ingested 0 records for 2023-02-08..2023-03-01"
        );
    }

    #[test]
    fn test_invocation_response_body_is_json_string() {
        let response = InvocationResponse::ok("done").unwrap();
        assert_eq!(response.body, "\"done\"");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"status_code": 200, "body": "\"done\""})
        );
    }
}
