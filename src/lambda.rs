use complaint_etl::utils::logger;
use complaint_etl::utils::validation::Validate;
use complaint_etl::{
    ComplaintPipeline, EtlEngine, IngestConfig, InvocationResponse, MongoRunStore, S3Storage,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

/// The trigger event is opaque; scheduled invocations carry nothing we use.
async fn function_handler(event: LambdaEvent<serde_json::Value>) -> Result<InvocationResponse, Error> {
    tracing::info!(request_id = %event.context.request_id, "Starting complaint ingestion");

    let config = IngestConfig::from_env()?;
    config.validate()?;

    // 每次呼叫建立並關閉自己的連線
    let store = MongoRunStore::connect(
        &config.database.connection_string,
        &config.database.name,
        &config.database.collection,
    )
    .await?;
    let storage = S3Storage::from_archive_config(&config.archive).await;
    let engine = EtlEngine::new(ComplaintPipeline::new(store, storage, config)?);

    let response = engine.invoke().await;
    engine.into_pipeline().into_parts().0.shutdown().await;

    let response = response?;
    tracing::info!(body = %response.body, "Complaint ingestion finished");
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
