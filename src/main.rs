use clap::Parser;
use complaint_etl::core::{Pipeline, RunOutcome};
use complaint_etl::utils::{logger, validation::Validate};
use complaint_etl::{
    CliConfig, ComplaintPipeline, EtlEngine, EtlError, IngestConfig, LocalStorage, MongoRunStore,
};

fn load_config(cli: &CliConfig) -> complaint_etl::Result<IngestConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            IngestConfig::from_file(path)?
        }
        None => IngestConfig::from_env()?,
    };
    config.validate()?;
    complaint_etl::utils::validation::validate_path("output_path", &cli.output_path)?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: IngestConfig) -> complaint_etl::Result<()> {
    let store = MongoRunStore::connect(
        &config.database.connection_string,
        &config.database.name,
        &config.database.collection,
    )
    .await?;
    let storage = LocalStorage::new(cli.output_path.clone());
    let pipeline = ComplaintPipeline::new(store, storage, config)?;

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No data will be fetched or written");
        let window = pipeline.resolve_window().await?;
        if window.is_caught_up() {
            println!("Up to date at {}", window.to_date_str());
        } else {
            println!("Next window: {} -> {}", window, window.object_key());
        }
        pipeline.into_parts().0.shutdown().await;
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);
    let result = engine.run().await;
    engine.into_pipeline().into_parts().0.shutdown().await;

    match result? {
        RunOutcome::UpToDate(window) => {
            println!("✅ Already up to date ({})", window.to_date_str());
        }
        RunOutcome::Completed(summary) => {
            println!(
                "✅ Ingested {} records for {}",
                summary.records, summary.window
            );
            println!(
                "📁 Output saved to: {}/{}",
                cli.output_path, summary.object_key
            );
            if !summary.persisted {
                println!("⚠️  Run record was not stored in the database");
            }
        }
    }

    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting complaint-etl");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = run(&cli, config).await {
        exit_with(&e);
    }

    Ok(())
}
