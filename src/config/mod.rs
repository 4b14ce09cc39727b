#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

use crate::core::fetcher::DEFAULT_API_ENDPOINT;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FROM_DATE: &str = "2023-02-08";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub name: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_from_date")]
    pub default_from_date: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub bucket: String,
    /// Overrides the region the AWS SDK resolves from its environment
    #[serde(default)]
    pub region: Option<String>,
    /// Custom S3-compatible endpoint, e.g. MinIO or LocalStack
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_from_date() -> String {
    DEFAULT_FROM_DATE.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_from_date: default_from_date(),
            timeout_seconds: None,
        }
    }
}

impl IngestConfig {
    /// 從環境變數建立配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| EtlError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        let timeout_seconds = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: "REQUEST_TIMEOUT_SECONDS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            database: DatabaseConfig {
                connection_string: required("CONNECTION_STRING")?,
                name: required("DATABASE_NAME")?,
                collection: required("COLLECTION_NAME")?,
            },
            source: SourceConfig {
                endpoint: lookup("API_ENDPOINT").unwrap_or_else(default_endpoint),
                default_from_date: lookup("DEFAULT_FROM_DATE").unwrap_or_else(default_from_date),
                timeout_seconds,
            },
            archive: ArchiveConfig {
                bucket: required("BUCKET_NAME")?,
                region: lookup("S3_REGION"),
                endpoint: lookup("S3_ENDPOINT"),
            },
        })
    }
}

impl ConfigProvider for IngestConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn bucket_name(&self) -> &str {
        &self.archive.bucket
    }

    fn default_from_date(&self) -> NaiveDate {
        // validate() 已檢查格式
        NaiveDate::parse_from_str(&self.source.default_from_date, validation::DATE_FORMAT)
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2023, 2, 8).unwrap_or_default())
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }
}

impl Validate for IngestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string(
            "database.connection_string",
            &self.database.connection_string,
        )?;
        validation::validate_non_empty_string("database.name", &self.database.name)?;
        validation::validate_non_empty_string("database.collection", &self.database.collection)?;

        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_date("source.default_from_date", &self.source.default_from_date)?;
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 900)?;
        }

        validation::validate_bucket_name("archive.bucket", &self.archive.bucket)?;
        if let Some(region) = &self.archive.region {
            validation::validate_region("archive.region", region)?;
        }
        if let Some(endpoint) = &self.archive.endpoint {
            validation::validate_url("archive.endpoint", endpoint)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "complaint-etl")]
#[command(about = "Incremental consumer-complaint ingestion")]
pub struct CliConfig {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Local directory standing in for the object-store bucket
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Resolve and print the next window without fetching or writing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
