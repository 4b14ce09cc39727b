use crate::config::IngestConfig;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl IngestConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${CONNECTION_STRING})，未設定的保留原樣
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[database]
connection_string = "mongodb://localhost:27017"
name = "finance"
collection = "complaints"

[source]
endpoint = "https://api.example.com/search"
timeout_seconds = 60

[archive]
bucket = "complaint-archive"
"#;

        let config = IngestConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.database.name, "finance");
        assert_eq!(config.api_endpoint(), "https://api.example.com/search");
        assert_eq!(config.source.default_from_date, "2023-02-08");
        assert_eq!(config.request_timeout_seconds(), Some(60));
        assert_eq!(config.archive.region, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_section_is_optional() {
        let toml_content = r#"
[database]
connection_string = "mongodb://localhost:27017"
name = "finance"
collection = "complaints"

[archive]
bucket = "complaint-archive"
region = "us-east-1"
"#;

        let config = IngestConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.api_endpoint(),
            crate::core::fetcher::DEFAULT_API_ENDPOINT
        );
        assert_eq!(config.archive.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COMPLAINT_ETL_TEST_CONN", "mongodb://db.internal:27017");

        let toml_content = r#"
[database]
connection_string = "${COMPLAINT_ETL_TEST_CONN}"
name = "finance"
collection = "complaints"

[archive]
bucket = "${COMPLAINT_ETL_TEST_UNSET_BUCKET}"
"#;

        let config = IngestConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.database.connection_string,
            "mongodb://db.internal:27017"
        );
        assert_eq!(config.archive.bucket, "${COMPLAINT_ETL_TEST_UNSET_BUCKET}");
        assert!(config.validate().is_err());

        std::env::remove_var("COMPLAINT_ETL_TEST_CONN");
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let toml_content = r#"
[database]
connection_string = "mongodb://localhost:27017"
name = "finance"
collection = "complaints"
"#;

        let err = IngestConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[database]
connection_string = "mongodb://localhost:27017"
name = "file-test"
collection = "complaints"

[archive]
bucket = "complaint-archive"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = IngestConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.database.name, "file-test");
    }
}
