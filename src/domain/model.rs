use crate::utils::error::Result;
use crate::utils::validation::DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 上游 envelope 裡 `_source` 欄位的內容，不做 schema 檢查，保留欄位順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// One ingestion window. `from_date` is the previous watermark, `to_date` is today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl DateWindow {
    pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self { from_date, to_date }
    }

    pub fn parse(from_date: &str, to_date: &str) -> Result<Self> {
        Ok(Self {
            from_date: NaiveDate::parse_from_str(from_date, DATE_FORMAT)?,
            to_date: NaiveDate::parse_from_str(to_date, DATE_FORMAT)?,
        })
    }

    pub fn from_date_str(&self) -> String {
        self.from_date.format(DATE_FORMAT).to_string()
    }

    pub fn to_date_str(&self) -> String {
        self.to_date.format(DATE_FORMAT).to_string()
    }

    /// A window that is empty or inverted has nothing left to download.
    pub fn is_caught_up(&self) -> bool {
        self.from_date >= self.to_date
    }

    /// `2023-02-08..2023-03-01` -> `2023_02_08_2023_03_01_compliant_data`
    pub fn object_key(&self) -> String {
        format!(
            "{}_{}_compliant_data",
            self.from_date_str().replace('-', "_"),
            self.to_date_str().replace('-', "_")
        )
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.from_date_str(), self.to_date_str())
    }
}

/// 每次執行寫入資料庫的一筆文件
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub complaint_data: Vec<Record>,
}

impl RunRecord {
    pub fn new(window: DateWindow, complaint_data: Vec<Record>) -> Self {
        Self {
            from_date: window.from_date,
            to_date: window.to_date,
            complaint_data,
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from_date, self.to_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReceipt {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStatus {
    /// Database was listed by the server.
    AlreadyExists,
    /// Database is created lazily by the first insert.
    Created,
}

impl BootstrapStatus {
    pub fn message(&self) -> &'static str {
        match self {
            BootstrapStatus::AlreadyExists => "DB already exists",
            BootstrapStatus::Created => "DB & collection created successfully!!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub window: DateWindow,
    pub records: usize,
    pub persisted: bool,
    pub object_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    UpToDate(DateWindow),
    Completed(RunSummary),
}
