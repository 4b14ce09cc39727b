use crate::core::{InsertReceipt, RunRecord, RunStore};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::{Client, Collection, Database};

/// Run records stored one document per run in a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoRunStore {
    client: Client,
    database_name: String,
    collection_name: String,
}

impl MongoRunStore {
    pub fn new(client: Client, database_name: String, collection_name: String) -> Self {
        Self {
            client,
            database_name,
            collection_name,
        }
    }

    pub async fn connect(
        connection_string: &str,
        database_name: &str,
        collection_name: &str,
    ) -> Result<Self> {
        tracing::debug!("Connecting to database {}", database_name);
        let client = Client::with_uri_str(connection_string).await?;
        Ok(Self::new(
            client,
            database_name.to_string(),
            collection_name.to_string(),
        ))
    }

    /// 結束時釋放連線
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    fn collection(&self) -> Collection<Document> {
        self.database().collection(&self.collection_name)
    }
}

pub(crate) fn to_bson_date(date: NaiveDate) -> BsonDateTime {
    BsonDateTime::from_millis(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

pub(crate) fn from_bson_date(value: &Bson) -> Result<Option<NaiveDate>> {
    match value {
        Bson::DateTime(dt) => chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
            .map(|ts| Some(ts.date_naive()))
            .ok_or_else(|| EtlError::ProcessingError {
                message: format!("stored to_date out of range: {}", dt),
            }),
        // 舊資料可能以字串存日期
        Bson::String(s) => Ok(Some(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)),
        Bson::Null => Ok(None),
        other => Err(EtlError::ProcessingError {
            message: format!("unexpected to_date value: {}", other),
        }),
    }
}

pub(crate) fn run_document(run: &RunRecord) -> Result<Document> {
    let complaint_data =
        mongodb::bson::to_bson(&run.complaint_data).map_err(|e| EtlError::ProcessingError {
            message: format!("failed to encode complaint data: {}", e),
        })?;

    Ok(doc! {
        "from_date": to_bson_date(run.from_date),
        "to_date": to_bson_date(run.to_date),
        "compliant_data": complaint_data,
    })
}

#[async_trait]
impl RunStore for MongoRunStore {
    async fn database_exists(&self) -> Result<bool> {
        let names = self.client.list_database_names().await?;
        Ok(names.contains(&self.database_name))
    }

    async fn collection_exists(&self) -> Result<bool> {
        let names = self.database().list_collection_names().await?;
        Ok(names.contains(&self.collection_name))
    }

    async fn max_to_date(&self) -> Result<Option<NaiveDate>> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "max_to_date": { "$max": "$to_date" },
            }
        }];

        let mut cursor = self.collection().aggregate(pipeline).await?;
        if !cursor.advance().await? {
            return Ok(None);
        }

        let group = cursor.deserialize_current()?;
        match group.get("max_to_date") {
            Some(value) => from_bson_date(value),
            None => Ok(None),
        }
    }

    async fn insert_run(&self, run: &RunRecord) -> Result<InsertReceipt> {
        let document = run_document(run)?;
        let result = self.collection().insert_one(document).await?;

        Ok(InsertReceipt {
            acknowledged: true,
            inserted_id: Some(result.inserted_id.to_string()),
        })
    }
}
