use crate::core::{DateWindow, RunStore};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// 計算本次要抓取的日期區間
///
/// `from_date` is the largest `to_date` already stored, or `default_from`
/// when the collection does not exist yet or holds no runs. `to_date` is
/// always `today`.
pub async fn resolve_window<R: RunStore + ?Sized>(
    store: &R,
    default_from: NaiveDate,
    today: NaiveDate,
) -> Result<DateWindow> {
    let mut from_date = default_from;

    if store.collection_exists().await? {
        if let Some(max_to_date) = store.max_to_date().await? {
            tracing::debug!("Stored watermark: {}", max_to_date);
            from_date = max_to_date;
        }
    } else {
        tracing::debug!("Collection not found, using default from_date {}", default_from);
    }

    Ok(DateWindow::new(from_date, today))
}
