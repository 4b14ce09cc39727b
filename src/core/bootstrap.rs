use crate::core::{BootstrapStatus, RunStore};
use crate::utils::error::Result;

/// Reports whether the target database already exists.
///
/// Document databases create the database and collection on first insert, so
/// this never writes anything and calling it repeatedly has no side effects.
pub async fn ensure_database<R: RunStore + ?Sized>(store: &R) -> Result<BootstrapStatus> {
    if store.database_exists().await? {
        return Ok(BootstrapStatus::AlreadyExists);
    }

    // 資料庫會在第一次 insert 時建立
    Ok(BootstrapStatus::Created)
}
