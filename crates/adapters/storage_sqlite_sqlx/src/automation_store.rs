//! `SQLite` implementation of [`AutomationStore`].
//!
//! The snapshot is one row per automation with a `position` column holding
//! its index. Saving replaces every row inside a single transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use inksync_app::ports::AutomationStore;
use inksync_domain::automation::{Action, Automation, AutomationKind, Trigger};
use inksync_domain::error::InkSyncError;
use inksync_domain::id::AutomationId;

use crate::error::StorageError;

struct Wrapper(Automation);

fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, sqlx::Error> {
    serde_json::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let enabled: bool = row.try_get("enabled")?;
        let kind: String = row.try_get("kind")?;
        let trigger_json: String = row.try_get("trigger_data")?;
        let actions_json: String = row.try_get("actions")?;

        let kind: AutomationKind = decode(&format!("\"{kind}\""))?;
        let trigger: Trigger = decode(&trigger_json)?;
        let actions: Vec<Action> = decode(&actions_json)?;

        Ok(Self(Automation {
            id: AutomationId::from_uuid(id),
            name,
            enabled,
            kind,
            trigger,
            actions,
        }))
    }
}

const SELECT_ALL: &str = "SELECT * FROM automations ORDER BY position";
const DELETE_ALL: &str = "DELETE FROM automations";
const INSERT: &str = r"
    INSERT INTO automations (id, position, name, enabled, kind, trigger_data, actions)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

/// `SQLite`-backed automation snapshot store.
pub struct SqliteAutomationStore {
    pool: SqlitePool,
}

impl SqliteAutomationStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationStore for SqliteAutomationStore {
    async fn load_all(&self) -> Result<Vec<Automation>, InkSyncError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn save_all(&self, automations: Vec<Automation>) -> Result<(), InkSyncError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        sqlx::query(DELETE_ALL)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        for (position, automation) in automations.iter().enumerate() {
            let position =
                i64::try_from(position).map_err(|_| StorageError::TooLarge(automations.len()))?;
            let trigger_json =
                serde_json::to_string(&automation.trigger).map_err(StorageError::from)?;
            let actions_json =
                serde_json::to_string(&automation.actions).map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(automation.id.as_uuid())
                .bind(position)
                .bind(&automation.name)
                .bind(automation.enabled)
                .bind(automation.kind.to_string())
                .bind(&trigger_json)
                .bind(&actions_json)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;
        tracing::debug!(count = automations.len(), "automation snapshot written");
        Ok(())
    }
}
