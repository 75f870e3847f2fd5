//! SQLite-backed record source

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

use super::RecordSource;
use crate::errors::SourceError;
use crate::models::{Field, RecordId, RecordRow, RecordUpdate};

pub struct SqliteSource {
    pool: SqlitePool,
}

/// Row layout accepted by `import_csv`
#[derive(Debug, Deserialize)]
struct CsvAccount {
    #[serde(rename = "Id", default)]
    id: Option<String>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type", default)]
    account_type: Option<String>,
}

impl SqliteSource {
    pub async fn new(database_path: &str) -> Result<Self, SourceError> {
        // Create database if it doesn't exist
        if !Path::new(database_path).exists() {
            std::fs::File::create(database_path)?;
        }

        let database_url = format!("sqlite://{}", database_path);
        let pool = SqlitePool::connect(&database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                account_type TEXT,
                last_modified TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_account_type ON accounts(account_type);
            CREATE INDEX IF NOT EXISTS idx_account_name ON accounts(name);
            "#,
        )
        .execute(&pool)
        .await?;

        debug!("Opened account store at {}", database_path);
        Ok(SqliteSource { pool })
    }

    pub async fn insert_record(&self, record: &RecordRow) -> Result<(), SourceError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO accounts (id, name, account_type, last_modified)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(record.account_type.as_deref())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load accounts from a CSV file with `Id,Name,Type` headers.
    /// Rows without an id get a generated one.
    pub async fn import_csv(&self, csv_path: &str) -> Result<usize, SourceError> {
        let mut reader = csv::Reader::from_path(csv_path)?;
        let mut count = 0;

        for result in reader.deserialize::<CsvAccount>() {
            let account = result?;
            let id = match account.id.filter(|id| !id.trim().is_empty()) {
                Some(id) => RecordId::new(id.trim()),
                None => RecordId::generate(),
            };
            let account_type = account
                .account_type
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());

            self.insert_record(&RecordRow {
                id,
                name: account.name.trim().to_string(),
                account_type,
            })
            .await?;
            count += 1;
        }

        info!("Imported {} accounts from {}", count, csv_path);
        Ok(count)
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> RecordRow {
        RecordRow {
            id: RecordId::new(row.get::<String, _>("id")),
            name: row.get("name"),
            account_type: row.get("account_type"),
        }
    }
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
        let rows = sqlx::query(
            "SELECT DISTINCT account_type FROM accounts \
             WHERE account_type IS NOT NULL AND account_type != '' \
             ORDER BY account_type ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("account_type")).collect())
    }

    async fn list_records(&self, category_filter: &str) -> Result<Vec<RecordRow>, SourceError> {
        let rows = if category_filter.is_empty() {
            sqlx::query("SELECT id, name, account_type FROM accounts ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query(
                "SELECT id, name, account_type FROM accounts WHERE account_type = ? ORDER BY name ASC",
            )
            .bind(category_filter)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    async fn update_record(&self, update: &RecordUpdate) -> Result<(), SourceError> {
        if let Some(name) = update.fields.get(&Field::Name) {
            if name.trim().is_empty() {
                return Err(SourceError::Rejected(
                    "Required fields are missing: [Name]".to_string(),
                ));
            }
        }

        let exists = sqlx::query("SELECT 1 FROM accounts WHERE id = ?")
            .bind(update.id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if !exists {
            return Err(SourceError::NotFound(update.id.clone()));
        }

        if update.fields.is_empty() {
            return Ok(());
        }

        // Column names come from the closed `Field` enum, never from input
        let assignments: Vec<String> = update
            .fields
            .keys()
            .map(|field| format!("{} = ?", field.column_name()))
            .collect();
        let sql = format!(
            "UPDATE accounts SET {}, last_modified = ? WHERE id = ?",
            assignments.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for value in update.fields.values() {
            query = query.bind(value.as_str());
        }
        query
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(update.id.as_str())
            .execute(&self.pool)
            .await?;

        debug!("Updated account {} ({} fields)", update.id, update.fields.len());
        Ok(())
    }
}
