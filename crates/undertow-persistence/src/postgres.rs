//! PostgreSQL adapter for the [`DocumentStore`] port.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use undertow_types::CrawledDoc;

use crate::{is_admitted, DocumentStore, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS crawled_data (
    url        TEXT PRIMARY KEY,
    title      TEXT,
    snippet    TEXT,
    image_url  TEXT,
    date       TEXT,
    language   TEXT,
    type       TEXT,
    pdf_url    TEXT,
    content    TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const UPSERT: &str = r#"
INSERT INTO crawled_data
    (url, title, snippet, image_url, date, pdf_url, content, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
ON CONFLICT (url) DO UPDATE SET
    title = EXCLUDED.title,
    snippet = EXCLUDED.snippet,
    image_url = EXCLUDED.image_url,
    date = EXCLUDED.date,
    pdf_url = EXCLUDED.pdf_url,
    content = EXCLUDED.content,
    updated_at = EXCLUDED.updated_at
"#;

const SELECT: &str = r#"
SELECT url, title, snippet, image_url, date, pdf_url, content
FROM crawled_data WHERE url = $1
"#;

/// Document store over a shared `PgPool`.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect to the database and make sure the table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        info!("document store connected");
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    fn bind_doc<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        doc: &'q CrawledDoc,
        now: chrono::DateTime<Utc>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        query
            .bind(&doc.url)
            .bind(&doc.title)
            .bind(&doc.snippet)
            .bind(&doc.image_url)
            .bind(&doc.date)
            .bind(&doc.pdf_url)
            .bind(&doc.content)
            .bind(now)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, url: &str) -> Result<Option<CrawledDoc>, StoreError> {
        let row = sqlx::query(SELECT)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| CrawledDoc {
            url: row.get::<Option<String>, _>("url").unwrap_or_default(),
            title: row.get::<Option<String>, _>("title").unwrap_or_default(),
            snippet: row.get::<Option<String>, _>("snippet").unwrap_or_default(),
            image_url: row.get::<Option<String>, _>("image_url").unwrap_or_default(),
            date: row.get::<Option<String>, _>("date").unwrap_or_default(),
            pdf_url: row.get::<Option<String>, _>("pdf_url").unwrap_or_default(),
            content: row.get::<Option<String>, _>("content").unwrap_or_default(),
        }))
    }

    async fn put(&self, doc: &CrawledDoc) -> Result<(), StoreError> {
        if !is_admitted(&doc.url) {
            debug!(url = %doc.url, "document not admitted, skipping write");
            return Ok(());
        }
        let now = Utc::now();
        Self::bind_doc(sqlx::query(UPSERT), doc, now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn put_bulk(&self, docs: &[CrawledDoc]) -> Result<(), StoreError> {
        let admitted: Vec<&CrawledDoc> = docs.iter().filter(|d| is_admitted(&d.url)).collect();
        if admitted.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for doc in &admitted {
            Self::bind_doc(sqlx::query(UPSERT), doc, now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!(count = admitted.len(), "bulk write committed");
        Ok(())
    }
}
