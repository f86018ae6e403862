use crate::db::{
    errors::Result,
    handlers::repository::{ImageRepository, page_offset},
    models::images::{ImageCreateDBRequest, ImageDBResponse},
};
use sqlx::PgPool;
use tracing::instrument;

/// PostgreSQL-backed record repository (`images` table)
#[derive(Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ImageRepository for PostgresImageRepository {
    #[instrument(skip(self, request), fields(path = %request.path), err)]
    async fn save_results(&self, request: &ImageCreateDBRequest) -> Result<ImageDBResponse> {
        let record = sqlx::query_as::<_, ImageDBResponse>(
            r#"
            INSERT INTO images (path, result)
            VALUES ($1, $2)
            RETURNING id, path, result, uploaded_at
            "#,
        )
        .bind(&request.path)
        .bind(&request.result)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn get_history(&self, page: i64, per_page: i64) -> Result<Vec<ImageDBResponse>> {
        let records = sqlx::query_as::<_, ImageDBResponse>(
            r#"
            SELECT id, path, result, uploaded_at
            FROM images
            ORDER BY uploaded_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page.max(1))
        .bind(page_offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
