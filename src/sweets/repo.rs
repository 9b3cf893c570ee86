use sqlx::PgPool;
use uuid::Uuid;

use crate::sweets::dto::{SearchQuery, SweetFields};
use crate::sweets::repo_types::Sweet;

impl Sweet {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Sweet>> {
        let rows = sqlx::query_as::<_, Sweet>(
            r#"
            SELECT id, name, category, price, quantity, description, image_url, created_at, updated_at
            FROM sweets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Sweet>> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            SELECT id, name, category, price, quantity, description, image_url, created_at, updated_at
            FROM sweets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(sweet)
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<Sweet>> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            SELECT id, name, category, price, quantity, description, image_url, created_at, updated_at
            FROM sweets
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(sweet)
    }

    /// Conjunctive filters; every absent filter is skipped by the
    /// `IS NULL OR` guard, so an empty query behaves like `list_all`.
    pub async fn search(db: &PgPool, query: &SearchQuery) -> anyhow::Result<Vec<Sweet>> {
        let category = query.category.as_deref().map(str::to_lowercase);
        let rows = sqlx::query_as::<_, Sweet>(
            r#"
            SELECT id, name, category, price, quantity, description, image_url, created_at, updated_at
            FROM sweets
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category::text = $2)
              AND ($3::float8 IS NULL OR price >= $3)
              AND ($4::float8 IS NULL OR price <= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&query.name)
        .bind(category)
        .bind(query.min_price)
        .bind(query.max_price)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, fields: &SweetFields) -> anyhow::Result<Sweet> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            INSERT INTO sweets (name, category, price, quantity, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, category, price, quantity, description, image_url, created_at, updated_at
            "#,
        )
        .bind(&fields.name)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_one(db)
        .await?;
        Ok(sweet)
    }

    /// Writes the merged field set. Returns `None` when the row vanished
    /// between the caller's existence check and the write.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        fields: &SweetFields,
    ) -> anyhow::Result<Option<Sweet>> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            UPDATE sweets
            SET name = $2, category = $3, price = $4, quantity = $5,
                description = $6, image_url = $7, updated_at = now()
            WHERE id = $1
            RETURNING id, name, category, price, quantity, description, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.category)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_optional(db)
        .await?;
        Ok(sweet)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM sweets WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomic decrement: the stock check and the write are one statement, so
    /// concurrent purchases cannot drive quantity below zero. `None` means
    /// the row is missing or the stock was insufficient; the caller
    /// distinguishes the two with a follow-up read.
    pub async fn purchase(db: &PgPool, id: Uuid, quantity: i32) -> anyhow::Result<Option<Sweet>> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            UPDATE sweets
            SET quantity = quantity - $2, updated_at = now()
            WHERE id = $1 AND quantity >= $2
            RETURNING id, name, category, price, quantity, description, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(db)
        .await?;
        Ok(sweet)
    }

    /// Atomic increment twin of `purchase`. `None` means the row is missing.
    pub async fn restock(db: &PgPool, id: Uuid, quantity: i32) -> anyhow::Result<Option<Sweet>> {
        let sweet = sqlx::query_as::<_, Sweet>(
            r#"
            UPDATE sweets
            SET quantity = quantity + $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, category, price, quantity, description, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(db)
        .await?;
        Ok(sweet)
    }
}
