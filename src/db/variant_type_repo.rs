// src/db/variant_type_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{VariantKind, VariantTypeRow},
};

#[derive(Clone)]
pub struct VariantTypeRepository {
    pool: PgPool,
}

impl VariantTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_by_seller<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
    ) -> Result<Vec<VariantTypeRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VariantTypeRow>(
            "SELECT * FROM variant_types WHERE seller_id = $1 ORDER BY sort_order ASC, display_name ASC",
        )
        .bind(seller_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_seller_and_kind<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
        kind: VariantKind,
    ) -> Result<Vec<VariantTypeRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VariantTypeRow>(
            r#"
            SELECT * FROM variant_types
            WHERE seller_id = $1 AND kind = $2
            ORDER BY sort_order ASC, display_name ASC
            "#,
        )
        .bind(seller_id)
        .bind(kind)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<VariantTypeRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, VariantTypeRow>(
            "SELECT * FROM variant_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
        name: &str,
        display_name: &str,
        kind: VariantKind,
        options: &Value,
        required: bool,
        multi_select: bool,
        product_categories: &Value,
        sort_order: i32,
    ) -> Result<VariantTypeRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, VariantTypeRow>(
            r#"
            INSERT INTO variant_types
                (seller_id, name, display_name, kind, options, required, multi_select, product_categories, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(seller_id)
        .bind(name)
        .bind(display_name)
        .bind(kind)
        .bind(options)
        .bind(required)
        .bind(multi_select)
        .bind(product_categories)
        .bind(sort_order)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // Atualização parcial: campos None mantêm o valor atual (COALESCE).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        display_name: Option<&str>,
        kind: Option<VariantKind>,
        options: Option<&Value>,
        required: Option<bool>,
        multi_select: Option<bool>,
        product_categories: Option<&Value>,
        sort_order: Option<i32>,
        is_active: Option<bool>,
    ) -> Result<VariantTypeRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, VariantTypeRow>(
            r#"
            UPDATE variant_types SET
                name               = COALESCE($2, name),
                display_name       = COALESCE($3, display_name),
                kind               = COALESCE($4, kind),
                options            = COALESCE($5, options),
                required           = COALESCE($6, required),
                multi_select       = COALESCE($7, multi_select),
                product_categories = COALESCE($8, product_categories),
                sort_order         = COALESCE($9, sort_order),
                is_active          = COALESCE($10, is_active),
                updated_at         = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(display_name)
        .bind(kind)
        .bind(options)
        .bind(required)
        .bind(multi_select)
        .bind(product_categories)
        .bind(sort_order)
        .bind(is_active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::VariantTypeNotFound)?;
        Ok(row)
    }

    /// Exclusão lógica: o fluxo normal nunca remove a linha.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE variant_types SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::VariantTypeNotFound);
        }
        Ok(())
    }

    pub async fn hard_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM variant_types WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::VariantTypeNotFound);
        }
        Ok(())
    }
}
