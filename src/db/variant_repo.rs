// src/db/variant_repo.rs

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::variants::VariantRow};

#[derive(Clone)]
pub struct VariantRepository {
    pool: PgPool,
}

impl VariantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn get_by_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<VariantRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VariantRow>(
            "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY created_at ASC",
        )
        .bind(product_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sku: &str,
        combinations: &Value,
        price: Decimal,
        sale_price: Option<Decimal>,
        stock: i32,
        is_active: bool,
        is_default: bool,
    ) -> Result<VariantRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VariantRow>(
            r#"
            INSERT INTO product_variants
                (product_id, sku, combinations, price, sale_price, stock, is_active, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(sku)
        .bind(combinations)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(is_active)
        .bind(is_default)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // As constraints do banco são a última linha de defesa dos
            // invariantes de unicidade; aqui viram erros de domínio.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("combination") {
                        return AppError::DuplicateCombination;
                    }
                    if constraint.contains("default") {
                        return AppError::DefaultVariantAlreadyExists;
                    }
                }
            }
            e.into()
        })
    }

    // Atualização parcial (COALESCE), igual ao padrão dos outros repos.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
        sku: Option<&str>,
        price: Option<Decimal>,
        sale_price: Option<Decimal>,
        stock: Option<i32>,
        is_active: Option<bool>,
        is_default: Option<bool>,
    ) -> Result<VariantRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VariantRow>(
            r#"
            UPDATE product_variants SET
                sku        = COALESCE($2, sku),
                price      = COALESCE($3, price),
                sale_price = COALESCE($4, sale_price),
                stock      = COALESCE($5, stock),
                is_active  = COALESCE($6, is_active),
                is_default = COALESCE($7, is_default),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(variant_id)
        .bind(sku)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(is_active)
        .bind(is_default)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DefaultVariantAlreadyExists;
                }
            }
            AppError::from(e)
        })?
        .ok_or(AppError::VariantNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, variant_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
            .bind(variant_id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::VariantNotFound);
        }
        Ok(())
    }

    pub async fn delete_by_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
