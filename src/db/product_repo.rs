// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::products::Product};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn get_by_id<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
        name: &str,
        category_name: Option<&str>,
        price: Decimal,
        sale_price: Option<Decimal>,
        stock: i32,
        currency: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (seller_id, name, category_name, price, sale_price, stock, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(seller_id)
        .bind(name)
        .bind(category_name)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(currency)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Mantido pelo fluxo de variantes: o produto sabe se tem variantes
    /// para a tela de produto poder pular o seletor por completo.
    pub async fn set_has_variants<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        has_variants: bool,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE products SET has_variants = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .bind(has_variants)
        .execute(executor)
        .await?;
        Ok(())
    }
}
