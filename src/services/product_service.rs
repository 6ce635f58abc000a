// src/services/product_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::products::{CreateProductPayload, Product},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    pub async fn create(&self, payload: CreateProductPayload) -> Result<Product, AppError> {
        let seller_id = payload
            .seller_id
            .ok_or(AppError::MissingParameter("sellerId"))?;

        self.product_repo
            .create(
                self.product_repo.pool(),
                seller_id,
                &payload.name,
                payload.category_name.as_deref(),
                payload.price,
                payload.sale_price,
                payload.stock,
                &payload.currency,
            )
            .await
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .get_by_id(self.product_repo.pool(), product_id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }
}
