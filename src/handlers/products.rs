// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, models::products::CreateProductPayload,
};

// POST /api/marketplace/products
#[utoipa::path(
    post,
    path = "/api/marketplace/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado"),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/marketplace/products/{id}
#[utoipa::path(
    get,
    path = "/api/marketplace/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get(product_id).await?;
    Ok(Json(product))
}
