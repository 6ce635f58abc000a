// src/handlers/variant_types.rs
//
// CRUD de tipos de variante ("eixos") voltado ao vendedor. As formas de
// requisição/resposta seguem o contrato que o front do marketplace já
// consome: envelopes { success, ... } e corpos camelCase.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{CreateVariantTypePayload, UpdateVariantTypePayload, VariantKind},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListVariantTypesQuery {
    pub seller_id: Option<Uuid>,
    pub category: Option<String>,
    pub kind: Option<VariantKind>,
}

// GET /api/marketplace/variant-types
#[utoipa::path(
    get,
    path = "/api/marketplace/variant-types",
    tag = "Variant Types",
    params(ListVariantTypesQuery),
    responses(
        (status = 200, description = "Tipos de variante do vendedor, com opções normalizadas"),
        (status = 400, description = "sellerId ausente")
    )
)]
pub async fn list_variant_types(
    State(app_state): State<AppState>,
    Query(query): Query<ListVariantTypesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let seller_id = query.seller_id.ok_or(AppError::MissingParameter("sellerId"))?;

    let variant_types = app_state
        .catalog_service
        .list_for_seller(seller_id, query.category.as_deref(), query.kind)
        .await?;

    Ok(Json(json!({
        "success": true,
        "variantTypes": variant_types,
    })))
}

// POST /api/marketplace/variant-types
#[utoipa::path(
    post,
    path = "/api/marketplace/variant-types",
    tag = "Variant Types",
    request_body = CreateVariantTypePayload,
    responses(
        (status = 201, description = "Tipo de variante criado"),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_variant_type(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateVariantTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state.catalog_service.create_type(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "variantTypeId": created.id,
        })),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantTypeBody {
    pub id: Uuid,
    pub update_data: UpdateVariantTypePayload,
}

// PUT /api/marketplace/variant-types
#[utoipa::path(
    put,
    path = "/api/marketplace/variant-types",
    tag = "Variant Types",
    request_body = UpdateVariantTypeBody,
    responses(
        (status = 200, description = "Tipo de variante atualizado"),
        (status = 404, description = "Tipo não encontrado")
    )
)]
pub async fn update_variant_type(
    State(app_state): State<AppState>,
    Json(body): Json<UpdateVariantTypeBody>,
) -> Result<impl IntoResponse, AppError> {
    body.update_data.validate()?;

    app_state
        .catalog_service
        .update_type(body.id, body.update_data)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteVariantTypeQuery {
    pub id: Option<Uuid>,

    // Exclusão física só quando pedida; o padrão é desativar.
    #[serde(default)]
    pub hard: bool,
}

// DELETE /api/marketplace/variant-types
#[utoipa::path(
    delete,
    path = "/api/marketplace/variant-types",
    tag = "Variant Types",
    params(DeleteVariantTypeQuery),
    responses(
        (status = 200, description = "Tipo de variante removido (lógico por padrão)"),
        (status = 404, description = "Tipo não encontrado")
    )
)]
pub async fn delete_variant_type(
    State(app_state): State<AppState>,
    Query(query): Query<DeleteVariantTypeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = query.id.ok_or(AppError::MissingParameter("id"))?;

    app_state.catalog_service.delete_type(id, query.hard).await?;

    Ok(Json(json!({ "success": true })))
}
