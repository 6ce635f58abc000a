// src/handlers/variants.rs
//
// Rotas por produto: a matriz de variantes (listagem/gestão) e a rota de
// resolução, que avalia no servidor a seleção parcial do comprador usando
// o CombinationResolver.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        catalog::{VariantKind, VariantOption},
        products::ProductSummary,
        variants::{CombinationMap, ReplaceVariantsPayload, UpdateVariantPayload, Variant},
    },
    services::{
        resolver::{CombinationResolver, SelectionState},
        variant_service,
    },
};

// GET /api/marketplace/products/{id}/variants
#[utoipa::path(
    get,
    path = "/api/marketplace/products/{id}/variants",
    tag = "Variants",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Variantes + tipos aplicáveis ao produto"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn list_product_variants(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.variant_service.get_product(product_id).await?;

    // Catálogo e matriz são buscas independentes; o resolvedor (no front
    // ou na rota de resolução) só roda com as duas completas.
    let variants = app_state.variant_service.list_variants(product_id).await;
    let variant_types = app_state
        .catalog_service
        .list_axes(product.seller_id, product.category_name.as_deref())
        .await;

    Ok(Json(json!({
        "success": true,
        "variants": variants,
        "variantTypes": variant_types,
        "product": ProductSummary::from(&product),
    })))
}

// POST /api/marketplace/products/{id}/variants
#[utoipa::path(
    post,
    path = "/api/marketplace/products/{id}/variants",
    tag = "Variants",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ReplaceVariantsPayload,
    responses(
        (status = 201, description = "Conjunto de variantes substituído"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Combinação duplicada no lote")
    )
)]
pub async fn replace_product_variants(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ReplaceVariantsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.variant_service.get_product(product_id).await?;
    let axes = app_state
        .catalog_service
        .list_axes(product.seller_id, product.category_name.as_deref())
        .await;

    let variant_ids = app_state
        .variant_service
        .replace_all(product_id, payload, &axes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "variantIds": variant_ids,
        })),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantBody {
    pub variant_id: Uuid,
    pub update_data: UpdateVariantPayload,
}

// PUT /api/marketplace/products/{id}/variants
#[utoipa::path(
    put,
    path = "/api/marketplace/products/{id}/variants",
    tag = "Variants",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateVariantBody,
    responses(
        (status = 200, description = "Variante atualizada"),
        (status = 404, description = "Variante não encontrada")
    )
)]
pub async fn update_product_variant(
    State(app_state): State<AppState>,
    Path(_product_id): Path<Uuid>,
    Json(body): Json<UpdateVariantBody>,
) -> Result<impl IntoResponse, AppError> {
    body.update_data.validate()?;

    app_state
        .variant_service
        .update_variant(body.variant_id, body.update_data)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Variante atualizada com sucesso.",
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVariantQuery {
    pub variant_id: Option<Uuid>,
}

// DELETE /api/marketplace/products/{id}/variants
#[utoipa::path(
    delete,
    path = "/api/marketplace/products/{id}/variants",
    tag = "Variants",
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        DeleteVariantQuery
    ),
    responses(
        (status = 200, description = "Variante(s) removida(s)")
    )
)]
pub async fn delete_product_variants(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<DeleteVariantQuery>,
) -> Result<impl IntoResponse, AppError> {
    match query.variant_id {
        Some(variant_id) => {
            app_state.variant_service.delete_variant(variant_id).await?;
        }
        None => {
            app_state.variant_service.delete_all(product_id).await?;
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Variante(s) removida(s) com sucesso.",
    })))
}

// ---
// Resolução de seleção
// ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSelectionPayload {
    // Seleção parcial (ou completa) do comprador: tipo -> opção
    #[serde(default)]
    #[schema(value_type = Object)]
    pub combinations: CombinationMap,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ResolveState {
    // O produto não tem variantes: o resolvedor é ignorado por completo
    NoVariants,
    Empty,
    Partial,
    Resolved,
    // Cobertura completa sem variante correspondente: estado de exibição
    // "sem estoque para esta combinação", nunca um erro
    DeadEnd,
}

impl From<SelectionState> for ResolveState {
    fn from(state: SelectionState) -> Self {
        match state {
            SelectionState::Empty => ResolveState::Empty,
            SelectionState::Partial => ResolveState::Partial,
            SelectionState::Resolved => ResolveState::Resolved,
            SelectionState::DeadEnd => ResolveState::DeadEnd,
        }
    }
}

// Um eixo como a tela de seleção o mostra: só com as opções que ainda
// levam a alguma combinação comprável.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectableAxis {
    pub id: Uuid,
    pub display_name: String,
    pub kind: VariantKind,
    pub required: bool,
    pub options: Vec<VariantOption>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub success: bool,
    pub state: ResolveState,
    pub variant: Option<Variant>,
    pub variant_types: Vec<SelectableAxis>,
    #[schema(value_type = Option<Object>)]
    pub default_combinations: Option<CombinationMap>,
    pub price: Decimal,
    pub stock: i32,
    pub in_stock: bool,
}

// POST /api/marketplace/products/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/marketplace/products/{id}/resolve",
    tag = "Variants",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ResolveSelectionPayload,
    responses(
        (status = 200, description = "Estado resolvido da seleção", body = ResolveResponse),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn resolve_selection(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ResolveSelectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.variant_service.get_product(product_id).await?;

    // Produto sem variantes: preço e estoque vêm direto do registro
    if !product.has_variants {
        return Ok(Json(ResolveResponse {
            success: true,
            state: ResolveState::NoVariants,
            variant: None,
            variant_types: Vec::new(),
            default_combinations: None,
            price: product.effective_price(),
            stock: product.stock,
            in_stock: product.stock > 0,
        }));
    }

    let variants = app_state.variant_service.list_variants(product_id).await;
    let axes = app_state
        .catalog_service
        .list_axes(product.seller_id, product.category_name.as_deref())
        .await;

    let resolver = CombinationResolver::new(&variants, &axes);
    let selection = payload.combinations;

    let state = resolver.state(&selection);
    let matched = resolver.find_matching_variant(&selection);

    // Só expomos a variante (e seu preço/estoque) com cobertura total;
    // seleção parcial cai sempre no fallback do produto.
    let resolved = if resolver.is_fully_covered(&selection) { matched } else { None };

    let variant_types: Vec<SelectableAxis> = resolver
        .selectable_types(&selection)
        .into_iter()
        .map(|(vt, options)| SelectableAxis {
            id: vt.id,
            display_name: vt.display_name.clone(),
            kind: vt.kind,
            required: vt.required,
            options: options.into_iter().cloned().collect(),
        })
        .collect();

    let price = resolver.effective_price(&selection, &product);
    let stock = resolver.effective_stock(&selection, &product);

    Ok(Json(ResolveResponse {
        success: true,
        state: state.into(),
        variant: resolved.cloned(),
        variant_types,
        default_combinations: variant_service::find_default(&variants)
            .map(|v| v.combinations.clone()),
        price,
        stock,
        in_stock: stock > 0,
    }))
}
