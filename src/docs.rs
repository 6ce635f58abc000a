// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Products ---
        handlers::products::create_product,
        handlers::products::get_product,

        // --- Variant Types ---
        handlers::variant_types::list_variant_types,
        handlers::variant_types::create_variant_type,
        handlers::variant_types::update_variant_type,
        handlers::variant_types::delete_variant_type,

        // --- Variants ---
        handlers::variants::list_product_variants,
        handlers::variants::replace_product_variants,
        handlers::variants::update_product_variant,
        handlers::variants::delete_product_variants,
        handlers::variants::resolve_selection,
    ),
    components(
        schemas(
            models::products::Product,
            models::products::ProductSummary,
            models::products::CreateProductPayload,
            models::catalog::VariantKind,
            models::catalog::VariantOption,
            models::catalog::VariantType,
            models::catalog::OptionPayload,
            models::catalog::CreateVariantTypePayload,
            models::catalog::UpdateVariantTypePayload,
            models::variants::Variant,
            models::variants::VariantPayload,
            models::variants::ReplaceVariantsPayload,
            models::variants::UpdateVariantPayload,
            handlers::variant_types::UpdateVariantTypeBody,
            handlers::variants::UpdateVariantBody,
            handlers::variants::ResolveSelectionPayload,
            handlers::variants::ResolveResponse,
            handlers::variants::ResolveState,
            handlers::variants::SelectableAxis,
        )
    ),
    tags(
        (name = "Products", description = "Registro mínimo de produto"),
        (name = "Variant Types", description = "Eixos de variação definidos pelo vendedor"),
        (name = "Variants", description = "Matriz de variantes e resolução de seleção"),
    )
)]
pub struct ApiDoc;
