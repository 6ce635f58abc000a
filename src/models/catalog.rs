// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE variant_kind do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "variant_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Size,
    Color,
    Material,
    Length,
    Format,
    Style,
    Custom,
}

// --- OPÇÃO DE VARIANTE ---

// Uma opção concreta de um eixo (Ex: "M" do eixo "Tamanho").
// O id é derivado do valor (slug), nunca compartilhado entre eixos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub id: String,
    pub value: String,

    // Pode faltar em registros legados; a normalização preenche com value
    #[serde(default)]
    pub display_value: String,

    // Só faz sentido quando o eixo é do tipo 'color'
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// --- TIPO DE VARIANTE (EIXO) ---

// Como a linha vem do banco: options e product_categories são JSONB cru.
// Dados legados podem vir como array OU como objeto indexado por chave;
// a normalização acontece no CatalogService, nunca aqui.
#[derive(Debug, Clone, FromRow)]
pub struct VariantTypeRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub display_name: String,
    pub kind: VariantKind,
    pub options: Value,
    pub required: bool,
    pub multi_select: bool,
    pub product_categories: Value,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// A forma canônica, já normalizada, que o resto da aplicação consome.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantType {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub display_name: String,
    pub kind: VariantKind,
    pub options: Vec<VariantOption>,
    pub required: bool,
    pub multi_select: bool,
    pub product_categories: Vec<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    #[validate(length(min = 1, message = "O valor da opção é obrigatório."))]
    pub value: String,

    // Se ausente, usamos o próprio value como rótulo
    pub display_value: Option<String>,

    pub color_hex: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl OptionPayload {
    // Opções ganham o id como slug do valor, igual ao padrão usado
    // pelo gerenciador de variantes do front.
    pub fn into_option(self) -> VariantOption {
        let display_value = self
            .display_value
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.value.clone());
        VariantOption {
            id: slugify(&self.value),
            value: self.value,
            display_value,
            color_hex: self.color_hex,
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}

/// Slug usado como id de opção: minúsculas, espaços viram '_'.
pub fn slugify(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantTypePayload {
    #[validate(required(message = "O campo 'sellerId' é obrigatório."))]
    pub seller_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome interno é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,

    pub kind: VariantKind,

    #[validate(nested, length(min = 1, message = "Pelo menos uma opção é necessária."))]
    pub options: Vec<OptionPayload>,

    #[serde(default = "default_true")]
    pub required: bool,

    #[serde(default)]
    pub multi_select: bool,

    // Vazio = vale para todas as categorias
    #[serde(default)]
    pub product_categories: Vec<String>,

    #[serde(default)]
    pub sort_order: i32,
}

// Campos opcionais: só o que vier preenchido é alterado.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantTypePayload {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub kind: Option<VariantKind>,

    #[validate(nested)]
    pub options: Option<Vec<OptionPayload>>,

    pub required: Option<bool>,
    pub multi_select: Option<bool>,
    pub product_categories: Option<Vec<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
