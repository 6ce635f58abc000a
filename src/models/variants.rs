// src/models/variants.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O mapa de combinações identifica a variante: tipo de variante -> opção.
pub type CombinationMap = BTreeMap<Uuid, String>;

// Linha crua do banco. O mapa de combinações vem como JSONB e pode estar
// corrompido em registros legados; a validação defensiva fica no serviço.
#[derive(Debug, Clone, FromRow)]
pub struct VariantRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub combinations: Value,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VariantRow {
    // Converte para a forma canônica; None = registro malformado
    // (sem combinações utilizáveis), que deve ser descartado no load.
    pub fn into_variant(self) -> Option<Variant> {
        let combinations: CombinationMap =
            serde_json::from_value(self.combinations).ok()?;
        if combinations.is_empty() {
            return None;
        }
        Some(Variant {
            id: self.id,
            product_id: self.product_id,
            sku: self.sku,
            combinations,
            price: self.price,
            sale_price: self.sale_price,
            stock: self.stock,
            is_active: self.is_active,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// Uma variante concreta (SKU) de um produto.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    // Mapa chaveado por UUID: o schema OpenAPI o expõe como objeto livre
    #[schema(value_type = Object)]
    pub combinations: CombinationMap,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    // Preço efetivo: promoção, se houver
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn is_purchasable(&self) -> bool {
        self.stock > 0 && self.is_active
    }
}

// --- PAYLOADS ---

fn validate_not_negative(stock: i32) -> Result<(), validator::ValidationError> {
    if stock < 0 {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("O estoque não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    #[schema(value_type = Object)]
    pub combinations: CombinationMap,

    // Se ausente, o serviço gera um SKU a partir do produto + opções
    pub sku: Option<String>,

    pub price: Decimal,
    pub sale_price: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub stock: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceVariantsPayload {
    #[validate(nested)]
    pub variants: Vec<VariantPayload>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantPayload {
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    pub stock: Option<i32>,

    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn row(combinations: Value) -> VariantRow {
        VariantRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU-1".into(),
            combinations,
            price: dec("10.00"),
            sale_price: None,
            stock: 1,
            is_active: true,
            is_default: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn linha_com_combinacao_valida_vira_variante() {
        let type_id = Uuid::new_v4();
        let value = serde_json::json!({ (type_id.to_string()): "m" });
        let variant = row(value).into_variant().unwrap();
        assert_eq!(variant.combinations.get(&type_id), Some(&"m".to_string()));
    }

    #[test]
    fn linha_malformada_e_descartada() {
        assert!(row(Value::String("oops".into())).into_variant().is_none());
        assert!(row(serde_json::json!({})).into_variant().is_none());
        assert!(row(serde_json::json!([1, 2])).into_variant().is_none());
    }

    #[test]
    fn estoque_negativo_e_rejeitado_na_validacao() {
        let invalido = UpdateVariantPayload { stock: Some(-1), ..Default::default() };
        assert!(invalido.validate().is_err());

        let valido = UpdateVariantPayload { stock: Some(0), ..Default::default() };
        assert!(valido.validate().is_ok());
    }

    #[test]
    fn preco_efetivo_prefere_promocao() {
        let mut v = row(serde_json::json!({ (Uuid::new_v4().to_string()): "m" }))
            .into_variant()
            .unwrap();
        assert_eq!(v.effective_price(), dec("10.00"));
        v.sale_price = Some(dec("7.50"));
        assert_eq!(v.effective_price(), dec("7.50"));
    }
}
