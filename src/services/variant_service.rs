// src/services/variant_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, VariantRepository},
    models::{
        catalog::VariantType,
        products::Product,
        variants::{
            CombinationMap, ReplaceVariantsPayload, UpdateVariantPayload, Variant,
        },
    },
};

#[derive(Clone)]
pub struct VariantService {
    variant_repo: VariantRepository,
    product_repo: ProductRepository,
}

/// Valida o invariante de construção de uma variante: exatamente um par
/// para cada eixo obrigatório do produto, nenhum eixo estranho, e opções
/// que existem de fato no eixo.
pub fn validate_combination(
    combinations: &CombinationMap,
    axes: &[VariantType],
) -> Result<(), AppError> {
    if combinations.is_empty() {
        return Err(AppError::InvalidCombination(
            "o mapa de combinações está vazio".into(),
        ));
    }

    for (type_id, option_id) in combinations {
        let Some(axis) = axes.iter().find(|a| a.id == *type_id) else {
            return Err(AppError::InvalidCombination(format!(
                "o eixo {} não se aplica a este produto",
                type_id
            )));
        };
        if !axis.options.iter().any(|o| o.id == *option_id) {
            return Err(AppError::InvalidCombination(format!(
                "a opção '{}' não existe no eixo '{}'",
                option_id, axis.display_name
            )));
        }
    }

    for axis in axes.iter().filter(|a| a.required) {
        if !combinations.contains_key(&axis.id) {
            return Err(AppError::InvalidCombination(format!(
                "o eixo obrigatório '{}' não foi preenchido",
                axis.display_name
            )));
        }
    }

    Ok(())
}

/// Duas variantes do mesmo lote não podem repetir a mesma combinação.
pub fn find_duplicate_combination(combinations: &[&CombinationMap]) -> bool {
    for (i, a) in combinations.iter().enumerate() {
        if combinations.iter().skip(i + 1).any(|b| b == a) {
            return true;
        }
    }
    false
}

/// SKU gerado quando o vendedor não informa um: prefixo do produto +
/// fragmentos dos valores das opções + sufixo de desambiguação.
pub fn generate_sku(product_name: &str, option_values: &[&str]) -> String {
    let prefix: String = product_name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let middle: String = option_values
        .iter()
        .map(|v| v.chars().take(2).collect::<String>().to_uppercase())
        .collect::<Vec<_>>()
        .join("");
    let suffix = Utc::now().timestamp_millis() % 10_000;
    format!("{}-{}-{:04}", prefix, middle, suffix)
}

/// A variante pré-selecionada: a marcada como padrão; na falta dela, a
/// primeira comprável; se nada for comprável, nenhuma (o chamador trata o
/// estado "nada à venda").
pub fn find_default(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .find(|v| v.is_default)
        .or_else(|| variants.iter().find(|v| v.is_purchasable()))
}

impl VariantService {
    pub fn new(variant_repo: VariantRepository, product_repo: ProductRepository) -> Self {
        Self { variant_repo, product_repo }
    }

    fn pool(&self) -> &PgPool {
        self.variant_repo.pool()
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .get_by_id(self.pool(), product_id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    /// A "Matriz" do resolvedor: todas as variantes do produto, já com a
    /// validação defensiva contra registros parciais ou legados — linha
    /// sem mapa de combinações utilizável é descartada, nunca propagada.
    pub async fn list_variants(&self, product_id: Uuid) -> Vec<Variant> {
        let rows = match self
            .variant_repo
            .get_by_product(self.pool(), product_id)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Falha ao carregar variantes do produto {}: {}", product_id, e);
                return Vec::new();
            }
        };

        let total = rows.len();
        let variants: Vec<Variant> = rows
            .into_iter()
            .filter_map(|row| row.into_variant())
            .collect();
        if variants.len() < total {
            tracing::debug!(
                "Descartadas {} variantes malformadas do produto {}",
                total - variants.len(),
                product_id
            );
        }
        variants
    }

    /// Substitui o conjunto inteiro de variantes do produto, do jeito que
    /// a tela de gestão salva: apaga as existentes e insere o lote novo,
    /// mantendo o flag `has_variants` do produto. Tudo numa transação.
    pub async fn replace_all(
        &self,
        product_id: Uuid,
        payload: ReplaceVariantsPayload,
        axes: &[VariantType],
    ) -> Result<Vec<Uuid>, AppError> {
        let maps: Vec<&CombinationMap> =
            payload.variants.iter().map(|v| &v.combinations).collect();
        if find_duplicate_combination(&maps) {
            return Err(AppError::DuplicateCombination);
        }
        for variant in &payload.variants {
            validate_combination(&variant.combinations, axes)?;
        }

        let mut tx = self.pool().begin().await?;

        let product = self
            .product_repo
            .get_by_id(&mut *tx, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        self.variant_repo.delete_by_product(&mut *tx, product_id).await?;

        let mut created = Vec::with_capacity(payload.variants.len());
        for variant in &payload.variants {
            let sku = match &variant.sku {
                Some(sku) if !sku.trim().is_empty() => sku.clone(),
                _ => {
                    let values: Vec<&str> = variant
                        .combinations
                        .iter()
                        .filter_map(|(type_id, option_id)| {
                            axes.iter()
                                .find(|a| a.id == *type_id)
                                .and_then(|a| a.options.iter().find(|o| o.id == *option_id))
                                .map(|o| o.value.as_str())
                        })
                        .collect();
                    generate_sku(&product.name, &values)
                }
            };

            let row = self
                .variant_repo
                .insert(
                    &mut *tx,
                    product_id,
                    &sku,
                    &serde_json::to_value(&variant.combinations).map_err(anyhow::Error::from)?,
                    variant.price,
                    variant.sale_price,
                    variant.stock,
                    variant.is_active,
                    variant.is_default,
                )
                .await?;
            created.push(row.id);
        }

        self.product_repo
            .set_has_variants(&mut *tx, product_id, !created.is_empty())
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update_variant(
        &self,
        variant_id: Uuid,
        payload: UpdateVariantPayload,
    ) -> Result<Variant, AppError> {
        let row = self
            .variant_repo
            .update(
                self.pool(),
                variant_id,
                payload.sku.as_deref(),
                payload.price,
                payload.sale_price,
                payload.stock,
                payload.is_active,
                payload.is_default,
            )
            .await?;
        row.into_variant().ok_or_else(|| {
            AppError::InvalidCombination("registro de variante malformado".into())
        })
    }

    pub async fn delete_variant(&self, variant_id: Uuid) -> Result<(), AppError> {
        self.variant_repo.delete(self.pool(), variant_id).await
    }

    /// Remove todas as variantes do produto e rebaixa `has_variants`.
    pub async fn delete_all(&self, product_id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.pool().begin().await?;
        let removed = self.variant_repo.delete_by_product(&mut *tx, product_id).await?;
        self.product_repo
            .set_has_variants(&mut *tx, product_id, false)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{VariantKind, VariantOption};
    use rust_decimal::Decimal;

    fn axis(id: Uuid, name: &str, required: bool, options: &[&str]) -> VariantType {
        VariantType {
            id,
            seller_id: Uuid::new_v4(),
            name: name.to_lowercase(),
            display_name: name.to_string(),
            kind: VariantKind::Custom,
            options: options
                .iter()
                .map(|o| VariantOption {
                    id: o.to_string(),
                    value: o.to_string(),
                    display_value: o.to_string(),
                    color_hex: None,
                    sort_order: 0,
                    is_active: true,
                })
                .collect(),
            required,
            multi_select: false,
            product_categories: vec![],
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn combinacao_completa_e_valida() {
        let size = Uuid::new_v4();
        let color = Uuid::new_v4();
        let axes = vec![axis(size, "Tamanho", true, &["s", "m"]), axis(color, "Cor", true, &["red"])];

        let combos: CombinationMap =
            [(size, "s".to_string()), (color, "red".to_string())].into_iter().collect();
        assert!(validate_combination(&combos, &axes).is_ok());
    }

    #[test]
    fn eixo_obrigatorio_ausente_e_rejeitado() {
        let size = Uuid::new_v4();
        let color = Uuid::new_v4();
        let axes = vec![axis(size, "Tamanho", true, &["s"]), axis(color, "Cor", true, &["red"])];

        let combos: CombinationMap = [(size, "s".to_string())].into_iter().collect();
        assert!(matches!(
            validate_combination(&combos, &axes),
            Err(AppError::InvalidCombination(_))
        ));
    }

    #[test]
    fn eixo_estranho_ao_produto_e_rejeitado() {
        let size = Uuid::new_v4();
        let axes = vec![axis(size, "Tamanho", true, &["s"])];

        let combos: CombinationMap =
            [(size, "s".to_string()), (Uuid::new_v4(), "x".to_string())].into_iter().collect();
        assert!(validate_combination(&combos, &axes).is_err());
    }

    #[test]
    fn opcao_inexistente_no_eixo_e_rejeitada() {
        let size = Uuid::new_v4();
        let axes = vec![axis(size, "Tamanho", true, &["s", "m"])];

        let combos: CombinationMap = [(size, "xl".to_string())].into_iter().collect();
        assert!(validate_combination(&combos, &axes).is_err());
    }

    #[test]
    fn mapa_vazio_e_rejeitado() {
        assert!(validate_combination(&CombinationMap::new(), &[]).is_err());
    }

    #[test]
    fn lote_com_combinacao_repetida_e_detectado() {
        let size = Uuid::new_v4();
        let a: CombinationMap = [(size, "s".to_string())].into_iter().collect();
        let b: CombinationMap = [(size, "m".to_string())].into_iter().collect();
        let a2 = a.clone();

        assert!(!find_duplicate_combination(&[&a, &b]));
        assert!(find_duplicate_combination(&[&a, &b, &a2]));
        assert!(!find_duplicate_combination(&[]));
    }

    #[test]
    fn sku_gerado_tem_prefixo_do_produto_e_das_opcoes() {
        let sku = generate_sku("Sapatilha de Ponta", &["Rosa", "38"]);
        assert!(sku.starts_with("SAP-RO38-"));
        assert_eq!(sku.split('-').count(), 3);
    }

    fn variant(stock: i32, is_active: bool, is_default: bool) -> Variant {
        Variant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU".into(),
            combinations: [(Uuid::new_v4(), "x".to_string())].into_iter().collect(),
            price: Decimal::from_str_exact("10.00").unwrap(),
            sale_price: None,
            stock,
            is_active,
            is_default,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn padrao_explicito_vence() {
        let variants = vec![variant(5, true, false), variant(0, true, true)];
        assert!(find_default(&variants).unwrap().is_default);
    }

    #[test]
    fn sem_padrao_cai_na_primeira_compravel() {
        let variants = vec![
            variant(0, true, false),
            variant(3, false, false),
            variant(2, true, false),
        ];
        let chosen = find_default(&variants).unwrap();
        assert_eq!(chosen.stock, 2);
    }

    #[test]
    fn nada_compravel_devolve_none() {
        let variants = vec![variant(0, true, false), variant(4, false, false)];
        assert!(find_default(&variants).is_none());
    }
}
