// src/services/catalog_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::VariantTypeRepository,
    models::catalog::{
        CreateVariantTypePayload, UpdateVariantTypePayload, VariantKind, VariantOption,
        VariantType, VariantTypeRow,
    },
};

// Cache read-through por (vendedor, categoria). É um objeto explícito do
// serviço (nada de singleton escondido): invalidado a cada escrita de
// tipo de variante, o que mantém os testes e a invalidação determinísticos.
type CatalogCache = Arc<RwLock<HashMap<(Uuid, String), Vec<VariantType>>>>;

#[derive(Clone)]
pub struct CatalogService {
    variant_type_repo: VariantTypeRepository,
    cache: CatalogCache,
}

/// Normaliza o JSONB de opções para uma lista ordenada. Aceita as duas
/// formas que o banco serializa: array OU objeto indexado por chave.
/// Entradas malformadas (não-objeto, sem id/valor) são descartadas em
/// silêncio; nenhum consumidor além daqui vê a forma crua.
pub fn normalize_options(raw: &Value) -> Vec<VariantOption> {
    let candidates: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };

    let mut options: Vec<VariantOption> = candidates
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<VariantOption>(entry.clone()).ok())
        .filter(|opt| !opt.id.is_empty() && !opt.value.is_empty())
        .map(|mut opt| {
            // Registro legado sem rótulo: o próprio valor serve de rótulo
            if opt.display_value.trim().is_empty() {
                opt.display_value = opt.value.clone();
            }
            opt
        })
        .collect();

    options.sort_by_key(|opt| opt.sort_order);
    options
}

/// Mesmo tratamento para as categorias aplicáveis (array ou objeto).
pub fn normalize_categories(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::Object(map) => map
            .values()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Converte a linha crua do banco na forma canônica.
pub fn normalize_row(row: VariantTypeRow) -> VariantType {
    VariantType {
        id: row.id,
        seller_id: row.seller_id,
        name: row.name,
        display_name: row.display_name,
        kind: row.kind,
        options: normalize_options(&row.options),
        required: row.required,
        multi_select: row.multi_select,
        product_categories: normalize_categories(&row.product_categories),
        sort_order: row.sort_order,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Um tipo vale para a categoria se for global (sem categorias) ou se a
/// categoria constar na lista (comparação sem caixa).
pub fn applies_to_category(variant_type: &VariantType, category: &str) -> bool {
    if variant_type.product_categories.is_empty() {
        return true;
    }
    variant_type
        .product_categories
        .iter()
        .any(|c| c.eq_ignore_ascii_case(category))
}

impl CatalogService {
    pub fn new(variant_type_repo: VariantTypeRepository) -> Self {
        Self {
            variant_type_repo,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // ---
    // Leitura para o seletor (o "Catálogo" do resolvedor)
    // ---

    /// Eixos aplicáveis ao produto: tipos ativos do vendedor, filtrados
    /// pela categoria, com as opções já normalizadas, ativas e ordenadas.
    ///
    /// Política de degradação: falha de leitura vira lista vazia + log.
    /// "Sem eixos" é um estado válido da tela, nunca um erro.
    pub async fn list_axes(&self, seller_id: Uuid, category: Option<&str>) -> Vec<VariantType> {
        let cache_key = (
            seller_id,
            category.map(|c| c.to_lowercase()).unwrap_or_default(),
        );

        if let Some(cached) = self.cache.read().await.get(&cache_key) {
            return cached.clone();
        }

        let rows = match self
            .variant_type_repo
            .get_by_seller(self.variant_type_repo.pool(), seller_id)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Falha ao carregar tipos de variante: {}", e);
                return Vec::new();
            }
        };

        let axes: Vec<VariantType> = rows
            .into_iter()
            .map(normalize_row)
            .filter(|vt| vt.is_active)
            .filter(|vt| category.map_or(true, |c| applies_to_category(vt, c)))
            .map(|mut vt| {
                vt.options.retain(|opt| opt.is_active);
                vt
            })
            .collect();

        self.cache.write().await.insert(cache_key, axes.clone());
        axes
    }

    // ---
    // Leitura para a tela de gestão (inclui inativos)
    // ---

    pub async fn list_for_seller(
        &self,
        seller_id: Uuid,
        category: Option<&str>,
        kind: Option<VariantKind>,
    ) -> Result<Vec<VariantType>, AppError> {
        let rows = match kind {
            Some(kind) => {
                self.variant_type_repo
                    .get_by_seller_and_kind(self.variant_type_repo.pool(), seller_id, kind)
                    .await?
            }
            None => {
                self.variant_type_repo
                    .get_by_seller(self.variant_type_repo.pool(), seller_id)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(normalize_row)
            .filter(|vt| category.map_or(true, |c| applies_to_category(vt, c)))
            .collect())
    }

    // ---
    // Escritas (CRUD do vendedor) — toda escrita invalida o cache
    // ---

    pub async fn create_type(
        &self,
        payload: CreateVariantTypePayload,
    ) -> Result<VariantType, AppError> {
        let seller_id = payload
            .seller_id
            .ok_or(AppError::MissingParameter("sellerId"))?;

        let options: Vec<VariantOption> = payload
            .options
            .into_iter()
            .map(|o| o.into_option())
            .collect();

        let row = self
            .variant_type_repo
            .create(
                self.variant_type_repo.pool(),
                seller_id,
                &payload.name,
                &payload.display_name,
                payload.kind,
                &serde_json::to_value(&options).map_err(anyhow::Error::from)?,
                payload.required,
                payload.multi_select,
                &serde_json::to_value(&payload.product_categories).map_err(anyhow::Error::from)?,
                payload.sort_order,
            )
            .await?;

        self.invalidate(seller_id).await;
        Ok(normalize_row(row))
    }

    pub async fn update_type(
        &self,
        id: Uuid,
        payload: UpdateVariantTypePayload,
    ) -> Result<VariantType, AppError> {
        let options_json = match payload.options {
            Some(opts) => {
                let opts: Vec<VariantOption> = opts.into_iter().map(|o| o.into_option()).collect();
                Some(serde_json::to_value(&opts).map_err(anyhow::Error::from)?)
            }
            None => None,
        };
        let categories_json = match payload.product_categories {
            Some(cats) => Some(serde_json::to_value(&cats).map_err(anyhow::Error::from)?),
            None => None,
        };

        let row = self
            .variant_type_repo
            .update(
                self.variant_type_repo.pool(),
                id,
                payload.name.as_deref(),
                payload.display_name.as_deref(),
                payload.kind,
                options_json.as_ref(),
                payload.required,
                payload.multi_select,
                categories_json.as_ref(),
                payload.sort_order,
                payload.is_active,
            )
            .await?;

        self.invalidate(row.seller_id).await;
        Ok(normalize_row(row))
    }

    /// Exclusão lógica por padrão; remoção física só sob pedido explícito.
    pub async fn delete_type(&self, id: Uuid, hard: bool) -> Result<(), AppError> {
        let row = self
            .variant_type_repo
            .get_by_id(self.variant_type_repo.pool(), id)
            .await?
            .ok_or(AppError::VariantTypeNotFound)?;

        if hard {
            self.variant_type_repo
                .hard_delete(self.variant_type_repo.pool(), id)
                .await?;
        } else {
            self.variant_type_repo
                .soft_delete(self.variant_type_repo.pool(), id)
                .await?;
        }

        self.invalidate(row.seller_id).await;
        Ok(())
    }

    async fn invalidate(&self, seller_id: Uuid) {
        self.cache
            .write()
            .await
            .retain(|(cached_seller, _), _| *cached_seller != seller_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn normaliza_array_ordenando_por_sort_order() {
        let raw = json!([
            { "id": "m", "value": "M", "displayValue": "Médio", "sortOrder": 1 },
            { "id": "s", "value": "S", "displayValue": "Pequeno", "sortOrder": 0 },
        ]);
        let options = normalize_options(&raw);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "s");
        assert_eq!(options[1].id, "m");
    }

    #[test]
    fn normaliza_objeto_indexado_por_chave() {
        // Artefato do banco de documentos: lista serializada como objeto
        let raw = json!({
            "0": { "id": "red", "value": "Red", "displayValue": "Vermelho", "sortOrder": 0 },
            "1": { "id": "blue", "value": "Blue", "displayValue": "Azul", "sortOrder": 1 },
        });
        let options = normalize_options(&raw);
        assert_eq!(options.len(), 2);
        assert!(options.iter().any(|o| o.id == "red"));
        assert!(options.iter().any(|o| o.id == "blue"));
    }

    #[test]
    fn entradas_malformadas_sao_descartadas_em_silencio() {
        let raw = json!([
            { "id": "ok", "value": "Ok", "displayValue": "Ok" },
            { "value": "sem id", "displayValue": "x" },
            { "id": "", "value": "vazio", "displayValue": "x" },
            "não sou um objeto",
            42,
            null,
        ]);
        let options = normalize_options(&raw);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "ok");
    }

    #[test]
    fn opcao_sem_rotulo_sobrevive_usando_o_valor() {
        // Registros legados podem vir só com id e value; o rótulo ausente
        // não pode descartar a opção.
        let raw = json!([{ "id": "m", "value": "M" }]);
        let options = normalize_options(&raw);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].display_value, "M");
    }

    #[test]
    fn formas_nao_reconhecidas_viram_lista_vazia() {
        assert!(normalize_options(&json!(null)).is_empty());
        assert!(normalize_options(&json!("string")).is_empty());
        assert!(normalize_options(&json!(3.14)).is_empty());
    }

    #[test]
    fn categorias_aceitam_array_ou_objeto() {
        assert_eq!(
            normalize_categories(&json!(["roupas", "calçados"])),
            vec!["roupas", "calçados"]
        );
        assert_eq!(
            normalize_categories(&json!({ "0": "roupas" })),
            vec!["roupas"]
        );
        assert!(normalize_categories(&json!(null)).is_empty());
    }

    fn vt(categories: Vec<String>) -> VariantType {
        VariantType {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            name: "tamanho".into(),
            display_name: "Tamanho".into(),
            kind: VariantKind::Size,
            options: vec![],
            required: true,
            multi_select: false,
            product_categories: categories,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tipo_global_vale_para_qualquer_categoria() {
        let global = vt(vec![]);
        assert!(applies_to_category(&global, "roupas"));
        assert!(applies_to_category(&global, "qualquer"));
    }

    #[test]
    fn filtro_de_categoria_ignora_caixa() {
        let tipo = vt(vec!["Calçados".into()]);
        assert!(applies_to_category(&tipo, "calçados"));
        assert!(!applies_to_category(&tipo, "roupas"));
    }

    #[test]
    fn linha_crua_e_normalizada_por_inteiro() {
        let row = VariantTypeRow {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            name: "cor".into(),
            display_name: "Cor".into(),
            kind: VariantKind::Color,
            options: json!({
                "a": { "id": "red", "value": "Red", "displayValue": "Vermelho" },
                "b": "lixo",
            }),
            required: true,
            multi_select: false,
            product_categories: json!(["roupas"]),
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let vt = normalize_row(row);
        assert_eq!(vt.options.len(), 1);
        assert_eq!(vt.product_categories, vec!["roupas"]);
    }
}
