// src/services/resolver.rs
//
// O coração do seletor de variantes: dado o catálogo (tipos + opções) e a
// matriz (variantes concretas) já carregados, resolve a seleção parcial do
// comprador. Tudo aqui é puro e síncrono: nenhum I/O, nenhum estado
// compartilhado entre sessões de seleção.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    catalog::{VariantOption, VariantType},
    products::Product,
    variants::{CombinationMap, Variant},
};

// Estados possíveis da sessão de seleção de um produto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    // Nenhum eixo escolhido
    Empty,
    // Alguns eixos escolhidos, cobertura incompleta
    Partial,
    // Todos os eixos cobertos e uma variante casou
    Resolved,
    // Todos os eixos cobertos mas nenhuma variante casou: só acontece se
    // o filtro foi contornado ou o estoque mudou no meio do caminho
    DeadEnd,
}

// Cada interação do comprador vira um evento discreto; o reducer recalcula
// a seleção de forma síncrona antes da próxima interação ser processada.
#[derive(Debug, Clone)]
pub enum SelectionEvent {
    // Escolher (ou trocar) a opção de um eixo
    Pick { type_id: Uuid, option_id: String },
    // "Mostrar todas as opções": volta para Empty
    Reset,
}

/// Reducer puro da seleção: `(seleção, evento) -> seleção'`.
/// Trocar a opção de um único eixo não exige reset dos demais.
pub fn apply_event(selection: &CombinationMap, event: SelectionEvent) -> CombinationMap {
    match event {
        SelectionEvent::Pick { type_id, option_id } => {
            let mut next = selection.clone();
            next.insert(type_id, option_id);
            next
        }
        SelectionEvent::Reset => CombinationMap::new(),
    }
}

pub struct CombinationResolver<'a> {
    variants: &'a [Variant],
    types: &'a [VariantType],
}

impl<'a> CombinationResolver<'a> {
    pub fn new(variants: &'a [Variant], types: &'a [VariantType]) -> Self {
        Self { variants, types }
    }

    /// Casamento exato por subconjunto: a variante casa se TODO par
    /// (tipo, opção) da seleção bater com o mapa de combinações dela.
    /// Seleção vazia não casa com nada. O casamento ignora estoque de
    /// propósito: estoque zero é um estado de exibição, não de resolução.
    pub fn find_matching_variant(&self, selection: &CombinationMap) -> Option<&'a Variant> {
        if selection.is_empty() {
            return None;
        }
        self.variants.iter().find(|variant| {
            selection
                .iter()
                .all(|(type_id, option_id)| variant.combinations.get(type_id) == Some(option_id))
        })
    }

    /// Filtro inteligente por eixo: uma opção fica disponível se existir
    /// alguma variante comprável (estoque > 0 e ativa) que case com a
    /// seleção atual trocando apenas este eixo pela opção testada.
    /// Com a seleção vazia, devolve todas as opções ativas (bootstrap).
    pub fn available_options(
        &self,
        selection: &CombinationMap,
        type_id: Uuid,
    ) -> Vec<&'a VariantOption> {
        let Some(variant_type) = self.types.iter().find(|vt| vt.id == type_id) else {
            return Vec::new();
        };

        let all_active: Vec<&VariantOption> = variant_type
            .options
            .iter()
            .filter(|opt| opt.is_active)
            .collect();

        if selection.is_empty() {
            return all_active;
        }

        all_active
            .into_iter()
            .filter(|option| {
                let mut test = selection.clone();
                test.insert(type_id, option.id.clone());

                self.variants.iter().any(|variant| {
                    let matches = test.iter().all(|(t, o)| {
                        variant.combinations.get(t) == Some(o)
                    });
                    matches && variant.is_purchasable()
                })
            })
            .collect()
    }

    /// Destaque de estoque, independente da seleção atual: existe alguma
    /// variante comprável com este par (eixo, opção)? Usado para feedback
    /// visual, distinto do filtro duro de `available_options`.
    pub fn is_option_in_stock(&self, type_id: Uuid, option_id: &str) -> bool {
        self.variants.iter().any(|variant| {
            variant.combinations.get(&type_id).map(String::as_str) == Some(option_id)
                && variant.is_purchasable()
        })
    }

    /// Os eixos que a tela de seleção de fato mostra, cada um com suas
    /// opções disponíveis. Um eixo sem nenhuma opção disponível é omitido
    /// por inteiro (nunca vira um controle desabilitado/vazio).
    pub fn selectable_types(
        &self,
        selection: &CombinationMap,
    ) -> Vec<(&'a VariantType, Vec<&'a VariantOption>)> {
        self.types
            .iter()
            .filter_map(|variant_type| {
                let options: Vec<&VariantOption> = self
                    .available_options(selection, variant_type.id)
                    .into_iter()
                    .filter(|opt| self.is_option_in_stock(variant_type.id, &opt.id))
                    .collect();
                if options.is_empty() {
                    None
                } else {
                    Some((variant_type, options))
                }
            })
            .collect()
    }

    /// Cobertura total: um par escolhido para cada eixo que conta — os
    /// obrigatórios e os que alguma variante da matriz de fato usa. Um
    /// eixo opcional que nenhuma variante referencia não pode bloquear a
    /// resolução (escolhê-lo nunca casaria com nada).
    pub fn is_fully_covered(&self, selection: &CombinationMap) -> bool {
        let mut any_counted = false;
        for variant_type in self.types {
            let counted = variant_type.required
                || self
                    .variants
                    .iter()
                    .any(|v| v.combinations.contains_key(&variant_type.id));
            if counted {
                any_counted = true;
                if !selection.contains_key(&variant_type.id) {
                    return false;
                }
            }
        }
        any_counted
    }

    pub fn state(&self, selection: &CombinationMap) -> SelectionState {
        if selection.is_empty() {
            return SelectionState::Empty;
        }
        if !self.is_fully_covered(selection) {
            return SelectionState::Partial;
        }
        if self.find_matching_variant(selection).is_some() {
            SelectionState::Resolved
        } else {
            SelectionState::DeadEnd
        }
    }

    /// Preço exibido: o da variante resolvida, com fallback para o do
    /// próprio produto. Decisão deliberada: preço/estoque de variante só
    /// aparecem com cobertura total de eixos; seleção parcial mostra
    /// sempre o preço do produto.
    pub fn effective_price(&self, selection: &CombinationMap, product: &Product) -> Decimal {
        if self.is_fully_covered(selection) {
            if let Some(variant) = self.find_matching_variant(selection) {
                return variant.effective_price();
            }
        }
        product.effective_price()
    }

    /// Estoque exibido: o da variante resolvida. Num beco sem saída
    /// (cobertura total sem variante) não há nada a vender, então zero;
    /// o fallback do produto vale só para seleção vazia ou parcial.
    pub fn effective_stock(&self, selection: &CombinationMap, product: &Product) -> i32 {
        if self.is_fully_covered(selection) {
            return self
                .find_matching_variant(selection)
                .map_or(0, |variant| variant.stock);
        }
        product.stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::VariantKind;
    use chrono::Utc;

    fn option(id: &str) -> VariantOption {
        VariantOption {
            id: id.to_string(),
            value: id.to_string(),
            display_value: id.to_uppercase(),
            color_hex: None,
            sort_order: 0,
            is_active: true,
        }
    }

    fn variant_type(id: Uuid, name: &str, kind: VariantKind, options: &[&str]) -> VariantType {
        VariantType {
            id,
            seller_id: Uuid::new_v4(),
            name: name.to_lowercase(),
            display_name: name.to_string(),
            kind,
            options: options.iter().map(|o| option(o)).collect(),
            required: true,
            multi_select: false,
            product_categories: vec![],
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(product_id: Uuid, combos: &[(Uuid, &str)], stock: i32) -> Variant {
        Variant {
            id: Uuid::new_v4(),
            product_id,
            sku: format!("SKU-{}", stock),
            combinations: combos
                .iter()
                .map(|(t, o)| (*t, o.to_string()))
                .collect(),
            price: Decimal::from_str_exact("20.00").unwrap(),
            sale_price: None,
            stock,
            is_active: true,
            is_default: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: Uuid) -> Product {
        Product {
            id,
            seller_id: Uuid::new_v4(),
            name: "Sapatilha de Ponta".into(),
            category_name: Some("calçados".into()),
            price: Decimal::from_str_exact("25.00").unwrap(),
            sale_price: None,
            stock: 7,
            currency: "EUR".into(),
            has_variants: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // Cenário de referência: Tamanho {S, M, L} x Cor {Red, Blue} com a
    // matriz de estoque (S,Red)=0 (S,Blue)=5 (M,Red)=3 (M,Blue)=0
    // (L,Red)=0 (L,Blue)=0.
    struct Fixture {
        size_id: Uuid,
        color_id: Uuid,
        product: Product,
        types: Vec<VariantType>,
        variants: Vec<Variant>,
    }

    fn fixture() -> Fixture {
        let size_id = Uuid::new_v4();
        let color_id = Uuid::new_v4();
        let product = product(Uuid::new_v4());
        let types = vec![
            variant_type(size_id, "Tamanho", VariantKind::Size, &["s", "m", "l"]),
            variant_type(color_id, "Cor", VariantKind::Color, &["red", "blue"]),
        ];
        let stocks = [
            ("s", "red", 0),
            ("s", "blue", 5),
            ("m", "red", 3),
            ("m", "blue", 0),
            ("l", "red", 0),
            ("l", "blue", 0),
        ];
        let variants = stocks
            .iter()
            .map(|(s, c, stock)| {
                variant(product.id, &[(size_id, *s), (color_id, *c)], *stock)
            })
            .collect();
        Fixture { size_id, color_id, product, types, variants }
    }

    fn pick(sel: &CombinationMap, type_id: Uuid, option_id: &str) -> CombinationMap {
        apply_event(
            sel,
            SelectionEvent::Pick { type_id, option_id: option_id.to_string() },
        )
    }

    #[test]
    fn selecao_vazia_mostra_tudo_e_nao_resolve() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = CombinationMap::new();

        assert!(resolver.find_matching_variant(&sel).is_none());
        assert_eq!(resolver.state(&sel), SelectionState::Empty);

        // Bootstrap: todas as opções ativas, sem filtro
        let sizes = resolver.available_options(&sel, f.size_id);
        assert_eq!(
            sizes.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["s", "m", "l"]
        );
        let colors = resolver.available_options(&sel, f.color_id);
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn escolher_tamanho_s_deixa_so_blue() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&CombinationMap::new(), f.size_id, "s");

        let colors = resolver.available_options(&sel, f.color_id);
        assert_eq!(
            colors.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["blue"]
        );
    }

    #[test]
    fn s_blue_resolve_na_variante_com_estoque() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "s"), f.color_id, "blue");

        let matched = resolver.find_matching_variant(&sel).unwrap();
        assert_eq!(matched.stock, 5);
        assert_eq!(resolver.state(&sel), SelectionState::Resolved);
        assert_eq!(resolver.effective_price(&sel, &f.product), matched.effective_price());
    }

    #[test]
    fn casamento_ignora_estoque_mas_exibicao_nao() {
        // (M, Blue) tem estoque zero: o casamento combinatório ainda
        // encontra a variante, mas o estado de exibição é "sem estoque".
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "m"), f.color_id, "blue");

        let matched = resolver.find_matching_variant(&sel).unwrap();
        assert_eq!(matched.stock, 0);
        assert_eq!(resolver.state(&sel), SelectionState::Resolved);
        assert!(!matched.is_purchasable());
        assert_eq!(resolver.effective_stock(&sel, &f.product), 0);
    }

    #[test]
    fn propriedade_subconjunto() {
        // Se casou, todo par da seleção aparece no mapa da variante.
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&CombinationMap::new(), f.size_id, "m");

        if let Some(v) = resolver.find_matching_variant(&sel) {
            for (t, o) in &sel {
                assert_eq!(v.combinations.get(t), Some(o));
            }
        } else {
            panic!("seleção parcial deveria casar por subconjunto");
        }
    }

    #[test]
    fn estreitamento_monotonico() {
        // Adicionar um par à seleção nunca aumenta o conjunto de
        // variantes que casam.
        let f = fixture();

        let count = |sel: &CombinationMap| {
            f.variants
                .iter()
                .filter(|v| sel.iter().all(|(t, o)| v.combinations.get(t) == Some(o)))
                .count()
        };

        let empty = CombinationMap::new();
        let partial = pick(&empty, f.size_id, "s");
        let full = pick(&partial, f.color_id, "blue");

        assert!(count(&partial) <= count(&empty));
        assert!(count(&full) <= count(&partial));
    }

    #[test]
    fn reset_e_idempotente() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);

        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "s"), f.color_id, "blue");
        let before = resolver.find_matching_variant(&sel).map(|v| v.id);

        let cleared = apply_event(&sel, SelectionEvent::Reset);
        assert!(cleared.is_empty());
        assert_eq!(resolver.state(&cleared), SelectionState::Empty);

        let again = pick(&pick(&cleared, f.size_id, "s"), f.color_id, "blue");
        let after = resolver.find_matching_variant(&again).map(|v| v.id);
        assert_eq!(before, after);
    }

    #[test]
    fn trocar_um_eixo_reresolve_sem_reset() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);

        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "s"), f.color_id, "blue");
        assert_eq!(resolver.state(&sel), SelectionState::Resolved);

        // Troca só o tamanho; a cor continua escolhida
        let sel = pick(&sel, f.size_id, "m");
        let matched = resolver.find_matching_variant(&sel).unwrap();
        assert_eq!(matched.combinations.get(&f.size_id), Some(&"m".to_string()));
        assert_eq!(matched.combinations.get(&f.color_id), Some(&"blue".to_string()));
    }

    #[test]
    fn cobertura_total_sem_casamento_e_beco_sem_saida() {
        let f = fixture();
        // Matriz sem a combinação (l, red): seleção completa sem variante
        let variants: Vec<Variant> = f
            .variants
            .iter()
            .filter(|v| v.combinations.get(&f.size_id) != Some(&"l".to_string()))
            .cloned()
            .collect();
        let resolver = CombinationResolver::new(&variants, &f.types);

        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "l"), f.color_id, "red");
        assert!(resolver.find_matching_variant(&sel).is_none());
        assert_eq!(resolver.state(&sel), SelectionState::DeadEnd);

        // Sem resolução, o preço cai no fallback do produto
        assert_eq!(resolver.effective_price(&sel, &f.product), f.product.effective_price());
    }

    #[test]
    fn beco_sem_saida_exibe_estoque_zero() {
        // Combinação completa sem variante correspondente: o estoque do
        // produto (7) não pode vazar para a resposta, senão a tela diria
        // "em estoque" para algo que não existe à venda.
        let f = fixture();
        let variants: Vec<Variant> = f
            .variants
            .iter()
            .filter(|v| v.combinations.get(&f.size_id) != Some(&"l".to_string()))
            .cloned()
            .collect();
        let resolver = CombinationResolver::new(&variants, &f.types);

        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "l"), f.color_id, "red");
        assert_eq!(resolver.state(&sel), SelectionState::DeadEnd);
        assert_eq!(resolver.effective_stock(&sel, &f.product), 0);

        // O fallback do produto continua valendo para seleção parcial
        let partial = pick(&CombinationMap::new(), f.size_id, "s");
        assert_eq!(resolver.effective_stock(&partial, &f.product), f.product.stock);
    }

    #[test]
    fn eixo_opcional_fora_da_matriz_nao_bloqueia_resolucao() {
        // Um eixo opcional que nenhuma variante usa não entra na conta da
        // cobertura: o produto resolve só com os eixos da matriz.
        let mut f = fixture();
        let material_id = Uuid::new_v4();
        let mut material =
            variant_type(material_id, "Material", VariantKind::Material, &["couro"]);
        material.required = false;
        f.types.push(material);
        let resolver = CombinationResolver::new(&f.variants, &f.types);

        let sel = pick(&pick(&CombinationMap::new(), f.size_id, "s"), f.color_id, "blue");
        assert!(resolver.is_fully_covered(&sel));
        assert_eq!(resolver.state(&sel), SelectionState::Resolved);
    }

    #[test]
    fn eixo_sem_opcao_disponivel_e_omitido() {
        let f = fixture();
        // Zera o estoque de todas as cores: o eixo Cor some da tela,
        // em vez de aparecer desabilitado.
        let variants: Vec<Variant> = f
            .variants
            .iter()
            .map(|v| {
                let mut v = v.clone();
                v.stock = 0;
                v
            })
            .collect();
        let resolver = CombinationResolver::new(&variants, &f.types);

        let shown = resolver.selectable_types(&CombinationMap::new());
        assert!(shown.is_empty());
    }

    #[test]
    fn solidez_do_filtro() {
        // Toda opção devolvida por available_options tem pelo menos uma
        // variante comprável consistente com o resto da seleção.
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&CombinationMap::new(), f.size_id, "m");

        for opt in resolver.available_options(&sel, f.color_id) {
            let exists = f.variants.iter().any(|v| {
                v.combinations.get(&f.color_id) == Some(&opt.id)
                    && v.combinations.get(&f.size_id) == Some(&"m".to_string())
                    && v.is_purchasable()
            });
            assert!(exists, "opção {} sem variante comprável", opt.id);
        }
    }

    #[test]
    fn opcao_inativa_nao_aparece_nem_no_bootstrap() {
        let mut f = fixture();
        f.types[0].options[2].is_active = false; // desativa "l"
        let resolver = CombinationResolver::new(&f.variants, &f.types);

        let sizes = resolver.available_options(&CombinationMap::new(), f.size_id);
        assert!(sizes.iter().all(|o| o.id != "l"));
    }

    #[test]
    fn estoque_zero_exclui_mesmo_com_variante_ativa() {
        let f = fixture();
        let resolver = CombinationResolver::new(&f.variants, &f.types);
        let sel = pick(&CombinationMap::new(), f.color_id, "red");

        // (L, Red) existe e está ativa, mas estoque 0 a exclui
        let sizes = resolver.available_options(&sel, f.size_id);
        assert_eq!(
            sizes.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["m"]
        );
    }
}
