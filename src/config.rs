// src/config.rs

use crate::{
    db::{ProductRepository, VariantRepository, VariantTypeRepository},
    services::{CatalogService, ProductService, VariantService},
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub product_service: ProductService,
    pub catalog_service: CatalogService,
    pub variant_service: VariantService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let product_repo = ProductRepository::new(db_pool.clone());
        let variant_type_repo = VariantTypeRepository::new(db_pool.clone());
        let variant_repo = VariantRepository::new(db_pool.clone());

        let product_service = ProductService::new(product_repo.clone());
        let catalog_service = CatalogService::new(variant_type_repo);
        let variant_service = VariantService::new(variant_repo, product_repo);

        Ok(Self {
            db_pool,
            product_service,
            catalog_service,
            variant_service,
        })
    }
}
