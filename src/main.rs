//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // CRUD de tipos de variante (eixos) do vendedor
    let variant_type_routes = Router::new()
        .route("/"
               ,get(handlers::variant_types::list_variant_types)
               .post(handlers::variant_types::create_variant_type)
               .put(handlers::variant_types::update_variant_type)
               .delete(handlers::variant_types::delete_variant_type)
        );

    // Rotas por produto: matriz de variantes + resolução de seleção
    let product_routes = Router::new()
        .route("/"
               ,post(handlers::products::create_product)
        )
        .route("/{id}"
               ,get(handlers::products::get_product)
        )
        .route("/{id}/variants"
               ,get(handlers::variants::list_product_variants)
               .post(handlers::variants::replace_product_variants)
               .put(handlers::variants::update_product_variant)
               .delete(handlers::variants::delete_product_variants)
        )
        .route("/{id}/resolve"
               ,post(handlers::variants::resolve_selection)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/marketplace/variant-types", variant_type_routes)
        .nest("/api/marketplace/products", product_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
