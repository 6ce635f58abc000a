pub mod catalog_service;
pub mod product_service;
pub mod resolver;
pub mod variant_service;

pub use catalog_service::CatalogService;
pub use product_service::ProductService;
pub use variant_service::VariantService;
