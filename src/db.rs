pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod variant_type_repo;
pub use variant_type_repo::VariantTypeRepository;
pub mod variant_repo;
pub use variant_repo::VariantRepository;
