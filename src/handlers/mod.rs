pub mod products;
pub mod variant_types;
pub mod variants;
