pub mod catalog;
pub mod products;
pub mod variants;
