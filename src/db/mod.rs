pub mod sale_store;

pub use sale_store::SaleStore;
