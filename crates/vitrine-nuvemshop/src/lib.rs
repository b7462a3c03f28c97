pub mod client;
pub mod error;
pub mod normalize;
pub mod sanitize;
pub mod types;

pub use client::{AppCredentials, NuvemshopClient, StoreCredentials};
pub use error::NuvemshopError;
pub use normalize::{normalize_product, normalize_products};
pub use types::{RawProduct, RawVariant, TokenGrant};
