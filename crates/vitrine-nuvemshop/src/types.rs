//! Nuvemshop API wire types for the products and token endpoints.
//!
//! ## Observed shape from live stores
//!
//! The products endpoint (`GET /v1/{store_id}/products`) returns a bare JSON
//! array. Individual records are only loosely typed:
//!
//! ### `name`
//! Either a plain string or a locale map such as
//! `{"pt": "Vestido", "es": "Vestido", "en": "Dress"}`. Locale entries may be
//! `null` or empty strings on partially translated stores.
//!
//! ### `images[].src` and `canonical_url`
//! String URLs, but observed with stray wrapping from a broken upstream
//! serializer: `"[https://…]"` and `"\"https://…\""` both occur in live
//! data. Anything that is not an `http`/`https` URL after cleanup must not
//! reach a URL-typed output field.
//!
//! ### `variants[].price` / `variants[].promotional_price`
//! A decimal string (`"129.90"`), a decimal-comma string (`"129,90"`), or a
//! bare JSON number (`19.9`), depending on store locale and API version.
//! `promotional_price` is `null` when no sale is active.
//!
//! ### `variants[].inventory_levels[].stock`
//! A number or a numeric string per location entry. Stores without
//! location-level inventory omit `inventory_levels` entirely, which is
//! "unknown", distinct from a present-but-empty array ("confirmed zero").
//!
//! Every loosely-typed field is modeled as an untagged sum type with a
//! catch-all variant, so deserializing a product array is total: junk in any
//! of the fields above degrades at normalization time instead of failing the
//! whole page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A scalar-ish JSON value in a field the upstream types inconsistently.
///
/// `Other` absorbs `null` and any non-scalar junk so that containers of
/// `LooseValue` always deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Other(serde_json::Value),
}

/// A list-typed field that tolerates non-list junk.
///
/// `Other` covers upstream bugs where a field documented as an array arrives
/// as a string, object, or `null`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseList<T> {
    Items(Vec<T>),
    Other(serde_json::Value),
}

impl<T> LooseList<T> {
    /// Returns the entries when the field really was a list.
    #[must_use]
    pub fn as_items(&self) -> Option<&[T]> {
        match self {
            LooseList::Items(items) => Some(items),
            LooseList::Other(_) => None,
        }
    }
}

/// A list entry that tolerates entries of the wrong shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseEntry<T> {
    Known(T),
    Other(serde_json::Value),
}

impl<T> LooseEntry<T> {
    /// Returns the entry when it matched the expected shape.
    #[must_use]
    pub fn known(&self) -> Option<&T> {
        match self {
            LooseEntry::Known(value) => Some(value),
            LooseEntry::Other(_) => None,
        }
    }
}

/// Product display name: plain string or locale map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductName {
    Plain(String),
    ByLocale(HashMap<String, LooseValue>),
    Other(serde_json::Value),
}

/// A single product record from the catalog listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    /// Numeric product ID. Absent on some draft records.
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: Option<ProductName>,

    /// Gallery images in display order.
    #[serde(default)]
    pub images: Option<LooseList<LooseEntry<RawImage>>>,

    /// Canonical storefront URL for the product page.
    #[serde(default)]
    pub canonical_url: Option<LooseValue>,

    /// Purchasable variants in display order; the first one is the
    /// storefront default.
    #[serde(default)]
    pub variants: Option<LooseList<LooseEntry<RawVariant>>>,
}

/// A product gallery image.
#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    /// CDN URL. See the module doc for the bracket/quote wrapping bug.
    #[serde(default)]
    pub src: Option<LooseValue>,
}

/// A purchasable variant of a [`RawProduct`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub price: Option<LooseValue>,

    /// `null` when no sale is active.
    #[serde(default)]
    pub promotional_price: Option<LooseValue>,

    /// Per-location stock entries. Absent when the store does not track
    /// location-level inventory.
    #[serde(default)]
    pub inventory_levels: Option<LooseList<LooseEntry<InventoryLevel>>>,
}

/// One per-location stock entry within a variant.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryLevel {
    #[serde(default)]
    pub stock: Option<LooseValue>,
}

/// Response payload of the OAuth token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Store ID the grant is scoped to.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Fields the platform returns beyond the documented grant shape,
    /// passed through to the caller unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_array_with_wrong_typed_fields_deserializes() {
        // One record per malformed-field scenario from the module doc.
        let payload = serde_json::json!([
            {},
            {"id": 1, "name": 7, "images": "not-a-list", "variants": {"oops": true}},
            {"id": 2, "name": {"pt": null, "en": 42}, "canonical_url": ["x"]},
            {"id": 3, "variants": [null, "junk", {"price": {"amount": 1}}]},
            {"id": 4, "variants": [{"inventory_levels": [{"stock": []}, 9]}]},
        ]);
        let products: Vec<RawProduct> =
            serde_json::from_value(payload).expect("loose payload must deserialize");
        assert_eq!(products.len(), 5);
    }

    #[test]
    fn plain_name_parses_as_plain() {
        let product: RawProduct =
            serde_json::from_value(serde_json::json!({"name": "Camisa"})).expect("parse");
        assert!(matches!(product.name, Some(ProductName::Plain(ref s)) if s == "Camisa"));
    }

    #[test]
    fn locale_map_name_parses_as_by_locale() {
        let product: RawProduct =
            serde_json::from_value(serde_json::json!({"name": {"pt": "Camisa", "en": "Shirt"}}))
                .expect("parse");
        match product.name {
            Some(ProductName::ByLocale(map)) => {
                assert!(map.contains_key("pt"));
                assert!(map.contains_key("en"));
            }
            other => panic!("expected ByLocale, got: {other:?}"),
        }
    }

    #[test]
    fn non_list_variants_yield_no_items() {
        let product: RawProduct =
            serde_json::from_value(serde_json::json!({"variants": "oops"})).expect("parse");
        let variants = product.variants.expect("field was present");
        assert!(variants.as_items().is_none());
    }

    #[test]
    fn token_grant_keeps_undocumented_fields() {
        let grant: TokenGrant = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "token_type": "bearer",
            "scope": "read_products",
            "user_id": 123,
            "expires_in": 3600
        }))
        .expect("parse");
        assert_eq!(grant.access_token.as_deref(), Some("tok"));
        assert_eq!(grant.user_id, Some(123));
        assert_eq!(
            grant.extra.get("expires_in"),
            Some(&serde_json::json!(3600))
        );
    }
}
