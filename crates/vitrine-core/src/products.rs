use serde::{Deserialize, Serialize};

/// A catalog product reshaped for the mobile storefront.
///
/// Every field is always present and well-typed: missing or malformed
/// upstream data degrades to an empty string or `None`, never to an error.
/// A strict renderer can consume any `NormalizedProduct` without guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// Upstream numeric product ID, or `None` when the record carried none.
    pub id: Option<i64>,
    /// Display name, already whitespace-collapsed. May be empty.
    pub name: String,
    /// Price of the first variant as the upstream string, e.g. `"19.9"` or
    /// `"129,90"`. Never numerically coerced: stores use decimal-comma and
    /// currency-formatted strings, and reformatting would lose that.
    pub price: String,
    /// Sale price of the first variant, same representation as `price`.
    pub promotional_price: String,
    /// First gallery image URL. Either empty or a syntactically valid
    /// `http`/`https` URL.
    pub image_url: String,
    /// Canonical storefront URL for the product. Same constraint as
    /// `image_url`.
    pub url: String,
    /// Total stock summed across the first variant's inventory levels.
    /// `None` means "stock information unavailable"; `Some(0)` means
    /// confirmed out of stock.
    pub stock: Option<i64>,
}

impl NormalizedProduct {
    /// Returns `true` unless the product is confirmed out of stock.
    ///
    /// Unknown stock (`None`) is treated optimistically; the storefront
    /// renders products without inventory data as purchasable.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(stock: Option<i64>) -> NormalizedProduct {
        NormalizedProduct {
            id: Some(7),
            name: "Vestido Midi".to_string(),
            price: "129,90".to_string(),
            promotional_price: String::new(),
            image_url: "https://cdn.example.com/vestido.jpg".to_string(),
            url: "https://loja.example.com/produtos/vestido-midi".to_string(),
            stock,
        }
    }

    #[test]
    fn in_stock_true_for_positive_stock() {
        assert!(make_product(Some(3)).in_stock());
    }

    #[test]
    fn in_stock_false_for_zero_stock() {
        assert!(!make_product(Some(0)).in_stock());
    }

    #[test]
    fn in_stock_true_when_stock_unknown() {
        assert!(make_product(None).in_stock());
    }

    #[test]
    fn serde_roundtrip_preserves_all_fields() {
        let product = make_product(Some(12));
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: NormalizedProduct =
            serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded, product);
    }

    #[test]
    fn stock_none_serializes_as_null() {
        let json = serde_json::to_value(make_product(None)).expect("serialize");
        assert!(json.get("stock").expect("stock key present").is_null());
    }
}
