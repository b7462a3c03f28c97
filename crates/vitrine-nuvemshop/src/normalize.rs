//! Normalization from raw catalog records to [`vitrine_core::NormalizedProduct`].
//!
//! The whole pipeline is total: every function here accepts any shape the
//! wire types can carry and substitutes a safe default (empty string, `None`,
//! or a zero contribution) for anything missing or malformed. There is no
//! error channel; the rendering layer must never see a value it cannot
//! display.

use vitrine_core::NormalizedProduct;

use crate::sanitize::{clean_string, clean_text, clean_url};
use crate::types::{
    InventoryLevel, LooseEntry, LooseList, LooseValue, ProductName, RawImage, RawProduct,
};

/// Locale preference for the storefront's audience. Fixed order, not
/// alphabetical and not upstream-declared order.
const NAME_LOCALE_PRIORITY: [&str; 4] = ["pt", "pt-BR", "es", "en"];

/// Normalizes one page of raw products, one-to-one and order-preserving.
#[must_use]
pub fn normalize_products(products: Vec<RawProduct>) -> Vec<NormalizedProduct> {
    products.into_iter().map(normalize_product).collect()
}

/// Normalizes a raw catalog record into a display-ready product.
///
/// Field-by-field: `id` passes through, `name` goes through the locale
/// picker, `price`/`promotional_price`/`stock` come from the first variant,
/// `image_url` from the first gallery image, `url` from the canonical URL.
/// Both URL fields go through [`clean_url`] and are therefore either empty
/// or valid `http`/`https` URLs.
#[must_use]
pub fn normalize_product(product: RawProduct) -> NormalizedProduct {
    let name = pick_name(product.name.as_ref());
    let image_url = clean_url(first_image_src(product.images.as_ref()));
    let url = clean_url(product.canonical_url.as_ref());

    let first_variant = product
        .variants
        .as_ref()
        .and_then(LooseList::as_items)
        .and_then(<[_]>::first)
        .and_then(LooseEntry::known);

    let (price, promotional_price, stock) = match first_variant {
        Some(variant) => (
            clean_string(variant.price.as_ref()),
            clean_string(variant.promotional_price.as_ref()),
            sum_stock(variant.inventory_levels.as_ref()),
        ),
        None => (String::new(), String::new(), None),
    };

    NormalizedProduct {
        id: product.id,
        name,
        price,
        promotional_price,
        image_url,
        url,
        stock,
    }
}

/// Picks a single display name from the `name` attribute.
///
/// Plain strings are sanitized directly. Locale maps are resolved with the
/// fixed priority `pt`, `pt-BR`, `es`, `en`; an entry that is missing,
/// `null`, or an empty string falls through to the next locale.
#[must_use]
pub fn pick_name(name: Option<&ProductName>) -> String {
    match name {
        None | Some(ProductName::Other(_)) => String::new(),
        Some(ProductName::Plain(s)) => clean_text(s),
        Some(ProductName::ByLocale(map)) => {
            let selected = NAME_LOCALE_PRIORITY
                .iter()
                .find_map(|locale| map.get(*locale).filter(|v| is_present(v)));
            clean_string(selected)
        }
    }
}

/// Sums a variant's per-location stock entries.
///
/// Returns `None` when the field is missing or not a list ("unknown",
/// distinct from zero). Otherwise every entry's `stock` is converted to a
/// number; entries that do not convert to a finite number contribute zero.
/// An empty list therefore sums to `Some(0)`, confirmed out of stock.
#[must_use]
pub fn sum_stock(levels: Option<&LooseList<LooseEntry<InventoryLevel>>>) -> Option<i64> {
    let entries = levels?.as_items()?;

    let mut total = 0.0_f64;
    for entry in entries {
        let Some(level) = entry.known() else { continue };
        if let Some(value) = to_finite_number(level.stock.as_ref()) {
            total += value;
        }
    }

    // Stock counts are integral in practice; fractional junk truncates.
    #[allow(clippy::cast_possible_truncation)]
    let total = total as i64;
    Some(total)
}

/// Converts a loose stock value to a finite number, if possible.
///
/// Numeric strings parse after trimming; an empty or whitespace-only string
/// counts as zero (the upstream serializer emits `""` for untracked
/// locations); booleans count as 0/1. Anything else, including non-finite
/// parses, yields `None`.
fn to_finite_number(value: Option<&LooseValue>) -> Option<f64> {
    match value? {
        LooseValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        LooseValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        LooseValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        LooseValue::Other(_) => None,
    }
}

/// Locale-map entries are picked with fall-through semantics: `null` and
/// the empty string read as "no translation", everything else is selected
/// even if it later sanitizes to empty (e.g. whitespace-only).
fn is_present(value: &LooseValue) -> bool {
    match value {
        LooseValue::Text(s) => !s.is_empty(),
        LooseValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        LooseValue::Bool(b) => *b,
        LooseValue::Other(v) => !v.is_null(),
    }
}

fn first_image_src(images: Option<&LooseList<LooseEntry<RawImage>>>) -> Option<&LooseValue> {
    images
        .and_then(LooseList::as_items)
        .and_then(<[_]>::first)
        .and_then(LooseEntry::known)
        .and_then(|image| image.src.as_ref())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
