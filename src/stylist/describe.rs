use serde_json::Value;

use crate::wardrobe::repo_types::WardrobeItem;

/// Rendered for any attribute the item does not carry.
pub const PLACEHOLDER: &str = "N/A";

/// Render an item as the text that gets embedded and later shown to the model.
///
/// The output is a pure function of the item's name and metadata. Every field
/// is always present; missing, null, blank or empty values become [`PLACEHOLDER`].
pub fn describe(item: &WardrobeItem) -> String {
    let field = |key: &str| item.metadata.get(key).map_or_else(placeholder, render_scalar);

    let properties = match item.metadata.get("properties") {
        Some(Value::Array(values)) => {
            let parts: Vec<String> = values
                .iter()
                .map(render_scalar)
                .filter(|p| p != PLACEHOLDER)
                .collect();
            if parts.is_empty() {
                placeholder()
            } else {
                parts.join(", ")
            }
        }
        _ => placeholder(),
    };

    format!(
        "Item Name: {}. Style: {}. Category: {}. Material: {}. Properties: {}.",
        non_blank(&item.name),
        field("style"),
        field("category"),
        field("material"),
        properties,
    )
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

fn non_blank(s: &str) -> String {
    let t = s.trim();
    if t.is_empty() {
        placeholder()
    } else {
        t.to_string()
    }
}

fn render_scalar(v: &Value) -> String {
    match v {
        Value::Null => placeholder(),
        Value::String(s) => non_blank(s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::OffsetDateTime;

    fn item(name: &str, metadata: Value) -> WardrobeItem {
        WardrobeItem {
            id: 1,
            name: name.into(),
            metadata: metadata.as_object().cloned().unwrap_or_default(),
            owner_id: 1,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn full_item_renders_every_field() {
        let it = item(
            "Rain Shell",
            json!({
                "style": "sporty",
                "category": "outerwear",
                "material": "nylon",
                "properties": ["waterproof", "breathable"]
            }),
        );
        assert_eq!(
            describe(&it),
            "Item Name: Rain Shell. Style: sporty. Category: outerwear. \
             Material: nylon. Properties: waterproof, breathable."
        );
    }

    #[test]
    fn missing_fields_use_placeholder() {
        let it = item("Blue Jacket", json!({"style": "casual", "category": "outerwear"}));
        assert_eq!(
            describe(&it),
            "Item Name: Blue Jacket. Style: casual. Category: outerwear. \
             Material: N/A. Properties: N/A."
        );
    }

    #[test]
    fn odd_values_never_vanish() {
        let it = item(
            "  ",
            json!({"style": null, "category": "", "material": 42, "properties": "warm"}),
        );
        assert_eq!(
            describe(&it),
            "Item Name: N/A. Style: N/A. Category: N/A. Material: 42. Properties: N/A."
        );
    }

    #[test]
    fn empty_property_list_uses_placeholder() {
        let it = item("Tee", json!({"properties": []}));
        assert!(describe(&it).ends_with("Properties: N/A."));
    }

    #[test]
    fn deterministic_for_equal_metadata() {
        let a = item("Boots", json!({"material": "leather", "properties": ["waterproof"]}));
        let mut b = a.clone();
        b.id = 99;
        assert_eq!(describe(&a), describe(&a));
        assert_eq!(describe(&a), describe(&b));
    }
}
