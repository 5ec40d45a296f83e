use super::*;
use chrono::Utc;

fn item(name: &str, price: f64, is_offer: Option<bool>) -> Item {
    Item {
        id: ItemId::generate(),
        name: name.to_string(),
        price,
        is_offer,
        created_at: Utc::now(),
    }
}

#[test]
fn test_item_id_display_roundtrips_through_from_str() {
    let id = ItemId::generate();
    let parsed: ItemId = id.to_string().parse().expect("should parse");
    assert_eq!(parsed, id);
}

#[test]
fn test_item_id_rejects_malformed() {
    assert!("not-a-uuid".parse::<ItemId>().is_err());
}

#[test]
fn test_create_validate_ok() {
    let valid = ItemCreate::new("Widget", 9.5).validate().expect("should validate");
    assert_eq!(valid.name, "Widget");
    assert_eq!(valid.is_offer, Some(false));
}

#[test]
fn test_create_validate_rejects_non_positive_price() {
    let err = ItemCreate::new("Widget", 0.0).validate().unwrap_err();
    assert!(err.has_field("price"));

    let err = ItemCreate::new("Widget", -3.0).validate().unwrap_err();
    assert!(err.has_field("price"));
}

#[test]
fn test_create_validate_rejects_non_finite_price() {
    let err = ItemCreate::new("Widget", f64::INFINITY).validate().unwrap_err();
    assert!(err.has_field("price"));
}

#[test]
fn test_create_validate_collects_all_missing_fields() {
    let request: ItemCreate = serde_json::from_str("{}").expect("should parse");
    let err = request.validate().unwrap_err();
    assert_eq!(err.errors.len(), 2);
    assert!(err.has_field("name"));
    assert!(err.has_field("price"));
}

#[test]
fn test_create_missing_offer_defaults_to_false() {
    let request: ItemCreate =
        serde_json::from_str(r#"{"name": "Lamp", "price": 12.0}"#).expect("should parse");
    assert_eq!(request.is_offer, Some(false));
}

#[test]
fn test_create_explicit_null_offer_stays_unset() {
    let request: ItemCreate =
        serde_json::from_str(r#"{"name": "Lamp", "price": 12.0, "is_offer": null}"#)
            .expect("should parse");
    assert_eq!(request.is_offer, None);
}

#[test]
fn test_record_key_order() {
    let record = item("Lamp", 12.0, Some(true)).to_record();
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "price", "is_offer", "created_at"]);
}

#[test]
fn test_record_unset_offer_is_null() {
    let record = item("Lamp", 12.0, None).to_record();
    assert_eq!(record.get("is_offer"), Some(&serde_json::Value::Null));
}

#[test]
fn test_record_timestamp_matches_api_format() {
    let stored = item("Lamp", 12.0, None);
    let record = stored.to_record();
    let detail = serde_json::to_value(ItemDetail::from(&stored)).unwrap();

    assert_eq!(record.get("created_at"), detail.get("created_at"));
    let text = record["created_at"].as_str().unwrap();
    assert!(text.ends_with('Z'), "{text}");
}

#[test]
fn test_filters_empty_matches_everything() {
    let filters = ItemFilters::new();
    assert!(filters.matches(&item("a", 1.0, None)));
    assert!(filters.matches(&item("b", 100.0, Some(true))));
}

#[test]
fn test_filters_name_prefix() {
    let filters = ItemFilters::new().with_name_prefix("Wid");
    assert!(filters.matches(&item("Widget", 1.0, None)));
    assert!(!filters.matches(&item("Gadget", 1.0, None)));
    assert!(!filters.matches(&item("wid", 1.0, None)));
}

#[test]
fn test_filters_price_bounds_are_half_open() {
    let filters = ItemFilters::new().with_min_price(10.0).with_max_price(20.0);
    assert!(filters.matches(&item("a", 10.0, None)));
    assert!(filters.matches(&item("a", 19.99, None)));
    assert!(!filters.matches(&item("a", 20.0, None)));
    assert!(!filters.matches(&item("a", 9.99, None)));
}

#[test]
fn test_filters_nan_bounds_match_nothing() {
    let min_nan = ItemFilters::new().with_min_price(f64::NAN);
    let max_nan = ItemFilters::new().with_max_price(f64::NAN);
    for price in [5.0, 500.0] {
        assert!(!min_nan.matches(&item("a", price, None)));
        assert!(!max_nan.matches(&item("a", price, None)));
    }
}

#[test]
fn test_filters_validate_rejects_non_finite_bounds() {
    assert!(ItemFilters::offers(Some(1.0), Some(2.0)).validate().is_ok());
    assert!(ItemFilters::new().validate().is_ok());

    let err = ItemFilters::offers(Some(f64::NAN), Some(f64::INFINITY))
        .validate()
        .unwrap_err();
    assert!(err.has_field("min_price"));
    assert!(err.has_field("max_price"));
}

#[test]
fn test_filters_offer_ignores_unset_items() {
    let filters = ItemFilters::new().with_offer(false);
    assert!(filters.matches(&item("a", 1.0, Some(false))));
    assert!(!filters.matches(&item("a", 1.0, None)));
    assert!(!filters.matches(&item("a", 1.0, Some(true))));
}

#[test]
fn test_offers_filter() {
    let filters = ItemFilters::offers(Some(5.0), Some(50.0));
    assert_eq!(filters.is_offer, Some(true));
    assert!(filters.matches(&item("a", 5.0, Some(true))));
    assert!(!filters.matches(&item("a", 5.0, Some(false))));
}

#[test]
fn test_detail_from_item() {
    let stored = item("Chair", 45.0, Some(false));
    let detail = ItemDetail::from(&stored);
    assert_eq!(detail.id, stored.id);
    assert_eq!(detail.created_at, stored.created_at);
    assert_eq!(detail.name, "Chair");
}
