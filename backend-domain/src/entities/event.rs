// Event entity
// A single row of the events table, with the JSON text columns decoded

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::utils::mysql_datetime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_categories: Option<Vec<String>>,
    #[serde(with = "mysql_datetime")]
    pub event_date: NaiveDateTime,
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
    #[serde(rename = "ticketTypes", default)]
    pub ticket_types: Option<Vec<TicketType>>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub total_tickets: Option<i64>,
    #[serde(default)]
    pub available_tickets: Option<i64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(with = "mysql_datetime::option", default)]
    pub created_at: Option<NaiveDateTime>,
}

/// One ticket tier as stored in the `ticketTypes` JSON column.
///
/// Keys the service does not know about are kept in `extra` so a tier
/// written by another client survives a read unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    pub name: String,
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "isFeatured", default, deserialize_with = "lenient::flag")]
    pub is_featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tier fields accept numbers given as strings and flags given as `0`/`1`.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| D::Error::custom("number out of range")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| D::Error::custom(format!("invalid number '{}'", s))),
            other => Err(D::Error::custom(format!("expected a number, got {}", other))),
        }
    }

    pub fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => match n.as_i64() {
                Some(v) => return Ok(v),
                None => n.as_f64(),
            },
            Value::String(s) => {
                let s = s.trim();
                if let Ok(v) = s.parse::<i64>() {
                    return Ok(v);
                }
                s.parse::<f64>().ok()
            }
            other => return Err(D::Error::custom(format!("expected an integer, got {}", other))),
        };
        value
            .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
            .ok_or_else(|| D::Error::custom("expected a whole number"))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            Value::Number(n) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "" | "0" | "false" | "no" => Ok(false),
                other => Err(D::Error::custom(format!("invalid flag '{}'", other))),
            },
            other => Err(D::Error::custom(format!("expected a flag, got {}", other))),
        }
    }
}

/// Decodes a JSON text column. Malformed content is logged and mapped to
/// `None` so one bad row never fails a whole listing.
pub fn decode_json_column<T>(event_id: i64, column: &str, raw: Option<&str>) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw = raw?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(event_id, column, "failed to decode json column: {}", err);
            None
        }
    }
}

/// Serializes a decoded column back into its text form for storage.
pub fn encode_json_column<T: Serialize>(value: &Option<T>) -> anyhow::Result<Option<String>> {
    match value {
        Some(inner) => Ok(Some(serde_json::to_string(inner)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ticket_types_decode_keeps_every_tier() {
        let raw = json!([
            {"name": "VIP", "price": 150, "quantity": 50, "description": "Premium seating with free drinks", "isFeatured": true},
            {"name": "Gold", "price": 120, "quantity": 80, "description": "Great view with early access", "isFeatured": true},
            {"name": "Regular", "price": 49.99, "quantity": 400, "isFeatured": false}
        ])
        .to_string();

        let tiers: Vec<TicketType> =
            decode_json_column(1, "ticketTypes", Some(&raw)).expect("decoded tiers");
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].name, "VIP");
        assert_eq!(tiers[0].price, 150.0);
        assert_eq!(tiers[1].quantity, 80);
        assert!(tiers[1].is_featured);
        assert_eq!(tiers[2].description, None);

        let encoded = encode_json_column(&Some(tiers.clone())).expect("encode").expect("some");
        let again: Vec<TicketType> =
            decode_json_column(1, "ticketTypes", Some(&encoded)).expect("decoded again");
        assert_eq!(again, tiers);
    }

    #[test]
    fn loosely_typed_tiers_still_decode() {
        let raw = json!([
            {"name": "VIP", "price": "150", "quantity": "50", "isFeatured": 1},
            {"name": "Gold", "price": 120, "quantity": 80.0, "isFeatured": "0"},
            {"name": "Door", "price": " 25.5 ", "quantity": 10, "description": null}
        ])
        .to_string();

        let tiers: Vec<TicketType> =
            decode_json_column(2, "ticketTypes", Some(&raw)).expect("decoded tiers");
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].price, 150.0);
        assert_eq!(tiers[0].quantity, 50);
        assert!(tiers[0].is_featured);
        assert_eq!(tiers[1].quantity, 80);
        assert!(!tiers[1].is_featured);
        assert_eq!(tiers[2].price, 25.5);

        let back = serde_json::to_value(&tiers[2]).expect("serialize");
        assert!(back.as_object().expect("object").contains_key("description"));
        assert_eq!(back["description"], Value::Null);
    }

    #[test]
    fn fractional_quantity_is_still_rejected() {
        let raw = r#"[{"name":"Half","price":1,"quantity":2.5}]"#;
        let tiers: Option<Vec<TicketType>> = decode_json_column(4, "ticketTypes", Some(raw));
        assert!(tiers.is_none());
    }

    #[test]
    fn unknown_tier_keys_are_preserved() {
        let raw = r#"[{"name":"Early","price":10,"quantity":5,"isFeatured":false,"salesEnd":"2025-05-01"}]"#;
        let tiers: Vec<TicketType> = decode_json_column(7, "ticketTypes", Some(raw)).expect("tiers");
        assert_eq!(tiers[0].extra.get("salesEnd"), Some(&json!("2025-05-01")));
        let back = serde_json::to_value(&tiers[0]).expect("serialize");
        assert_eq!(back["salesEnd"], json!("2025-05-01"));
    }

    #[test]
    fn malformed_json_column_becomes_none() {
        let parsed: Option<Vec<String>> = decode_json_column(3, "sub_categories", Some("[\"Rock\","));
        assert!(parsed.is_none());
        let empty: Option<Vec<String>> = decode_json_column(3, "sub_categories", Some("  "));
        assert!(empty.is_none());
        let missing: Option<Vec<String>> = decode_json_column(3, "sub_categories", None);
        assert!(missing.is_none());
    }

    #[test]
    fn event_serializes_with_storage_field_names() {
        let event = Event {
            id: 1,
            title: "Summer Music Festival".to_string(),
            description: None,
            location: Some("Central Park, NYC".to_string()),
            organizer: Some("Music Corp".to_string()),
            category: Some("Music".to_string()),
            sub_categories: Some(vec!["Rock".to_string(), "Pop".to_string()]),
            event_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 21)
                .and_then(|d| d.and_hms_opt(18, 0, 0))
                .expect("date"),
            price: 49.99,
            featured: true,
            ticket_types: None,
            main_image: None,
            banner_image: None,
            total_tickets: Some(5000),
            available_tickets: Some(4000),
            duration: Some("3 days".to_string()),
            created_at: None,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event_date"], json!("2025-06-21 18:00:00"));
        assert_eq!(value["sub_categories"], json!(["Rock", "Pop"]));
        assert!(value.get("ticketTypes").is_some());
        assert_eq!(value["ticketTypes"], Value::Null);
    }
}
