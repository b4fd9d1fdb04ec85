use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Boat – one listing record
// ---------------------------------------------------------------------------

/// A single boat-for-sale listing as served by the backend `boats` table.
///
/// Any field may be absent or malformed in the source data. Missing values are kept as "unknown" (`None`, empty string, `false`)
/// instead of rejecting the record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Boat {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub builder: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub year_built: Option<i64>,
    /// Length overall in meters.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_eur: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub vat_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_sold: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub image_url: Option<String>,
    /// ISO-8601 timestamps kept as text for simplicity.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub navinet_updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub last_seen_at: Option<String>,
}

impl Boat {
    /// Length with missing values treated as zero.
    pub fn length_or_zero(&self) -> f64 {
        self.length.filter(|l| l.is_finite()).unwrap_or(0.0)
    }

    /// Price with missing or non-numeric values treated as zero.
    pub fn price_or_zero(&self) -> f64 {
        self.price_eur.filter(|p| p.is_finite()).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// PricePoint – one row of the `price_history` table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub boat_id: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_eur: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub recorded_at: Option<String>,
}

// ---------------------------------------------------------------------------
// BoatCollection – the fetched record set
// ---------------------------------------------------------------------------

/// The record set for one session. Order is the source order and ids are
/// unique: later duplicates are dropped on construction.
#[derive(Debug, Clone, Default)]
pub struct BoatCollection {
    boats: Vec<Boat>,
}

impl BoatCollection {
    pub fn new(boats: Vec<Boat>) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(boats.len());
        let mut unique = Vec::with_capacity(boats.len());
        for boat in boats {
            if seen.insert(boat.id.clone()) {
                unique.push(boat);
            } else {
                log::warn!("Dropping duplicate listing id {:?}", boat.id);
            }
        }
        BoatCollection { boats: unique }
    }

    pub fn boats(&self) -> &[Boat] {
        &self.boats
    }

    pub fn get(&self, idx: usize) -> Option<&Boat> {
        self.boats.get(idx)
    }

    pub fn len(&self) -> usize {
        self.boats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boats.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------
//
// Both the REST backend (JSON) and CSV/Parquet snapshots go through these.
// A value that cannot be interpreted becomes "unknown" rather than an error.

fn lenient_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<JsonValue>, D::Error> {
    Option::<JsonValue>::deserialize(d)
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match lenient_value(d)? {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match lenient_value(d)? {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match lenient_value(d)? {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
        Some(JsonValue::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match lenient_value(d)? {
        Some(JsonValue::Bool(b)) => b,
        Some(JsonValue::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "t" | "1" | "yes"),
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}
