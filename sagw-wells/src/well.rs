use crate::error::{Result, SagwError};
use chrono::{Datelike, NaiveDate};
use sagw_utils::dates::parse_attribute_date;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The descriptive columns every well carries, in layer field order.
pub const WELL_COLUMNS: [&str; 46] = [
    "dh_no",
    "id",
    "title",
    "name",
    "unit_no.map",
    "unit_no.seq",
    "unit_no.hyphen",
    "unit_no.long",
    "unit_no.long_int",
    "unit_no.wilma",
    "unit_no.hydstra",
    "obs_no.plan",
    "obs_no.seq",
    "obs_no.id",
    "obs_no.egis",
    "lat",
    "lon",
    "max_depth",
    "drill_date",
    "swl",
    "yield",
    "tds",
    "class",
    "nrm",
    "logdrill",
    "litholog",
    "chem",
    "water",
    "sal",
    "obswell",
    "stratlog",
    "hstratlog",
    "latest_swl_date",
    "latest_sal_date",
    "latest_yield_date",
    "latest_open_depth",
    "latest_open_date",
    "stat_desc",
    "purp_desc",
    "aq_mon",
    "permit_no",
    "pwa",
    "obsnetwork",
    "swlstatus",
    "salstatus",
    "replaceunitnum",
];

/// Well columns holding "YYYY-MM-DD" dates.
pub const WELL_DATE_COLUMNS: [&str; 5] = [
    "drill_date",
    "latest_swl_date",
    "latest_sal_date",
    "latest_open_date",
    "latest_yield_date",
];

/// Identifier columns of a well search result, most preferred first.
pub const WELL_ID_COLUMNS: [&str; 2] = ["obs_no.id", "unit_no.hyphen"];

/// Identifier columns of a bulk download row, most preferred first.
pub const SAMPLE_ID_COLUMNS: [&str; 2] = ["Obs_No", "Unit_No"];

/// Suffix of the derived year column added for every date column.
pub const YEAR_SUFFIX: &str = "_year";

const DETAILS_URL: &str = "https://www.waterconnect.sa.gov.au/Systems/GD/Pages/Details.aspx";

/// Return the first non-empty candidate, or an empty string if there is none.
pub fn preferred_id<I, S>(candidates: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .find(|c| !c.as_ref().is_empty())
        .map(|c| c.as_ref().to_string())
        .unwrap_or_default()
}

/// URL of the Groundwater Data page for a drillhole.
pub fn details_url(dh_no: i64) -> String {
    format!("{}?DHNO={}", DETAILS_URL, dh_no)
}

/// A single attribute value of a well.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl AttributeValue {
    /// Convert a scalar JSON value. Nested values are kept as JSON text.
    pub fn from_json(value: &Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Int(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AttributeValue::Text(s.clone()),
            other => AttributeValue::Text(other.to_string()),
        }
    }

    /// Text rendering, empty for nulls.
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Null => String::new(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::Date(d) => d.format(sagw_utils::dates::ISO_FORMAT).to_string(),
            AttributeValue::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// One raw well search result with nested objects flattened into dotted
/// keys, e.g. `{"unit_no": {"hyphen": "6628-123"}}` becomes `unit_no.hyphen`.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct WellRecord(pub Map<String, Value>);

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&name, inner, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

impl WellRecord {
    /// Flatten a JSON object into a record.
    pub fn flatten(value: &Value) -> Result<WellRecord> {
        if !value.is_object() {
            return Err(SagwError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                value
            )));
        }
        let mut out = Map::new();
        flatten_into("", value, &mut out);
        Ok(WellRecord(out))
    }

    /// Records of a search response: either an array of well objects or an
    /// object wrapping that array in `data`.
    pub fn from_response(value: &Value) -> Result<Vec<WellRecord>> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(SagwError::InvalidRecord(
                        "search response has no data array".to_string(),
                    ))
                }
            },
            other => {
                return Err(SagwError::InvalidRecord(format!(
                    "unexpected search response {}",
                    other
                )))
            }
        };
        items.iter().map(WellRecord::flatten).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn json_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A monitoring well: drillhole number, position and descriptive attributes.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Well {
    /// Drillhole number, the unique key of a well
    pub dh_no: i64,
    /// Observation number if the well has one, otherwise its unit number
    pub well_id: String,
    pub lat: f64,
    pub lon: f64,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Well {
    /// Convert a search result into a well.
    ///
    /// Missing static columns are filled with empty text, date columns are
    /// parsed and get a companion `<col>_year` column, and `well_id` is
    /// derived from the observation and unit numbers.
    pub fn from_record(record: &WellRecord) -> Result<Well> {
        let dh_no = record
            .get("dh_no")
            .and_then(json_to_i64)
            .ok_or_else(|| SagwError::InvalidRecord("missing or invalid dh_no".to_string()))?;
        let lat = record
            .get("lat")
            .and_then(json_to_f64)
            .ok_or_else(|| SagwError::InvalidRecord(format!("dh_no {} has no lat", dh_no)))?;
        let lon = record
            .get("lon")
            .and_then(json_to_f64)
            .ok_or_else(|| SagwError::InvalidRecord(format!("dh_no {} has no lon", dh_no)))?;

        let mut attributes: BTreeMap<String, AttributeValue> = record
            .0
            .iter()
            .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
            .collect();
        for col in WELL_COLUMNS {
            attributes
                .entry(col.to_string())
                .or_insert_with(|| AttributeValue::Text(String::new()));
        }
        for col in WELL_DATE_COLUMNS {
            let date = attributes
                .get(col)
                .and_then(|v| parse_attribute_date(&v.as_text()));
            let (value, year) = match date {
                Some(d) => (AttributeValue::Date(d), AttributeValue::Int(i64::from(d.year()))),
                None => (AttributeValue::Null, AttributeValue::Null),
            };
            attributes.insert(col.to_string(), value);
            attributes.insert(format!("{}{}", col, YEAR_SUFFIX), year);
        }
        attributes.insert("dh_no".to_string(), AttributeValue::Int(dh_no));
        attributes.insert("lat".to_string(), AttributeValue::Float(lat));
        attributes.insert("lon".to_string(), AttributeValue::Float(lon));

        let well_id = preferred_id(
            WELL_ID_COLUMNS
                .iter()
                .map(|c| attributes.get(*c).map(AttributeValue::as_text).unwrap_or_default()),
        );
        attributes.insert("well_id".to_string(), AttributeValue::Text(well_id.clone()));

        Ok(Well {
            dh_no,
            well_id,
            lat,
            lon,
            attributes,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Text of an attribute, empty when it is absent or null.
    pub fn attribute_text(&self, name: &str) -> String {
        self.attribute(name).map(AttributeValue::as_text).unwrap_or_default()
    }
}
