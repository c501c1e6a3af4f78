//! Typed queries over a feature layer.

use crate::models::{Category, Field, FieldKind};
use crate::FeatureLayer;
use rusqlite::types::Type;
use rusqlite::{params, Row};
use sagw_utils::dates::{format_date, parse_attribute_date};
use sagw_wells::well::{AttributeValue, Well};
use std::collections::BTreeMap;

/// Restore attribute types lost in JSON: dates stored as text in datetime
/// fields become dates again, and date-looking text in other fields stays
/// text.
pub(crate) fn normalize_attributes(
    mut attributes: BTreeMap<String, AttributeValue>,
    fields: &[Field],
) -> BTreeMap<String, AttributeValue> {
    for field in fields {
        if let Some(value) = attributes.get_mut(&field.name) {
            *value = match (field.kind, std::mem::replace(value, AttributeValue::Null)) {
                (FieldKind::DateTime, AttributeValue::Text(s)) => match parse_attribute_date(&s) {
                    Some(d) => AttributeValue::Date(d),
                    None if s.is_empty() => AttributeValue::Null,
                    None => AttributeValue::Text(s),
                },
                (FieldKind::DateTime, v) => v,
                (_, AttributeValue::Date(d)) => AttributeValue::Text(format_date(&d)),
                (_, v) => v,
            };
        }
    }
    attributes
}

fn row_to_well(row: &Row<'_>, fields: &[Field]) -> rusqlite::Result<Well> {
    let attributes_json: String = row.get(4)?;
    let attributes: BTreeMap<String, AttributeValue> = serde_json::from_str(&attributes_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Well {
        dh_no: row.get(0)?,
        well_id: row.get(1)?,
        lon: row.get(2)?,
        lat: row.get(3)?,
        attributes: normalize_attributes(attributes, fields),
    })
}

impl FeatureLayer {
    /// Attribute fields in layer order.
    pub fn fields(&self) -> anyhow::Result<Vec<Field>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT name, kind FROM fields ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Field {
                    name: row.get(0)?,
                    kind: FieldKind::parse(&row.get::<_, String>(1)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn feature_count(&self) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn contains(&self, dh_no: i64) -> anyhow::Result<bool> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM features WHERE dh_no = ?1",
            params![dh_no],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drillhole numbers of all features, ascending.
    pub fn dh_nos(&self) -> anyhow::Result<Vec<i64>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT dh_no FROM features ORDER BY dh_no")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(rows)
    }

    /// All features ordered by drillhole number.
    pub fn features(&self) -> anyhow::Result<Vec<Well>> {
        let fields = self.fields()?;
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT dh_no, well_id, lon, lat, attributes FROM features ORDER BY dh_no",
        )?;
        let rows = stmt
            .query_map([], |row| row_to_well(row, &fields))?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("layer {}: features returned {} records", self.name, rows.len());
        Ok(rows)
    }

    /// Features for the given drillholes, in the order requested. Unknown
    /// drillholes are skipped.
    pub fn features_by_dh_no(&self, dh_nos: &[i64]) -> anyhow::Result<Vec<Well>> {
        let fields = self.fields()?;
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT dh_no, well_id, lon, lat, attributes FROM features WHERE dh_no = ?1",
        )?;
        let mut rows = Vec::with_capacity(dh_nos.len());
        for dh_no in dh_nos {
            let mut matches = stmt
                .query_map(params![dh_no], |row| row_to_well(row, &fields))?
                .collect::<Result<Vec<_>, _>>()?;
            rows.append(&mut matches);
        }
        Ok(rows)
    }

    /// Text of `field` on the first feature (by drillhole) with `well_id`.
    pub fn attribute_text(&self, well_id: &str, field: &str) -> anyhow::Result<Option<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT attributes FROM features WHERE well_id = ?1 ORDER BY dh_no LIMIT 1",
        )?;
        let mut rows = stmt.query(params![well_id])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let attributes: BTreeMap<String, AttributeValue> = serde_json::from_str(&json)?;
                Ok(attributes.get(field).map(AttributeValue::as_text))
            }
            None => Ok(None),
        }
    }

    /// Categorised style entries in legend order.
    pub fn categories(&self) -> anyhow::Result<Vec<Category>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT value, colour, label FROM categories ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Category {
                    value: row.get(0)?,
                    colour: row.get(1)?,
                    label: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Replace the categorised style.
    pub fn set_categories(&self, categories: &[Category]) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        for (position, category) in categories.iter().enumerate() {
            tx.execute(
                "INSERT OR REPLACE INTO categories (position, value, colour, label)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position as i64, category.value, category.colour, category.label],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
