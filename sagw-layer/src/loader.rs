//! Feature loading for the in-memory layer.
//!
//! The first batch of wells added to an empty layer defines its fields;
//! later batches are aligned to that field list.

use crate::models::{Field, FieldKind};
use crate::FeatureLayer;
use rusqlite::{params, Connection};
use sagw_wells::well::{AttributeValue, Well, WELL_COLUMNS, WELL_DATE_COLUMNS, YEAR_SUFFIX};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Field kind of a column, from its name and the values seen for it.
fn infer_kind(name: &str, wells: &[Well]) -> FieldKind {
    if WELL_DATE_COLUMNS.contains(&name) {
        return FieldKind::DateTime;
    }
    if name.ends_with(YEAR_SUFFIX) {
        return FieldKind::Int;
    }
    let mut seen_any = false;
    let mut all_int = true;
    let mut all_numeric = true;
    for value in wells.iter().filter_map(|w| w.attribute(name)) {
        match value {
            AttributeValue::Null => continue,
            AttributeValue::Int(_) => {}
            AttributeValue::Float(_) => all_int = false,
            _ => {
                all_int = false;
                all_numeric = false;
            }
        }
        seen_any = true;
    }
    match (seen_any, all_int, all_numeric) {
        (false, _, _) => FieldKind::String,
        (true, true, _) => FieldKind::Int,
        (true, false, true) => FieldKind::Double,
        _ => FieldKind::String,
    }
}

/// Field list for a first batch: the static well columns, the derived year
/// columns, `well_id`, then any other attribute in name order.
pub(crate) fn infer_fields(wells: &[Well]) -> Vec<Field> {
    let mut names: Vec<String> = WELL_COLUMNS.iter().map(|c| c.to_string()).collect();
    names.extend(
        WELL_DATE_COLUMNS
            .iter()
            .map(|c| format!("{}{}", c, YEAR_SUFFIX)),
    );
    names.push("well_id".to_string());
    let known: HashSet<String> = names.iter().cloned().collect();
    let extra: BTreeSet<&String> = wells
        .iter()
        .flat_map(|w| w.attributes.keys())
        .filter(|k| !known.contains(*k))
        .collect();
    names.extend(extra.into_iter().cloned());
    names
        .into_iter()
        .map(|name| Field {
            kind: infer_kind(&name, wells),
            name,
        })
        .collect()
}

/// Attribute values of `well` in field order; absent fields are empty text.
pub(crate) fn align_attributes(well: &Well, fields: &[Field]) -> BTreeMap<String, AttributeValue> {
    fields
        .iter()
        .map(|field| {
            let value = well
                .attribute(&field.name)
                .cloned()
                .unwrap_or_else(|| AttributeValue::Text(String::new()));
            (field.name.clone(), value)
        })
        .collect()
}

pub(crate) fn insert_fields(conn: &Connection, fields: &[Field]) -> anyhow::Result<()> {
    for (position, field) in fields.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO fields (position, name, kind) VALUES (?1, ?2, ?3)",
            params![position as i64, field.name, field.kind.as_str()],
        )?;
    }
    Ok(())
}

impl FeatureLayer {
    /// Add point features for `wells`, skipping any drillhole already in the
    /// layer. Returns the number of features added.
    pub fn add_wells(&self, wells: &[Well]) -> anyhow::Result<usize> {
        let mut fields = self.fields()?;
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        if fields.is_empty() && !wells.is_empty() {
            fields = infer_fields(wells);
            insert_fields(&tx, &fields)?;
        }

        let mut added = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO features (dh_no, well_id, lon, lat, attributes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for well in wells {
                let attributes = serde_json::to_string(&align_attributes(well, &fields))?;
                added += stmt.execute(params![
                    well.dh_no,
                    well.well_id,
                    well.lon,
                    well.lat,
                    attributes
                ])?;
            }
        }
        tx.commit()?;
        log::info!(
            "layer {}: added {} of {} wells",
            self.name,
            added,
            wells.len()
        );
        Ok(added)
    }

    /// Replace the field list. Only valid while the layer has no features.
    pub fn set_fields(&self, fields: &[Field]) -> anyhow::Result<()> {
        if self.feature_count()? > 0 {
            anyhow::bail!("layer {} already has features", self.name);
        }
        let conn = self.conn.borrow();
        conn.execute("DELETE FROM fields", [])?;
        insert_fields(&conn, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::well;

    #[test]
    fn add_wells_skips_existing_drillholes() {
        let layer = FeatureLayer::new("wells").unwrap();
        let first = vec![well(1, "ADE001", "6628-1", "Tqa"), well(2, "", "6628-2", "")];
        assert_eq!(layer.add_wells(&first).unwrap(), 2);

        let refresh = vec![well(2, "", "6628-2", ""), well(3, "ADE003", "6628-3", "Tqa")];
        assert_eq!(layer.add_wells(&refresh).unwrap(), 1);
        assert_eq!(layer.feature_count().unwrap(), 3);
        assert_eq!(layer.dh_nos().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn add_wells_deduplicates_within_a_batch() {
        let layer = FeatureLayer::new("wells").unwrap();
        let batch = vec![well(7, "A", "B", ""), well(7, "A", "B", "")];
        assert_eq!(layer.add_wells(&batch).unwrap(), 1);
    }

    #[test]
    fn first_batch_defines_fields() {
        let layer = FeatureLayer::new("wells").unwrap();
        layer.add_wells(&[well(1, "ADE001", "6628-1", "Tqa")]).unwrap();
        let fields = layer.fields().unwrap();
        assert_eq!(fields[0].name, "dh_no");
        assert_eq!(fields[0].kind, FieldKind::Int);
        let kind_of = |name: &str| fields.iter().find(|f| f.name == name).map(|f| f.kind);
        assert_eq!(kind_of("lat"), Some(FieldKind::Double));
        assert_eq!(kind_of("max_depth"), Some(FieldKind::Double));
        assert_eq!(kind_of("drill_date"), Some(FieldKind::DateTime));
        assert_eq!(kind_of("drill_date_year"), Some(FieldKind::Int));
        assert_eq!(kind_of("aq_mon"), Some(FieldKind::String));
        assert_eq!(kind_of("well_id"), Some(FieldKind::String));
        // swl is missing from the record and filled with empty text
        assert_eq!(kind_of("swl"), Some(FieldKind::String));
    }

    #[test]
    fn later_batches_are_aligned_to_fields() {
        let layer = FeatureLayer::new("wells").unwrap();
        layer.add_wells(&[well(1, "ADE001", "6628-1", "Tqa")]).unwrap();
        let mut other = well(2, "ADE002", "6628-2", "Qpah");
        other
            .attributes
            .insert("not_a_field".into(), AttributeValue::Int(1));
        other.attributes.remove("aq_mon");
        layer.add_wells(&[other]).unwrap();

        let stored = layer.features_by_dh_no(&[2]).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].attribute("not_a_field").is_none());
        assert_eq!(stored[0].attribute_text("aq_mon"), "");
    }

    #[test]
    fn set_fields_rejected_once_populated() {
        let layer = FeatureLayer::new("wells").unwrap();
        let fields = vec![Field {
            name: "dh_no".into(),
            kind: FieldKind::Int,
        }];
        layer.set_fields(&fields).unwrap();
        assert_eq!(layer.fields().unwrap(), fields);
        layer.add_wells(&[well(1, "A", "B", "")]).unwrap();
        assert!(layer.set_fields(&fields).is_err());
    }
}
