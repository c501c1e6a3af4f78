//! GeoJSON import and export of a feature layer.
//!
//! Layers are written as a `FeatureCollection` with three foreign members:
//! `name`, `fields` and `categories`. Each feature carries its drillhole
//! number as `id`, a `Point` geometry and its attributes as properties.

use crate::models::{Category, Field};
use crate::FeatureLayer;
use anyhow::{anyhow, Context};
use sagw_wells::well::{AttributeValue, Well};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const DEFAULT_NAME: &str = "wells";

fn feature_to_geojson(well: &Well) -> Value {
    let properties: Map<String, Value> = well
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
        .collect();
    json!({
        "type": "Feature",
        "id": well.dh_no,
        "geometry": {
            "type": "Point",
            "coordinates": [well.lon, well.lat],
        },
        "properties": properties,
    })
}

fn feature_from_geojson(feature: &Value) -> anyhow::Result<Well> {
    let coordinates = feature
        .pointer("/geometry/coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("feature without point coordinates"))?;
    let coord = |i: usize| {
        coordinates
            .get(i)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("invalid point coordinates"))
    };
    let (lon, lat) = (coord(0)?, coord(1)?);

    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let dh_no = properties
        .get("dh_no")
        .and_then(Value::as_i64)
        .or_else(|| feature.get("id").and_then(Value::as_i64))
        .ok_or_else(|| anyhow!("feature without dh_no"))?;
    let well_id = properties
        .get("well_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut attributes: BTreeMap<String, AttributeValue> = properties
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
        .collect();
    attributes.insert("dh_no".into(), AttributeValue::Int(dh_no));
    attributes.insert("lat".into(), AttributeValue::Float(lat));
    attributes.insert("lon".into(), AttributeValue::Float(lon));

    Ok(Well {
        dh_no,
        well_id,
        lat,
        lon,
        attributes,
    })
}

impl FeatureLayer {
    /// Export the layer as a GeoJSON `FeatureCollection`.
    pub fn to_geojson(&self) -> anyhow::Result<Value> {
        let features: Vec<Value> = self.features()?.iter().map(feature_to_geojson).collect();
        Ok(json!({
            "type": "FeatureCollection",
            "name": self.name,
            "fields": serde_json::to_value(self.fields()?)?,
            "categories": serde_json::to_value(self.categories()?)?,
            "features": features,
        }))
    }

    /// Rebuild a layer from a `FeatureCollection` written by
    /// [`FeatureLayer::to_geojson`]. Plain collections without the foreign
    /// members are accepted; their fields are inferred from the features.
    pub fn from_geojson(value: &Value) -> anyhow::Result<FeatureLayer> {
        if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            anyhow::bail!("not a GeoJSON FeatureCollection");
        }
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NAME);
        let layer = FeatureLayer::new(name)?;

        if let Some(fields) = value.get("fields") {
            let fields: Vec<Field> =
                serde_json::from_value(fields.clone()).context("invalid layer fields")?;
            if !fields.is_empty() {
                layer.set_fields(&fields)?;
            }
        }

        let wells = value
            .get("features")
            .and_then(Value::as_array)
            .map(|features| {
                features
                    .iter()
                    .map(feature_from_geojson)
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();
        layer.add_wells(&wells)?;

        if let Some(categories) = value.get("categories") {
            let categories: Vec<Category> =
                serde_json::from_value(categories.clone()).context("invalid layer categories")?;
            layer.set_categories(&categories)?;
        }
        log::debug!("layer {}: loaded {} features from GeoJSON", name, wells.len());
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::well;
    use chrono::NaiveDate;

    #[test]
    fn export_writes_points_and_foreign_members() {
        let layer = FeatureLayer::new("sa_gwdata wells").unwrap();
        layer
            .add_wells(&[well(5, "ADE005", "6628-5", "Tqa")])
            .unwrap();
        let value = layer.to_geojson().unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["name"], "sa_gwdata wells");
        assert!(value["fields"].as_array().unwrap().len() > 40);
        let feature = &value["features"][0];
        assert_eq!(feature["id"], 5);
        assert_eq!(feature["geometry"]["coordinates"][0], 138.6);
        assert_eq!(feature["properties"]["well_id"], "ADE005");
        assert_eq!(feature["properties"]["drill_date"], "1990-05-06");
        assert_eq!(feature["properties"]["drill_date_year"], 1990);
    }

    #[test]
    fn import_restores_layer() {
        let layer = FeatureLayer::new("Fig 1 rswl").unwrap();
        layer
            .add_wells(&[
                well(1, "ADE001", "6628-1", "Tqa"),
                well(2, "", "6628-2", ""),
            ])
            .unwrap();
        let categories = vec![Category {
            value: "ADE001".into(),
            colour: "#023eff".into(),
            label: "ADE001 Tqa".into(),
        }];
        layer.set_categories(&categories).unwrap();

        let restored = FeatureLayer::from_geojson(&layer.to_geojson().unwrap()).unwrap();
        assert_eq!(restored.name(), "Fig 1 rswl");
        assert_eq!(restored.dh_nos().unwrap(), vec![1, 2]);
        assert_eq!(restored.fields().unwrap(), layer.fields().unwrap());
        assert_eq!(restored.categories().unwrap(), categories);
        let wells = restored.features().unwrap();
        assert_eq!(wells[1].well_id, "6628-2");
        assert_eq!(
            wells[0].attribute("drill_date"),
            Some(&AttributeValue::Date(NaiveDate::from_ymd_opt(1990, 5, 6).unwrap()))
        );
    }

    #[test]
    fn import_plain_collection_uses_feature_id() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": 42,
                "geometry": {"type": "Point", "coordinates": [139.1, -35.2]},
                "properties": {"well_id": "YAT042"},
            }],
        });
        let layer = FeatureLayer::from_geojson(&value).unwrap();
        assert_eq!(layer.name(), "wells");
        assert_eq!(layer.dh_nos().unwrap(), vec![42]);
        let wells = layer.features().unwrap();
        assert_eq!(wells[0].lat, -35.2);
        assert_eq!(wells[0].well_id, "YAT042");
    }

    #[test]
    fn import_rejects_other_geojson() {
        let value = json!({"type": "Feature", "geometry": null, "properties": {}});
        assert!(FeatureLayer::from_geojson(&value).is_err());
    }
}
