//! Main-thread state shared by the commands.

use crate::config::Config;
use anyhow::Context;
use sagw_layer::FeatureLayer;
use sagw_wells::well::Well;
use std::path::{Path, PathBuf};

/// A chart written by a plotting task, with its wells layer.
#[derive(Debug)]
pub struct Figure {
    pub number: usize,
    pub name: String,
    pub svg_path: PathBuf,
    pub geojson_path: PathBuf,
    pub layer: FeatureLayer,
}

/// State the task completion handlers work on.
#[derive(Debug)]
pub struct Plugin {
    pub config: Config,
    output_dir: PathBuf,
    wells_layer: Option<FeatureLayer>,
    figure_counter: usize,
    figures: Vec<Figure>,
}

impl Plugin {
    pub fn new(config: Config, output_dir: &Path) -> Self {
        Plugin {
            config,
            output_dir: output_dir.to_path_buf(),
            wells_layer: None,
            figure_counter: 0,
            figures: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn wells_layer(&self) -> Option<&FeatureLayer> {
        self.wells_layer.as_ref()
    }

    /// Forget the wells layer; the next search starts a new one.
    pub fn wells_layer_removed(&mut self) {
        self.wells_layer = None;
    }

    /// Add wells to the wells layer, creating it first if needed. Wells
    /// already in the layer are skipped.
    pub fn add_found_wells(&mut self, wells: &[Well]) -> anyhow::Result<usize> {
        let layer = match self.wells_layer.take() {
            Some(layer) => layer,
            None => {
                log::info!("Creating layer {}", self.config.wells_layer_name);
                FeatureLayer::new(&self.config.wells_layer_name)?
            }
        };
        let added = layer.add_wells(wells);
        self.wells_layer = Some(layer);
        added
    }

    /// Copy of every well in the wells layer, empty without a layer.
    pub fn wells_snapshot(&self) -> anyhow::Result<Vec<Well>> {
        match &self.wells_layer {
            Some(layer) => layer.features(),
            None => Ok(Vec::new()),
        }
    }

    /// Number for the next figure, starting at 1.
    pub fn next_figure(&mut self) -> usize {
        self.figure_counter += 1;
        self.figure_counter
    }

    pub fn add_figure(&mut self, figure: Figure) {
        log::info!("Added figure {} ({})", figure.name, figure.svg_path.display());
        self.figures.push(figure);
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Pick up a wells layer saved by an earlier run. A missing file is not
    /// an error.
    pub fn load_wells_layer(&mut self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            log::debug!("No wells layer at {}", path.display());
            return Ok(());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading wells layer {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing wells layer {}", path.display()))?;
        let layer = FeatureLayer::from_geojson(&value)?;
        if layer.name() != self.config.wells_layer_name {
            log::warn!(
                "{} holds layer {:?}, expected {:?}",
                path.display(),
                layer.name(),
                self.config.wells_layer_name
            );
        }
        log::info!(
            "Loaded {} wells from {}",
            layer.feature_count()?,
            path.display()
        );
        self.wells_layer = Some(layer);
        Ok(())
    }

    /// Write the wells layer as GeoJSON. Does nothing without a layer.
    pub fn save_wells_layer(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(layer) = &self.wells_layer {
            write_geojson(path, layer)?;
            log::info!(
                "Saved {} wells to {}",
                layer.feature_count()?,
                path.display()
            );
        }
        Ok(())
    }
}

pub(crate) fn write_geojson(path: &Path, layer: &FeatureLayer) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(&layer.to_geojson()?)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use sagw_wells::well::{Well, WellRecord};
    use serde_json::json;

    pub fn well(dh_no: i64, obs_no: &str, aq_mon: &str) -> Well {
        let record = WellRecord::flatten(&json!({
            "dh_no": dh_no,
            "lat": -34.9,
            "lon": 138.6 + dh_no as f64 / 1000.0,
            "obs_no": {"id": obs_no},
            "unit_no": {"hyphen": format!("6628-{}", dh_no)},
            "aq_mon": aq_mon,
        }))
        .unwrap();
        Well::from_record(&record).unwrap()
    }

    /// A fresh directory under the system temp dir.
    pub fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sagw-{}-{}-{}",
            name,
            std::process::id(),
            sagw_task::TaskId::new()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
