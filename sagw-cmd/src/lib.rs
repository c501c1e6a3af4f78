//! Command implementations for the SA groundwater CLI.
//!
//! Each subcommand loads the wells layer saved by earlier runs, submits
//! its background task and drives the completion loop until the task is
//! done or the user interrupts with Ctrl-C.

use clap::{Args, Subcommand};
use sagw_task::TaskManager;
use sagw_wells::api::Connector;
use sagw_wells::rect::Rect;
use sagw_wells::series::Parameter;
use sagw_wells::session::WaterConnect;
use sagw_wells::well::details_url;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config;
pub mod plugin;
pub mod tasks;

pub use config::Config;
pub use plugin::{Figure, Plugin};
use tasks::{FindMapCanvasWellsTask, ParamTimeSeriesPlotTask};

/// Where the wells layer is kept between runs.
#[derive(Args, Debug, Clone)]
pub struct LayerArgs {
    /// GeoJSON file holding the wells layer
    #[arg(long, default_value = "sa_gwdata_wells.geojson")]
    pub wells: PathBuf,
}

/// Which wells of the wells layer a command works on.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Drillhole numbers, comma separated or repeated
    #[arg(long = "dh-no", value_delimiter = ',')]
    pub dh_nos: Vec<i64>,

    /// Every well in the wells layer
    #[arg(long, conflicts_with = "dh_nos")]
    pub all: bool,
}

impl SelectionArgs {
    /// The selected drillhole numbers.
    pub fn resolve(&self, plugin: &Plugin) -> anyhow::Result<Vec<i64>> {
        let dh_nos = if self.all {
            match plugin.wells_layer() {
                Some(layer) => layer.dh_nos()?,
                None => anyhow::bail!("--all needs a wells layer; run find-wells first"),
            }
        } else {
            self.dh_nos.clone()
        };
        if dh_nos.is_empty() {
            anyhow::bail!("no wells selected");
        }
        Ok(dh_nos)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the wells inside a latitude/longitude rectangle into the wells layer
    FindWells {
        #[arg(long, allow_hyphen_values = true)]
        min_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        max_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        min_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        max_lon: f64,
        #[command(flatten)]
        layer: LayerArgs,
    },

    /// Chart water levels for selected wells
    ChartWaterLevels {
        /// rswl or swl
        #[arg(long, default_value = "rswl")]
        param: Parameter,
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        layer: LayerArgs,
        /// Directory the chart and figure layer are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Chart bulk salinity sample data for selected wells
    ChartSalinity {
        /// TDS or EC
        #[arg(long, default_value = "TDS")]
        param: Parameter,
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        layer: LayerArgs,
        /// Directory the chart and figure layer are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the Groundwater Data page of selected wells
    Browse {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        layer: LayerArgs,
    },
}

pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let connector = Arc::new(WaterConnect::new(config.session_config()));
    match command {
        Command::FindWells {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            layer,
        } => {
            let rect = Rect::new([min_lat, max_lat], [min_lon, max_lon]);
            find_wells(config, connector, rect, &layer.wells).await
        }
        Command::ChartWaterLevels {
            param,
            selection,
            layer,
            out_dir,
        } => chart(config, connector, param, &selection, &layer.wells, &out_dir).await,
        Command::ChartSalinity {
            param,
            selection,
            layer,
            out_dir,
        } => chart(config, connector, param, &selection, &layer.wells, &out_dir).await,
        Command::Browse { selection, layer } => {
            let mut plugin = Plugin::new(config, Path::new("."));
            plugin.load_wells_layer(&layer.wells)?;
            for url in browse(&plugin, &selection.resolve(&plugin)?)? {
                println!("{}", url);
            }
            Ok(())
        }
    }
}

/// Search `rect` and merge the wells into the layer saved at `wells_path`.
pub async fn find_wells<C: Connector>(
    config: Config,
    connector: Arc<C>,
    rect: Rect,
    wells_path: &Path,
) -> anyhow::Result<()> {
    let mut plugin = Plugin::new(config, Path::new("."));
    plugin.load_wells_layer(wells_path)?;
    let mut manager = TaskManager::new();
    manager.add_task(FindMapCanvasWellsTask::new(connector, &plugin, rect));
    drive(&mut manager, &mut plugin).await?;
    plugin.save_wells_layer(wells_path)
}

/// Chart `param` for the selected wells into `out_dir`.
pub async fn chart<C: Connector>(
    config: Config,
    connector: Arc<C>,
    param: Parameter,
    selection: &SelectionArgs,
    wells_path: &Path,
    out_dir: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let mut plugin = Plugin::new(config, out_dir);
    plugin.load_wells_layer(wells_path)?;
    let dh_nos = selection.resolve(&plugin)?;
    let task = match param.service() {
        sagw_wells::series::BulkService::WaterLevel => {
            ParamTimeSeriesPlotTask::water_level(connector, &plugin, dh_nos, param)?
        }
        sagw_wells::series::BulkService::Salinity => {
            ParamTimeSeriesPlotTask::salinity(connector, &plugin, dh_nos, param)?
        }
    };
    let mut manager = TaskManager::new();
    manager.add_task(task);
    drive(&mut manager, &mut plugin).await?;
    for figure in plugin.figures() {
        println!("{}", figure.svg_path.display());
    }
    Ok(())
}

/// Groundwater Data page URLs of the selected wells. Drillholes missing
/// from a loaded wells layer are reported but still listed.
pub fn browse(plugin: &Plugin, dh_nos: &[i64]) -> anyhow::Result<Vec<String>> {
    if let Some(layer) = plugin.wells_layer() {
        for dh_no in dh_nos {
            if !layer.contains(*dh_no)? {
                log::warn!("Drillhole {} is not in layer {}", dh_no, layer.name());
            }
        }
    }
    Ok(dh_nos.iter().map(|dh_no| details_url(*dh_no)).collect())
}

/// Run the completion loop until no task is pending. Ctrl-C cancels every
/// running task; their completions are still awaited.
pub async fn drive(manager: &mut TaskManager<Plugin>, plugin: &mut Plugin) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            completion = manager.next_completion() => match completion {
                Some(completion) => manager.finish(completion, plugin)?,
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted; canceling {} tasks", manager.pending());
                manager.cancel_all();
            }
        }
    }
}
