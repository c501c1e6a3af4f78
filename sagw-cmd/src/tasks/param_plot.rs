use crate::plugin::{write_geojson, Figure, Plugin};
use anyhow::{anyhow, bail};
use sagw_chart::{
    bright_palette, salinity_chart, to_hex, water_level_chart, write_svg, ChartSpec, RGBColor,
};
use sagw_layer::models::Category;
use sagw_layer::FeatureLayer;
use sagw_task::{acquire_session, Task, TaskContext, TaskError};
use sagw_wells::api::{Connector, GroundwaterApi};
use sagw_wells::series::{BulkService, ParamSeries, Parameter};
use sagw_wells::well::Well;
use std::sync::Arc;
use std::time::Duration;

/// Download a parameter's time series for selected wells, chart it, and
/// build a figure layer of the charted wells coloured as on the chart.
pub struct ParamTimeSeriesPlotTask<C: Connector> {
    connector: Arc<C>,
    parameter: Parameter,
    dh_nos: Vec<i64>,
    retry_delay: Duration,
    /// The wells layer as it was when the task was created
    all_wells: Vec<Well>,
    series: Option<ParamSeries>,
    well_ids: Vec<String>,
    colours: Vec<RGBColor>,
}

impl<C: Connector> ParamTimeSeriesPlotTask<C> {
    fn new(
        connector: Arc<C>,
        plugin: &Plugin,
        dh_nos: Vec<i64>,
        parameter: Parameter,
    ) -> anyhow::Result<Self> {
        if dh_nos.is_empty() {
            bail!("no wells selected");
        }
        Ok(ParamTimeSeriesPlotTask {
            connector,
            parameter,
            dh_nos,
            retry_delay: plugin.config.retry_delay(),
            all_wells: plugin.wells_snapshot()?,
            series: None,
            well_ids: Vec::new(),
            colours: Vec::new(),
        })
    }

    /// Chart `rswl` or `swl` from the water level download.
    pub fn water_level(
        connector: Arc<C>,
        plugin: &Plugin,
        dh_nos: Vec<i64>,
        parameter: Parameter,
    ) -> anyhow::Result<Self> {
        if parameter.service() != BulkService::WaterLevel {
            bail!("{} is not a water level parameter", parameter);
        }
        Self::new(connector, plugin, dh_nos, parameter)
    }

    /// Chart `TDS` or `EC` from the salinity download, split by sampling
    /// method.
    pub fn salinity(
        connector: Arc<C>,
        plugin: &Plugin,
        dh_nos: Vec<i64>,
        parameter: Parameter,
    ) -> anyhow::Result<Self> {
        if parameter.service() != BulkService::Salinity {
            bail!("{} is not a salinity parameter", parameter);
        }
        Self::new(connector, plugin, dh_nos, parameter)
    }

    /// `<well_id> <aq_mon>`, or the bare well id when the monitored aquifer
    /// is unknown.
    fn label(&self, well_id: &str) -> String {
        let aq_mon = self
            .all_wells
            .iter()
            .find(|w| w.well_id == well_id)
            .map(|w| w.attribute_text("aq_mon"))
            .unwrap_or_default();
        if aq_mon.is_empty() {
            well_id.to_string()
        } else {
            format!("{} {}", well_id, aq_mon)
        }
    }

    fn chart(&self, series: &ParamSeries) -> ChartSpec {
        let labels: Vec<(String, String)> = self
            .well_ids
            .iter()
            .map(|id| (id.clone(), self.label(id)))
            .collect();
        match self.parameter.service() {
            BulkService::WaterLevel => water_level_chart(series, &labels, &self.colours),
            BulkService::Salinity => salinity_chart(series, &labels, &self.colours),
        }
    }

    /// Layer of the snapshot wells present in the data, one colour category
    /// per charted well.
    fn figure_layer(&self, name: &str, series: &ParamSeries) -> anyhow::Result<FeatureLayer> {
        let dh_nos = series.dh_nos();
        let wells: Vec<Well> = self
            .all_wells
            .iter()
            .filter(|w| dh_nos.binary_search(&w.dh_no).is_ok())
            .cloned()
            .collect();
        let layer = FeatureLayer::new(name)?;
        layer.add_wells(&wells)?;
        let categories: Vec<Category> = self
            .well_ids
            .iter()
            .zip(&self.colours)
            .map(|(well_id, colour)| {
                log::debug!(target: Self::KIND, "well_id {} colour {}", well_id, to_hex(colour));
                Category {
                    value: well_id.clone(),
                    colour: to_hex(colour),
                    label: self.label(well_id),
                }
            })
            .collect();
        layer.set_categories(&categories)?;
        Ok(layer)
    }
}

impl<C: Connector> Task for ParamTimeSeriesPlotTask<C> {
    const KIND: &'static str = "ParamTimeSeriesPlotTask";
    type State = Plugin;

    fn description(&self) -> String {
        format!("Chart {} for {} wells", self.parameter, self.dh_nos.len())
    }

    async fn run(&mut self, ctx: &TaskContext) -> Result<bool, TaskError> {
        let session = acquire_session(self.connector.as_ref(), self.retry_delay).await?;
        let service = self.parameter.service();
        let table = tokio::select! {
            _ = ctx.token().cancelled() => return Ok(false),
            table = session.bulk_download(service, &self.dh_nos) => table?,
        };
        log::info!(
            target: Self::KIND,
            "Param Plot task: columns = {:?}",
            table.headers
        );
        let series = ParamSeries::from_table(&table, self.parameter)?;
        self.well_ids = series.well_ids();
        log::info!(target: Self::KIND, "well_ids: {:?}", self.well_ids);
        // rows without any well id are not charted
        if series.is_empty() || self.well_ids.is_empty() {
            log::info!(target: Self::KIND, "No data points were found!!");
            return Ok(false);
        }
        self.colours = bright_palette(self.well_ids.len());
        self.series = Some(series);
        Ok(true)
    }

    fn finished_success(self, plugin: &mut Plugin) -> anyhow::Result<()> {
        let series = self
            .series
            .as_ref()
            .ok_or_else(|| anyhow!("no series downloaded"))?;
        log::info!(
            target: Self::KIND,
            "Found {} values from {}",
            series.len(),
            self.parameter.service().service_name()
        );
        let number = plugin.next_figure();
        let name = format!("Fig {} {}", number, self.parameter.column());
        let chart = self.chart(series);
        let layer = self.figure_layer(&name, series)?;

        let stem = format!("fig_{}_{}", number, self.parameter.column().to_lowercase());
        let svg_path = plugin.output_dir().join(format!("{}.svg", stem));
        let geojson_path = plugin.output_dir().join(format!("{}.geojson", stem));
        write_svg(&svg_path, &chart, plugin.config.chart_size())?;
        write_geojson(&geojson_path, &layer)?;
        plugin.add_figure(Figure {
            number,
            name,
            svg_path,
            geojson_path,
            layer,
        });
        Ok(())
    }
}
