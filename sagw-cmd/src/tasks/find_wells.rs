use crate::plugin::Plugin;
use sagw_task::{acquire_session, Task, TaskContext, TaskError};
use sagw_wells::api::Connector;
use sagw_wells::rect::Rect;
use sagw_wells::search::find_wells_subdivided;
use sagw_wells::well::Well;
use sagw_wells::SagwError;
use std::sync::Arc;
use std::time::Duration;

/// Load the wells inside a rectangle into the plugin's wells layer.
pub struct FindMapCanvasWellsTask<C: Connector> {
    connector: Arc<C>,
    rect: Rect,
    page_cap: usize,
    retry_delay: Duration,
    wells: Vec<Well>,
}

impl<C: Connector> FindMapCanvasWellsTask<C> {
    pub fn new(connector: Arc<C>, plugin: &Plugin, rect: Rect) -> Self {
        FindMapCanvasWellsTask {
            connector,
            rect,
            page_cap: plugin.config.page_cap,
            retry_delay: plugin.config.retry_delay(),
            wells: Vec::new(),
        }
    }
}

impl<C: Connector> Task for FindMapCanvasWellsTask<C> {
    const KIND: &'static str = "FindMapCanvasWellsTask";
    type State = Plugin;

    fn description(&self) -> String {
        format!("Find wells in {}", self.rect)
    }

    async fn run(&mut self, ctx: &TaskContext) -> Result<bool, TaskError> {
        let session = acquire_session(self.connector.as_ref(), self.retry_delay).await?;
        let is_canceled = || ctx.is_canceled();
        let records =
            match find_wells_subdivided(&session, self.rect, self.page_cap, &is_canceled).await {
                Ok(records) => records,
                Err(SagwError::Canceled) => return Ok(false),
                Err(e) => return Err(e.into()),
            };

        let mut wells = Vec::with_capacity(records.len());
        for record in &records {
            match Well::from_record(record) {
                Ok(well) => wells.push(well),
                Err(e) => log::warn!(target: Self::KIND, "Skipping record: {}", e),
            }
        }
        if let Some(first) = wells.first() {
            log::debug!(
                target: Self::KIND,
                "{} attribute columns",
                first.attributes.len()
            );
        }
        self.wells = wells;
        Ok(!ctx.is_canceled())
    }

    fn finished_success(self, plugin: &mut Plugin) -> anyhow::Result<()> {
        log::info!(target: Self::KIND, "{} wells found", self.wells.len());
        let added = plugin.add_found_wells(&self.wells)?;
        log::info!(
            target: Self::KIND,
            "{} new wells added to {}",
            added,
            plugin.config.wells_layer_name
        );
        Ok(())
    }
}
