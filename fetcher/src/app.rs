use crate::ingest::{HttpSource, PageSource};
use crate::pipeline::{Pipeline, PipelineHandle, PipelineSettings};
use crate::sink::LineSink;
use fetcher_core::{Config, Result};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct App {
    pipeline: Pipeline,
}

impl App {
    #[instrument(skip(config))]
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing application");

        let source: Arc<dyn PageSource> =
            Arc::new(HttpSource::new(config.source.request_timeout())?);

        let pipeline = Pipeline::new(
            source,
            Box::new(LineSink::stdout()),
            PipelineSettings::from(config),
        );

        Ok(Self { pipeline })
    }

    pub fn start(self) -> PipelineHandle {
        self.pipeline.start()
    }
}
