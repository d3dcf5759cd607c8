use crate::buffer::Buffer;
use crate::ingest::PageSource;
use crate::model::Item;
use crate::sink::ItemSink;
use fetcher_core::Config;
use metrics::{counter, gauge};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// The fetcher cannot get more than one item ahead of the buffering stage.
const ITEM_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub start_url: String,
    pub buffer_capacity: NonZeroUsize,
    pub flush_interval: Duration,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            start_url: config.source.start_url.clone(),
            buffer_capacity: config.buffer.capacity,
            flush_interval: config.buffer.flush_interval(),
        }
    }
}

pub struct Pipeline {
    source: Arc<dyn PageSource>,
    sink: Box<dyn ItemSink>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn PageSource>,
        sink: Box<dyn ItemSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    /// Spawns the fetcher and buffering stages. Both share one cancellation token.
    pub fn start(self) -> PipelineHandle {
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let (tx, rx) = mpsc::channel::<Item>(ITEM_CHANNEL_CAPACITY);

        info!(
            source = self.source.source_id(),
            start_url = %self.settings.start_url,
            capacity = self.settings.buffer_capacity.get(),
            flush_interval_ms = self.settings.flush_interval.as_millis() as u64,
            "Starting pipeline"
        );

        tokio::spawn(run_fetcher(
            self.source,
            tx,
            cancel.clone(),
            self.settings.start_url,
        ));

        let stage = BufferStage::new(self.settings.buffer_capacity, self.sink);
        tokio::spawn(run_buffer(
            stage,
            rx,
            cancel.clone(),
            done.clone(),
            self.settings.flush_interval,
        ));

        PipelineHandle { cancel, done }
    }
}

/// Control side of a running pipeline.
#[derive(Clone)]
pub struct PipelineHandle {
    cancel: CancellationToken,
    done: CancellationToken,
}

impl PipelineHandle {
    /// Cancels both stages and waits for the final flush. Safe to call more than once.
    pub async fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("Stopping pipeline");
        }
        self.cancel.cancel();
        self.done.cancelled().await;
    }

    /// Resolves once the buffering stage has made its final flush, whether the
    /// stop came from a caller or from the fetcher running out of pages.
    pub async fn finished(&self) {
        self.done.cancelled().await;
    }

    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }
}

#[instrument(skip_all, fields(source = source.source_id()))]
async fn run_fetcher(
    source: Arc<dyn PageSource>,
    tx: mpsc::Sender<Item>,
    cancel: CancellationToken,
    start_url: String,
) {
    let mut url = start_url;
    let mut pages = 0u64;
    let mut items = 0u64;
    let mut attempt = 0u32;

    'pages: loop {
        if cancel.is_cancelled() {
            info!(url = %url, "Fetcher cancelled");
            break;
        }

        info!(url = %url, "Fetching page");
        let page = match source.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                attempt += 1;
                counter!("fetcher_fetch_errors").increment(1);
                warn!(url = %url, attempt, error = %e, "Failed to fetch page, retrying");
                // Retries are immediate; give the other stage a turn first.
                tokio::task::yield_now().await;
                continue;
            }
        };

        attempt = 0;
        pages += 1;
        counter!("fetcher_pages_fetched").increment(1);

        if page.results.is_empty() {
            info!(url = %url, "Empty page, no more data");
            cancel.cancel();
            break;
        }

        let next = page.next_cursor().map(str::to_owned);

        for item in page.results {
            if tx.send(item).await.is_err() {
                warn!("Item channel closed, stopping fetcher");
                break 'pages;
            }
            items += 1;
            counter!("fetcher_items_emitted").increment(1);
        }

        match next {
            Some(next) => url = next,
            None => {
                info!(url = %url, "Last page reached");
                cancel.cancel();
                break;
            }
        }
    }

    info!(pages, items, "Fetcher completed");
}

async fn run_buffer(
    mut stage: BufferStage,
    mut rx: mpsc::Receiver<Item>,
    cancel: CancellationToken,
    done: CancellationToken,
    flush_interval: Duration,
) {
    // Dropped last, after the final flush, and also when the sink panics.
    let _done = done.drop_guard();

    let mut ticker = time::interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut items_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // Items already handed off belong to the final batch.
                while let Ok(item) = rx.try_recv() {
                    stage.insert(item);
                }
                stage.flush(FlushTrigger::Shutdown);
                break;
            }
            received = rx.recv(), if items_open => match received {
                Some(item) => stage.insert(item),
                None => {
                    debug!("Item channel closed");
                    items_open = false;
                }
            },
            _ = ticker.tick() => {
                stage.flush(FlushTrigger::Timer);
                ticker.reset();
            }
        }
    }

    info!(written = stage.written, "Buffering stage stopped");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushTrigger {
    Capacity,
    Timer,
    Shutdown,
}

impl FlushTrigger {
    fn as_str(self) -> &'static str {
        match self {
            FlushTrigger::Capacity => "capacity",
            FlushTrigger::Timer => "timer",
            FlushTrigger::Shutdown => "shutdown",
        }
    }
}

struct BufferStage {
    buffer: Buffer,
    sink: Box<dyn ItemSink>,
    written: u64,
}

impl BufferStage {
    fn new(capacity: NonZeroUsize, sink: Box<dyn ItemSink>) -> Self {
        Self {
            buffer: Buffer::new(capacity),
            sink,
            written: 0,
        }
    }

    fn insert(&mut self, item: Item) {
        if let Some(batch) = self.buffer.insert(item) {
            self.write(batch, FlushTrigger::Capacity);
        }
        gauge!("fetcher_buffer_len").set(self.buffer.len() as f64);
    }

    fn flush(&mut self, trigger: FlushTrigger) {
        if let Some(batch) = self.buffer.take() {
            self.write(batch, trigger);
            gauge!("fetcher_buffer_len").set(0.0);
        }
    }

    /// Best effort: a failed item is logged and the rest of the batch still goes out.
    fn write(&mut self, batch: Vec<Item>, trigger: FlushTrigger) {
        let total = batch.len();
        let mut failed = 0usize;

        for item in &batch {
            if let Err(e) = self.sink.write_item(item) {
                failed += 1;
                counter!("fetcher_write_errors").increment(1);
                error!(item = %item, error = %e, "Failed to write item");
            }
        }

        if let Err(e) = self.sink.flush() {
            error!(error = %e, "Failed to flush sink");
        }

        let ok = (total - failed) as u64;
        self.written += ok;
        counter!("fetcher_flushes", "trigger" => trigger.as_str()).increment(1);
        counter!("fetcher_items_written").increment(ok);

        debug!(
            trigger = trigger.as_str(),
            items = total,
            failed,
            "Flushed buffer"
        );
    }
}
