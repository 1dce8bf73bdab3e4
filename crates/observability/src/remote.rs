//! Remote log stream shipping.
//!
//! The formatter writes each record into a [`RemoteWriter`]; on drop the line
//! is queued on a bounded channel without blocking. A background task drains
//! the channel in batches and hands them to a [`LogShipper`].
//!
//! Shipping problems are reported on stderr. Routing them through `tracing`
//! would feed them back into the stream that just failed.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::registry::LookupSpan;

use crate::ObservabilityError;
use crate::config::RemoteStreamConfig;

/// One log line as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub partition_key: String,
    pub service: String,
    /// The formatted record; parsed JSON when the line is JSON, the raw text otherwise.
    pub data: Value,
}

/// Destination for batches of log records.
#[async_trait]
pub trait LogShipper: Send + Sync {
    async fn ship(&self, batch: &[LogRecord]) -> anyhow::Result<()>;
}

/// Ships batches as JSON `POST`s to an HTTP ingestion endpoint.
pub struct HttpShipper {
    client: reqwest::Client,
    endpoint: String,
    stream_name: String,
}

impl HttpShipper {
    pub fn new(config: &RemoteStreamConfig) -> Result<Self, ObservabilityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self::with_client(config, client))
    }

    /// Ship through an existing client (shared connection pool, custom TLS).
    pub fn with_client(config: &RemoteStreamConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            stream_name: config.stream_name.clone(),
        }
    }
}

#[derive(Serialize)]
struct PutRecords<'a> {
    stream_name: &'a str,
    records: &'a [LogRecord],
}

#[async_trait]
impl LogShipper for HttpShipper {
    async fn ship(&self, batch: &[LogRecord]) -> anyhow::Result<()> {
        self.client
            .post(&self.endpoint)
            .json(&PutRecords {
                stream_name: &self.stream_name,
                records: batch,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Writer side
// ---------------------------------------------------------------------------

// Targets of the HTTP stack the shipper itself runs on. Their records would
// be shipped by the very requests that produced them.
const TRANSPORT_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn is_transport_target(target: &str) -> bool {
    TRANSPORT_TARGETS.iter().any(|crate_name| {
        target
            .strip_prefix(crate_name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// JSON formatting layer that feeds `writer`, minus the HTTP stack's own records.
pub(crate) fn layer<S>(writer: RemoteMakeWriter) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_timer(SystemTime)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter_fn(|meta| !is_transport_target(meta.target())))
}

/// [`MakeWriter`](tracing_subscriber::fmt::MakeWriter) for the remote layer.
///
/// Never blocks: when the queue is full the record is dropped and counted.
#[derive(Debug, Clone)]
pub struct RemoteMakeWriter {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RemoteMakeWriter {
    type Writer = RemoteWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RemoteWriter {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
            buf: Vec::with_capacity(256),
        }
    }
}

/// Per-event writer. Buffers the formatted record and queues it on drop.
pub struct RemoteWriter {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
    buf: Vec<u8>,
}

impl Write for RemoteWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RemoteWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }

        if self.tx.try_send(line.to_string()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ---------------------------------------------------------------------------
// Shipper task
// ---------------------------------------------------------------------------

/// Handle on the background shipper task.
#[derive(Debug)]
pub struct ShipperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    dropped: Arc<AtomicU64>,
}

impl ShipperHandle {
    /// Records dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Ship whatever is queued, then stop the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            eprintln!("remote log shipper task failed: {e}");
        }
    }

    pub(crate) fn abort(self) {
        self.task.abort();
    }
}

/// Start the shipper task on the current tokio runtime.
pub fn spawn<S>(
    config: &RemoteStreamConfig,
    service: &str,
    shipper: S,
) -> Result<(RemoteMakeWriter, ShipperHandle), ObservabilityError>
where
    S: LogShipper + 'static,
{
    config.validate()?;
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| ObservabilityError::NoRuntime)?;

    let (tx, rx) = mpsc::channel(config.buffer);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let dropped = Arc::new(AtomicU64::new(0));

    let batcher = Batcher {
        service: service.to_string(),
        partition_key: config
            .partition_key
            .clone()
            .unwrap_or_else(|| service.to_string()),
        batch_size: config.batch_size,
        shipper,
    };
    let task = runtime.spawn(batcher.run(
        rx,
        shutdown_rx,
        Duration::from_millis(config.flush_interval_ms),
    ));

    let writer = RemoteMakeWriter {
        tx,
        dropped: Arc::clone(&dropped),
    };
    let handle = ShipperHandle {
        shutdown: shutdown_tx,
        task,
        dropped,
    };
    Ok((writer, handle))
}

struct Batcher<S> {
    service: String,
    partition_key: String,
    batch_size: usize,
    shipper: S,
}

impl<S: LogShipper> Batcher<S> {
    async fn run(
        self,
        mut rx: mpsc::Receiver<String>,
        mut shutdown: oneshot::Receiver<()>,
        flush_interval: Duration,
    ) {
        let mut batch: Vec<LogRecord> = Vec::with_capacity(self.batch_size);
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + flush_interval, flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Dropping the handle without calling shutdown leaves the task running.
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        batch.push(self.record(line));
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch).await;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    if !batch.is_empty() {
                        self.flush(&mut batch).await;
                    }
                }
                signal = &mut shutdown, if shutdown_open => {
                    if signal.is_err() {
                        shutdown_open = false;
                        continue;
                    }
                    rx.close();
                    while let Some(line) = rx.recv().await {
                        batch.push(self.record(line));
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch).await;
                        }
                    }
                    break;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch).await;
        }
    }

    fn record(&self, line: String) -> LogRecord {
        let data = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(_) => Value::String(line),
        };
        LogRecord {
            partition_key: self.partition_key.clone(),
            service: self.service.clone(),
            data,
        }
    }

    async fn flush(&self, batch: &mut Vec<LogRecord>) {
        if let Err(e) = self.shipper.ship(batch).await {
            eprintln!(
                "failed to ship {} log records for {}: {e:#}",
                batch.len(),
                self.service
            );
        }
        batch.clear();
    }
}
