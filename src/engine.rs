// src/engine.rs
// Wires the producer and the consumers onto their own threads.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};

use crate::config::{StreamConfig, TransportKind};
use crate::drivers::{
    AcquisitionPipeline, FrameSink, LatestValuePublisher, LogSink, PacketSource, PlotStyle,
    PngFileSink, RawPacket, ReaderSource, SimulatedSource, StreamError, WindowRenderer,
};
use crate::net::PublisherServer;
use crate::recorder::CsvRecorder;

/// Longest the producer blocks before re-checking the stop flag and the deadline.
const PRODUCER_POLL: Duration = Duration::from_millis(50);

type TransportItem = Result<RawPacket, StreamError>;

/// What the producer did before it stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProducerSummary {
    pub packets: u64,
    pub samples: u64,
    pub rejected: u64,
    pub delivered: u64,
}

pub struct Engine {
    stop: Arc<AtomicBool>,
    producer: JoinHandle<ProducerSummary>,
    consumers: Vec<(&'static str, JoinHandle<()>)>,
}

/// Everything that can fail to open, built before any thread exists.
struct Workers<S> {
    source: S,
    pipeline: AcquisitionPipeline,
    renderer: WindowRenderer,
    sink: Box<dyn FrameSink + Send>,
    server: Option<PublisherServer>,
    recorder: Option<CsvRecorder>,
}

impl Engine {
    /// Builds the pipeline from `config` and spawns every thread.
    pub fn start(config: &StreamConfig) -> Result<Self> {
        let source: Box<dyn PacketSource + Send> = match config.transport {
            TransportKind::Simulated => Box::new(SimulatedSource::new(
                config.samples_per_packet,
                config.nominal_period,
            )),
            TransportKind::Stdin => Box::new(ReaderSource::new(
                io::stdin(),
                "stdin",
                config.samples_per_packet,
            )),
        };
        let sink: Box<dyn FrameSink + Send> = match &config.plot_path {
            Some(path) => Box::new(PngFileSink::new(path, PlotStyle::default())),
            None => Box::new(LogSink),
        };
        Self::start_with(config, source, sink)
    }

    /// Same as [`Engine::start`] with an explicit transport and rendering sink.
    ///
    /// The publisher socket and the CSV file are opened before any thread is spawned,
    /// so an error here leaves nothing running.
    pub fn start_with<S>(
        config: &StreamConfig,
        source: S,
        sink: Box<dyn FrameSink + Send>,
    ) -> Result<Self>
    where
        S: PacketSource + Send + 'static,
    {
        config.validate().context("invalid stream configuration")?;
        let stop = Arc::new(AtomicBool::new(false));
        let mut pipeline = AcquisitionPipeline::new(config.nominal_period);
        let renderer = WindowRenderer::new(pipeline.subscribe("plot"), config);

        let server = match &config.publisher_addr {
            Some(addr) => {
                let publisher = LatestValuePublisher::new(pipeline.subscribe("publisher"));
                let server = PublisherServer::bind(addr, publisher, stop.clone())
                    .with_context(|| format!("failed to bind publisher on {addr}"))?;
                Some(server)
            }
            None => None,
        };
        let recorder = match &config.csv_path {
            Some(path) => Some(
                CsvRecorder::create(path, pipeline.subscribe("csv"))
                    .with_context(|| format!("failed to open {path}"))?,
            ),
            None => None,
        };

        let workers = Workers {
            source,
            pipeline,
            renderer,
            sink,
            server,
            recorder,
        };
        let mut consumers = Vec::new();
        let producer = match spawn_workers(config, &stop, workers, &mut consumers) {
            Ok(producer) => producer,
            Err(e) => {
                stop.store(true, Ordering::Relaxed);
                join_consumers(consumers);
                return Err(e);
            }
        };
        info!(
            "streaming started: period {} s, window {} s, max runtime {} s",
            config.nominal_period, config.window_seconds, config.max_runtime_secs
        );
        Ok(Self {
            stop,
            producer,
            consumers,
        })
    }

    /// Flag that ends every loop at its next tick once set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Waits for the producer to finish, then stops and joins the consumers.
    ///
    /// The transport thread is not joined: a blocking reader may never return.
    pub fn wait(self) -> Result<ProducerSummary> {
        let summary = self
            .producer
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
        self.stop.store(true, Ordering::Relaxed);
        join_consumers(self.consumers);
        Ok(summary)
    }
}

fn spawn_workers<S>(
    config: &StreamConfig,
    stop: &Arc<AtomicBool>,
    workers: Workers<S>,
    consumers: &mut Vec<(&'static str, JoinHandle<()>)>,
) -> Result<JoinHandle<ProducerSummary>>
where
    S: PacketSource + Send + 'static,
{
    let Workers {
        source,
        pipeline,
        mut renderer,
        mut sink,
        server,
        recorder,
    } = workers;

    let render_interval = config.render_interval();
    let flag = stop.clone();
    consumers.push((
        "renderer",
        spawn_named("renderer", move || {
            let mut present = |renderer: &mut WindowRenderer| {
                if let Some(frame) = renderer.tick() {
                    if let Err(e) = sink.present(&frame) {
                        warn!("frame dropped: {e}");
                    }
                }
            };
            run_periodic(&flag, render_interval, || present(&mut renderer));
            present(&mut renderer);
            info!(
                "renderer stopped: {} frames, {} idle ticks",
                renderer.frames(),
                renderer.idle_ticks()
            );
        })?,
    ));

    if let Some(server) = server {
        consumers.push((
            "publisher",
            spawn_named("publisher", move || {
                server.run();
            })?,
        ));
    }

    if let Some(mut recorder) = recorder {
        let interval = config.recorder_interval();
        let flag = stop.clone();
        consumers.push((
            "recorder",
            spawn_named("recorder", move || {
                run_periodic(&flag, interval, || {
                    if let Err(e) = recorder.tick() {
                        error!("csv write failed: {e}");
                    }
                });
                if let Err(e) = recorder.finish() {
                    error!("csv finish failed: {e}");
                }
            })?,
        ));
    }

    let (tx, rx) = mpsc::channel();
    // detached; it ends once the source does or the producer hangs up
    spawn_named("transport", move || forward(source, tx))?;
    let max_runtime = config.max_runtime();
    let flag = stop.clone();
    spawn_named("producer", move || produce(pipeline, rx, &flag, max_runtime))
}

fn join_consumers(consumers: Vec<(&'static str, JoinHandle<()>)>) {
    for (name, handle) in consumers {
        if handle.join().is_err() {
            error!("{name} thread panicked");
        }
    }
}

fn spawn_named<T, F>(name: &str, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(f)
        .with_context(|| format!("failed to spawn {name} thread"))
}

/// Calls `tick` every `interval` until `stop` is set.
fn run_periodic(stop: &AtomicBool, interval: Duration, mut tick: impl FnMut()) {
    let mut next = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        tick();
        next += interval;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // fell behind; don't try to catch up with a burst of ticks
            next = now;
        }
    }
}

/// Pulls packets off a (possibly blocking) source and hands them to the producer.
fn forward<S: PacketSource>(mut source: S, tx: Sender<TransportItem>) {
    loop {
        match source.next_packet() {
            Ok(Some(packet)) => {
                if tx.send(Ok(packet)).is_err() {
                    debug!("transport: producer gone");
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

fn produce(
    mut pipeline: AcquisitionPipeline,
    packets: Receiver<TransportItem>,
    stop: &AtomicBool,
    max_runtime: Duration,
) -> ProducerSummary {
    // None when the runtime is too large to represent; treat it as unbounded
    let deadline = Instant::now().checked_add(max_runtime);
    let mut summary = ProducerSummary::default();
    loop {
        if stop.load(Ordering::Relaxed) {
            info!("producer: stop requested");
            break;
        }
        let now = Instant::now();
        let timeout = match deadline {
            Some(deadline) if now >= deadline => {
                info!("producer: maximum runtime of {:?} reached", max_runtime);
                break;
            }
            Some(deadline) => (deadline - now).min(PRODUCER_POLL),
            None => PRODUCER_POLL,
        };
        match packets.recv_timeout(timeout) {
            Ok(Ok(packet)) => {
                summary.packets += 1;
                summary.samples += pipeline.on_notification(&packet.source_id, &packet.bytes) as u64;
            }
            Ok(Err(e)) => {
                error!("producer: transport failed: {e}");
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("producer: transport closed");
                break;
            }
        }
    }
    summary.rejected = pipeline.decoder().rejected();
    summary.delivered = pipeline.delivered();
    summary
}
