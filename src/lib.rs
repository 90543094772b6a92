//! Streams 6-axis IMU notifications from a peripheral, decodes them and fans every
//! sample out to independent consumers: a rolling-window plot, a latest-value
//! publisher and a CSV recorder.
pub mod config;
pub mod drivers;
pub mod engine;
pub mod net;
pub mod recorder;
pub mod types;

pub use config::{AxisScale, StreamConfig, TransportKind};
pub use types::{Sample, SensorGroup};
