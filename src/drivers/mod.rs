// src/drivers/mod.rs
pub mod decoder;
pub mod error;
pub mod fanout;
pub mod pipeline;
pub mod plot;
pub mod publisher;
pub mod renderer;
pub mod source;
pub mod window;
pub use decoder::{SampleDecoder, RECORD_SIZE};
pub use error::{FramingError, StreamError};
pub use fanout::{drain, FanoutDistributor, SampleReceiver, SampleSender};
pub use pipeline::AcquisitionPipeline;
pub use plot::{render_frame_png, PlotStyle, PngFileSink};
pub use publisher::LatestValuePublisher;
pub use renderer::{FrameSink, LogSink, RenderFrame, RenderState, WindowRenderer};
pub use source::{ManualSource, PacketSource, RawPacket, ReaderSource, SimulatedSource};
pub use window::{AxisRange, GroupSnapshot, RollingWindow, TimePoint, WindowGroup, WindowSnapshot};
