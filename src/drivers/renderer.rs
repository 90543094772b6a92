use std::collections::BTreeMap;
use log::debug;
use crate::config::StreamConfig;
use crate::drivers::fanout::{drain, SampleReceiver};
use crate::drivers::window::{AxisRange, TimePoint, WindowGroup};
use crate::drivers::StreamError;
use crate::types::{Sample, SensorGroup};
/// Everything the rendering side needs for one redraw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    /// series name (`accel_x`, ...) -> ordered points
    pub series: BTreeMap<String, Vec<TimePoint>>,
    /// group name (`accel`, `gyro`) -> (x range, y range)
    pub axis_ranges: BTreeMap<String, (AxisRange, AxisRange)>,
}
impl RenderFrame {
    pub fn series(&self, name: &str) -> &[TimePoint] {
        self.series.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn ranges(&self, group: SensorGroup) -> Option<(AxisRange, AxisRange)> {
        self.axis_ranges.get(group.name()).copied()
    }
    pub fn point_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}
/// Rendering collaborator: draws whatever frame it is handed.
pub trait FrameSink {
    fn present(&mut self, frame: &RenderFrame) -> Result<(), StreamError>;
}
/// Sink that only reports frame sizes. Used when no image output is configured.
#[derive(Debug, Default)]
pub struct LogSink;
impl FrameSink for LogSink {
    fn present(&mut self, frame: &RenderFrame) -> Result<(), StreamError> {
        for group in SensorGroup::ALL {
            if let Some((x, y)) = frame.ranges(group) {
                log::info!(
                    "{group}: t=[{:.2}, {:.2}] s, y=[{:.3}, {:.3}]",
                    x.min,
                    x.max,
                    y.min,
                    y.max
                );
            }
        }
        Ok(())
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Draining,
    Merging,
    Rescaling,
}
/// Drains the plot channel on each tick and keeps the rolling windows current.
pub struct WindowRenderer {
    rx: SampleReceiver,
    groups: Vec<WindowGroup>,
    state: RenderState,
    frames: u64,
    idle_ticks: u64,
}
impl WindowRenderer {
    pub fn new(rx: SampleReceiver, config: &StreamConfig) -> Self {
        let capacity = config.window_capacity();
        let groups = SensorGroup::ALL
            .iter()
            .map(|&group| {
                WindowGroup::new(
                    group,
                    capacity,
                    config.window_seconds,
                    config.axis_scale(group),
                )
            })
            .collect();
        Self {
            rx,
            groups,
            state: RenderState::Idle,
            frames: 0,
            idle_ticks: 0,
        }
    }
    pub fn state(&self) -> RenderState {
        self.state
    }
    pub fn frames(&self) -> u64 {
        self.frames
    }
    pub fn idle_ticks(&self) -> u64 {
        self.idle_ticks
    }
    pub fn group(&self, group: SensorGroup) -> Option<&WindowGroup> {
        self.groups.iter().find(|g| g.group() == group)
    }
    /// Runs one Draining -> Merging -> Rescaling pass.
    ///
    /// Returns `None` when nothing was queued; the windows are left untouched in that case.
    pub fn tick(&mut self) -> Option<RenderFrame> {
        self.state = RenderState::Draining;
        let samples = drain(&self.rx);
        if samples.is_empty() {
            self.idle_ticks += 1;
            self.state = RenderState::Idle;
            return None;
        }
        self.state = RenderState::Merging;
        for window in &mut self.groups {
            window.ingest(&partition(&samples, window.group()));
        }
        self.state = RenderState::Rescaling;
        let frame = self.frame();
        self.frames += 1;
        debug!(
            "render tick: merged {} samples, {} points in frame",
            samples.len(),
            frame.point_count()
        );
        self.state = RenderState::Idle;
        Some(frame)
    }
    /// Current window contents and axis ranges, without draining.
    pub fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::default();
        for window in &self.groups {
            let snapshot = window.snapshot();
            for (name, points) in snapshot.series {
                frame.series.insert(name.to_owned(), points);
            }
            frame.axis_ranges.insert(
                snapshot.group.name().to_owned(),
                (snapshot.x_range, snapshot.y_range),
            );
        }
        frame
    }
}
/// Splits a drained batch into X/Y/Z point lists for one group.
fn partition(samples: &[Sample], group: SensorGroup) -> [Vec<TimePoint>; 3] {
    let mut out: [Vec<TimePoint>; 3] = Default::default();
    for sample in samples {
        for (series, value) in out.iter_mut().zip(sample.group_values(group)) {
            series.push(TimePoint::new(sample.timestamp, value));
        }
    }
    out
}
