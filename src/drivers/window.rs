use std::collections::VecDeque;
use crate::config::AxisScale;
use crate::types::SensorGroup;
/// Points reserved up front per series; longer windows grow as they fill.
const PREALLOC_POINTS: usize = 4096;
/// One `(timestamp, value)` point of a plotted series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimePoint {
    /// Seconds, synthetic (`index * nominal_period`).
    pub time: f64,
    pub value: f64,
}
impl TimePoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}
/// Closed interval used to scale an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}
impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
    /// Pads `[min, max]` by the scale's margin on both sides.
    pub fn padded(min: f64, max: f64, scale: AxisScale) -> Self {
        let margin = scale.margin(min, max);
        Self::new(min - margin, max + margin)
    }
}
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSnapshot {
    pub points: Vec<TimePoint>,
    pub x_range: AxisRange,
}
/// Bounded series that keeps the most recent `capacity` points.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    points: VecDeque<TimePoint>,
    capacity: usize,
    window_seconds: f64,
}
impl RollingWindow {
    pub fn new(capacity: usize, window_seconds: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(PREALLOC_POINTS)),
            capacity,
            window_seconds,
        }
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter()
    }
    /// Appends `batch` and evicts from the front until the window fits. An empty batch
    /// leaves the window exactly as it was.
    pub fn ingest(&mut self, batch: &[TimePoint]) {
        if batch.is_empty() {
            return;
        }
        // Only the tail of an oversized batch can survive.
        let keep = &batch[batch.len().saturating_sub(self.capacity)..];
        let overflow = (self.points.len() + keep.len()).saturating_sub(self.capacity);
        self.points.drain(..overflow);
        self.points.extend(keep.iter().copied());
    }
    /// `(oldest, newest)` timestamp, or `(0, window_seconds)` while empty.
    pub fn x_range(&self) -> AxisRange {
        match (self.points.front(), self.points.back()) {
            (Some(first), Some(last)) => AxisRange::new(first.time, last.time),
            _ => AxisRange::new(0.0, self.window_seconds),
        }
    }
    /// `(min, max)` of the stored values.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.value, p.value)),
            Some((lo, hi)) => Some((lo.min(p.value), hi.max(p.value))),
        })
    }
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            points: self.points.iter().copied().collect(),
            x_range: self.x_range(),
        }
    }
}
/// X/Y/Z windows of one quantity, drawn against a shared y axis.
#[derive(Clone, Debug)]
pub struct WindowGroup {
    group: SensorGroup,
    members: [RollingWindow; 3],
    scale: AxisScale,
}
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSnapshot {
    pub group: SensorGroup,
    pub series: Vec<(&'static str, Vec<TimePoint>)>,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
}
impl WindowGroup {
    pub fn new(group: SensorGroup, capacity: usize, window_seconds: f64, scale: AxisScale) -> Self {
        let window = RollingWindow::new(capacity, window_seconds);
        Self {
            group,
            members: [window.clone(), window.clone(), window],
            scale,
        }
    }
    pub fn group(&self) -> SensorGroup {
        self.group
    }
    pub fn member(&self, axis: usize) -> Option<&RollingWindow> {
        self.members.get(axis)
    }
    /// Ingests one batch per member series, X/Y/Z order.
    pub fn ingest(&mut self, batches: &[Vec<TimePoint>; 3]) {
        for (window, batch) in self.members.iter_mut().zip(batches) {
            window.ingest(batch);
        }
    }
    /// Members share timestamps, so the widest span covers them all.
    pub fn x_range(&self) -> AxisRange {
        let mut ranges = self.members.iter().filter(|w| !w.is_empty()).map(|w| w.x_range());
        match ranges.next() {
            Some(first) => ranges.fold(first, |acc, r| {
                AxisRange::new(acc.min.min(r.min), acc.max.max(r.max))
            }),
            None => self.members[0].x_range(),
        }
    }
    /// Padded range over the union of all member values.
    pub fn y_range(&self) -> AxisRange {
        let bounds = self
            .members
            .iter()
            .filter_map(|w| w.value_bounds())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));
        match bounds {
            Some((min, max)) => AxisRange::padded(min, max, self.scale),
            None => AxisRange::new(-self.scale.floor_margin, self.scale.floor_margin),
        }
    }
    pub fn snapshot(&self) -> GroupSnapshot {
        let names = self.group.series_names();
        GroupSnapshot {
            group: self.group,
            series: names
                .iter()
                .zip(&self.members)
                .map(|(name, w)| (*name, w.snapshot().points))
                .collect(),
            x_range: self.x_range(),
            y_range: self.y_range(),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn ramp(start: usize, count: usize) -> Vec<TimePoint> {
        (start..start + count)
            .map(|i| TimePoint::new(i as f64 * 0.01, i as f64))
            .collect()
    }
    #[test]
    fn empty_batch_leaves_snapshot_unchanged() {
        let mut window = RollingWindow::new(10, 0.1);
        window.ingest(&ramp(0, 4));
        let before = window.snapshot();
        window.ingest(&[]);
        assert_eq!(window.snapshot(), before);
    }
    #[test]
    fn keeps_the_most_recent_capacity_points() {
        let mut window = RollingWindow::new(5, 0.05);
        window.ingest(&ramp(0, 3));
        window.ingest(&ramp(3, 4));
        let snap = window.snapshot();
        assert_eq!(snap.points.len(), 5);
        let values: Vec<f64> = snap.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(snap.x_range.min, snap.points[0].time);
        assert_eq!(snap.x_range.max, snap.points[4].time);
    }
    #[test]
    fn oversized_batch_keeps_its_tail() {
        let mut window = RollingWindow::new(4, 0.04);
        window.ingest(&ramp(0, 2));
        window.ingest(&ramp(2, 10));
        let values: Vec<f64> = window.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![8.0, 9.0, 10.0, 11.0]);
    }
    #[test]
    fn timestamps_stay_ordered() {
        let mut window = RollingWindow::new(50, 0.5);
        for chunk in 0..20 {
            window.ingest(&ramp(chunk * 7, 7));
        }
        let snap = window.snapshot();
        assert!(snap.points.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(snap.points.len(), 50);
    }
    #[test]
    fn empty_window_uses_default_x_range() {
        let window = RollingWindow::new(500, 5.0);
        assert_eq!(window.x_range(), AxisRange::new(0.0, 5.0));
    }
    #[test]
    fn constant_signal_respects_floor_margin() {
        let mut group = WindowGroup::new(SensorGroup::Accel, 10, 0.1, AxisScale::ACCEL);
        let flat: Vec<TimePoint> = (0..5).map(|i| TimePoint::new(i as f64, 1.0)).collect();
        group.ingest(&[flat.clone(), flat.clone(), flat]);
        let range = group.y_range();
        assert_eq!(range, AxisRange::new(0.5, 1.5));
        assert!(range.width() >= 1.0);
    }
    #[test]
    fn y_range_spans_union_of_members() {
        let mut group = WindowGroup::new(SensorGroup::Gyro, 10, 0.1, AxisScale::GYRO);
        let x = vec![TimePoint::new(0.0, -200.0), TimePoint::new(0.01, 0.0)];
        let y = vec![TimePoint::new(0.0, 100.0), TimePoint::new(0.01, 50.0)];
        let z = vec![TimePoint::new(0.0, 0.0), TimePoint::new(0.01, 800.0)];
        group.ingest(&[x, y, z]);
        // span 1000, margin 10%
        let range = group.y_range();
        assert!((range.min - -300.0).abs() < 1e-9);
        assert!((range.max - 900.0).abs() < 1e-9);
    }
    #[test]
    fn empty_group_has_symmetric_floor_range() {
        let group = WindowGroup::new(SensorGroup::Gyro, 10, 0.1, AxisScale::GYRO);
        assert_eq!(group.y_range(), AxisRange::new(-10.0, 10.0));
        assert_eq!(group.x_range(), AxisRange::new(0.0, 0.1));
    }
    #[test]
    fn group_snapshot_names_series() {
        let mut group = WindowGroup::new(SensorGroup::Accel, 4, 0.04, AxisScale::ACCEL);
        group.ingest(&[ramp(0, 2), ramp(0, 2), ramp(0, 2)]);
        let snap = group.snapshot();
        let names: Vec<&str> = snap.series.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["accel_x", "accel_y", "accel_z"]);
        assert_eq!(snap.x_range, AxisRange::new(0.0, 0.01));
    }
}
