use log::trace;
use crate::drivers::fanout::{drain, SampleReceiver};
use crate::types::Sample;
/// Answers each request with the newest queued sample.
///
/// Older samples drained in the same request are dropped: a slow client sees the
/// current state, never a backlog.
pub struct LatestValuePublisher {
    rx: SampleReceiver,
    requests: u64,
    discarded: u64,
}
impl LatestValuePublisher {
    pub fn new(rx: SampleReceiver) -> Self {
        Self {
            rx,
            requests: 0,
            discarded: 0,
        }
    }
    /// Drains the channel and returns its last sample, or [`Sample::ZERO`] when it was empty.
    pub fn latest(&mut self) -> Sample {
        self.requests += 1;
        let drained = drain(&self.rx);
        let Some(last) = drained.last().copied() else {
            return Sample::ZERO;
        };
        self.discarded += (drained.len() - 1) as u64;
        trace!(
            "publisher: serving sample {} ({} stale dropped)",
            last.index,
            drained.len() - 1
        );
        last
    }
    /// Text payload for one request.
    pub fn respond(&mut self) -> String {
        self.latest().to_payload()
    }
    pub fn requests(&self) -> u64 {
        self.requests
    }
    /// Samples drained but never served.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::decoder::encode_record;
    use crate::drivers::{FanoutDistributor, SampleDecoder};
    #[test]
    fn serves_newest_of_decoded_packet() {
        let mut bytes = Vec::new();
        encode_record([1.0, 2.0, 3.0], [0.1, 0.2, 0.3], &mut bytes);
        encode_record([4.0, 5.0, 6.0], [0.4, 0.5, 0.6], &mut bytes);
        let mut decoder = SampleDecoder::new(0.01);
        let mut fanout = FanoutDistributor::new();
        let _plot = fanout.subscribe("plot");
        let mut publisher = LatestValuePublisher::new(fanout.subscribe("publisher"));
        let samples = decoder.decode(&bytes).unwrap();
        assert_eq!((samples[0].index, samples[0].timestamp), (0, 0.0));
        assert_eq!((samples[1].index, samples[1].timestamp), (1, 0.01));
        fanout.distribute_all(&samples);
        assert_eq!(publisher.respond(), "4.000;5.000;6.000;0.400;0.500;0.600");
        assert_eq!(publisher.discarded(), 1);
    }
    #[test]
    fn empty_drain_serves_zero_sentinel() {
        let mut fanout = FanoutDistributor::new();
        let mut publisher = LatestValuePublisher::new(fanout.subscribe("publisher"));
        assert_eq!(publisher.respond(), "0.000;0.000;0.000;0.000;0.000;0.000");
        fanout.distribute(&Sample {
            index: 3,
            timestamp: 0.03,
            gyro: [1.0; 3],
            accel: [1.0; 3],
        });
        assert_eq!(publisher.latest().index, 3);
        // already served; nothing new queued
        assert_eq!(publisher.latest(), Sample::ZERO);
        assert_eq!(publisher.requests(), 3);
    }
}
