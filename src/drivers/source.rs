use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};
use rand::Rng;
use crate::drivers::decoder::{encode_record, RECORD_SIZE};
use crate::drivers::StreamError;
/// One notification as delivered by the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPacket {
    /// Opaque id of the characteristic/peripheral that sent it.
    pub source_id: String,
    pub bytes: Vec<u8>,
}
impl RawPacket {
    pub fn new(source_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_id: source_id.into(),
            bytes,
        }
    }
}
/// Something that yields notification buffers. `Ok(None)` means the stream ended.
pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, StreamError>;
}
impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, StreamError> {
        (**self).next_packet()
    }
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<RawPacket>,
}
impl ManualSource {
    pub fn new(packets: impl IntoIterator<Item = RawPacket>) -> Self {
        Self {
            queue: packets.into_iter().collect(),
        }
    }
}
impl PacketSource for ManualSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, StreamError> {
        Ok(self.queue.pop_front())
    }
}
/// Synthetic peripheral: slow sinusoids plus a little noise, paced like real notifications.
pub struct SimulatedSource {
    samples_per_packet: usize,
    nominal_period: f64,
    phase_index: u64,
    next_due: Option<Instant>,
    paced: bool,
}
impl SimulatedSource {
    pub const SOURCE_ID: &'static str = "simulated-imu";
    pub fn new(samples_per_packet: usize, nominal_period: f64) -> Self {
        Self {
            samples_per_packet: samples_per_packet.max(1),
            nominal_period,
            phase_index: 0,
            next_due: None,
            paced: true,
        }
    }
    /// Produces packets back to back instead of sleeping between them.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }
    fn packet_interval(&self) -> Duration {
        Duration::from_secs_f64(self.nominal_period * self.samples_per_packet as f64)
    }
    fn wait_for_slot(&mut self) {
        if !self.paced {
            return;
        }
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        self.next_due = Some(due + self.packet_interval());
    }
}
impl PacketSource for SimulatedSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, StreamError> {
        self.wait_for_slot();
        let mut rng = rand::thread_rng();
        let mut bytes = Vec::with_capacity(self.samples_per_packet * RECORD_SIZE);
        for _ in 0..self.samples_per_packet {
            let t = (self.phase_index as f64 * self.nominal_period) as f32;
            self.phase_index += 1;
            let gyro = [
                90.0 * (t * 1.3).sin() + noise(&mut rng, 2.0),
                45.0 * (t * 0.7).cos() + noise(&mut rng, 2.0),
                20.0 * (t * 2.1).sin() + noise(&mut rng, 2.0),
            ];
            // gravity on z
            let accel = [
                0.2 * (t * 0.9).sin() + noise(&mut rng, 0.02),
                0.2 * (t * 1.1).cos() + noise(&mut rng, 0.02),
                1.0 + 0.05 * (t * 0.5).sin() + noise(&mut rng, 0.02),
            ];
            encode_record(gyro, accel, &mut bytes);
        }
        Ok(Some(RawPacket::new(Self::SOURCE_ID, bytes)))
    }
}
fn noise(rng: &mut impl Rng, amplitude: f32) -> f32 {
    rng.gen_range(-amplitude..amplitude)
}
/// Reads fixed-size notifications from a byte stream, e.g. stdin fed by a BLE bridge.
pub struct ReaderSource<R: Read> {
    reader: R,
    source_id: String,
    packet_len: usize,
}
impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, source_id: impl Into<String>, samples_per_packet: usize) -> Self {
        Self {
            reader,
            source_id: source_id.into(),
            packet_len: samples_per_packet.max(1) * RECORD_SIZE,
        }
    }
}
impl<R: Read> PacketSource for ReaderSource<R> {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, StreamError> {
        let mut bytes = vec![0u8; self.packet_len];
        let mut filled = 0;
        while filled < bytes.len() {
            match self.reader.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        // A short final read is passed through; the decoder rejects it as truncated.
        bytes.truncate(filled);
        Ok(Some(RawPacket::new(self.source_id.clone(), bytes)))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    #[test]
    fn simulated_packets_are_whole_records() {
        let mut source = SimulatedSource::new(3, 0.01).unpaced();
        for _ in 0..4 {
            let packet = source.next_packet().unwrap().unwrap();
            assert_eq!(packet.bytes.len(), 3 * RECORD_SIZE);
            assert_eq!(packet.source_id, SimulatedSource::SOURCE_ID);
        }
    }
    #[test]
    fn reader_source_splits_stream_and_ends() {
        let data: Vec<u8> = (0..(2 * RECORD_SIZE + 5) as u8).collect();
        let mut source = ReaderSource::new(Cursor::new(data), "stdin", 1);
        assert_eq!(source.next_packet().unwrap().unwrap().bytes.len(), RECORD_SIZE);
        assert_eq!(source.next_packet().unwrap().unwrap().bytes.len(), RECORD_SIZE);
        assert_eq!(source.next_packet().unwrap().unwrap().bytes.len(), 5);
        assert!(source.next_packet().unwrap().is_none());
    }
    #[test]
    fn manual_source_replays_in_order() {
        let mut source = ManualSource::new(vec![
            RawPacket::new("a", vec![1]),
            RawPacket::new("b", vec![2]),
        ]);
        assert_eq!(source.next_packet().unwrap().unwrap().source_id, "a");
        assert_eq!(source.next_packet().unwrap().unwrap().source_id, "b");
        assert!(source.next_packet().unwrap().is_none());
    }
}
