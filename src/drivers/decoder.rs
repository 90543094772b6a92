use crate::drivers::FramingError;
use crate::types::Sample;
/// Floats per record: gyro xyz then accel xyz.
pub const FLOATS_PER_SAMPLE: usize = 6;
/// Bytes per record on the wire.
pub const RECORD_SIZE: usize = FLOATS_PER_SAMPLE * 4;
/// Turns notification buffers into samples and assigns their index/timestamp.
#[derive(Debug)]
pub struct SampleDecoder {
    nominal_period: f64,
    next_index: u64,
    rejected: u64,
}
impl SampleDecoder {
    pub fn new(nominal_period: f64) -> Self {
        Self {
            nominal_period,
            next_index: 0,
            rejected: 0,
        }
    }
    /// Index the next decoded sample will get.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }
    /// Number of buffers dropped for bad framing.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
    /// Decodes every 24-byte record of `buffer`.
    ///
    /// A buffer that is not a whole number of records is dropped entirely: no sample
    /// comes out of it and the index counter stays where it was.
    pub fn decode(&mut self, buffer: &[u8]) -> Result<Vec<Sample>, FramingError> {
        if buffer.len() % RECORD_SIZE != 0 {
            self.rejected += 1;
            return Err(FramingError::TruncatedPacket {
                len: buffer.len(),
                record_size: RECORD_SIZE,
            });
        }
        let samples = buffer
            .chunks_exact(RECORD_SIZE)
            .map(|record| {
                let mut values = [0.0f64; FLOATS_PER_SAMPLE];
                for (value, word) in values.iter_mut().zip(record.chunks_exact(4)) {
                    *value = f32::from_le_bytes([word[0], word[1], word[2], word[3]]) as f64;
                }
                let index = self.next_index;
                self.next_index += 1;
                Sample {
                    index,
                    timestamp: index as f64 * self.nominal_period,
                    gyro: [values[0], values[1], values[2]],
                    accel: [values[3], values[4], values[5]],
                }
            })
            .collect();
        Ok(samples)
    }
}
/// Encodes samples in the peripheral's wire layout. Used by the simulated transport.
pub fn encode_record(gyro: [f32; 3], accel: [f32; 3], out: &mut Vec<u8>) {
    for value in gyro.iter().chain(accel.iter()) {
        out.extend_from_slice(&value.to_le_bytes());
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn packet(records: &[([f32; 3], [f32; 3])]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (gyro, accel) in records {
            encode_record(*gyro, *accel, &mut bytes);
        }
        bytes
    }
    #[test]
    fn decodes_two_records_with_contiguous_indices() {
        let bytes = packet(&[
            ([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]),
            ([4.0, 5.0, 6.0], [0.4, 0.5, 0.6]),
        ]);
        assert_eq!(bytes.len(), 48);
        let mut decoder = SampleDecoder::new(0.01);
        let samples = decoder.decode(&bytes).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].index, 0);
        assert_eq!(samples[0].timestamp, 0.0);
        assert_eq!(samples[0].gyro, [1.0, 2.0, 3.0]);
        assert_eq!(samples[1].index, 1);
        assert_eq!(samples[1].timestamp, 0.01);
        assert_eq!(samples[1].accel[1], 0.5);
        assert!((samples[1].accel[0] - 0.4).abs() < 1e-6);
    }
    #[test]
    fn indices_continue_across_calls() {
        let mut decoder = SampleDecoder::new(0.5);
        let record = packet(&[([0.0; 3], [0.0; 3]); 3]);
        decoder.decode(&record).unwrap();
        let samples = decoder.decode(&record).unwrap();
        let indices: Vec<u64> = samples.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![3, 4, 5]);
        for s in &samples {
            assert_eq!(s.timestamp, s.index as f64 * 0.5);
        }
    }
    #[test]
    fn truncated_packet_yields_nothing_and_keeps_counter() {
        let mut decoder = SampleDecoder::new(0.01);
        decoder.decode(&packet(&[([1.0; 3], [1.0; 3])])).unwrap();
        let err = decoder.decode(&[0u8; 25]).unwrap_err();
        assert_eq!(
            err,
            FramingError::TruncatedPacket {
                len: 25,
                record_size: 24
            }
        );
        assert_eq!(decoder.next_index(), 1);
        assert_eq!(decoder.rejected(), 1);
        let samples = decoder.decode(&packet(&[([2.0; 3], [2.0; 3])])).unwrap();
        assert_eq!(samples[0].index, 1);
    }
    #[test]
    fn short_tail_rejects_the_whole_buffer() {
        let mut decoder = SampleDecoder::new(0.01);
        let mut bytes = packet(&[([1.0; 3], [1.0; 3]); 2]);
        bytes.truncate(47);
        assert!(decoder.decode(&bytes).is_err());
        assert_eq!(decoder.next_index(), 0);
    }
    #[test]
    fn empty_buffer_is_not_an_error() {
        let mut decoder = SampleDecoder::new(0.01);
        assert!(decoder.decode(&[]).unwrap().is_empty());
        assert_eq!(decoder.next_index(), 0);
    }
    #[test]
    fn reads_little_endian_bit_exact() {
        let mut bytes = Vec::new();
        for v in [1.5f32, -2.0, 0.0, 1024.25, -0.125, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut decoder = SampleDecoder::new(0.01);
        let sample = decoder.decode(&bytes).unwrap()[0];
        assert_eq!(sample.gyro, [1.5, -2.0, 0.0]);
        assert_eq!(sample.accel, [1024.25, -0.125, 3.0]);
    }
}
