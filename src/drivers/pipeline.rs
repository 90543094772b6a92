use log::warn;
use crate::drivers::decoder::SampleDecoder;
use crate::drivers::fanout::{FanoutDistributor, SampleReceiver};
use crate::drivers::source::PacketSource;
use crate::drivers::StreamError;
/// Producer side: decodes notifications and fans the samples out.
///
/// The pipeline does not own its transport; blocking sources are read elsewhere and
/// their packets handed to [`AcquisitionPipeline::on_notification`].
pub struct AcquisitionPipeline {
    decoder: SampleDecoder,
    fanout: FanoutDistributor,
    delivered: u64,
}
impl AcquisitionPipeline {
    pub fn new(nominal_period: f64) -> Self {
        Self {
            decoder: SampleDecoder::new(nominal_period),
            fanout: FanoutDistributor::new(),
            delivered: 0,
        }
    }
    pub fn subscribe(&mut self, name: impl Into<String>) -> SampleReceiver {
        self.fanout.subscribe(name)
    }
    pub fn fanout(&mut self) -> &mut FanoutDistributor {
        &mut self.fanout
    }
    pub fn decoder(&self) -> &SampleDecoder {
        &self.decoder
    }
    /// Samples successfully enqueued, summed over consumers.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
    /// Pulls one notification from `source` and handles it. `Ok(None)` once the source ends.
    pub fn pump_once<S: PacketSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<usize>, StreamError> {
        let Some(packet) = source.next_packet()? else {
            return Ok(None);
        };
        Ok(Some(self.on_notification(&packet.source_id, &packet.bytes)))
    }
    /// Transport callback. Returns the number of samples decoded from `buffer`.
    ///
    /// Framing errors are logged and the buffer dropped; they never reach the consumers.
    pub fn on_notification(&mut self, source_id: &str, buffer: &[u8]) -> usize {
        match self.decoder.decode(buffer) {
            Ok(samples) => {
                self.delivered += self.fanout.distribute_all(&samples) as u64;
                samples.len()
            }
            Err(err) => {
                warn!(
                    "dropping notification from {source_id}: {err} ({} rejected so far)",
                    self.decoder.rejected()
                );
                0
            }
        }
    }
}
