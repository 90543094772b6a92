use std::sync::mpsc::{channel, Receiver, Sender};
use log::{debug, warn};
use crate::drivers::StreamError;
use crate::types::Sample;
pub type SampleSender = Sender<Sample>;
pub type SampleReceiver = Receiver<Sample>;
/// Takes everything currently queued on `rx` without waiting.
pub fn drain(rx: &SampleReceiver) -> Vec<Sample> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}
struct Registration {
    name: String,
    tx: SampleSender,
}
/// Delivers each sample to every registered consumer channel.
///
/// Channels are unbounded so a slow consumer never stalls the producer or its siblings.
#[derive(Default)]
pub struct FanoutDistributor {
    channels: Vec<Registration>,
}
impl FanoutDistributor {
    pub fn new() -> Self {
        Self::default()
    }
    /// Creates a channel for a new consumer and registers its sending half.
    pub fn subscribe(&mut self, name: impl Into<String>) -> SampleReceiver {
        let (tx, rx) = channel();
        self.register(name, tx);
        rx
    }
    pub fn register(&mut self, name: impl Into<String>, tx: SampleSender) {
        let name = name.into();
        debug!("fan-out: registered consumer `{name}`");
        self.channels.push(Registration { name, tx });
    }
    pub fn len(&self) -> usize {
        self.channels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
    pub fn consumer_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|r| r.name.as_str())
    }
    /// Enqueues a copy of `sample` on every channel, in registration order.
    ///
    /// A channel whose receiver is gone is dropped from the set for good. Returns the
    /// number of channels that accepted the sample.
    pub fn distribute(&mut self, sample: &Sample) -> usize {
        self.channels.retain(|registration| match registration.tx.send(*sample) {
            Ok(()) => true,
            Err(_) => {
                let err = StreamError::ChannelUnavailable {
                    name: registration.name.clone(),
                };
                warn!("{err}; removing it from the fan-out");
                false
            }
        });
        self.channels.len()
    }
    pub fn distribute_all(&mut self, samples: &[Sample]) -> usize {
        samples.iter().map(|s| self.distribute(s)).sum()
    }
}
