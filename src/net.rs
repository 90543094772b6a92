// src/net.rs
// Minimal request/response loop in front of the latest-value publisher:
// every line a client sends is answered with one payload line.
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::drivers::{LatestValuePublisher, StreamError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct PublisherServer {
    listener: TcpListener,
    publisher: LatestValuePublisher,
    stop: Arc<AtomicBool>,
}

impl PublisherServer {
    pub fn bind(
        addr: &str,
        publisher: LatestValuePublisher,
        stop: Arc<AtomicBool>,
    ) -> Result<Self, StreamError> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            publisher,
            stop,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, StreamError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves peers one at a time until the stop flag is raised.
    pub fn run(mut self) -> LatestValuePublisher {
        if let Ok(addr) = self.listener.local_addr() {
            info!("publisher listening on {addr}");
        }
        while !self.stop.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    info!("publisher: client {peer} connected");
                    match self.serve(stream) {
                        Ok(()) => info!("publisher: client {peer} disconnected"),
                        Err(e) => warn!("publisher: client {peer} dropped: {e}"),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    warn!("publisher: accept failed: {e}");
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
        debug!(
            "publisher stopped after {} requests ({} stale samples dropped)",
            self.publisher.requests(),
            self.publisher.discarded()
        );
        self.publisher
    }

    fn serve(&mut self, stream: TcpStream) -> std::io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while !self.stop.load(Ordering::Relaxed) {
            match reader.read_line(&mut line) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    line.clear();
                    let payload = self.publisher.respond();
                    writer.write_all(payload.as_bytes())?;
                    writer.write_all(b"\n")?;
                    writer.flush()?;
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    // a partial request may sit in `line`; keep it for the next read
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
