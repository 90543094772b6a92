use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::drivers::fanout::{drain, SampleReceiver};
use crate::drivers::StreamError;
use crate::types::Sample;

pub const CSV_HEADER: &str = "index,timestamp,gyro_x,gyro_y,gyro_z,accel_x,accel_y,accel_z";

/// Appends every sample it drains to a CSV file. The file is truncated on open.
pub struct CsvRecorder {
    rx: SampleReceiver,
    writer: BufWriter<File>,
    path: PathBuf,
    rows: u64,
}

impl CsvRecorder {
    pub fn create(path: impl AsRef<Path>, rx: SampleReceiver) -> Result<Self, StreamError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}")?;
        writer.flush()?;
        info!("recording samples to {}", path.display());
        Ok(Self {
            rx,
            writer,
            path,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Drains the channel and appends the rows. Returns how many were written.
    pub fn tick(&mut self) -> Result<usize, StreamError> {
        let samples = drain(&self.rx);
        if samples.is_empty() {
            return Ok(0);
        }
        for sample in &samples {
            write_row(&mut self.writer, sample)?;
        }
        self.writer.flush()?;
        self.rows += samples.len() as u64;
        Ok(samples.len())
    }

    /// Writes whatever is still queued and closes the file.
    pub fn finish(mut self) -> Result<u64, StreamError> {
        self.tick()?;
        info!("recording saved: {} rows in {}", self.rows, self.path.display());
        Ok(self.rows)
    }
}

fn write_row(w: &mut impl Write, s: &Sample) -> std::io::Result<()> {
    write!(w, "{},{:.4}", s.index, s.timestamp)?;
    for v in s.gyro.iter().chain(s.accel.iter()) {
        write!(w, ",{v}")?;
    }
    writeln!(w)
}
