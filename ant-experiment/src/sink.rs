use crate::error::HostError;
use ant_core::TrialRecord;
use std::io::Write;

/// Receives one record per finished trial.
pub trait DataSink {
    fn write(&mut self, record: &TrialRecord) -> Result<(), HostError>;
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<TrialRecord>,
}

impl DataSink for MemorySink {
    fn write(&mut self, record: &TrialRecord) -> Result<(), HostError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// One JSON object per line, flushed after every trial.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DataSink for JsonLinesSink<W> {
    fn write(&mut self, record: &TrialRecord) -> Result<(), HostError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

impl<D: DataSink + ?Sized> DataSink for &mut D {
    fn write(&mut self, record: &TrialRecord) -> Result<(), HostError> {
        (**self).write(record)
    }
}
