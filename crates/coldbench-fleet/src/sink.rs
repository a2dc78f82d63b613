//! Result sink
//!
//! A CSV table shared by every replica task of a run. Rows are written under a
//! single lock so concurrent appends never interleave; row order is the order
//! in which tasks acquired the lock. Every row reaches the underlying writer
//! before the lock is released, so a killed run keeps what it recorded.

use crate::error::SinkError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Header of the gateway table written by deploy runs
pub const GATEWAY_TABLE_HEADER: &str = "Gateway ID";

/// File name of the gateway table inside the run directory
pub const GATEWAY_TABLE_FILE: &str = "gateways.csv";

type CsvWriter = csv::Writer<Box<dyn Write + Send>>;

struct SinkState {
    /// `None` once flushed
    writer: Option<CsvWriter>,
    initialized: bool,
    rows: usize,
}

pub struct ResultSink {
    state: Mutex<SinkState>,
}

impl ResultSink {
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let writer: Box<dyn Write + Send> = Box::new(writer);
        Self {
            state: Mutex::new(SinkState {
                writer: Some(csv::Writer::from_writer(writer)),
                initialized: false,
                rows: 0,
            }),
        }
    }

    /// Create (or truncate) a CSV file and write its header
    pub fn create_csv<I, T>(path: &Path, header: I) -> Result<Self, SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let file = File::create(path)?;
        let sink = Self::new(BufWriter::new(file));
        sink.initialize(header)?;
        tracing::debug!("Result table created at {}", path.display());
        Ok(sink)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SinkState>, SinkError> {
        self.state.lock().map_err(|_| SinkError::Poisoned)
    }

    /// Write the header row; only the first call succeeds
    pub fn initialize<I, T>(&self, header: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut state = self.lock()?;
        if state.initialized {
            return Err(SinkError::AlreadyInitialized);
        }
        let writer = state.writer.as_mut().ok_or(SinkError::Closed)?;
        writer.write_record(header)?;
        writer.flush()?;
        state.initialized = true;
        Ok(())
    }

    /// Append one data row atomically with respect to other rows
    pub fn append_row<I, T>(&self, columns: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut state = self.lock()?;
        if !state.initialized {
            return Err(SinkError::NotInitialized);
        }
        let writer = state.writer.as_mut().ok_or(SinkError::Closed)?;
        writer.write_record(columns)?;
        writer.flush()?;
        state.rows += 1;
        Ok(())
    }

    /// Flush the underlying writer one last time and close the sink
    pub fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        let mut writer = state.writer.take().ok_or(SinkError::Closed)?;
        writer.flush()?;
        tracing::debug!("Result table flushed with {} rows", state.rows);
        Ok(())
    }

    /// Number of data rows appended so far
    pub fn rows_written(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.rows,
            Err(poisoned) => poisoned.into_inner().rows,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.writer.is_none(),
            Err(poisoned) => poisoned.into_inner().writer.is_none(),
        }
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("rows", &self.rows_written())
            .field("closed", &self.is_closed())
            .finish()
    }
}
