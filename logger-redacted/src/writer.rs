use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{LogError, MaskError, Result};

/// One decoded log record.
pub type Event = Map<String, Value>;

/// A transformation applied to every decoded record before it is re-encoded.
pub trait EventProcessor: Send + Sync {
    /// # Errors
    ///
    /// Any error aborts the write of the current record.
    fn process(&self, event: &mut Event) -> std::result::Result<(), MaskError>;
}

impl<F> EventProcessor for F
where
    F: Fn(&mut Event) -> std::result::Result<(), MaskError> + Send + Sync,
{
    fn process(&self, event: &mut Event) -> std::result::Result<(), MaskError> {
        self(event)
    }
}

/// Writer decorator that decodes each written record as one JSON object,
/// runs the configured processors over it and writes the re-encoded record,
/// newline terminated, to the inner writer.
///
/// `write` reports the number of input bytes consumed, so the decorator is
/// transparent to callers such as `write_all`.
pub struct EventWriter<W> {
    inner: W,
    indent: bool,
    processors: Vec<Box<dyn EventProcessor>>,
}

impl<W: Write> EventWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            indent: false,
            processors: Vec::new(),
        }
    }

    /// Indent the output with two spaces.
    pub fn indented(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_processor<P: EventProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn push_processor(&mut self, processor: Box<dyn EventProcessor>) {
        self.processors.push(processor);
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Run one record through the pipeline.
    ///
    /// # Errors
    ///
    /// Each stage reports its own [`LogError`] variant; nothing is written
    /// when decoding, processing or encoding fails.
    pub fn write_event(&mut self, input: &[u8]) -> Result<usize> {
        let mut event: Event = serde_json::from_slice(input).map_err(LogError::Decode)?;

        for processor in &self.processors {
            processor.process(&mut event).map_err(LogError::Process)?;
        }

        let mut output = if self.indent {
            serde_json::to_vec_pretty(&event)
        } else {
            serde_json::to_vec(&event)
        }
        .map_err(LogError::Encode)?;
        output.push(b'\n');

        self.inner.write_all(&output).map_err(LogError::Write)?;

        Ok(input.len())
    }
}

impl<W: Write> Write for EventWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.write_event(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W> fmt::Debug for EventWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventWriter")
            .field("indent", &self.indent)
            .field("processors", &self.processors.len())
            .finish_non_exhaustive()
    }
}

/// Writes every record to each of its writers in order.
///
/// The first failing writer aborts the record; writers after it do not see it.
#[derive(Default)]
pub struct MultiWriter {
    writers: Vec<Box<dyn Write + Send>>,
}

impl MultiWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }

        Ok(())
    }
}

/// Cloneable handle to the end of a writer chain.
///
/// Every clone writes through the same lock, so a record is never interleaved
/// with another one. Implements [`MakeWriter`] so `tracing-subscriber` layers
/// can share the chain with [`crate::Logger`].
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWriter").finish_non_exhaustive()
    }
}

/// Writer that can be released while clones of it are still part of a
/// chain. Records written after [`ClosableWriter::close`] are dropped.
#[derive(Clone)]
pub struct ClosableWriter {
    inner: Arc<Mutex<Option<Box<dyn Write + Send>>>>,
}

impl ClosableWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(writer)))),
        }
    }

    /// Flush and drop the inner writer. Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Fails when the final flush fails; the writer is dropped anyway.
    pub fn close(&self) -> io::Result<()> {
        match self.inner.lock().take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl Write for ClosableWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.lock().as_mut() {
            Some(writer) => writer.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.inner.lock().as_mut() {
            Some(writer) => writer.write_all(buf),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.lock().as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ClosableWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosableWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
