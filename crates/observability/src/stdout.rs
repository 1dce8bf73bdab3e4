//! stdout writer that stamps the service name on each JSON record.

use std::io::{self, Write};
use std::sync::Arc;

use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

/// Wraps a [`MakeWriter`] so every JSON object it writes starts with a
/// `"service"` key.
pub(crate) struct ServiceStamped<M> {
    inner: M,
    prefix: Arc<[u8]>,
}

impl<M> ServiceStamped<M> {
    pub(crate) fn new(service: &str, inner: M) -> Self {
        let prefix = format!("{{\"service\":{},", Value::from(service));
        Self {
            inner,
            prefix: prefix.into_bytes().into(),
        }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ServiceStamped<M> {
    type Writer = StampedWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        StampedWriter {
            inner: self.inner.make_writer(),
            prefix: Arc::clone(&self.prefix),
            buf: Vec::with_capacity(256),
        }
    }
}

/// Buffers one formatted record and writes it, stamped, on drop.
pub(crate) struct StampedWriter<W: Write> {
    inner: W,
    prefix: Arc<[u8]>,
    buf: Vec<u8>,
}

impl<W: Write> Write for StampedWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for StampedWriter<W> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }

        let written = match self.buf.strip_prefix(b"{") {
            Some(rest) => self
                .inner
                .write_all(&self.prefix)
                .and_then(|()| self.inner.write_all(rest)),
            None => self.inner.write_all(&self.buf),
        };
        // stdout went away; nowhere left to report it.
        let _ = written.and_then(|()| self.inner.flush());
    }
}
