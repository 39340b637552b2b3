//! Rendezvous pipe between the producing and consuming halves of a render.

use std::borrow::Cow;
use std::io;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::ScopedJoinHandle;

use thiserror::Error;

/// One piece of rendered output.
pub type Chunk = Cow<'static, str>;

/// The consuming end went away; nothing more will be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("render output pipe closed")]
pub struct Closed;

impl From<Closed> for io::Error {
    fn from(_: Closed) -> Self {
        io::Error::new(io::ErrorKind::BrokenPipe, Closed)
    }
}

/// Create a pipe with no buffering: every write blocks until the reader
/// takes the chunk.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = sync_channel(0);
    (PipeWriter { tx }, PipeReader { rx })
}

/// Producing end of a [`pipe`]. Dropping it (or calling
/// [`close`](Self::close)) ends the stream.
#[derive(Debug)]
pub struct PipeWriter {
    tx: SyncSender<Chunk>,
}

impl PipeWriter {
    /// Write a static fragment without copying it.
    pub fn write_str(&mut self, s: &'static str) -> Result<(), Closed> {
        self.send(Cow::Borrowed(s))
    }

    /// Write an owned fragment.
    pub fn write_string(&mut self, s: String) -> Result<(), Closed> {
        self.send(Cow::Owned(s))
    }

    fn send(&mut self, chunk: Chunk) -> Result<(), Closed> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx.send(chunk).map_err(|_| Closed)
    }

    /// End the stream.
    pub fn close(self) {}
}

/// Consuming end of a [`pipe`]. Iterates chunks until the writer closes.
#[derive(Debug)]
pub struct PipeReader {
    rx: Receiver<Chunk>,
}

impl Iterator for PipeReader {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        self.rx.recv().ok()
    }
}

/// Join the producer of a render and combine its result with the
/// consumer's. A panic in the producer is resumed on the calling thread.
pub fn finish(
    producer: ScopedJoinHandle<'_, Result<(), Closed>>,
    consumed: io::Result<()>,
) -> io::Result<()> {
    let produced = match producer.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    };
    consumed?;
    produced.map_err(io::Error::from)
}
