//! Reusable output buffers.

use std::io;
use std::ops::Deref;
use std::sync::Mutex;

const INITIAL_CAPACITY: usize = 4096;
const MAX_POOLED: usize = 64;

static POOL: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());

/// A byte buffer whose allocation returns to a process-wide pool on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Vec<u8>,
}

impl PooledBuffer {
    /// Take a buffer from the pool, or allocate one.
    pub fn new() -> Self {
        let buf = POOL
            .lock()
            .ok()
            .and_then(|mut pool| pool.pop())
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_CAPACITY));
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Lossy UTF-8 view of the contents.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for PooledBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl io::Write for PooledBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        if let Ok(mut pool) = POOL.lock()
            && pool.len() < MAX_POOLED
        {
            pool.push(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_write_and_read_back() {
        let mut buffer = PooledBuffer::new();
        buffer.write_all(b"<p>hi</p>").unwrap();
        assert_eq!(buffer.as_bytes(), b"<p>hi</p>");
        assert_eq!(buffer.to_string_lossy(), "<p>hi</p>");
        assert_eq!(buffer.len(), 9);
    }

    #[test]
    fn test_reused_buffers_start_empty() {
        {
            let mut buffer = PooledBuffer::new();
            buffer.write_all(b"old").unwrap();
        }
        let buffer = PooledBuffer::new();
        assert!(buffer.is_empty());
    }
}
