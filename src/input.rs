use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

/// Reports end of input once `running` is cleared, but only on a boundary of
/// `frame_bytes` bytes: a read in progress is completed up to the next whole
/// frame first.
pub struct InterruptibleReader<R> {
    inner: R,
    running: Arc<AtomicBool>,
    frame_bytes: u64,
    delivered: u64,
}

impl<R: Read> InterruptibleReader<R> {
    pub fn new(inner: R, running: Arc<AtomicBool>) -> InterruptibleReader<R> {
        InterruptibleReader { inner, running, frame_bytes: 1, delivered: 0 }
    }

    /// Sets the alignment for everything read from here on.
    pub fn set_frame_bytes(&mut self, frame_bytes: usize) {
        self.frame_bytes = frame_bytes.max(1) as u64;
        self.delivered = 0;
    }
}

impl<R: Read> Read for InterruptibleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = if self.running.load(Ordering::SeqCst) {
            buf.len()
        } else {
            let partial = (self.frame_bytes - self.delivered % self.frame_bytes) % self.frame_bytes;
            if partial == 0 {
                return Ok(0);
            }
            debug!("interrupted mid frame, reading {} more bytes", partial);
            buf.len().min(partial as usize)
        };

        let read = self.inner.read(&mut buf[..limit])?;
        self.delivered += read as u64;
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn stops_at_once_when_aligned() {
        let running = Arc::new(AtomicBool::new(false));
        let mut reader = InterruptibleReader::new(Cursor::new(vec![1u8; 64]), running);
        reader.set_frame_bytes(8);

        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn completes_the_current_frame() {
        let running = Arc::new(AtomicBool::new(true));
        let mut reader = InterruptibleReader::new(Cursor::new(vec![1u8; 64]), running.clone());
        reader.set_frame_bytes(8);

        let mut buf = [0u8; 13];
        assert_eq!(reader.read(&mut buf).unwrap(), 13);

        running.store(false, Ordering::SeqCst);
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn passes_everything_while_running() {
        let running = Arc::new(AtomicBool::new(true));
        let mut reader = InterruptibleReader::new(Cursor::new(vec![7u8; 30]), running);
        reader.set_frame_bytes(8);

        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        assert_eq!(all.len(), 30);
    }
}
