//! In-memory source and sink for exercising the relay without hardware

use crate::sink::DatagramSink;
use crate::source::ByteSource;
use std::collections::VecDeque;
use std::io;

/// Source that replays one scripted burst per drain
///
/// Each burst is handed out across as many reads as needed and is followed
/// by a single `Ok(0)`, so a reader that drains until empty consumes exactly
/// one burst per cycle. A read into an empty slice returns 0 and leaves any
/// undelivered bytes for the next drain. Once the script is exhausted every
/// read returns 0.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    bursts: VecDeque<Result<Vec<u8>, io::ErrorKind>>,
    pending: Option<VecDeque<u8>>,
}

impl ScriptedSource {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes that become available together
    pub fn push_burst(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.bursts.push_back(Ok(bytes.into()));
        self
    }

    /// Queue a cycle with nothing to read
    pub fn push_idle(&mut self) -> &mut Self {
        self.push_burst(Vec::new())
    }

    /// Queue a failing read
    pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.bursts.push_back(Err(kind));
        self
    }

    /// Bursts not yet started
    pub fn remaining(&self) -> usize {
        self.bursts.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(pending) = self.pending.as_mut() {
            if pending.is_empty() {
                self.pending = None;
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }
            let n = pending.len().min(buf.len());
            for (slot, byte) in buf.iter_mut().zip(pending.drain(..n)) {
                *slot = byte;
            }
            return Ok(n);
        }

        if buf.is_empty() {
            return Ok(0);
        }
        match self.bursts.pop_front() {
            None => Ok(0),
            Some(Err(kind)) => Err(io::Error::from(kind)),
            Some(Ok(bytes)) => {
                self.pending = Some(bytes.into());
                self.read_available(buf)
            }
        }
    }
}

/// Sink that records every datagram
#[derive(Debug, Default)]
pub struct CaptureSink {
    sent: Vec<Vec<u8>>,
    fail: bool,
}

impl CaptureSink {
    /// Create a recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose sends always fail
    pub fn failing() -> Self {
        Self {
            sent: Vec::new(),
            fail: true,
        }
    }

    /// Raw datagrams in send order
    pub fn datagrams(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Datagrams decoded as UTF-8 text
    pub fn lines(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|d| String::from_utf8_lossy(d).into_owned())
            .collect()
    }
}

impl DatagramSink for CaptureSink {
    fn send_datagram(&mut self, payload: &[u8]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::Other, "capture sink set to fail"));
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut ScriptedSource) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = source.read_available(&mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn test_one_burst_per_drain() {
        let mut source = ScriptedSource::new();
        source.push_burst(vec![1, 2, 3, 4, 5, 6]).push_idle().push_burst(vec![7]);

        assert_eq!(drain(&mut source).unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(drain(&mut source).unwrap(), Vec::<u8>::new());
        assert_eq!(drain(&mut source).unwrap(), vec![7]);
        assert_eq!(drain(&mut source).unwrap(), Vec::<u8>::new());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_empty_read_ends_a_full_drain() {
        let mut source = ScriptedSource::new();
        source.push_burst(vec![1, 2, 3, 4]).push_burst(vec![5, 6]);

        let mut buf = [0u8; 4];
        assert_eq!(source.read_available(&mut buf).unwrap(), 4);
        // Burst fully delivered; the empty read consumes its end marker
        assert_eq!(source.read_available(&mut []).unwrap(), 0);
        assert_eq!(drain(&mut source).unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_empty_read_keeps_undelivered_bytes() {
        let mut source = ScriptedSource::new();
        source.push_burst(vec![1, 2, 3, 4, 5, 6]);

        let mut buf = [0u8; 4];
        assert_eq!(source.read_available(&mut buf).unwrap(), 4);
        assert_eq!(source.read_available(&mut []).unwrap(), 0);
        assert_eq!(drain(&mut source).unwrap(), vec![5, 6]);
        assert_eq!(source.read_available(&mut []).unwrap(), 0);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_scripted_error() {
        let mut source = ScriptedSource::new();
        source.push_error(io::ErrorKind::BrokenPipe).push_burst(vec![9]);

        assert!(drain(&mut source).is_err());
        assert_eq!(drain(&mut source).unwrap(), vec![9]);
    }

    #[test]
    fn test_capture_sink() {
        let mut sink = CaptureSink::new();
        sink.send_datagram(b"a").unwrap();
        sink.send_datagram(b"b").unwrap();
        assert_eq!(sink.lines(), vec!["a".to_string(), "b".to_string()]);

        let mut failing = CaptureSink::failing();
        assert!(failing.send_datagram(b"a").is_err());
        assert!(failing.datagrams().is_empty());
    }
}
