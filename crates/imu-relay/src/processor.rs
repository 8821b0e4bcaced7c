//! Read → sync → decode → publish cycle

use crate::cadence::Cadence;
use frame_buffer::{CursorMode, FrameBuffer};
use imu_link::{ByteSource, DatagramSink};
use imu_protocol::{FrameSynchronizer, ImuRecord, PacketDecoder, PACKET_SIZE, SIGNATURE_LEN};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Scratch size for a single source read
pub const READ_CHUNK: usize = 1024;

/// Result of one processing cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleOutcome {
    /// Bytes pulled from the source
    pub bytes_read: usize,
    /// Unread bytes overwritten while appending
    pub overrun_bytes: u64,
    /// Ring index where a frame was found
    pub frame_start: Option<usize>,
    /// Record published this cycle
    pub record: Option<ImuRecord>,
}

/// Running counters for the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Cycles run
    pub cycles: u64,
    /// Bytes pulled from the source
    pub bytes_read: u64,
    /// Records decoded and published
    pub records: u64,
    /// Unscanned bytes lost to overwrite
    pub overrun_bytes: u64,
    /// Source reads that failed
    pub read_errors: u64,
    /// Datagram sends that failed
    pub send_errors: u64,
    /// Cycles that ran past the cadence period
    pub late_cycles: u64,
}

/// Owns the frame buffer and drives source, synchronizer, decoder and sink
pub struct ProcessingLoop<S, K> {
    source: S,
    sink: K,
    buffer: FrameBuffer,
    synchronizer: FrameSynchronizer,
    decoder: PacketDecoder,
    cadence: Cadence,
    scratch: Box<[u8]>,
    stats: LoopStats,
}

impl<S: ByteSource, K: DatagramSink> ProcessingLoop<S, K> {
    /// Create a loop around an empty buffer
    pub fn new(source: S, sink: K, buffer: FrameBuffer, cadence: Cadence) -> Self {
        info!(
            "Processing loop: {} byte ring ({:?} cursor), every {:?}",
            buffer.capacity(),
            buffer.mode(),
            cadence.period()
        );
        Self {
            source,
            sink,
            buffer,
            synchronizer: FrameSynchronizer::default(),
            decoder: PacketDecoder::new(),
            cadence,
            scratch: vec![0u8; READ_CHUNK].into_boxed_slice(),
            stats: LoopStats::default(),
        }
    }

    /// Run one cycle without pacing
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();
        self.stats.cycles += 1;

        self.pull(&mut outcome);

        // Shared mode reports the whole ring as unread, giving a full scan
        let cursor = self.buffer.cursor();
        let unread = self.buffer.unread();
        let Some(frame_start) = self.synchronizer.find_start_within(&self.buffer, cursor, unread)
        else {
            // A signature may still be completed by the last few bytes
            self.buffer.mark_scanned(unread.saturating_sub(SIGNATURE_LEN - 1));
            trace!(cursor, "No start signature this cycle");
            return outcome;
        };
        outcome.frame_start = Some(frame_start);

        // Shared mode decodes whatever follows the signature, stale or not
        let lead = self.buffer.distance_from_cursor(frame_start);
        if self.buffer.mode() == CursorMode::Split && lead + PACKET_SIZE > unread {
            self.buffer.mark_scanned(lead);
            trace!(frame_start, "Frame tail not received yet");
            return outcome;
        }

        let record = self.decoder.decode(&self.buffer, frame_start);
        info!(
            count = record.packet_count,
            x = record.x_rate,
            y = record.y_rate,
            z = record.z_rate,
            "Parsed IMU data"
        );
        self.publish(&record);

        self.buffer.advance(lead + PACKET_SIZE);
        self.stats.records += 1;
        outcome.record = Some(record);
        outcome
    }

    /// Run cycles forever at the configured cadence
    pub async fn run(&mut self) {
        loop {
            self.paced_cycle().await;
        }
    }

    /// Run a fixed number of paced cycles
    pub async fn run_cycles(&mut self, cycles: usize) -> Vec<CycleOutcome> {
        let mut outcomes = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            outcomes.push(self.paced_cycle().await);
        }
        outcomes
    }

    async fn paced_cycle(&mut self) -> CycleOutcome {
        let started = Instant::now();
        let outcome = self.run_cycle();
        if !self.cadence.pace(started).await {
            self.stats.late_cycles += 1;
        }
        outcome
    }

    /// Drain the source into the ring, at most one ring's worth per cycle
    ///
    /// Once the ring's worth is reached the last read gets an empty slice,
    /// which every source answers with `Ok(0)`.
    fn pull(&mut self, outcome: &mut CycleOutcome) {
        let capacity = self.buffer.capacity();
        loop {
            let room = (capacity - outcome.bytes_read).min(READ_CHUNK);
            match self.source.read_available(&mut self.scratch[..room]) {
                Ok(0) => break,
                Ok(n) => {
                    outcome.overrun_bytes += self.buffer.append(&self.scratch[..n]);
                    outcome.bytes_read += n;
                }
                Err(e) => {
                    debug!("Source read failed, treating as no data: {}", e);
                    self.stats.read_errors += 1;
                    break;
                }
            }
        }

        self.stats.bytes_read += outcome.bytes_read as u64;
        if outcome.overrun_bytes > 0 {
            self.stats.overrun_bytes += outcome.overrun_bytes;
            warn!(
                lost = outcome.overrun_bytes,
                total_lost = self.stats.overrun_bytes,
                "Unscanned bytes overwritten, packets dropped"
            );
        }
    }

    fn publish(&mut self, record: &ImuRecord) {
        if let Err(e) = self.sink.send_datagram(record.datagram_line().as_bytes()) {
            debug!("Broadcast send failed: {}", e);
            self.stats.send_errors += 1;
        }
    }

    /// Frame buffer state
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Byte source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Datagram sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Counters so far
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Cadence in use
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }
}
