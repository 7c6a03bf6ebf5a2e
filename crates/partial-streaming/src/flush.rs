//! Explicit flush control - no implicit flushing beyond the chosen mode.

use partial_core::FlushMode;

/// Controller for managing flush behavior.
#[derive(Debug)]
pub struct FlushController {
    mode: FlushMode,
    pending_bytes: usize,
    total_bytes: usize,
    flushes: usize,
}

impl FlushController {
    /// Create a new flush controller with given mode.
    pub fn new(mode: FlushMode) -> Self {
        Self {
            mode,
            pending_bytes: 0,
            total_bytes: 0,
            flushes: 0,
        }
    }

    /// Record bytes handed to the writer.
    pub fn add_bytes(&mut self, count: usize) {
        self.pending_bytes += count;
        self.total_bytes += count;
    }

    /// Check if a closed section should be flushed.
    pub fn flush_after_section(&self) -> bool {
        matches!(self.mode, FlushMode::EachSection) && self.pending_bytes > 0
    }

    /// Check if the finished document should be flushed.
    pub fn flush_at_end(&self) -> bool {
        !matches!(self.mode, FlushMode::Manual)
    }

    /// Reset pending byte count after flush.
    pub fn reset(&mut self) {
        self.pending_bytes = 0;
        self.flushes += 1;
    }

    /// Bytes written since the last flush.
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Bytes written in total.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Number of flushes performed.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Get current mode.
    pub fn mode(&self) -> FlushMode {
        self.mode
    }
}

impl Default for FlushController {
    fn default() -> Self {
        Self::new(FlushMode::default())
    }
}
