/// Fixed-capacity circular buffer between a realtime capture callback and
/// the thread that writes the capture file.
///
/// Storage is allocated once in [`new`](Self::new); writing never allocates.
/// Wrap in `Arc<parking_lot::Mutex<RingBuffer>>` for cross-thread access.
///
/// Overflow drops the oldest samples and counts them, so the drain side can
/// log that it fell behind.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    write_index: usize,
    read_index: usize,
    available: usize,
    dropped: u64,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_index: 0,
            read_index: 0,
            available: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of samples waiting to be drained.
    pub fn len(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Append samples, overwriting the oldest ones once full.
    pub fn extend<I: IntoIterator<Item = f32>>(&mut self, samples: I) {
        let capacity = self.capacity();
        for sample in samples {
            if self.available == capacity {
                self.read_index = (self.read_index + 1) % capacity;
                self.available -= 1;
                self.dropped += 1;
            }
            self.buffer[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % capacity;
            self.available += 1;
        }
    }

    /// Move every waiting sample, oldest first, onto the end of `out`.
    pub fn drain_into(&mut self, out: &mut Vec<f32>) {
        let capacity = self.capacity();
        let first = self.available.min(capacity - self.read_index);
        out.extend_from_slice(&self.buffer[self.read_index..self.read_index + first]);
        out.extend_from_slice(&self.buffer[..self.available - first]);
        self.read_index = (self.read_index + self.available) % capacity;
        self.available = 0;
    }

    /// Samples lost to overflow since the last call.
    pub fn take_dropped(&mut self) -> u64 {
        std::mem::take(&mut self.dropped)
    }
}
