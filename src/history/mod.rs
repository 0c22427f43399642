// Frame history
//
// Fixed-capacity store of the most recently received frames, plus the
// playback state that decides which of them is on screen.

pub mod playback;

pub use playback::PlaybackState;

use crate::frame::Frame;

/// Default number of frames kept for scrubbing
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest history a session may be configured with
pub const MAX_CAPACITY: usize = 10_000;

/// Destination for frames produced by a source
///
/// Both the live connection and the mock source push through this, so every
/// producer goes down the same append path.
pub trait FrameSink {
    fn push(&mut self, frame: Frame);
}

/// Ordered buffer of recent frames
///
/// Overflow policy: when the buffer is full, the next append discards the
/// whole history and keeps only the new frame. This is a reset, not a
/// sliding window.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    frames: Vec<Frame>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer; a zero capacity is raised to one
    ///
    /// Storage grows with the frames actually appended.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a frame, resetting the buffer first if it is full
    pub fn append(&mut self, frame: Frame) {
        if self.frames.len() >= self.capacity {
            tracing::debug!(capacity = self.capacity, "History full, resetting buffer");
            self.frames.clear();
        }
        self.frames.push(frame);
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Most recently appended frame
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all buffered frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FrameSink for HistoryBuffer {
    fn push(&mut self, frame: Frame) {
        self.append(frame);
    }
}

#[cfg(test)]
pub(crate) fn test_frame(timestamp: i64) -> Frame {
    Frame {
        timestamp,
        metadata: serde_json::Map::new(),
        query_image: None,
        observation_images: None,
        icl_images: None,
    }
}

#[cfg(test)]
impl FrameSink for Vec<Frame> {
    fn push(&mut self, frame: Frame) {
        Vec::push(self, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any capacity and any number of appends, the buffer never
        /// holds more than its capacity and always ends with the last frame.
        #[test]
        fn prop_length_never_exceeds_capacity(
            capacity in 1usize..20usize,
            appends in 0usize..100usize,
        ) {
            let mut buffer = HistoryBuffer::new(capacity);
            for i in 0..appends {
                buffer.append(test_frame(i as i64));
                prop_assert!(buffer.len() <= capacity);
                prop_assert_eq!(buffer.last().map(|f| f.timestamp), Some(i as i64));
            }
            if appends > 0 {
                // Length follows the reset cycle: 1..=capacity, then back to 1
                prop_assert_eq!(buffer.len(), (appends - 1) % capacity + 1);
            }
        }

        /// Appending to a full buffer leaves exactly the new frame.
        #[test]
        fn prop_overflow_resets_to_singleton(capacity in 1usize..20usize) {
            let mut buffer = HistoryBuffer::new(capacity);
            for i in 0..capacity {
                buffer.append(test_frame(i as i64));
            }
            prop_assert_eq!(buffer.len(), capacity);

            buffer.append(test_frame(-1));
            prop_assert_eq!(buffer.len(), 1);
            prop_assert_eq!(buffer.get(0).map(|f| f.timestamp), Some(-1));
        }
    }

    #[test]
    fn test_capacity_three_scenario() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.append(test_frame(1));
        buffer.append(test_frame(2));
        buffer.append(test_frame(3));
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(2).map(|f| f.timestamp), Some(3));

        buffer.append(test_frame(4));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(0).map(|f| f.timestamp), Some(4));
        assert!(buffer.get(1).is_none());
    }

    #[test]
    fn test_get_out_of_range() {
        let mut buffer = HistoryBuffer::new(5);
        assert!(buffer.get(0).is_none());
        buffer.append(test_frame(1));
        assert!(buffer.get(0).is_some());
        assert!(buffer.get(1).is_none());
        assert!(buffer.get(usize::MAX).is_none());
    }

    #[test]
    fn test_preserves_arrival_order() {
        let mut buffer = HistoryBuffer::new(10);
        for ts in [30, 10, 20] {
            buffer.append(test_frame(ts));
        }
        let order: Vec<i64> = buffer.iter().map(|f| f.timestamp).collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = HistoryBuffer::new(5);
        buffer.append(test_frame(1));
        buffer.append(test_frame(2));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 5);
        assert!(buffer.last().is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut buffer = HistoryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.append(test_frame(1));
        buffer.append(test_frame(2));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(0).map(|f| f.timestamp), Some(2));
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut buffer = HistoryBuffer::new(usize::MAX);
        assert_eq!(buffer.capacity(), usize::MAX);
        buffer.append(test_frame(1));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(HistoryBuffer::default().capacity(), DEFAULT_CAPACITY);
    }
}
