// Playback controller
//
// Tracks whether the viewer follows the newest frame ("live") or holds a
// selected position in the history ("paused"). The stored index is only a
// request; every read clamps it against the current buffer length, so the
// state stays valid when the buffer resets or is cleared underneath it.

use super::HistoryBuffer;
use crate::frame::Frame;

/// Live/paused viewing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    is_live: bool,
    selected_index: usize,
}

impl PlaybackState {
    /// Sessions start live
    pub fn new() -> Self {
        Self {
            is_live: true,
            selected_index: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    /// Raw stored index; use `display_index` for what is on screen
    #[allow(dead_code)]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Index of the frame to display for a buffer of `len` frames
    pub fn display_index(&self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        if self.is_live {
            Some(last)
        } else {
            Some(self.selected_index.min(last))
        }
    }

    /// Frame to display, derived from the buffer without mutating anything
    pub fn current_frame<'a>(&self, buffer: &'a HistoryBuffer) -> Option<&'a Frame> {
        self.display_index(buffer.len())
            .and_then(|index| buffer.get(index))
    }

    /// Pause and select `index`, clamped into the buffer
    ///
    /// Does nothing when the buffer is empty.
    pub fn select_index(&mut self, index: usize, buffer: &HistoryBuffer) {
        let Some(last) = buffer.len().checked_sub(1) else {
            return;
        };
        self.is_live = false;
        self.selected_index = index.min(last);
    }

    /// Switch between live and paused
    ///
    /// Going live jumps to the newest frame. Pausing freezes the frame that
    /// is currently displayed.
    pub fn toggle_live(&mut self, buffer: &HistoryBuffer) {
        let len = buffer.len();
        if self.is_live {
            self.selected_index = self.display_index(len).unwrap_or(0);
            self.is_live = false;
        } else {
            self.is_live = true;
            self.selected_index = len.saturating_sub(1);
        }
    }

    /// Return to live mode if paused
    pub fn go_live(&mut self, buffer: &HistoryBuffer) {
        if !self.is_live {
            self.toggle_live(buffer);
        }
    }

    /// Select the frame before the displayed one
    pub fn step_back(&mut self, buffer: &HistoryBuffer) {
        if let Some(current) = self.display_index(buffer.len()) {
            self.select_index(current.saturating_sub(1), buffer);
        }
    }

    /// Select the frame after the displayed one
    pub fn step_forward(&mut self, buffer: &HistoryBuffer) {
        if let Some(current) = self.display_index(buffer.len()) {
            self.select_index(current.saturating_add(1), buffer);
        }
    }

    pub fn jump_to_oldest(&mut self, buffer: &HistoryBuffer) {
        self.select_index(0, buffer);
    }

    pub fn jump_to_newest(&mut self, buffer: &HistoryBuffer) {
        self.select_index(usize::MAX, buffer);
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::test_frame;
    use proptest::prelude::*;

    fn buffer_with(count: usize, capacity: usize) -> HistoryBuffer {
        let mut buffer = HistoryBuffer::new(capacity);
        for i in 0..count {
            buffer.append(test_frame(i as i64));
        }
        buffer
    }

    fn displayed(state: &PlaybackState, buffer: &HistoryBuffer) -> Option<i64> {
        state.current_frame(buffer).map(|f| f.timestamp)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// While live, the displayed frame is always the last one, for every
        /// buffer state reached by appending (including the empty buffer and
        /// states after an overflow reset).
        #[test]
        fn prop_live_tracks_last_frame(
            capacity in 1usize..10usize,
            appends in 0usize..40usize,
        ) {
            let state = PlaybackState::new();
            let mut buffer = HistoryBuffer::new(capacity);
            prop_assert!(state.current_frame(&buffer).is_none());
            for i in 0..appends {
                buffer.append(test_frame(i as i64));
                prop_assert_eq!(
                    displayed(&state, &buffer),
                    buffer.get(buffer.len() - 1).map(|f| f.timestamp)
                );
            }
        }

        /// Pausing never changes what is on screen at the moment of the toggle.
        #[test]
        fn prop_pause_keeps_displayed_frame(
            count in 0usize..20usize,
            select in proptest::option::of(0usize..30usize),
        ) {
            let buffer = buffer_with(count, 20);
            let mut state = PlaybackState::new();
            if let Some(index) = select {
                // Select then resume live so the stored index is stale
                state.select_index(index, &buffer);
                state.go_live(&buffer);
            }
            prop_assert!(state.is_live());

            let before = displayed(&state, &buffer);
            state.toggle_live(&buffer);
            prop_assert!(!state.is_live());
            prop_assert_eq!(displayed(&state, &buffer), before);
        }

        /// Out-of-range selection never panics and lands inside the buffer.
        #[test]
        fn prop_select_index_clamps(count in 0usize..20usize, index in any::<usize>()) {
            let buffer = buffer_with(count, 20);
            let mut state = PlaybackState::new();
            state.select_index(index, &buffer);
            if count == 0 {
                prop_assert!(state.is_live());
                prop_assert!(state.current_frame(&buffer).is_none());
            } else {
                prop_assert!(!state.is_live());
                prop_assert!(state.selected_index() < count);
                prop_assert_eq!(state.selected_index(), index.min(count - 1));
            }
        }
    }

    #[test]
    fn test_starts_live() {
        let state = PlaybackState::default();
        assert!(state.is_live());
        assert_eq!(state.display_index(0), None);
        assert_eq!(state.display_index(4), Some(3));
    }

    #[test]
    fn test_resume_live_jumps_to_newest() {
        let mut buffer = buffer_with(5, 10);
        let mut state = PlaybackState::new();

        state.select_index(1, &buffer);
        assert_eq!(displayed(&state, &buffer), Some(1));

        buffer.append(test_frame(5));
        // Paused view holds its position while frames arrive
        assert_eq!(displayed(&state, &buffer), Some(1));

        state.toggle_live(&buffer);
        assert!(state.is_live());
        assert_eq!(state.selected_index(), buffer.len() - 1);
        assert_eq!(displayed(&state, &buffer), Some(5));
    }

    #[test]
    fn test_resume_live_on_empty_buffer() {
        let buffer = buffer_with(3, 10);
        let mut state = PlaybackState::new();
        state.select_index(2, &buffer);

        let empty = HistoryBuffer::new(10);
        state.toggle_live(&empty);
        assert!(state.is_live());
        assert_eq!(state.selected_index(), 0);
        assert!(state.current_frame(&empty).is_none());
    }

    #[test]
    fn test_pause_on_empty_buffer() {
        let buffer = HistoryBuffer::new(10);
        let mut state = PlaybackState::new();
        state.toggle_live(&buffer);
        assert!(!state.is_live());
        assert_eq!(state.selected_index(), 0);
        assert!(state.current_frame(&buffer).is_none());
    }

    #[test]
    fn test_paused_index_clamps_after_reset() {
        let mut buffer = buffer_with(3, 3);
        let mut state = PlaybackState::new();
        state.select_index(2, &buffer);

        // Overflow reset shrinks the buffer to the new frame
        buffer.append(test_frame(99));
        assert_eq!(state.selected_index(), 2);
        assert_eq!(state.display_index(buffer.len()), Some(0));
        assert_eq!(displayed(&state, &buffer), Some(99));
    }

    #[test]
    fn test_paused_after_clear_shows_nothing() {
        let mut buffer = buffer_with(3, 10);
        let mut state = PlaybackState::new();
        state.select_index(1, &buffer);
        buffer.clear();
        assert!(!state.is_live());
        assert!(state.current_frame(&buffer).is_none());
    }

    #[test]
    fn test_step_navigation() {
        let buffer = buffer_with(4, 10);
        let mut state = PlaybackState::new();

        state.step_back(&buffer);
        assert!(!state.is_live());
        assert_eq!(displayed(&state, &buffer), Some(2));

        state.step_back(&buffer);
        state.step_back(&buffer);
        state.step_back(&buffer);
        assert_eq!(displayed(&state, &buffer), Some(0));

        state.step_forward(&buffer);
        assert_eq!(displayed(&state, &buffer), Some(1));

        state.jump_to_newest(&buffer);
        assert!(!state.is_live());
        assert_eq!(displayed(&state, &buffer), Some(3));

        state.step_forward(&buffer);
        assert_eq!(displayed(&state, &buffer), Some(3));

        state.jump_to_oldest(&buffer);
        assert_eq!(displayed(&state, &buffer), Some(0));

        state.go_live(&buffer);
        assert!(state.is_live());
        state.go_live(&buffer);
        assert!(state.is_live());
    }

    #[test]
    fn test_step_on_empty_buffer_is_noop() {
        let buffer = HistoryBuffer::new(10);
        let mut state = PlaybackState::new();
        state.step_back(&buffer);
        state.step_forward(&buffer);
        state.jump_to_oldest(&buffer);
        assert!(state.is_live());
    }
}
