//! Channel Window: one channel's bounded history plus its config
//!
//! The window only ever holds numeric readings. Missing values are handled
//! by the caller and never reach [`ChannelWindow::append`].

use crate::buffer::CircularBuffer;
use crate::channel::ChannelConfig;
use crate::constants::MAX_WINDOW_SIZE;
use crate::errors::MonitorResult;
use crate::trend;

/// Snapshot of a window's readings, oldest first
pub type WindowSnapshot = heapless::Vec<f32, MAX_WINDOW_SIZE>;

/// Bounded, insertion-ordered history for one channel
#[derive(Debug, Clone)]
pub struct ChannelWindow {
    config: ChannelConfig,
    buffer: CircularBuffer<MAX_WINDOW_SIZE>,
}

impl ChannelWindow {
    /// Create an empty window sized by `config.window_size`
    pub fn new(config: ChannelConfig) -> MonitorResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Create a window from a config already known to be valid
    pub(crate) fn from_valid(config: ChannelConfig) -> Self {
        Self {
            config,
            buffer: CircularBuffer::with_capacity(config.window_size),
        }
    }

    /// Append at the newest end, evicting the oldest reading when full
    pub fn append(&mut self, value: f32) {
        self.buffer.push(value);
    }

    /// True once `window_size` readings are held
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// Drop every reading
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Current readings, oldest first, without touching the window
    pub fn snapshot(&self) -> WindowSnapshot {
        self.buffer.to_vec()
    }

    /// Run the channel's predicate over the current contents
    ///
    /// Always `false` until the window is full.
    pub fn evaluate(&self) -> bool {
        trend::evaluate(&self.snapshot(), &self.config)
    }

    /// Number of readings held
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no readings are held
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Readings needed for a full window
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Newest reading
    pub fn latest(&self) -> Option<f32> {
        self.buffer.last()
    }

    /// The channel's config
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}
