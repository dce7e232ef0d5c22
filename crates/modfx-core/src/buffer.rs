//! Borrowed, per-block view over the host's channel buffers.

/// Most channels a single [`AudioBufferInfo`] can carry.
pub const MAX_CHANNELS: usize = 16;

/// A non-owning view of one audio block: up to [`MAX_CHANNELS`] mutable
/// channel slices and a shared sample count.
///
/// The view is rebuilt every block. Appending channel 0 clears whatever the
/// previous block left behind, so the host supplies channel 0 first and then
/// the remaining channels in order.
///
/// # Example
///
/// ```rust
/// use modfx_core::AudioBufferInfo;
///
/// let mut left = [0.5_f32; 64];
/// let mut right = [0.5_f32; 64];
///
/// let mut buffer = AudioBufferInfo::new();
/// buffer.append_channel(64, &mut left, 0);
/// buffer.append_channel(64, &mut right, 1);
///
/// assert_eq!(buffer.num_channels(), 2);
/// buffer.channel_data(1)[0] = 0.0;
/// ```
#[derive(Debug)]
pub struct AudioBufferInfo<'a, T> {
    channels: [Option<&'a mut [T]>; MAX_CHANNELS],
    num_channels: usize,
    num_samples: usize,
}

impl<'a, T> AudioBufferInfo<'a, T> {
    /// An empty view.
    pub fn new() -> Self {
        Self {
            channels: [const { None }; MAX_CHANNELS],
            num_channels: 0,
            num_samples: 0,
        }
    }

    /// Build a view from channel slices in order, `num_samples` long each.
    ///
    /// Channels past [`MAX_CHANNELS`] are ignored.
    pub fn from_channels<I>(num_samples: usize, channels: I) -> Self
    where
        I: IntoIterator<Item = &'a mut [T]>,
    {
        let mut buffer = Self::new();
        for (index, data) in channels.into_iter().take(MAX_CHANNELS).enumerate() {
            buffer.append_channel(num_samples, data, index);
        }
        buffer
    }

    /// Append the next channel of the block.
    ///
    /// `channel_index` 0 resets the view. Otherwise the index must equal the
    /// number of channels already appended. The block length becomes the
    /// smallest of `num_samples` and every appended slice length.
    pub fn append_channel(&mut self, num_samples: usize, data: &'a mut [T], channel_index: usize) {
        if channel_index == 0 {
            self.clear();
        }
        debug_assert_eq!(
            channel_index, self.num_channels,
            "channels must be appended in order"
        );
        debug_assert!(
            data.len() >= num_samples,
            "channel {channel_index} holds {} samples, block needs {num_samples}",
            data.len()
        );
        debug_assert!(self.num_channels < MAX_CHANNELS, "too many channels");
        if self.num_channels >= MAX_CHANNELS {
            return;
        }

        let len = num_samples.min(data.len());
        self.num_samples = if self.num_channels == 0 {
            len
        } else {
            self.num_samples.min(len)
        };
        self.channels[self.num_channels] = Some(data);
        self.num_channels += 1;
    }

    /// Drop every channel reference.
    pub fn clear(&mut self) {
        for channel in &mut self.channels[..self.num_channels] {
            *channel = None;
        }
        self.num_channels = 0;
        self.num_samples = 0;
    }

    /// Samples per channel in this block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Channels in this block.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Mutable samples of `channel`, trimmed to [`num_samples`](Self::num_samples).
    ///
    /// An out-of-range channel yields an empty slice.
    #[inline]
    pub fn channel_data(&mut self, channel: usize) -> &mut [T] {
        debug_assert!(channel < self.num_channels, "channel {channel} not in block");
        let num_samples = self.num_samples;
        match self.channels.get_mut(channel) {
            Some(Some(data)) => &mut data[..num_samples],
            _ => &mut [],
        }
    }

    /// Read-only samples of `channel`, trimmed to [`num_samples`](Self::num_samples).
    #[inline]
    pub fn channel(&self, channel: usize) -> &[T] {
        match self.channels.get(channel) {
            Some(Some(data)) => &data[..self.num_samples],
            _ => &[],
        }
    }
}

impl<T> Default for AudioBufferInfo<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}
