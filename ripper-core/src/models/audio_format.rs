/// PCM layout of the audio a disc device delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl PcmFormat {
    /// Red Book CD audio: 44.1 kHz, 16-bit, stereo.
    pub const CD_AUDIO: PcmFormat = PcmFormat {
        sample_rate: 44_100,
        channels: 2,
        bit_depth: 16,
    };

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bit_depth as u32 / 8
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bit_depth / 8
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::CD_AUDIO
    }
}
