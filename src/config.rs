//! Decoder configuration

use crate::layout::HardwareVariant;
use crate::{FrameError, Result};

/// Parameters that fix every offset computation for a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub variant: HardwareVariant,
    pub num_data_streams: usize,
    pub num_samples: usize,
}

impl DecoderConfig {
    /// One stream, one data block
    pub fn new(variant: HardwareVariant) -> Self {
        Self {
            variant,
            num_data_streams: 1,
            num_samples: variant.samples_per_block(),
        }
    }

    pub fn with_num_data_streams(mut self, num_data_streams: usize) -> Self {
        self.num_data_streams = num_data_streams;
        self
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Size the sample count as `blocks` whole data blocks
    pub fn with_num_blocks(mut self, blocks: usize) -> Self {
        self.num_samples = blocks * self.variant.samples_per_block();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let max = self.variant.max_data_streams();
        if !(1..=max).contains(&self.num_data_streams) {
            return Err(FrameError::InvalidStreamCount {
                requested: self.num_data_streams,
                max,
            });
        }
        Ok(())
    }
}
