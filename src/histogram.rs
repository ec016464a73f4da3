//! 256-bucket brightness histogram.

use serde::Serialize;

use crate::frame::PixelBuffer;

pub const BINS: usize = 256;

/// Count of pixels per `floor((R + G + B) / 3)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    #[serde(with = "bins_serde")]
    bins: [u32; BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { bins: [0; BINS] }
    }
}

impl Histogram {
    /// Recompute from scratch over the whole buffer.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut bins = [0u32; BINS];
        for px in buffer.pixels() {
            let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
            bins[(sum / 3) as usize] += 1;
        }
        Self { bins }
    }

    pub fn bins(&self) -> &[u32; BINS] {
        &self.bins
    }

    pub fn get(&self, bucket: u8) -> u32 {
        self.bins[bucket as usize]
    }

    /// Total pixel count.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }

    /// Largest bucket count.
    pub fn max(&self) -> u32 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Bucket with the largest count (lowest index on ties), `None` when empty.
    pub fn peak(&self) -> Option<u8> {
        if self.total() == 0 {
            return None;
        }
        let max = self.max();
        self.bins.iter().position(|&c| c == max).map(|i| i as u8)
    }

    /// Mean bucket index, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &c)| i as u64 * c as u64)
            .sum();
        Some(weighted as f64 / total as f64)
    }

    /// Bar heights scaled so the largest bucket is `height`.
    pub fn normalized(&self, height: u32) -> Vec<u32> {
        let max = self.max();
        if max == 0 {
            return vec![0; BINS];
        }
        self.bins
            .iter()
            .map(|&c| (c as u64 * height as u64 / max as u64) as u32)
            .collect()
    }
}

mod bins_serde {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bins: &[u32; super::BINS], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(bins.iter())
    }
}
