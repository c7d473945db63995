use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    /// Negative when the compressed form is larger than the original.
    pub space_saving_percent: f64,
}

impl CompressionStats {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        let space_saving_percent = if original_size == 0 {
            0.0
        } else {
            (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0
        };

        Self {
            original_size,
            compressed_size,
            space_saving_percent,
        }
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Original size: {} bytes, Compressed size: {} bytes, Saved {:.2}%",
            self.original_size, self.compressed_size, self.space_saving_percent
        )
    }
}
