//! Lossless byte compression with Huffman coding.
//!
//! [`Codec`] covers the in-memory round trip, [`container`] adds the file
//! layout that lets a later session rebuild the tree.

pub mod codec;
pub mod container;
pub mod error;
pub mod frequency;
pub mod stats;
pub mod tree;

pub use codec::{Codec, EncodedPayload};
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use stats::CompressionStats;
pub use tree::{CodeTable, HuffmanTree, Node, NodeId};
