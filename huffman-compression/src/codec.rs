use bit_vec::BitVec;
use log::debug;

use crate::{
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
    tree::{CodeTable, HuffmanTree, Node},
};

/// Packed code bits plus the exact number of meaningful bits. The last byte
/// carries `0..=7` zeroed padding bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub bit_length: u64,
}

/// A Huffman tree and the code table derived from it.
///
/// The same codec (or one rebuilt from the same [`FrequencyTable`]) must be
/// used to decode what it encoded.
#[derive(Debug, Clone)]
pub struct Codec {
    frequencies: FrequencyTable,
    tree: HuffmanTree,
    codes: CodeTable,
}

impl Codec {
    pub fn build(content: &[u8]) -> Result<Self> {
        Self::from_frequencies(FrequencyTable::from_bytes(content))
    }

    pub fn from_frequencies(frequencies: FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::new(&frequencies)?;
        let codes = tree.codes();
        Ok(Self {
            frequencies,
            tree,
            codes,
        })
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Number of bits the input described by the frequency table encodes to,
    /// or `None` if that does not fit in a `u64`.
    pub fn encoded_bit_length(&self) -> Option<u64> {
        self.frequencies.iter().try_fold(0_u64, |total, (symbol, count)| {
            let code_length = self.codes.get(&symbol)?.len() as u64;
            total.checked_add(count.checked_mul(code_length)?)
        })
    }

    pub fn encode(&self, content: &[u8]) -> Result<EncodedPayload> {
        let mut bits = BitVec::new();
        for &byte in content {
            let code = self
                .codes
                .get(&byte)
                .ok_or(HuffmanError::MissingCode(byte))?;
            bits.extend(code.iter());
        }

        let payload = EncodedPayload {
            bit_length: bits.len() as u64,
            bytes: bits.to_bytes(),
        };
        debug!(
            "encoded {} bytes into {} bits ({} bytes)",
            content.len(),
            payload.bit_length,
            payload.bytes.len()
        );
        Ok(payload)
    }

    pub fn decode(&self, payload: &[u8], bit_length: u64) -> Result<Vec<u8>> {
        let available = payload.len() as u64 * 8;
        if bit_length > available {
            return Err(HuffmanError::malformed(format!(
                "declared {bit_length} bits but only {available} are present"
            )));
        }
        if payload.len() as u64 > bit_length.div_ceil(8) {
            return Err(HuffmanError::malformed(format!(
                "{} bytes of trailing data after {bit_length} bits",
                payload.len() as u64 - bit_length.div_ceil(8)
            )));
        }
        let bit_length = usize::try_from(bit_length)
            .map_err(|_| HuffmanError::malformed("bit length does not fit in memory"))?;

        let bits = BitVec::from_bytes(payload);
        if bits.iter().skip(bit_length).any(|bit| bit) {
            return Err(HuffmanError::malformed("padding bits are not zero"));
        }

        let root = self.tree.root();
        let mut decoded = Vec::new();
        let mut current = root;

        for (position, bit) in bits.iter().take(bit_length).enumerate() {
            current = self.tree.child(current, bit).ok_or_else(|| {
                HuffmanError::malformed(format!("walked past a leaf at bit {position}"))
            })?;

            match self.tree.node(current) {
                node if node.is_placeholder() => {
                    return Err(HuffmanError::malformed(format!(
                        "bit {position} selects a code that was never assigned"
                    )));
                }
                Node::Leaf { symbol, .. } => {
                    decoded.push(*symbol);
                    current = root;
                }
                Node::Internal { .. } => {}
            }
        }

        if current != root {
            return Err(HuffmanError::malformed(
                "stream ends in the middle of a code",
            ));
        }

        debug!("decoded {bit_length} bits into {} bytes", decoded.len());
        Ok(decoded)
    }
}
