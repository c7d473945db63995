//! Self-describing file layout. Every integer is little-endian.
//!
//! ```text
//! magic        4 bytes   b"HUF1"
//! symbols      u16       number of (symbol, frequency) pairs, 0..=256
//! pairs        9 bytes   symbol: u8, frequency: u64, repeated `symbols` times
//! bit length   u64       exact number of encoded bits
//! payload      ceil(bit length / 8) bytes
//! ```
//!
//! The frequency table is enough to rebuild the exact tree the encoder used,
//! since tree construction is deterministic.

use bytes::{Buf, BufMut};
use itertools::Itertools;
use log::debug;

use crate::{
    codec::Codec,
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
};

pub const MAGIC: &[u8; 4] = b"HUF1";

const MAX_SYMBOLS: usize = 256;
const PAIR_SIZE: usize = 1 + 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub frequencies: FrequencyTable,
    pub bit_length: u64,
}

impl Header {
    pub fn encoded_len(&self) -> usize {
        MAGIC.len() + 2 + self.frequencies.len() * PAIR_SIZE + 8
    }

    pub fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(MAGIC);
        buf.put_u16_le(self.frequencies.len() as u16);
        for (symbol, count) in self.frequencies.iter() {
            buf.put_u8(symbol);
            buf.put_u64_le(count);
        }
        buf.put_u64_le(self.bit_length);
    }

    pub fn read<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, MAGIC.len() + 2, "header")?;

        let mut magic = [0; 4];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(HuffmanError::metadata(format!(
                "unknown magic {magic:02x?}"
            )));
        }

        let symbol_count = buf.get_u16_le() as usize;
        if symbol_count > MAX_SYMBOLS {
            return Err(HuffmanError::metadata(format!(
                "header claims {symbol_count} symbols, at most {MAX_SYMBOLS} exist"
            )));
        }
        ensure_remaining(buf, symbol_count * PAIR_SIZE, "frequency table")?;

        let pairs = (0..symbol_count)
            .map(|_| (buf.get_u8(), buf.get_u64_le()))
            .collect_vec();
        let frequencies = FrequencyTable::from_pairs(pairs)?;

        ensure_remaining(buf, 8, "bit length")?;
        let bit_length = buf.get_u64_le();

        Ok(Self {
            frequencies,
            bit_length,
        })
    }
}

fn ensure_remaining<B: Buf>(buf: &B, needed: usize, section: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(HuffmanError::metadata(format!(
            "{section} needs {needed} bytes but only {} are available",
            buf.remaining()
        )));
    }
    Ok(())
}

pub fn compress(content: &[u8]) -> Result<Vec<u8>> {
    let (header, payload) = if content.is_empty() {
        let header = Header {
            frequencies: FrequencyTable::default(),
            bit_length: 0,
        };
        (header, Vec::new())
    } else {
        let codec = Codec::build(content)?;
        let payload = codec.encode(content)?;
        let header = Header {
            frequencies: codec.frequencies().clone(),
            bit_length: payload.bit_length,
        };
        (header, payload.bytes)
    };

    let mut compressed = Vec::with_capacity(header.encoded_len() + payload.len());
    header.write(&mut compressed);
    compressed.put_slice(&payload);

    debug!(
        "compressed {} bytes into {} bytes",
        content.len(),
        compressed.len()
    );
    Ok(compressed)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = data;
    let header = Header::read(&mut buf)?;

    let expected_payload = header.bit_length.div_ceil(8);
    if buf.remaining() as u64 != expected_payload {
        return Err(HuffmanError::metadata(format!(
            "{} bits need {expected_payload} payload bytes but {} are present",
            header.bit_length,
            buf.remaining()
        )));
    }

    if header.frequencies.is_empty() {
        if header.bit_length != 0 {
            return Err(HuffmanError::metadata(format!(
                "no symbols but {} bits declared",
                header.bit_length
            )));
        }
        return Ok(Vec::new());
    }

    let codec = Codec::from_frequencies(header.frequencies)?;
    match codec.encoded_bit_length() {
        Some(bit_length) if bit_length == header.bit_length => {}
        implied => {
            return Err(HuffmanError::metadata(format!(
                "frequencies imply {implied:?} bits but {} are declared",
                header.bit_length
            )));
        }
    }

    let decoded = codec.decode(buf, header.bit_length)?;
    if FrequencyTable::from_bytes(&decoded) != *codec.frequencies() {
        return Err(HuffmanError::metadata(format!(
            "decoded {} bytes that do not match the {} declared by the frequency table",
            decoded.len(),
            codec.frequencies().total()
        )));
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;
    use itertools::Itertools;
    use rstest::rstest;

    use super::{compress, decompress, Header, MAGIC};
    use crate::{error::HuffmanError, frequency::FrequencyTable};

    #[rstest]
    #[case::empty(vec![])]
    #[case::single_byte(vec![0xff])]
    #[case::single_distinct_value(vec![0x00; 5])]
    #[case::all_byte_values((0..=255_u8).rev().collect_vec())]
    #[case::fixture(include_bytes!("../tests/lorem.txt").to_vec())]
    fn test_round_trip(#[case] content: Vec<u8>) {
        let compressed = compress(&content).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), content);
    }

    #[test]
    fn test_layout() {
        let compressed = compress(&[0x00; 5]).unwrap();

        let mut expected = Vec::new();
        expected.put_slice(b"HUF1");
        expected.put_u16_le(1);
        expected.put_u8(0x00);
        expected.put_u64_le(5);
        expected.put_u64_le(5);
        expected.put_u8(0b0000_0000);

        assert_eq!(compressed, expected);
    }

    #[test]
    fn test_empty_input_has_header_only() {
        let compressed = compress(&[]).unwrap();
        assert_eq!(compressed.len(), MAGIC.len() + 2 + 8);
    }

    #[test]
    fn test_header_round_trip() {
        let header = Header {
            frequencies: FrequencyTable::from_bytes(b"mississippi"),
            bit_length: 21,
        };
        let mut buf = Vec::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), header.encoded_len());

        let mut slice = buf.as_slice();
        assert_eq!(Header::read(&mut slice).unwrap(), header);
        assert!(slice.is_empty());
    }

    fn header_bytes(symbol_count: u16, pairs: &[(u8, u64)], bit_length: Option<u64>) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_slice(MAGIC);
        buf.put_u16_le(symbol_count);
        for &(symbol, count) in pairs {
            buf.put_u8(symbol);
            buf.put_u64_le(count);
        }
        if let Some(bit_length) = bit_length {
            buf.put_u64_le(bit_length);
        }
        buf
    }

    #[rstest]
    #[case::bad_magic(b"HUF2\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00".to_vec())]
    #[case::truncated_magic(b"HU".to_vec())]
    #[case::too_many_symbols(header_bytes(257, &[], Some(0)))]
    #[case::more_symbols_than_bytes(header_bytes(3, &[(b'a', 1)], Some(1)))]
    #[case::missing_bit_length(header_bytes(1, &[(b'a', 1)], None))]
    #[case::zero_frequency(header_bytes(2, &[(b'a', 1), (b'b', 0)], Some(1)))]
    #[case::duplicate_symbol(header_bytes(2, &[(b'a', 1), (b'a', 2)], Some(2)))]
    #[case::frequency_overflow(header_bytes(2, &[(b'a', u64::MAX), (b'b', 1)], Some(0)))]
    // a:2 b:1 c:1 gives a = 0, b = 10, c = 11 and implies 6 bits, but the
    // payload spells "bbb"
    #[case::counts_differ_from_payload({
        let mut buf = header_bytes(3, &[(b'a', 2), (b'b', 1), (b'c', 1)], Some(6));
        buf.put_u8(0b1010_1000);
        buf
    })]
    // same table, six 'a's
    #[case::longer_than_declared({
        let mut buf = header_bytes(3, &[(b'a', 2), (b'b', 1), (b'c', 1)], Some(6));
        buf.put_u8(0b0000_0000);
        buf
    })]
    #[case::bits_without_symbols({
        let mut buf = header_bytes(0, &[], Some(3));
        buf.put_u8(0);
        buf
    })]
    fn test_malformed_header(#[case] data: Vec<u8>) {
        assert!(matches!(
            decompress(&data),
            Err(HuffmanError::MetadataMismatch(_))
        ));
    }

    #[test]
    fn test_tampered_bit_length_is_rejected() {
        let content = b"abracadabra";
        let mut compressed = compress(content).unwrap();

        // the bit length sits right before the payload
        let header_len = MAGIC.len() + 2 + 5 * 9;
        let mut tampered = compressed[..header_len].to_vec();
        tampered.put_u64_le(22);
        tampered.extend_from_slice(&compressed[header_len + 8..]);
        assert!(matches!(
            decompress(&tampered),
            Err(HuffmanError::MetadataMismatch(_))
        ));

        compressed.push(0);
        assert!(matches!(
            decompress(&compressed),
            Err(HuffmanError::MetadataMismatch(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let content = include_bytes!("../tests/lorem.txt");
        let compressed = compress(content).unwrap();

        let truncated = &compressed[..compressed.len() - 1];
        assert!(matches!(
            decompress(truncated),
            Err(HuffmanError::MetadataMismatch(_))
        ));
    }
}
