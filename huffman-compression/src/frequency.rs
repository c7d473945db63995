use std::collections::BTreeMap;

use itertools::Itertools;

use crate::error::{HuffmanError, Result};

/// Occurrence count of every byte value present in an input.
///
/// Only symbols that actually occur are stored, and iteration is always in
/// ascending byte order so that everything built on top of the table is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable(BTreeMap<u8, u64>);

impl FrequencyTable {
    pub fn from_bytes(content: &[u8]) -> Self {
        let counts = content
            .iter()
            .copied()
            .into_grouping_map_by(|&byte| byte)
            .fold(0_u64, |acc, _key, _value| acc + 1);

        Self(counts.into_iter().collect())
    }

    /// Rebuilds a table from persisted `(symbol, count)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, u64)>) -> Result<Self> {
        let mut table = BTreeMap::new();
        let mut total = 0_u64;
        for (symbol, count) in pairs {
            if count == 0 {
                return Err(HuffmanError::metadata(format!(
                    "symbol {symbol:#04x} has a zero frequency"
                )));
            }
            if table.insert(symbol, count).is_some() {
                return Err(HuffmanError::metadata(format!(
                    "symbol {symbol:#04x} is listed more than once"
                )));
            }
            total = total
                .checked_add(count)
                .ok_or_else(|| HuffmanError::metadata("frequencies overflow a u64"))?;
        }
        Ok(Self(table))
    }

    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.0.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts, i.e. the length of the analyzed input.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.0.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

#[cfg(test)]
mod tests {
    use super::FrequencyTable;
    use crate::error::HuffmanError;
    use itertools::Itertools;

    #[test]
    fn test_empty_input_gives_empty_table() {
        let table = FrequencyTable::from_bytes(&[]);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_counts_every_distinct_byte() {
        let table = FrequencyTable::from_bytes(b"abracadabra");

        assert_eq!(table.len(), 5);
        assert_eq!(table.get(b'a'), Some(5));
        assert_eq!(table.get(b'b'), Some(2));
        assert_eq!(table.get(b'r'), Some(2));
        assert_eq!(table.get(b'c'), Some(1));
        assert_eq!(table.get(b'd'), Some(1));
        assert_eq!(table.get(b'z'), None);
        assert_eq!(table.total(), 11);
    }

    #[test]
    fn test_iterates_in_ascending_symbol_order() {
        let table = FrequencyTable::from_bytes(&[0xff, 0x00, 0x7f, 0x00]);
        let symbols = table.iter().map(|(symbol, _)| symbol).collect_vec();
        assert_eq!(symbols, vec![0x00, 0x7f, 0xff]);
    }

    #[test]
    fn test_total_matches_input_length_for_all_byte_values() {
        let content = (0..=255_u8).cycle().take(1000).collect_vec();
        let table = FrequencyTable::from_bytes(&content);
        assert_eq!(table.len(), 256);
        assert_eq!(table.total(), 1000);
    }

    #[test]
    fn test_from_pairs_rejects_zero_and_duplicates() {
        assert!(matches!(
            FrequencyTable::from_pairs([(1, 3), (2, 0)]),
            Err(HuffmanError::MetadataMismatch(_))
        ));
        assert!(matches!(
            FrequencyTable::from_pairs([(1, 3), (1, 4)]),
            Err(HuffmanError::MetadataMismatch(_))
        ));

        assert!(matches!(
            FrequencyTable::from_pairs([(1, u64::MAX), (2, 1)]),
            Err(HuffmanError::MetadataMismatch(_))
        ));

        let table = FrequencyTable::from_pairs([(9, 1), (3, 2)]).unwrap();
        assert_eq!(table, FrequencyTable::from_bytes(&[3, 9, 3]));
    }
}
