//! AD-structure codec.
//!
//! Advertising data is a sequence of `length | type | value` records where
//! `length` counts the type byte plus the value. A zero length ends the
//! data early (the remainder is padding).

use core::fmt;

use advscope_errors::CatalogError;
use serde::{Deserialize, Serialize};

/// One decoded AD structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdStructure {
    /// AD type byte
    pub ad_type: u8,
    /// Value bytes
    pub data: Vec<u8>,
}

impl AdStructure {
    /// Create a structure.
    #[must_use]
    pub fn new(ad_type: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            ad_type,
            data: data.into(),
        }
    }
}

impl fmt::Display for AdStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}:", self.ad_type)?;
        for b in &self.data {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Longest value an AD structure can carry (length byte covers the type too).
const MAX_VALUE_LEN: usize = u8::MAX as usize - 1;

/// Decode advertising data into AD structures.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedAdvertisingData`] when a record claims
/// more bytes than remain in the buffer.
pub fn parse_ad_structures(bytes: &[u8]) -> Result<Vec<AdStructure>, CatalogError> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut rest = bytes;
    while let Some((&length, tail)) = rest.split_first() {
        if length == 0 {
            break;
        }
        let length = usize::from(length);
        let Some(record) = tail.get(..length) else {
            return Err(CatalogError::malformed(
                offset,
                format!("record length {length} exceeds the {} remaining byte(s)", tail.len()),
            ));
        };
        let Some((&ad_type, data)) = record.split_first() else {
            return Err(CatalogError::malformed(offset, "record without type byte"));
        };
        records.push(AdStructure::new(ad_type, data));
        rest = tail.get(length..).unwrap_or_default();
        offset = offset.saturating_add(length).saturating_add(1);
    }
    Ok(records)
}

/// Encode AD structures into advertising data.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedAdvertisingData`] when a value is too
/// long to be described by a single length byte.
pub fn encode_ad_structures(records: &[AdStructure]) -> Result<Vec<u8>, CatalogError> {
    let mut out = Vec::with_capacity(records.iter().map(|r| r.data.len() + 2).sum());
    for record in records {
        if record.data.len() > MAX_VALUE_LEN {
            return Err(CatalogError::malformed(
                out.len(),
                format!("value of {} bytes does not fit a length byte", record.data.len()),
            ));
        }
        let length = u8::try_from(record.data.len() + 1).unwrap_or(u8::MAX);
        out.push(length);
        out.push(record.ad_type);
        out.extend_from_slice(&record.data);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_name() -> Result<(), CatalogError> {
        let bytes = [0x02, 0x01, 0x05, 0x04, 0x09, b'M', b'X', b'3'];
        let records = parse_ad_structures(&bytes)?;
        assert_eq!(
            records,
            vec![
                AdStructure::new(0x01, vec![0x05]),
                AdStructure::new(0x09, b"MX3".to_vec())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_zero_length_terminates() -> Result<(), CatalogError> {
        let bytes = [0x02, 0x01, 0x05, 0x00, 0xFF, 0xFF];
        assert_eq!(parse_ad_structures(&bytes)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_truncated_record_is_error() {
        let bytes = [0x02, 0x01, 0x05, 0x05, 0x09, b'a'];
        assert_eq!(
            parse_ad_structures(&bytes),
            Err(CatalogError::malformed(
                3,
                "record length 5 exceeds the 2 remaining byte(s)"
            ))
        );
    }

    #[test]
    fn test_empty_input() -> Result<(), CatalogError> {
        assert!(parse_ad_structures(&[])?.is_empty());
        assert!(encode_ad_structures(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_encode_rejects_oversized_value() {
        let record = AdStructure::new(0xFF, vec![0u8; 255]);
        assert!(encode_ad_structures(&[record]).is_err());
    }

    #[test]
    fn test_encode_then_parse() -> Result<(), CatalogError> {
        let records = vec![
            AdStructure::new(0x19, vec![0xC2, 0x03]),
            AdStructure::new(0x03, vec![0x12, 0x18, 0x72, 0xFD]),
        ];
        assert_eq!(parse_ad_structures(&encode_ad_structures(&records)?)?, records);
        Ok(())
    }
}
