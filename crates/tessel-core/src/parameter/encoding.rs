//! Binary parameter table.
//!
//! A parameter list is stored as a flat array of fixed-width little-endian
//! records, small enough to embed as a byte literal in a separately compiled
//! node library and parse back into a [`ParameterList`] on the host side.
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | index (`u32`)                  |
//! | 4      | 24   | short name, UTF-8, NUL-padded  |
//! | 28     | 4    | min (`f32`)                    |
//! | 32     | 4    | max (`f32`)                    |
//! | 36     | 4    | default (`f32`)                |
//! | 40     | 4    | skew (`f32`)                   |
//! | 44     | 4    | interval (`f32`)               |
//! | 48     | 1    | inverted (`0` or `1`)          |
//! | 49     | 3    | padding                        |

use core::fmt::Write as _;

use super::info::{ParameterInfo, ParameterList, SHORT_NAME_LEN, ShortName};
use super::range::ParameterRange;
use crate::error::{self, ErrorCode, NodeError, Result};

/// Size of one record in bytes.
pub const RECORD_SIZE: usize = 52;

const NAME_OFFSET: usize = 4;
const VALUES_OFFSET: usize = NAME_OFFSET + SHORT_NAME_LEN;
const INVERTED_OFFSET: usize = VALUES_OFFSET + 5 * 4;

/// Encodes parameters into a record table.
pub fn encode(parameters: &[ParameterInfo]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parameters.len() * RECORD_SIZE);
    for p in parameters {
        let index = u32::try_from(p.index).unwrap_or(u32::MAX);
        out.extend_from_slice(&index.to_le_bytes());
        out.extend_from_slice(p.name.as_padded_bytes());
        for value in [p.range.min, p.range.max, p.default, p.range.skew, p.range.interval] {
            out.extend_from_slice(&(value as f32).to_le_bytes());
        }
        out.push(u8::from(p.range.inverted));
        out.extend_from_slice(&[0; 3]);
    }
    out
}

/// Parses a record table.
///
/// Fails with [`ErrorCode::InvalidParameterData`] if the length is not a
/// whole number of records or a name is not valid UTF-8.
pub fn decode(bytes: &[u8]) -> Result<ParameterList> {
    let mut list = ParameterList::new();

    if bytes.len() % RECORD_SIZE != 0 {
        error::raise(NodeError::new(
            ErrorCode::InvalidParameterData,
            RECORD_SIZE,
            bytes.len() % RECORD_SIZE,
        ))?;
        return Ok(list);
    }

    for (record_index, record) in bytes.chunks_exact(RECORD_SIZE).enumerate() {
        let index = u32::from_le_bytes(field(record, 0));

        let name_bytes = &record[NAME_OFFSET..VALUES_OFFSET];
        let name_len = name_bytes.iter().position(|&b| b == 0).unwrap_or(SHORT_NAME_LEN);
        let Ok(name) = core::str::from_utf8(&name_bytes[..name_len]) else {
            error::raise(NodeError::new(ErrorCode::InvalidParameterData, 0, record_index))?;
            return Ok(list);
        };

        let value = |slot: usize| f64::from(f32::from_le_bytes(field(record, VALUES_OFFSET + slot * 4)));
        let range = ParameterRange {
            min: value(0),
            max: value(1),
            interval: value(4),
            skew: value(3),
            inverted: record[INVERTED_OFFSET] != 0,
        };

        list.add(ParameterInfo {
            index: index as usize,
            name: ShortName::new(name),
            range,
            default: value(2),
        });
    }

    Ok(list)
}

fn field(record: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0; 4];
    out.copy_from_slice(&record[offset..offset + 4]);
    out
}

/// Renders a record table as a Rust `static` byte array named `name`.
pub fn to_rust_literal(name: &str, bytes: &[u8]) -> String {
    let mut out = format!("pub static {name}: [u8; {}] = [\n", bytes.len());
    for line in bytes.chunks(16) {
        out.push_str("    ");
        for (i, byte) in line.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "0x{byte:02x},");
        }
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ParameterInfo> {
        vec![
            ParameterInfo::gain_db(0, "Gain").with_default(-6.0),
            ParameterInfo::new(3, "Mix")
                .with_range(ParameterRange::new(0.0, 1.0).with_inverted(true))
                .with_default(0.5),
        ]
    }

    #[test]
    fn record_layout() {
        let bytes = encode(&sample());
        assert_eq!(bytes.len(), 2 * RECORD_SIZE);

        let second = &bytes[RECORD_SIZE..];
        assert_eq!(u32::from_le_bytes(field(second, 0)), 3);
        assert_eq!(&second[NAME_OFFSET..NAME_OFFSET + 4], b"Mix\0");
        assert_eq!(second[INVERTED_OFFSET], 1);
        assert_eq!(&second[INVERTED_OFFSET + 1..], &[0, 0, 0]);
    }

    #[test]
    fn decode_restores_descriptors() {
        let list = decode(&encode(&sample())).unwrap();
        assert_eq!(list.len(), 2);

        let gain = list.get(0).unwrap();
        assert_eq!(gain.name.as_str(), "Gain");
        assert_eq!(gain.default, -6.0);
        assert_eq!(gain.range.min, -100.0);
        assert!((gain.range.interval - 0.1).abs() < 1e-6);

        let mix = list.find("Mix").unwrap();
        assert_eq!(mix.index, 3);
        assert!(mix.range.inverted);
    }

    #[test]
    fn truncated_table_is_rejected() {
        let bytes = encode(&sample());
        let err = error::poll(decode(&bytes[..RECORD_SIZE + 7]).map(|_| ())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameterData);
        assert_eq!(err.actual, 7);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut bytes = encode(&sample());
        bytes[NAME_OFFSET] = 0xFF;
        let err = error::poll(decode(&bytes).map(|_| ())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameterData);
    }

    #[test]
    fn literal_is_embeddable() {
        let literal = to_rust_literal("GAIN_PARAMETERS", &[0x01, 0xab]);
        assert_eq!(literal, "pub static GAIN_PARAMETERS: [u8; 2] = [\n    0x01, 0xab,\n];\n");
    }
}
