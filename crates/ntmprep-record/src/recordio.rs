//! RecordIO framing: `magic | length | payload | pad to 4 bytes`, little endian.
use prost::Message;
use sprs::CsVecView;

use ntmprep_core::error::{Error, Result};

use crate::proto::{value, Float32Tensor, Record, Value};

pub const MAGIC: u32 = 0xCED7_230A;

/// Feature map key holding the count vector.
pub const FEATURES_KEY: &str = "values";

/// One decoded sparse row.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    pub keys: Vec<u64>,
    pub values: Vec<f32>,
    pub shape: Vec<u64>,
}

impl SparseRow {
    pub fn from_counts(row: CsVecView<'_, u32>) -> Self {
        let (keys, values) = row.iter().map(|(col, &count)| (col as u64, count as f32)).unzip();
        Self { keys, values, shape: vec![row.dim() as u64] }
    }

    pub fn to_record(&self) -> Record {
        let tensor = Float32Tensor { values: self.values.clone(), keys: self.keys.clone(), shape: self.shape.clone() };
        let mut record = Record::default();
        record.features.insert(FEATURES_KEY.to_string(), Value { kind: Some(value::Kind::Float32Tensor(tensor)) });
        record
    }
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Append one framed record to `out`.
pub fn write_record(out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::Encode(format!("record of {} bytes exceeds the frame limit", payload.len())))?;
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    out.resize(out.len() + padding(payload.len()), 0);
    Ok(())
}

/// Split a RecordIO body into its payloads, checking magic and lengths.
pub fn split_records<'a>(key: &str, bytes: &'a [u8]) -> Result<Vec<&'a [u8]>> {
    let mut payloads = Vec::new();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let header =
            bytes.get(pos..pos + 8).ok_or_else(|| Error::decode(key, format!("truncated header at offset {pos}")))?;
        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != MAGIC {
            return Err(Error::decode(key, format!("bad magic {magic:#010x} at offset {pos}")));
        }
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let start = pos + 8;
        let payload = bytes
            .get(start..start + len)
            .ok_or_else(|| Error::decode(key, format!("record at offset {pos} claims {len} bytes past the end")))?;
        payloads.push(payload);
        pos = start + len + padding(len);
    }
    Ok(payloads)
}

/// Decode every record of a chunk back into sparse rows.
pub fn read_records(key: &str, bytes: &[u8]) -> Result<Vec<SparseRow>> {
    split_records(key, bytes)?
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            let record = Record::decode(payload).map_err(|e| Error::decode(key, format!("record {i}: {e}")))?;
            match record.features.get(FEATURES_KEY).and_then(|v| v.kind.as_ref()) {
                Some(value::Kind::Float32Tensor(t)) => {
                    Ok(SparseRow { keys: t.keys.clone(), values: t.values.clone(), shape: t.shape.clone() })
                }
                _ => Err(Error::decode(key, format!("record {i}: no float32 '{FEATURES_KEY}' feature"))),
            }
        })
        .collect()
}
