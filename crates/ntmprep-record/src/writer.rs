use indicatif::{ProgressBar, ProgressStyle};
use prost::Message;
use std::ops::Range;

use ntmprep_core::error::{Error, Result};
use ntmprep_core::traits::BlobStore;
use ntmprep_text::SparseMatrix;

use crate::recordio::{write_record, SparseRow};

/// Row ranges of each chunk: `floor(rows / parts)` rows each, the last chunk
/// absorbing the remainder.
pub fn chunk_ranges(rows: usize, parts: usize) -> Result<Vec<Range<usize>>> {
    if parts == 0 {
        return Err(Error::InvalidConfig("number of parts must be at least 1".to_string()));
    }
    let chunk_size = rows / parts;
    Ok((0..parts)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i + 1 == parts { rows } else { start + chunk_size };
            start..end
        })
        .collect())
}

pub fn chunk_key(prefix: &str, index: usize) -> String {
    format!("{}/data_part_{index}.pbr", prefix.trim_end_matches('/'))
}

/// Serialize `rows` of a CSR matrix as consecutive RecordIO records.
pub fn encode_chunk(matrix: &SparseMatrix, rows: Range<usize>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for r in rows {
        let row = matrix
            .outer_view(r)
            .ok_or_else(|| Error::Encode(format!("row {r} out of bounds for {} rows", matrix.rows())))?;
        let record = SparseRow::from_counts(row).to_record();
        write_record(&mut out, &record.encode_to_vec())?;
    }
    Ok(out)
}

/// Write `matrix` under `prefix` as `parts` chunk objects.
///
/// Returns the number of chunks written. The first failing upload aborts.
pub fn recordize(
    matrix: &SparseMatrix,
    store: &dyn BlobStore,
    bucket: &str,
    prefix: &str,
    parts: usize,
) -> Result<usize> {
    let mut written = 0;
    recordize_counted(matrix, store, bucket, prefix, parts, &mut written)?;
    Ok(written)
}

/// Like [`recordize`] but keeps the count of finished chunks in `written`
/// even when a later upload fails.
pub fn recordize_counted(
    matrix: &SparseMatrix,
    store: &dyn BlobStore,
    bucket: &str,
    prefix: &str,
    parts: usize,
    written: &mut usize,
) -> Result<()> {
    if !matrix.is_csr() {
        return Err(Error::Encode("expected a CSR matrix".to_string()));
    }
    let ranges = chunk_ranges(matrix.rows(), parts)?;
    tracing::info!(prefix, rows = matrix.rows(), cols = matrix.cols(), parts, "writing sparse records");

    let pb = ProgressBar::new(parts as u64);
    let template = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    for (i, range) in ranges.into_iter().enumerate() {
        let key = chunk_key(prefix, i);
        let body = encode_chunk(matrix, range.clone())?;
        pb.set_message(key.clone());
        store.put(bucket, &key, &body)?;
        tracing::debug!(key = %key, rows = range.len(), bytes = body.len(), "uploaded chunk");
        *written += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

/// Headerless dense CSV with one row per document, counts written as floats.
pub fn dense_csv(matrix: &SparseMatrix) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).flexible(true).from_writer(Vec::new());
    for r in 0..matrix.rows() {
        let mut dense = vec![0.0f32; matrix.cols()];
        if let Some(row) = matrix.outer_view(r) {
            for (col, &count) in row.iter() {
                dense[col] = count as f32;
            }
        }
        writer.write_record(dense.iter().map(|v| format!("{v:?}"))).map_err(|e| Error::Encode(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| Error::Encode(e.to_string()))
}
