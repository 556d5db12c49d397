use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::ops::Range;

use crate::config::PrepareConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentCollection, Splits};

#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub seed: u64,
    pub train_fraction: f64,
    pub min_document_chars: usize,
    pub demo_count: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { seed: 42, train_fraction: 0.8, min_document_chars: 50, demo_count: 5 }
    }
}

impl From<&PrepareConfig> for SplitConfig {
    fn from(c: &PrepareConfig) -> Self {
        Self {
            seed: c.seed,
            train_fraction: c.train_fraction,
            min_document_chars: c.min_document_chars,
            demo_count: c.demo_count,
        }
    }
}

/// Index ranges of each split over a trimmed collection of `n` documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBounds {
    pub train: Range<usize>,
    pub validation: Range<usize>,
    pub test: Range<usize>,
    pub demo: Range<usize>,
}

impl SplitBounds {
    /// `train = [:split]`, `validation = [split:-remainder]`,
    /// `test = [-remainder:-demo]`, `demo = [-demo:]` with
    /// `split = floor(fraction * n)` and `remainder = (n - split) / 2`.
    ///
    /// Every end is clamped to the demo start so the splits stay disjoint when
    /// the remainder is smaller than the demo count.
    pub fn compute(n: usize, train_fraction: f64, demo_count: usize) -> Self {
        let split = ((train_fraction * n as f64).floor() as usize).min(n);
        let remainder = (n - split) / 2;
        let demo_start = n - demo_count.min(n);
        let test_start = n - remainder;
        Self {
            train: 0..split.min(demo_start),
            validation: split..test_start.min(demo_start).max(split),
            test: test_start..demo_start.max(test_start),
            demo: demo_start..n,
        }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    split_config: SplitConfig,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(split_config: SplitConfig) -> Self {
        Self { split_config }
    }

    /// Seeded shuffle, drop short documents, then slice into the four splits.
    pub fn partition(&self, mut documents: DocumentCollection) -> Result<Splits> {
        let cfg = &self.split_config;
        if !(0.0..=1.0).contains(&cfg.train_fraction) {
            return Err(Error::InvalidConfig(format!("train fraction must be in [0, 1], got {}", cfg.train_fraction)));
        }
        let mut rng = ChaCha20Rng::seed_from_u64(cfg.seed);
        documents.shuffle(&mut rng);

        let before = documents.len();
        documents.retain(|doc| doc.chars().count() >= cfg.min_document_chars);
        tracing::info!(
            kept = documents.len(),
            dropped = before - documents.len(),
            min_chars = cfg.min_document_chars,
            "trimmed short documents"
        );

        let bounds = SplitBounds::compute(documents.len(), cfg.train_fraction, cfg.demo_count);
        let splits = Splits {
            train: documents[bounds.train].to_vec(),
            validation: documents[bounds.validation].to_vec(),
            test: documents[bounds.test].to_vec(),
            demo: documents[bounds.demo].to_vec(),
        };
        tracing::info!(
            validation = splits.validation.len(),
            train = splits.train.len(),
            test = splits.test.len(),
            demo = splits.demo.len(),
            "split lengths"
        );
        Ok(splits)
    }
}

/// Keep the review column of `(label, title, review)` rows whose label equals `target_label`.
pub fn filter_by_label(key: &str, raw_csv: &[u8], target_label: i64) -> Result<DocumentCollection> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(raw_csv);
    let mut kept = Vec::new();
    let mut total = 0usize;
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::decode(key, format!("row {}: {e}", row + 1)))?;
        if record.len() < 3 {
            return Err(Error::decode(key, format!("row {}: expected 3 columns, found {}", row + 1, record.len())));
        }
        let label: i64 = record[0]
            .trim()
            .parse()
            .map_err(|_| Error::decode(key, format!("row {}: label '{}' is not an integer", row + 1, &record[0])))?;
        total += 1;
        if label == target_label {
            kept.push(record[2].to_string());
        }
    }
    tracing::info!(key, total, kept = kept.len(), target_label, "filtered reviews by label");
    Ok(kept)
}

/// Parse a headerless single-column CSV into documents.
pub fn read_documents(key: &str, body: &[u8]) -> Result<DocumentCollection> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(body);
    let mut docs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::decode(key, format!("row {}: {e}", row + 1)))?;
        docs.push(record.get(0).unwrap_or_default().to_string());
    }
    Ok(docs)
}

/// Serialize documents as a headerless single-column CSV.
pub fn write_documents(documents: &[String]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    for doc in documents {
        writer.write_record([doc]).map_err(|e| Error::Encode(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| Error::Encode(e.to_string()))
}
