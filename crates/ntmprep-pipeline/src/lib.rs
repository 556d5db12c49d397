//! Batch jobs chaining the preparation stages over a [`BlobStore`].
//!
//! `ingest` filters raw labeled reviews, `prepare` partitions them into
//! train/validation/test/demo, `process` fits the vocabulary on train and
//! writes the encoded splits. `run` chains all three.
use std::path::{Path, PathBuf};

use ntmprep_core::config::{resolve_with_base, PipelineConfig};
use ntmprep_core::data_processor::{filter_by_label, read_documents, write_documents, DataProcessor, SplitConfig};
use ntmprep_core::error::{Error, ErrorKind, Result};
use ntmprep_core::traits::BlobStore;
use ntmprep_core::types::{SplitKind, Splits};
use ntmprep_record::{dense_csv, read_records, recordize_counted};
use ntmprep_text::{fit, transform, Analyzer, LemmaDictionary, SparseMatrix, StopWords, Tokenizer, VocabularyOptions};

/// Outcome of serializing one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    pub name: String,
    pub rows: usize,
    pub chunks_written: usize,
    pub error: Option<ErrorKind>,
}

impl DatasetReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub vocabulary_size: usize,
    pub datasets: Vec<DatasetReport>,
}

impl ProcessReport {
    pub fn is_complete(&self) -> bool {
        self.datasets.iter().all(DatasetReport::succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DatasetReport> {
        self.datasets.iter().filter(|d| !d.succeeded())
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetReport> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

/// Row and shape summary of one record chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub rows: usize,
    pub nnz: usize,
    pub shape: Option<Vec<u64>>,
}

pub struct Pipeline<S: BlobStore> {
    store: S,
    config: PipelineConfig,
    base_dir: PathBuf,
}

impl<S: BlobStore> Pipeline<S> {
    pub fn new(store: S, config: PipelineConfig) -> Self {
        Self { store, config, base_dir: PathBuf::from(".") }
    }

    /// Directory that relative file paths in the configuration resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn bucket(&self) -> &str {
        &self.config.store.bucket
    }

    /// Keep reviews with the configured label. Returns the number kept.
    pub fn ingest(&self) -> Result<usize> {
        let cfg = &self.config.ingest;
        let raw = self.store.get(self.bucket(), &cfg.source_key)?;
        let kept = filter_by_label(&cfg.source_key, &raw, cfg.target_label)?;
        self.store.put(self.bucket(), &cfg.output_key, &write_documents(&kept)?)?;
        tracing::info!(key = %cfg.output_key, documents = kept.len(), "wrote filtered reviews");
        Ok(kept.len())
    }

    /// Partition the filtered reviews and write each split plus the demo documents.
    pub fn prepare(&self) -> Result<Splits> {
        let cfg = &self.config.prepare;
        let raw = self.store.get(self.bucket(), &cfg.input_key)?;
        let documents = read_documents(&cfg.input_key, &raw)?;
        let splits = DataProcessor::with_config(SplitConfig::from(cfg)).partition(documents)?;

        for kind in SplitKind::ALL {
            let key = format!("{}/{}.csv", cfg.output_prefix, kind.name());
            self.store.put(self.bucket(), &key, &write_documents(splits.get(kind))?)?;
        }
        for (i, doc) in splits.demo.iter().enumerate() {
            let key = format!("{}/document_{}.txt", cfg.demo_prefix, i + 1);
            self.store.put(self.bucket(), &key, doc.as_bytes())?;
        }
        tracing::info!(prefix = %cfg.output_prefix, demos = splits.demo.len(), "wrote prepared splits");
        Ok(splits)
    }

    fn analyzer(&self) -> Result<Analyzer> {
        let v = &self.config.vocabulary;
        let path = v.lemma_dictionary.as_ref().map(|p| resolve_with_base(&self.base_dir, p));
        let lemmas = LemmaDictionary::load(path.as_deref())?;
        let stop_words = v.stop_words.then(StopWords::english);
        Ok(Analyzer::new(Tokenizer::new(lemmas, v.min_token_len), stop_words))
    }

    fn read_split(&self, kind: SplitKind) -> Result<Vec<String>> {
        let key = format!("{}/{}.csv", self.config.process.input_prefix, kind.name());
        let body = self.store.get(self.bucket(), &key)?;
        read_documents(&key, &body)
    }

    /// Fit on train, encode every split, then write the vocabulary, record
    /// chunks for train/validation/test and the dense demo matrix.
    ///
    /// Failures while writing one dataset are recorded in its report and do
    /// not stop the others.
    pub fn process(&self) -> Result<ProcessReport> {
        let cfg = &self.config.process;
        let splits = Splits {
            train: self.read_split(SplitKind::Train)?,
            validation: self.read_split(SplitKind::Validation)?,
            test: self.read_split(SplitKind::Test)?,
            demo: self.read_split(SplitKind::Demo)?,
        };

        let options = VocabularyOptions::from(&self.config.vocabulary);
        let state = fit(&splits.train, self.analyzer()?, &options)?;
        if state.is_empty() {
            return Err(Error::EmptyVocabulary {
                documents: state.documents(),
                min_df: options.min_df,
                max_df: options.max_df,
            });
        }

        let encoded: Vec<(SplitKind, SparseMatrix)> =
            SplitKind::ALL.iter().map(|&k| (k, transform(splits.get(k), &state))).collect();
        for (kind, m) in &encoded {
            tracing::info!(split = %kind, rows = m.rows(), cols = m.cols(), nnz = m.nnz(), "encoded split");
        }

        let vocab_key = format!("{}/vocab.txt", cfg.output_prefix);
        self.store.put(self.bucket(), &vocab_key, state.listing().as_bytes())?;
        tracing::info!(key = %vocab_key, tokens = state.len(), "wrote vocabulary");

        let mut datasets = Vec::with_capacity(encoded.len());
        for (kind, matrix) in &encoded {
            let report = match kind {
                SplitKind::Train => self.write_records(*kind, matrix, cfg.train_parts),
                SplitKind::Validation => self.write_records(*kind, matrix, cfg.validation_parts),
                SplitKind::Test => self.write_records(*kind, matrix, cfg.test_parts),
                SplitKind::Demo => self.write_demo(matrix),
            };
            datasets.push(report);
        }
        let report = ProcessReport { vocabulary_size: state.len(), datasets };
        let failed = report.failed().count();
        if failed > 0 {
            tracing::warn!(failed, "process finished with failed datasets");
        } else {
            tracing::info!(vocabulary = report.vocabulary_size, "process finished");
        }
        Ok(report)
    }

    fn write_records(&self, kind: SplitKind, matrix: &SparseMatrix, parts: usize) -> DatasetReport {
        let prefix = format!("{}/{}", self.config.process.output_prefix, kind.name());
        let mut written = 0;
        let error = recordize_counted(matrix, &self.store, self.bucket(), &prefix, parts, &mut written).err();
        if let Some(e) = &error {
            tracing::warn!(dataset = %kind, chunks_written = written, error = %e, "failed to write dataset");
        }
        DatasetReport {
            name: kind.name().to_string(),
            rows: matrix.rows(),
            chunks_written: written,
            error: error.map(|e| e.kind()),
        }
    }

    fn write_demo(&self, matrix: &SparseMatrix) -> DatasetReport {
        let key = format!("{}/demo.csv", self.config.process.output_prefix);
        let result = dense_csv(matrix).and_then(|body| self.store.put(self.bucket(), &key, &body));
        if let Err(e) = &result {
            tracing::warn!(key = %key, error = %e, "failed to write demo matrix");
        }
        DatasetReport {
            name: SplitKind::Demo.name().to_string(),
            rows: matrix.rows(),
            chunks_written: usize::from(result.is_ok()),
            error: result.err().map(|e| e.kind()),
        }
    }

    pub fn run(&self) -> Result<ProcessReport> {
        self.ingest()?;
        self.prepare()?;
        self.process()
    }

    /// Decode a record chunk and summarize it.
    pub fn inspect(&self, key: &str) -> Result<ChunkSummary> {
        let rows = read_records(key, &self.store.get(self.bucket(), key)?)?;
        Ok(ChunkSummary {
            rows: rows.len(),
            nnz: rows.iter().map(|r| r.keys.len()).sum(),
            shape: rows.first().map(|r| r.shape.clone()),
        })
    }
}

/// Base directory of a configuration file, used to resolve relative paths in it.
pub fn config_base_dir(config_file: &Path) -> PathBuf {
    config_file.parent().filter(|p| !p.as_os_str().is_empty()).map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
