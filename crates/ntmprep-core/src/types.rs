//! Domain types shared by the preparation stages.

use serde::{Deserialize, Serialize};

/// One review body. No identity beyond its position in a collection.
pub type Document = String;

/// Ordered documents; after shuffling, order defines split boundaries.
pub type DocumentCollection = Vec<Document>;

/// The four disjoint document subsets produced by the partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitKind {
    Train,
    Validation,
    Test,
    Demo,
}

impl SplitKind {
    pub const ALL: [SplitKind; 4] = [SplitKind::Train, SplitKind::Validation, SplitKind::Test, SplitKind::Demo];

    /// Object name stem used for `<prefix>/<name>.csv` and `<prefix>/<name>/...`.
    pub fn name(self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Validation => "validation",
            SplitKind::Test => "test",
            SplitKind::Demo => "demo",
        }
    }
}

impl std::fmt::Display for SplitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Splits {
    pub train: DocumentCollection,
    pub validation: DocumentCollection,
    pub test: DocumentCollection,
    pub demo: DocumentCollection,
}

impl Splits {
    pub fn get(&self, kind: SplitKind) -> &DocumentCollection {
        match kind {
            SplitKind::Train => &self.train,
            SplitKind::Validation => &self.validation,
            SplitKind::Test => &self.test,
            SplitKind::Demo => &self.demo,
        }
    }

    pub fn total_len(&self) -> usize {
        SplitKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }
}
