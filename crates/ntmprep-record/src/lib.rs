//! ntmprep-record
//!
//! Sparse count matrices to chunked RecordIO-protobuf objects, plus the
//! reader used to inspect them and the dense CSV writer for demo output.
pub mod proto;
pub mod recordio;
pub mod writer;

pub use recordio::{read_records, SparseRow};
pub use writer::{chunk_key, chunk_ranges, dense_csv, recordize, recordize_counted};
