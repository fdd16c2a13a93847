//! # rwio - Uniform File Reading and Writing
//!
//! One small API for reading and writing text, JSON, JSON Lines, YAML and docx
//! files, with compression chosen from the file name or given explicitly.
//!
//! ## Features
//!
//! - **Transparent Compression**: bzip2, gzip, xz and zstd streams plus zip and tar
//!   (plain, bzip2, gzip, xz) archives holding a single file
//! - **Suffix Inference**: `events.jsonl.tar.gz` is read as JSON Lines inside a
//!   gzip-compressed tar archive; unknown suffixes mean no compression
//! - **Chunked Reads**: lazy, fixed-size groups of lines or records for large files
//! - **Serde Integration**: JSON, JSON Lines and YAML read into any `Deserialize` type
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`compression`] - Codec selection and transparent read/write streams
//! - [`formats`] - Per-format readers and writers built on those streams
//! - [`generic`] - File-type inference and type-dispatched read/write
//!
//! ## Example
//!
//! ```no_run
//! use rwio::{read_jsonl_chunked, write_jsonl, CodecRequest, WriteOptions};
//! use serde_json::{json, Value};
//!
//! # fn main() -> rwio::Result<()> {
//! let records: Vec<Value> = (0..7).map(|n| json!({"n": n})).collect();
//! write_jsonl("records.jsonl.gz", &records, &WriteOptions::new())?;
//!
//! for chunk in read_jsonl_chunked::<Value>("records.jsonl.gz", CodecRequest::Infer, 3)? {
//!     println!("{} records", chunk?.len());
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod error;
pub mod compression;

// Format layer
pub mod formats;
pub mod generic;

// Re-export commonly used types for convenience
pub use error::{Result, RwioError};

// Public API surface for external usage
pub use compression::{
    open_read, open_write, Codec, CodecRequest, ReadStream, WriteMode, WriteOptions, WriteStream,
};
pub use formats::{
    read_docx, read_docx_nonempty, read_json, read_jsonl, read_jsonl_chunked, read_lines,
    read_lines_chunked, read_text, read_yaml, write_docx, write_json, write_jsonl, write_lines,
    write_text, write_yaml, Chunks, JsonlChunks, LineChunks,
};
pub use generic::{infer_file_type, read, write, Content, FileType};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
