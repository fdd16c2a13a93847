//! JSON and JSON Lines reading and writing.
//!
//! Documents are (de)serialized through `serde`, so callers choose the in-memory
//! type: a concrete struct or `serde_json::Value` for untyped data.

use crate::compression::{open_read, open_write, CodecRequest, StreamLines, WriteOptions};
use crate::error::{Result, RwioError};
use crate::formats::chunks::{validate_chunk_size, Chunks};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Lazy sequence of record groups returned by [`read_jsonl_chunked`]
pub type JsonlChunks<T> = Chunks<JsonlRecords<T>>;

/// Decode a single JSON document from the whole file
///
/// # Errors
/// * `MalformedData` carrying the parser's line and column
pub fn read_json<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
) -> Result<T> {
    let path = path.as_ref();
    let data = open_read(path, compression.into())?.read_all()?;
    serde_json::from_slice(&data)
        .map_err(|e| RwioError::malformed_at(path, e.line(), Some(e.column()), e.to_string()))
}

/// Serialize `value` as one compact JSON document followed by a newline
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let encoded = encode(path, value)?;
    let mut stream = open_write(path, options)?;
    stream.write_bytes(&encoded)?;
    stream.write_bytes(b"\n")?;
    stream.finish()
}

/// Decode every non-blank line as its own JSON document.
///
/// A malformed line fails the whole call; no partial result is returned.
pub fn read_jsonl<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
) -> Result<Vec<T>> {
    let path = path.as_ref();
    let lines = open_read(path, compression.into())?.lines();
    JsonlRecords::new(lines).collect()
}

/// Decode JSON Lines lazily in groups of `chunksize` documents
pub fn read_jsonl_chunked<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
    chunksize: usize,
) -> Result<JsonlChunks<T>> {
    validate_chunk_size(chunksize)?;
    let lines = open_read(path.as_ref(), compression.into())?.lines();
    Chunks::new(JsonlRecords::new(lines), chunksize)
}

/// Write one compact JSON document per line, in input order
pub fn write_jsonl<I>(path: impl AsRef<Path>, records: I, options: &WriteOptions) -> Result<()>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let path = path.as_ref();
    let mut stream = open_write(path, options)?;
    for record in records {
        let encoded = encode(path, &record)?;
        stream.write_bytes(&encoded)?;
        stream.write_bytes(b"\n")?;
    }
    stream.finish()
}

fn encode<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        RwioError::invalid_argument(format!(
            "value cannot be written as JSON to {}: {e}",
            path.display()
        ))
    })
}

/// Iterator decoding one JSON document per non-blank line
pub struct JsonlRecords<T> {
    lines: StreamLines,
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlRecords<T> {
    fn new(lines: StreamLines) -> Self {
        let path = lines.path().to_path_buf();
        Self {
            lines,
            path,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for JsonlRecords<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if line.trim().is_empty() {
                continue;
            }

            let line_number = self.lines.line_number();
            return Some(serde_json::from_str(&line).map_err(|e| {
                RwioError::malformed_at(&self.path, line_number, Some(e.column()), e.to_string())
            }));
        }
    }
}
