//! Format readers and writers.
//!
//! Every reader obtains a [`ReadStream`](crate::compression::ReadStream) and every
//! writer a [`WriteStream`](crate::compression::WriteStream) from the compression
//! layer, so none of them knows which codec is in play.

pub mod chunks;
pub mod docx;
pub mod json;
pub mod text;
pub mod yaml;

pub use chunks::Chunks;
pub use docx::{read_docx, read_docx_nonempty, write_docx};
pub use json::{
    read_json, read_jsonl, read_jsonl_chunked, write_json, write_jsonl, JsonlChunks,
    JsonlRecords,
};
pub use text::{read_lines, read_lines_chunked, read_text, write_lines, write_text, LineChunks};
pub use yaml::{read_yaml, write_yaml};
