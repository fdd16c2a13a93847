//! Plain text reading and writing.
//!
//! Text is UTF-8 only. A whole-file read returns the content exactly as decoded;
//! line reads split on `\n` and drop the terminator, without producing an empty
//! element for a final trailing newline.

use crate::compression::{open_read, open_write, CodecRequest, StreamLines, WriteOptions};
use crate::error::Result;
use crate::formats::chunks::{validate_chunk_size, Chunks};
use std::path::Path;

/// Lazy sequence of line groups returned by [`read_lines_chunked`]
pub type LineChunks = Chunks<StreamLines>;

/// Read the whole decoded file as one string
pub fn read_text(path: impl AsRef<Path>, compression: impl Into<CodecRequest>) -> Result<String> {
    open_read(path.as_ref(), compression.into())?.read_all_text()
}

/// Read the decoded file as a list of lines
pub fn read_lines(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
) -> Result<Vec<String>> {
    open_read(path.as_ref(), compression.into())?.lines().collect()
}

/// Read the decoded file lazily in groups of `chunksize` lines.
///
/// The file stays open until the returned sequence is exhausted or dropped.
pub fn read_lines_chunked(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
    chunksize: usize,
) -> Result<LineChunks> {
    validate_chunk_size(chunksize)?;
    Chunks::new(open_read(path.as_ref(), compression.into())?.lines(), chunksize)
}

/// Write `text` verbatim.
///
/// Nothing is added: appending `"b"` after writing `"a"` yields `"ab"`. Use
/// [`write_lines`] for newline-terminated records.
pub fn write_text(path: impl AsRef<Path>, text: &str, options: &WriteOptions) -> Result<()> {
    let mut stream = open_write(path.as_ref(), options)?;
    stream.write_bytes(text.as_bytes())?;
    stream.finish()
}

/// Write each line followed by `\n`
pub fn write_lines<I>(path: impl AsRef<Path>, lines: I, options: &WriteOptions) -> Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut stream = open_write(path.as_ref(), options)?;
    for line in lines {
        stream.write_bytes(line.as_ref().as_bytes())?;
        stream.write_bytes(b"\n")?;
    }
    stream.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Codec;
    use crate::error::RwioError;
    use tempfile::TempDir;

    #[test]
    fn test_text_is_returned_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exact.txt");
        let text = "These\nare words\n\nof a sentence\n\n";

        write_text(&path, text, &WriteOptions::new()).unwrap();
        assert_eq!(read_text(&path, CodecRequest::Infer).unwrap(), text);
    }

    #[test]
    fn test_read_lines_drops_only_final_terminator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lines.txt");
        std::fs::write(&path, "a\nb\n\nc\n").unwrap();

        assert_eq!(
            read_lines(&path, CodecRequest::Infer).unwrap(),
            vec!["a", "b", "", "c"]
        );
    }

    #[test]
    fn test_read_lines_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("open_end.txt");
        std::fs::write(&path, "a\nb").unwrap();

        assert_eq!(read_lines(&path, CodecRequest::Infer).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_read_lines_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        assert!(read_lines(&path, CodecRequest::Infer).unwrap().is_empty());
        assert_eq!(read_text(&path, CodecRequest::Infer).unwrap(), "");
    }

    #[test]
    fn test_write_lines_then_read_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lines.txt.xz");
        let lines = vec!["first", "second", "third"];

        write_lines(&path, &lines, &WriteOptions::new()).unwrap();
        assert_eq!(read_lines(&path, CodecRequest::Infer).unwrap(), lines);
        assert_eq!(
            read_text(&path, CodecRequest::Infer).unwrap(),
            "first\nsecond\nthird\n"
        );
    }

    #[test]
    fn test_append_text_and_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("append.txt.bz2");

        write_lines(&path, ["one"], &WriteOptions::new()).unwrap();
        write_lines(&path, ["two", "three"], &WriteOptions::append()).unwrap();
        assert_eq!(
            read_lines(&path, CodecRequest::Infer).unwrap(),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn test_chunked_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunks.txt.gz");
        let lines: Vec<String> = (1..=5).map(|i| format!("line {i}")).collect();
        write_lines(&path, &lines, &WriteOptions::new()).unwrap();

        let chunks: Vec<Vec<String>> = read_lines_chunked(&path, CodecRequest::Infer, 2)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            chunks,
            vec![
                vec!["line 1".to_string(), "line 2".to_string()],
                vec!["line 3".to_string(), "line 4".to_string()],
                vec!["line 5".to_string()],
            ]
        );
    }

    #[test]
    fn test_chunksize_zero_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("any.txt");
        std::fs::write(&path, "x\n").unwrap();

        assert!(matches!(
            read_lines_chunked(&path, CodecRequest::Infer, 0),
            Err(RwioError::InvalidArgument { .. })
        ));
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn test_explicit_codec_with_plain_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hidden_zstd");

        write_text(&path, "zstd inside", &WriteOptions::new().compression(Codec::Zstd)).unwrap();
        assert_eq!(read_text(&path, Codec::Zstd).unwrap(), "zstd inside");
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9").unwrap();

        assert!(matches!(
            read_text(&path, CodecRequest::Infer),
            Err(RwioError::MalformedData { .. })
        ));
    }
}
