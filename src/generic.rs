//! File-type inference and type-dispatched `read`/`write`.
//!
//! Structured content uses `serde_json::Value` as its in-memory model, so JSON,
//! JSON Lines and YAML documents can be converted into one another on write.

use crate::compression::{strip_codec_suffix, Codec, CodecRequest, WriteMode, WriteOptions};
use crate::error::{Result, RwioError};
use crate::formats;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const VALID_FILE_TYPES: &str = "text, lines, json, jsonl, yaml, docx";

/// Content kinds understood by [`read`] and [`write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Whole-file UTF-8 text
    Text,
    /// UTF-8 text split on `\n`
    Lines,
    /// One JSON document
    Json,
    /// One JSON document per line
    Jsonl,
    /// One YAML document
    Yaml,
    /// Paragraphs of a docx document
    Docx,
}

impl FileType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Lines => "lines",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Yaml => "yaml",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileType {
    type Err = RwioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "lines" => Ok(Self::Lines),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "yaml" | "yml" => Ok(Self::Yaml),
            "docx" => Ok(Self::Docx),
            _ => Err(RwioError::UnsupportedFormat {
                name: s.to_string(),
                valid: VALID_FILE_TYPES.to_string(),
            }),
        }
    }
}

/// Infer the file type from the name left after stripping the compression suffix.
///
/// `events.jsonl.gz` is `Jsonl`; a docx is only recognised uncompressed.
pub fn infer_file_type(path: impl AsRef<Path>) -> Result<FileType> {
    let path = path.as_ref();
    let name = strip_codec_suffix(path);
    let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    let file_type = match extension {
        "txt" | "text" | "log" => Some(FileType::Text),
        "json" => Some(FileType::Json),
        "jsonl" | "ndjson" => Some(FileType::Jsonl),
        "yaml" | "yml" => Some(FileType::Yaml),
        "docx" if Codec::infer(path) == Codec::None => Some(FileType::Docx),
        _ => None,
    };

    file_type.ok_or_else(|| RwioError::UnsupportedFormat {
        name: path.display().to_string(),
        valid: VALID_FILE_TYPES.to_string(),
    })
}

/// Content read from or written to a file
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Lines(Vec<String>),
    Json(Value),
    Jsonl(Vec<Value>),
    Yaml(Value),
    Docx(Vec<String>),
}

impl Content {
    /// The file type this content was read as
    pub fn file_type(&self) -> FileType {
        match self {
            Self::Text(_) => FileType::Text,
            Self::Lines(_) => FileType::Lines,
            Self::Json(_) => FileType::Json,
            Self::Jsonl(_) => FileType::Jsonl,
            Self::Yaml(_) => FileType::Yaml,
            Self::Docx(_) => FileType::Docx,
        }
    }
}

/// Read `path` as `file_type`, inferring the type from the name when `None`.
///
/// Docx reads drop empty paragraphs.
pub fn read(
    path: impl AsRef<Path>,
    file_type: Option<FileType>,
    compression: impl Into<CodecRequest>,
) -> Result<Content> {
    let path = path.as_ref();
    let compression = compression.into();
    let file_type = match file_type {
        Some(file_type) => file_type,
        None => infer_file_type(path)?,
    };
    log::debug!("reading {} as {file_type}", path.display());

    Ok(match file_type {
        FileType::Text => Content::Text(formats::read_text(path, compression)?),
        FileType::Lines => Content::Lines(formats::read_lines(path, compression)?),
        FileType::Json => Content::Json(formats::read_json(path, compression)?),
        FileType::Jsonl => Content::Jsonl(formats::read_jsonl(path, compression)?),
        FileType::Yaml => Content::Yaml(formats::read_yaml(path, compression)?),
        FileType::Docx => {
            ensure_uncompressed(path, compression)?;
            Content::Docx(formats::read_docx_nonempty(path)?)
        }
    })
}

/// Write `content` to `path` as `file_type`, inferring the type from the name when
/// `None`.
///
/// Content of another type is converted where the conversion is lossless in
/// meaning: lines become text and paragraphs, JSON Lines become a JSON array and an
/// array becomes JSON Lines. Anything else is `UnsupportedOperation`.
pub fn write(
    path: impl AsRef<Path>,
    content: &Content,
    file_type: Option<FileType>,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let target = match file_type {
        Some(file_type) => file_type,
        None => infer_file_type(path)?,
    };
    let mismatch = || {
        RwioError::unsupported(format!(
            "cannot write {} content as {target} to {}",
            content.file_type(),
            path.display()
        ))
    };
    log::debug!(
        "writing {} content to {} as {target}",
        content.file_type(),
        path.display()
    );

    match target {
        FileType::Text => match content {
            Content::Text(text) => formats::write_text(path, text, options),
            Content::Lines(lines) | Content::Docx(lines) => {
                formats::write_lines(path, lines, options)
            }
            _ => Err(mismatch()),
        },
        FileType::Lines => match content {
            Content::Lines(lines) | Content::Docx(lines) => {
                formats::write_lines(path, lines, options)
            }
            Content::Text(text) => formats::write_lines(path, split_lines(text), options),
            _ => Err(mismatch()),
        },
        FileType::Json => {
            let value = document(content).ok_or_else(mismatch)?;
            formats::write_json(path, &value, options)
        }
        FileType::Yaml => {
            let value = document(content).ok_or_else(mismatch)?;
            formats::write_yaml(path, &value, options)
        }
        FileType::Jsonl => match content {
            Content::Jsonl(records) => formats::write_jsonl(path, records, options),
            Content::Json(Value::Array(records)) | Content::Yaml(Value::Array(records)) => {
                formats::write_jsonl(path, records, options)
            }
            _ => Err(mismatch()),
        },
        FileType::Docx => {
            if options.mode == WriteMode::Append {
                return Err(RwioError::unsupported(format!(
                    "append is not supported for docx file {}",
                    path.display()
                )));
            }
            ensure_uncompressed(path, options.compression)?;
            match content {
                Content::Docx(paragraphs) | Content::Lines(paragraphs) => {
                    formats::write_docx(path, paragraphs)
                }
                Content::Text(text) => formats::write_docx(path, split_lines(text)),
                _ => Err(mismatch()),
            }
        }
    }
}

/// Single structured document carried by `content`, if any
fn document(content: &Content) -> Option<Value> {
    match content {
        Content::Json(value) | Content::Yaml(value) => Some(value.clone()),
        Content::Jsonl(records) => Some(Value::Array(records.clone())),
        _ => None,
    }
}

/// Split on `\n` the way line reads do: `\r` is kept and a final terminator does
/// not produce an empty trailing line.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

fn ensure_uncompressed(path: &Path, compression: CodecRequest) -> Result<()> {
    match compression.resolve(path) {
        Codec::None => Ok(()),
        codec => Err(RwioError::unsupported(format!(
            "docx file {} cannot be wrapped in {codec} compression",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_infer_file_type() {
        let cases = [
            ("notes.txt", FileType::Text),
            ("notes.TXT.gz", FileType::Text),
            ("config.json", FileType::Json),
            ("events.jsonl.tar.gz", FileType::Jsonl),
            ("settings.yml.zst", FileType::Yaml),
            ("settings.yaml", FileType::Yaml),
            ("report.docx", FileType::Docx),
        ];
        for (name, expected) in cases {
            assert_eq!(infer_file_type(name).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn test_infer_file_type_rejects_unknown() {
        for name in ["archive.tar.gz", "image.png", "report.docx.gz", "README"] {
            assert!(
                matches!(
                    infer_file_type(name),
                    Err(RwioError::UnsupportedFormat { .. })
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn test_file_type_from_str() {
        assert_eq!("JSONL".parse::<FileType>().unwrap(), FileType::Jsonl);
        assert_eq!("yml".parse::<FileType>().unwrap(), FileType::Yaml);
        assert!(matches!(
            "csv".parse::<FileType>(),
            Err(RwioError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_write_inferred() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json.xz");
        let content = Content::Json(json!({"answer": 42}));

        write(&path, &content, None, &WriteOptions::new()).unwrap();
        assert_eq!(read(&path, None, CodecRequest::Infer).unwrap(), content);
    }

    #[test]
    fn test_jsonl_written_as_json_becomes_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let records = vec![json!({"n": 1}), json!({"n": 2})];

        write(&path, &Content::Jsonl(records.clone()), None, &WriteOptions::new()).unwrap();
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Json(Value::Array(records))
        );
    }

    #[test]
    fn test_json_array_written_as_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl.gz");

        write(
            &path,
            &Content::Json(json!([1, "two", {"three": 3}])),
            None,
            &WriteOptions::new(),
        )
        .unwrap();
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Jsonl(vec![json!(1), json!("two"), json!({"three": 3})])
        );
    }

    #[test]
    fn test_lines_written_as_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        write(
            &path,
            &Content::Lines(vec!["a".into(), "b".into()]),
            None,
            &WriteOptions::new(),
        )
        .unwrap();
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Text("a\nb\n".into())
        );
        assert_eq!(
            read(&path, Some(FileType::Lines), CodecRequest::Infer).unwrap(),
            Content::Lines(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_text_to_lines_keeps_carriage_returns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crlf.txt");

        write(
            &path,
            &Content::Text("a\r\nb\r\n".into()),
            Some(FileType::Lines),
            &WriteOptions::new(),
        )
        .unwrap();
        assert_eq!(
            read(&path, Some(FileType::Lines), CodecRequest::Infer).unwrap(),
            Content::Lines(vec!["a\r".into(), "b\r".into()])
        );
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Text("a\r\nb\r\n".into())
        );
    }

    #[test]
    fn test_split_lines_matches_line_reads() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\n\nb\n"), vec!["a\r", "", "b"]);
    }

    #[test]
    fn test_impossible_conversion_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        assert!(matches!(
            write(&path, &Content::Text("plain".into()), None, &WriteOptions::new()),
            Err(RwioError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            write(
                dir.path().join("out.jsonl"),
                &Content::Json(json!({"not": "an array"})),
                None,
                &WriteOptions::new()
            ),
            Err(RwioError::UnsupportedOperation { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_docx_rejects_compression_and_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.docx");
        let content = Content::Docx(vec!["para".into()]);

        assert!(matches!(
            write(&path, &content, None, &WriteOptions::new().compression(Codec::Gzip)),
            Err(RwioError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            write(&path, &content, None, &WriteOptions::append()),
            Err(RwioError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            read(&path, Some(FileType::Docx), Codec::Xz),
            Err(RwioError::UnsupportedOperation { .. })
        ));
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_docx_dispatch_drops_empty_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.docx");

        write(
            &path,
            &Content::Text("first\n\nsecond\n".into()),
            None,
            &WriteOptions::new(),
        )
        .unwrap();
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Docx(vec!["first".into(), "second".into()])
        );
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_from_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.yaml");
        let records = vec![json!({"a": 1}), json!({"b": [true]})];

        write(&path, &Content::Jsonl(records.clone()), None, &WriteOptions::new()).unwrap();
        assert_eq!(
            read(&path, None, CodecRequest::Infer).unwrap(),
            Content::Yaml(Value::Array(records))
        );
    }
}
