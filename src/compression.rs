//! Codec selection and transparent compressed stream access.
//!
//! This module maps a path and an optional explicit codec to a concrete stream
//! strategy: a plain file, a single-stream compressor (bzip2, gzip, xz, zstd) or the
//! single member of an archive container (zip, tar and its compressed variants).
//! Format readers and writers only ever see [`ReadStream`] and [`WriteStream`].

use crate::error::{Result, RwioError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod reader;
pub mod tar_member;
pub mod validation;
pub mod writer;

pub use reader::{open_read, ReadStream, StreamLines};
pub use writer::{open_write, WriteStream};

/// Supported codecs for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// No compression - plain file
    None,
    /// Bzip2 compression (.bz2 files)
    Bzip2,
    /// Gzip compression (.gz files)
    Gzip,
    /// XZ compression (.xz files)
    Xz,
    /// Zip archive holding one member (.zip files)
    Zip,
    /// Zstandard compression (.zst files)
    Zstd,
    /// Uncompressed tar archive holding one member (.tar files)
    Tar,
    /// Bzip2-compressed tar archive (.tar.bz2 files)
    TarBzip2,
    /// Gzip-compressed tar archive (.tar.gz, .tgz files)
    TarGzip,
    /// XZ-compressed tar archive (.tar.xz files)
    TarXz,
}

/// Filename suffixes checked in order; the first match wins, so longer suffixes
/// sharing a tail with shorter ones must come first.
static SUFFIX_TABLE: &[(&str, Codec)] = &[
    (".tar.bz2", Codec::TarBzip2),
    (".tar.gz", Codec::TarGzip),
    (".tgz", Codec::TarGzip),
    (".tar.xz", Codec::TarXz),
    (".tar", Codec::Tar),
    (".bz2", Codec::Bzip2),
    (".gz", Codec::Gzip),
    (".xz", Codec::Xz),
    (".zip", Codec::Zip),
    (".zst", Codec::Zstd),
];

const VALID_CODEC_NAMES: &str = "infer, none, bz2, gzip, xz, zip, zstd, tar, tar.bz2, tar.gz, tar.xz";

impl Codec {
    /// Every codec, in declaration order
    pub const ALL: [Codec; 10] = [
        Codec::None,
        Codec::Bzip2,
        Codec::Gzip,
        Codec::Xz,
        Codec::Zip,
        Codec::Zstd,
        Codec::Tar,
        Codec::TarBzip2,
        Codec::TarGzip,
        Codec::TarXz,
    ];

    /// Canonical name of the codec
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bzip2 => "bz2",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zip => "zip",
            Self::Zstd => "zstd",
            Self::Tar => "tar",
            Self::TarBzip2 => "tar.bz2",
            Self::TarGzip => "tar.gz",
            Self::TarXz => "tar.xz",
        }
    }

    /// Check if this type represents a compressed format
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None | Self::Tar)
    }

    /// Check if this codec is an archive container with named members
    pub fn is_archive(&self) -> bool {
        matches!(
            self,
            Self::Zip | Self::Tar | Self::TarBzip2 | Self::TarGzip | Self::TarXz
        )
    }

    /// Single-stream codec wrapping a tar archive, or `None` for non-tar codecs
    pub fn tar_outer(&self) -> Option<Codec> {
        match self {
            Self::Tar => Some(Self::None),
            Self::TarBzip2 => Some(Self::Bzip2),
            Self::TarGzip => Some(Self::Gzip),
            Self::TarXz => Some(Self::Xz),
            _ => None,
        }
    }

    /// Codecs compiled into this build, in declaration order
    pub fn available() -> impl Iterator<Item = Codec> {
        Self::ALL
            .into_iter()
            .filter(|codec| codec.ensure_available().is_ok())
    }

    /// Fail with `MissingDependency` if support for this codec was compiled out
    pub fn ensure_available(&self) -> Result<()> {
        if cfg!(not(feature = "zstd")) && *self == Self::Zstd {
            return Err(RwioError::MissingDependency { feature: "zstd" });
        }
        Ok(())
    }

    /// Filename suffixes (lowercase, with leading dot) that infer this codec
    pub fn suffixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        SUFFIX_TABLE
            .iter()
            .filter(move |(_, codec)| codec == self)
            .map(|(suffix, _)| *suffix)
    }

    /// Infer the codec from a path's file name.
    ///
    /// Names that match no known suffix resolve to [`Codec::None`] rather than an
    /// error, so a typo such as `data.gzz` is read as plain bytes.
    pub fn infer(path: &Path) -> Codec {
        let name = lowercase_file_name(path);
        SUFFIX_TABLE
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, codec)| *codec)
            .unwrap_or(Codec::None)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = RwioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "bz2" | "bzip2" => Ok(Self::Bzip2),
            "gzip" | "gz" => Ok(Self::Gzip),
            "xz" => Ok(Self::Xz),
            "zip" => Ok(Self::Zip),
            "zstd" | "zst" => Ok(Self::Zstd),
            "tar" => Ok(Self::Tar),
            "tar.bz2" => Ok(Self::TarBzip2),
            "tar.gz" | "tgz" => Ok(Self::TarGzip),
            "tar.xz" => Ok(Self::TarXz),
            _ => Err(RwioError::UnsupportedFormat {
                name: s.to_string(),
                valid: VALID_CODEC_NAMES.to_string(),
            }),
        }
    }
}

/// How the caller wants the codec chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecRequest {
    /// Pick the codec from the file name suffix
    #[default]
    Infer,
    /// Use this codec regardless of the file name
    Explicit(Codec),
}

impl CodecRequest {
    /// Resolve the request against a concrete path
    pub fn resolve(&self, path: &Path) -> Codec {
        match self {
            Self::Infer => Codec::infer(path),
            Self::Explicit(codec) => *codec,
        }
    }
}

impl From<Codec> for CodecRequest {
    fn from(codec: Codec) -> Self {
        Self::Explicit(codec)
    }
}

impl FromStr for CodecRequest {
    type Err = RwioError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("infer") {
            Ok(Self::Infer)
        } else {
            s.parse().map(Self::Explicit)
        }
    }
}

/// Write disposition of an output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Create the file, truncating existing content
    #[default]
    Write,
    /// Create the file if needed and add to the end of existing content
    Append,
}

/// Options shared by every writer
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Truncate or append
    pub mode: WriteMode,
    /// Codec selection
    pub compression: CodecRequest,
    /// Compression level; `None` uses each codec's default
    pub level: Option<u32>,
}

impl WriteOptions {
    /// Truncating write with an inferred codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Appending write with an inferred codec
    pub fn append() -> Self {
        Self {
            mode: WriteMode::Append,
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn compression(mut self, compression: impl Into<CodecRequest>) -> Self {
        self.compression = compression.into();
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

/// Name given to the single member of an archive written to `path`: the file name
/// with the codec suffix removed, e.g. `notes.txt.tar.gz` holds `notes.txt`.
pub fn archive_member_name(path: &Path, codec: Codec) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lowered = name.to_ascii_lowercase();

    let stem = codec
        .suffixes()
        .find(|suffix| lowered.ends_with(suffix))
        .map(|suffix| &name[..name.len() - suffix.len()])
        .unwrap_or(&name);

    if stem.is_empty() {
        "data".to_string()
    } else {
        stem.to_string()
    }
}

/// Strip the suffix of the codec inferred from `path`, returning the lowercase
/// remainder of the file name (`Report.JSON.gz` gives `report.json`).
pub(crate) fn strip_codec_suffix(path: &Path) -> String {
    let name = lowercase_file_name(path);
    let codec = Codec::infer(path);
    let suffix = codec.suffixes().find(|suffix| name.ends_with(suffix));
    match suffix {
        Some(suffix) => name[..name.len() - suffix.len()].to_string(),
        None => name,
    }
}

fn lowercase_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
