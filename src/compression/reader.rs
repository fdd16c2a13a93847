//! Decompressing read streams.
//!
//! [`open_read`] resolves the codec for a path and returns a [`ReadStream`] whose
//! bytes are the decoded content, whatever the container. Concatenated streams
//! (the result of appending to a compressed file) decode as one continuous stream.

use crate::compression::tar_member::TarMember;
use crate::compression::validation::validate_readable;
use crate::compression::{Codec, CodecRequest};
use crate::error::{Result, RwioError};
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use xz2::read::XzDecoder;

/// Cap on the buffer reserved up front from a zip member's declared size
const MEMBER_PREALLOCATE_LIMIT: u64 = 1 << 20;

/// Decoder for each supported codec family
enum Source {
    Plain(File),
    Bzip2(MultiBzDecoder<File>),
    Gzip(MultiGzDecoder<File>),
    Xz(XzDecoder<File>),
    #[cfg(feature = "zstd")]
    Zstd(zstd::Decoder<'static, BufReader<File>>),
    Tar(TarMember),
    Zip(Cursor<Vec<u8>>),
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Xz(r) => r.read(buf),
            #[cfg(feature = "zstd")]
            Self::Zstd(r) => r.read(buf),
            Self::Tar(r) => r.read(buf),
            Self::Zip(r) => r.read(buf),
        }
    }
}

/// Readable, decoded view of a file.
///
/// The stream owns every layer beneath it (file descriptor, decoder, archive);
/// dropping it releases all of them.
pub struct ReadStream {
    reader: BufReader<Source>,
    path: PathBuf,
    codec: Codec,
}

/// Open `path` for reading through the codec selected by `request`
///
/// # Errors
/// * `PathNotFound` / `NotAFile` when the path is not a readable file
/// * `MissingDependency` when the codec was compiled out
/// * `MalformedData` when an archive is unreadable or holds no file member
pub fn open_read(path: &Path, request: CodecRequest) -> Result<ReadStream> {
    validate_readable(path)?;

    let codec = request.resolve(path);
    codec.ensure_available()?;
    log::debug!("opening {} for reading with codec {}", path.display(), codec);

    let file = File::open(path).map_err(|e| RwioError::open_failed(path, e))?;
    let source = match codec {
        Codec::Zip => open_zip_member(path, file)?,
        Codec::Tar | Codec::TarBzip2 | Codec::TarGzip | Codec::TarXz => {
            let outer = codec.tar_outer().unwrap_or(Codec::None);
            let archive: Box<dyn Read> = Box::new(single_stream(path, file, outer)?);
            let member = TarMember::locate(archive).map_err(|e| archive_error(path, codec, e))?;
            log::debug!("reading tar member {:?} from {}", member.name(), path.display());
            Source::Tar(member)
        }
        single => single_stream(path, file, single)?,
    };

    Ok(ReadStream {
        reader: BufReader::new(source),
        path: path.to_path_buf(),
        codec,
    })
}

/// Wrap an open file in the decoder for a single-stream codec
fn single_stream(path: &Path, file: File, codec: Codec) -> Result<Source> {
    Ok(match codec {
        Codec::None => Source::Plain(file),
        Codec::Bzip2 => Source::Bzip2(MultiBzDecoder::new(file)),
        Codec::Gzip => Source::Gzip(MultiGzDecoder::new(file)),
        Codec::Xz => Source::Xz(XzDecoder::new_multi_decoder(file)),
        #[cfg(feature = "zstd")]
        Codec::Zstd => Source::Zstd(zstd::Decoder::new(file).map_err(|e| {
            RwioError::file_error(format!("Failed to start zstd decoder for {}", path.display()), e)
        })?),
        #[cfg(not(feature = "zstd"))]
        Codec::Zstd => return Err(RwioError::MissingDependency { feature: "zstd" }),
        archive => {
            return Err(RwioError::unsupported(format!(
                "{archive} is not a single-stream codec ({})",
                path.display()
            )))
        }
    })
}

/// Read the first file member of a zip archive into memory.
///
/// Zip members borrow their archive, so the member is materialized rather than
/// streamed.
fn open_zip_member(path: &Path, file: File) -> Result<Source> {
    let mut archive = zip::ZipArchive::new(file).map_err(|e| zip_error(path, e))?;

    let file_indices: Vec<usize> = (0..archive.len())
        .filter(|&i| archive.by_index(i).map(|m| m.is_file()).unwrap_or(false))
        .collect();
    let Some(&first) = file_indices.first() else {
        return Err(RwioError::malformed(path, "zip archive contains no file member"));
    };
    if file_indices.len() > 1 {
        log::warn!(
            "{} holds {} files; reading only the first",
            path.display(),
            file_indices.len()
        );
    }

    let mut member = archive.by_index(first).map_err(|e| zip_error(path, e))?;
    log::debug!("reading zip member {:?} from {}", member.name(), path.display());

    let mut data = Vec::with_capacity(member_capacity(member.size()));
    member
        .read_to_end(&mut data)
        .map_err(|e| stream_error(path, Codec::Zip, e))?;
    Ok(Source::Zip(Cursor::new(data)))
}

/// Initial buffer size for a member; the declared size comes from the archive and
/// is not trusted beyond the cap.
fn member_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MEMBER_PREALLOCATE_LIMIT)).unwrap_or(0)
}

fn zip_error(path: &Path, err: zip::result::ZipError) -> RwioError {
    match err {
        zip::result::ZipError::Io(e) if e.kind() != io::ErrorKind::UnexpectedEof => {
            stream_error(path, Codec::Zip, e)
        }
        other => RwioError::malformed(path, format!("invalid zip archive: {other}")),
    }
}

fn archive_error(path: &Path, codec: Codec, err: io::Error) -> RwioError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            RwioError::malformed(path, format!("invalid {codec} archive: {err}"))
        }
        _ => stream_error(path, codec, err),
    }
}

/// Error raised while pulling bytes through a decoder
pub(crate) fn stream_error(path: &Path, codec: Codec, err: io::Error) -> RwioError {
    RwioError::file_error(
        format!("Failed to read {} (codec {codec})", path.display()),
        err,
    )
}

impl ReadStream {
    /// Path the stream was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Codec the stream decodes
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Read the remaining decoded bytes
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader
            .read_to_end(&mut data)
            .map_err(|e| stream_error(&self.path, self.codec, e))?;
        Ok(data)
    }

    /// Read the remaining decoded content as UTF-8 text
    pub fn read_all_text(&mut self) -> Result<String> {
        let data = self.read_all()?;
        String::from_utf8(data).map_err(|e| {
            RwioError::malformed(&self.path, format!("content is not valid UTF-8: {e}"))
        })
    }

    /// Iterate over `\n`-separated lines, consuming the stream
    pub fn lines(self) -> StreamLines {
        StreamLines {
            stream: self,
            line_number: 0,
            buffer: Vec::new(),
        }
    }
}

impl Read for ReadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Lazy line iterator over a [`ReadStream`].
///
/// Lines are split on `\n` only and the terminator is removed; a final line
/// without terminator is still yielded, an empty trailing line is not. The
/// underlying file is closed when the iterator is dropped.
pub struct StreamLines {
    stream: ReadStream,
    line_number: usize,
    buffer: Vec<u8>,
}

impl StreamLines {
    /// 1-based number of the line most recently yielded (0 before the first)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Path of the underlying stream
    pub fn path(&self) -> &Path {
        self.stream.path()
    }
}

impl Iterator for StreamLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let read = match self.stream.reader.read_until(b'\n', &mut self.buffer) {
            Ok(read) => read,
            Err(e) => return Some(Err(stream_error(&self.stream.path, self.stream.codec, e))),
        };
        if read == 0 {
            return None;
        }

        self.line_number += 1;
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }

        let line = std::str::from_utf8(&self.buffer)
            .map(str::to_owned)
            .map_err(|e| {
                RwioError::malformed_at(
                    &self.stream.path,
                    self.line_number,
                    None,
                    format!("line is not valid UTF-8: {e}"),
                )
            });
        Some(line)
    }
}
