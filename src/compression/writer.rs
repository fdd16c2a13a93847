//! Compressing write streams.
//!
//! [`open_write`] resolves the codec for a path and returns a [`WriteStream`]. Bytes
//! written to it end up encoded in the target file; [`WriteStream::finish`] closes
//! every layer (encoder trailer, archive index, file) exactly once. A stream dropped
//! without `finish` still releases the file, but trailers are written on a best
//! effort basis and errors are lost.

use crate::compression::validation::validate_writable;
use crate::compression::{archive_member_name, Codec, WriteMode, WriteOptions};
use crate::error::{Result, RwioError};
use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use xz2::write::XzEncoder;

const DEFAULT_XZ_LEVEL: u32 = 6;

/// Encoder for each supported codec family
enum Sink {
    Plain(BufWriter<File>),
    Bzip2(BzEncoder<BufWriter<File>>),
    Gzip(GzEncoder<BufWriter<File>>),
    Xz(XzEncoder<BufWriter<File>>),
    #[cfg(feature = "zstd")]
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
    Tar(TarSink),
    Zip(zip::ZipWriter<File>),
}

/// Tar output: the member size goes in its header, so content is collected and
/// appended as a single entry on finish.
struct TarSink {
    builder: tar::Builder<Box<Sink>>,
    member: String,
    buffer: Vec<u8>,
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Bzip2(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Xz(w) => w.write(buf),
            #[cfg(feature = "zstd")]
            Self::Zstd(w) => w.write(buf),
            Self::Tar(t) => t.buffer.write(buf),
            Self::Zip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Bzip2(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Xz(w) => w.flush(),
            #[cfg(feature = "zstd")]
            Self::Zstd(w) => w.flush(),
            Self::Tar(_) => Ok(()),
            Self::Zip(w) => w.flush(),
        }
    }
}

impl Sink {
    /// Write trailers and flush every layer down to the file
    fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(w) => flush_file(w),
            Self::Bzip2(w) => flush_file(w.finish()?),
            Self::Gzip(w) => flush_file(w.finish()?),
            Self::Xz(w) => flush_file(w.finish()?),
            #[cfg(feature = "zstd")]
            Self::Zstd(w) => flush_file(w.finish()?),
            Self::Tar(t) => {
                let TarSink {
                    mut builder,
                    member,
                    buffer,
                } = t;
                let mut header = tar::Header::new_gnu();
                header.set_size(buffer.len() as u64);
                header.set_mode(0o644);
                header.set_mtime(unix_now());
                builder.append_data(&mut header, &member, buffer.as_slice())?;
                let inner = builder.into_inner()?;
                (*inner).finish()
            }
            Self::Zip(w) => w.finish().map(drop).map_err(zip_to_io),
        }
    }
}

fn flush_file(writer: BufWriter<File>) -> io::Result<()> {
    writer.into_inner().map_err(|e| e.into_error())?.flush()
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Writable, encoding view of a file
pub struct WriteStream {
    sink: Sink,
    path: PathBuf,
    codec: Codec,
}

/// Open `path` for writing through the codec selected by `options`
///
/// # Errors
/// * `PathNotFound` when the parent directory does not exist
/// * `NotAFile` when the path is a directory
/// * `UnsupportedOperation` when appending to an archive codec
/// * `MissingDependency` when the codec was compiled out
pub fn open_write(path: &Path, options: &WriteOptions) -> Result<WriteStream> {
    let codec = options.compression.resolve(path);

    if options.mode == WriteMode::Append && codec.is_archive() {
        return Err(RwioError::unsupported(format!(
            "{codec} archives do not support append mode ({})",
            path.display()
        )));
    }
    codec.ensure_available()?;
    validate_writable(path)?;
    log::debug!(
        "opening {} for {:?} with codec {} (level {:?})",
        path.display(),
        options.mode,
        codec,
        options.level
    );

    let mut open_options = OpenOptions::new();
    match options.mode {
        WriteMode::Write => open_options.write(true).create(true).truncate(true),
        WriteMode::Append => open_options.append(true).create(true),
    };
    let file = open_options
        .open(path)
        .map_err(|e| RwioError::open_failed(path, e))?;

    let sink = match codec {
        Codec::Zip => {
            let mut writer = zip::ZipWriter::new(file);
            let member_options = zip_member_options(options.level);
            writer
                .start_file(archive_member_name(path, codec), member_options)
                .map_err(|e| write_error(path, codec, zip_to_io(e)))?;
            Sink::Zip(writer)
        }
        Codec::Tar | Codec::TarBzip2 | Codec::TarGzip | Codec::TarXz => {
            let outer = codec.tar_outer().unwrap_or(Codec::None);
            let inner = single_stream(path, file, outer, options.level)?;
            Sink::Tar(TarSink {
                builder: tar::Builder::new(Box::new(inner)),
                member: archive_member_name(path, codec),
                buffer: Vec::new(),
            })
        }
        single => single_stream(path, file, single, options.level)?,
    };

    Ok(WriteStream {
        sink,
        path: path.to_path_buf(),
        codec,
    })
}

/// Deflate at the requested level; level 0 stores the member uncompressed since
/// deflate levels start at 1.
fn zip_member_options(level: Option<u32>) -> zip::write::SimpleFileOptions {
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
    match level {
        Some(0) => options.compression_method(zip::CompressionMethod::Stored),
        Some(level) => options
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level.clamp(1, 9)))),
        None => options.compression_method(zip::CompressionMethod::Deflated),
    }
}

fn single_stream(path: &Path, file: File, codec: Codec, level: Option<u32>) -> Result<Sink> {
    let file = BufWriter::new(file);
    Ok(match codec {
        Codec::None => Sink::Plain(file),
        Codec::Bzip2 => {
            let level = level.map_or_else(bzip2::Compression::default, |l| {
                bzip2::Compression::new(l.clamp(1, 9))
            });
            Sink::Bzip2(BzEncoder::new(file, level))
        }
        Codec::Gzip => {
            let level = level.map_or_else(flate2::Compression::default, |l| {
                flate2::Compression::new(l.min(9))
            });
            Sink::Gzip(GzEncoder::new(file, level))
        }
        Codec::Xz => Sink::Xz(XzEncoder::new(file, level.unwrap_or(DEFAULT_XZ_LEVEL).min(9))),
        #[cfg(feature = "zstd")]
        Codec::Zstd => {
            let level = level.map_or(zstd::DEFAULT_COMPRESSION_LEVEL, |l| l.clamp(1, 22) as i32);
            Sink::Zstd(
                zstd::Encoder::new(file, level).map_err(|e| write_error(path, codec, e))?,
            )
        }
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

fn write_error(path: &Path, codec: Codec, err: io::Error) -> RwioError {
    RwioError::file_error(
        format!("Failed to write {} (codec {codec})", path.display()),
        err,
    )
}

impl WriteStream {
    /// Path the stream writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Codec the stream encodes with
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Write all of `data`, attaching path and codec to any failure
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.sink
            .write_all(data)
            .map_err(|e| write_error(&self.path, self.codec, e))
    }

    /// Complete the encoded output and close the file
    pub fn finish(self) -> Result<()> {
        let Self { sink, path, codec } = self;
        sink.finish().map_err(|e| write_error(&path, codec, e))?;
        log::debug!("finished writing {} with codec {}", path.display(), codec);
        Ok(())
    }
}

impl Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
