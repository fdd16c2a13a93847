//! Streaming access to the single member of a tar archive.
//!
//! `tar::Archive` hands out entries that borrow the archive, which cannot be
//! returned from an opener. Instead the header blocks are walked directly with
//! `tar::Header` and the first regular-file member is exposed as an owned,
//! length-limited reader over the (possibly decompressing) archive stream.

use std::io::{self, Read, Take};

const BLOCK_SIZE: u64 = 512;

/// Upper bound on a GNU long-name or pax extension record held in memory
const MAX_EXTENSION_SIZE: u64 = 1024 * 1024;

/// Reader over the data of the first regular file in a tar stream
pub struct TarMember {
    data: Take<Box<dyn Read>>,
    name: String,
}

/// Path and size overrides that apply to the next header
#[derive(Default)]
struct PendingOverrides {
    path: Option<String>,
    size: Option<u64>,
}

impl TarMember {
    /// Walk headers until the first regular-file member.
    ///
    /// Directory entries and pax global records are skipped. GNU long-name and
    /// pax local records override the path and size of the entry that follows
    /// them. Sparse members are rejected, as is reaching the end-of-archive marker
    /// without a file; both are `InvalidData` errors.
    pub fn locate(mut archive: Box<dyn Read>) -> io::Result<Self> {
        let mut block = [0u8; BLOCK_SIZE as usize];
        let mut pending = PendingOverrides::default();

        loop {
            if !read_block(archive.as_mut(), &mut block)? || block.iter().all(|&b| b == 0) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "tar archive contains no file member",
                ));
            }

            let header = tar::Header::from_byte_slice(&block);
            verify_checksum(header)?;
            let entry_type = header.entry_type();

            if entry_type.is_gnu_longname() || entry_type.is_pax_local_extensions() {
                let data = read_extension(archive.as_mut(), header.entry_size()?)?;
                if entry_type.is_gnu_longname() {
                    let name = data.split(|&b| b == 0).next().unwrap_or_default();
                    pending.path = Some(String::from_utf8_lossy(name).into_owned());
                } else {
                    apply_pax(&data, &mut pending)?;
                }
                continue;
            }

            if entry_type.is_gnu_sparse() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "sparse tar members are not supported",
                ));
            }

            let overrides = std::mem::take(&mut pending);
            let size = match overrides.size {
                Some(size) => size,
                None => header.entry_size()?,
            };

            if entry_type.is_file() {
                let name = match overrides.path {
                    Some(path) => path,
                    None => header.path()?.to_string_lossy().into_owned(),
                };
                return Ok(Self {
                    data: archive.take(size),
                    name,
                });
            }

            skip_padded(archive.as_mut(), size)?;
        }
    }

    /// Member path, including any long-name or pax override
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for TarMember {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let expected = self.data.limit();
        let n = self.data.read(buf)?;
        if n == 0 && expected > 0 && !buf.is_empty() {
            return Err(truncated());
        }
        Ok(n)
    }
}

/// Fill `block` completely; `Ok(false)` on a clean end of stream before any byte.
fn read_block(reader: &mut dyn Read, block: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < block.len() {
        match reader.read(&mut block[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(truncated()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Skip an entry's data and the padding that rounds it up to a whole block
fn skip_padded(reader: &mut dyn Read, size: u64) -> io::Result<()> {
    skip_exact(reader, size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE)
}

fn skip_exact(reader: &mut dyn Read, len: u64) -> io::Result<()> {
    let skipped = io::copy(&mut (&mut *reader).take(len), &mut io::sink())?;
    if skipped != len {
        return Err(truncated());
    }
    Ok(())
}

/// Read an extension record's data and the padding after it
fn read_extension(reader: &mut dyn Read, size: u64) -> io::Result<Vec<u8>> {
    if size > MAX_EXTENSION_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("tar extension record of {size} bytes is too large"),
        ));
    }

    let mut data = Vec::with_capacity(size as usize);
    (&mut *reader).take(size).read_to_end(&mut data)?;
    if data.len() as u64 != size {
        return Err(truncated());
    }
    skip_exact(reader, size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE - size)?;
    Ok(data)
}

fn apply_pax(data: &[u8], pending: &mut PendingOverrides) -> io::Result<()> {
    for extension in tar::PaxExtensions::new(data) {
        let extension = extension?;
        let key = extension.key().map_err(|_| malformed_pax())?;
        match key {
            "path" => {
                let value = extension.value().map_err(|_| malformed_pax())?;
                pending.path = Some(value.to_string());
            }
            "size" => {
                let value = extension.value().map_err(|_| malformed_pax())?;
                pending.size = Some(value.parse().map_err(|_| malformed_pax())?);
            }
            _ if key.starts_with("GNU.sparse.") => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "sparse tar members are not supported",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn malformed_pax() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "malformed pax extension record")
}

fn verify_checksum(header: &tar::Header) -> io::Result<()> {
    let recorded = header.cksum().map_err(|_| not_a_tar())?;
    let computed: u32 = header
        .as_bytes()
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { u32::from(b' ') } else { u32::from(b) })
        .sum();

    if recorded == computed {
        Ok(())
    } else {
        Err(not_a_tar())
    }
}

fn not_a_tar() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        "not a tar archive (bad header checksum)",
    )
}

fn truncated() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "tar archive is truncated")
}
