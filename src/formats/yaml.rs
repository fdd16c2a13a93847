//! YAML reading and writing (cargo feature `yaml`).
//!
//! Without the feature both functions fail with `MissingDependency`, never with a
//! parse error.

use crate::compression::CodecRequest;
use crate::compression::WriteOptions;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Decode a single YAML document from the whole file
#[cfg(feature = "yaml")]
pub fn read_yaml<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    compression: impl Into<CodecRequest>,
) -> Result<T> {
    use crate::compression::open_read;
    use crate::error::RwioError;

    let path = path.as_ref();
    let data = open_read(path, compression.into())?.read_all()?;
    serde_yaml::from_slice(&data).map_err(|e| match e.location() {
        Some(location) => {
            RwioError::malformed_at(path, location.line(), Some(location.column()), e.to_string())
        }
        None => RwioError::malformed(path, e.to_string()),
    })
}

/// Serialize `value` as a single YAML document
#[cfg(feature = "yaml")]
pub fn write_yaml<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
    options: &WriteOptions,
) -> Result<()> {
    use crate::compression::open_write;
    use crate::error::RwioError;

    let path = path.as_ref();
    let encoded = serde_yaml::to_string(value).map_err(|e| {
        RwioError::invalid_argument(format!(
            "value cannot be written as YAML to {}: {e}",
            path.display()
        ))
    })?;

    let mut stream = open_write(path, options)?;
    stream.write_bytes(encoded.as_bytes())?;
    stream.finish()
}

#[cfg(not(feature = "yaml"))]
pub fn read_yaml<T: DeserializeOwned>(
    _path: impl AsRef<Path>,
    _compression: impl Into<CodecRequest>,
) -> Result<T> {
    Err(crate::error::RwioError::MissingDependency { feature: "yaml" })
}

#[cfg(not(feature = "yaml"))]
pub fn write_yaml<T: Serialize + ?Sized>(
    _path: impl AsRef<Path>,
    _value: &T,
    _options: &WriteOptions,
) -> Result<()> {
    Err(crate::error::RwioError::MissingDependency { feature: "yaml" })
}
