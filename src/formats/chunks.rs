//! Fixed-size grouping of lazily decoded records.

use crate::error::{Result, RwioError};
use std::iter::FusedIterator;

// Large chunk sizes grow on demand instead of reserving up front
const PREALLOCATE_LIMIT: usize = 4096;

/// Lazy sequence of record groups of at most `size` elements.
///
/// `Chunks` owns the record iterator and with it the open stream. The stream is
/// dropped as soon as the records run out or an error is yielded, and in any case
/// when the `Chunks` itself is dropped, so abandoning iteration early releases the
/// file. After an error no further groups are produced.
pub struct Chunks<I> {
    records: Option<I>,
    size: usize,
}

/// Reject a zero chunk size before any stream is opened
pub(crate) fn validate_chunk_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(RwioError::invalid_argument("chunksize must be 1 or greater"));
    }
    Ok(())
}

impl<I> Chunks<I> {
    /// Group `records` into chunks of `size`
    ///
    /// # Errors
    /// * `InvalidArgument` if `size` is zero
    pub fn new(records: I, size: usize) -> Result<Self> {
        validate_chunk_size(size)?;
        Ok(Self {
            records: Some(records),
            size,
        })
    }

    /// Maximum number of records per chunk
    pub fn chunk_size(&self) -> usize {
        self.size
    }

    /// Whether the underlying stream has been released
    pub fn is_released(&self) -> bool {
        self.records.is_none()
    }
}

impl<I, R> Iterator for Chunks<I>
where
    I: Iterator<Item = Result<R>>,
{
    type Item = Result<Vec<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.records.as_mut()?;
        let mut chunk = Vec::with_capacity(self.size.min(PREALLOCATE_LIMIT));

        while chunk.len() < self.size {
            match records.next() {
                Some(Ok(record)) => chunk.push(record),
                Some(Err(e)) => {
                    self.records = None;
                    return Some(Err(e));
                }
                None => {
                    self.records = None;
                    break;
                }
            }
        }

        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

impl<I, R> FusedIterator for Chunks<I> where I: Iterator<Item = Result<R>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ok_records(n: usize) -> impl Iterator<Item = Result<usize>> {
        (0..n).map(Ok)
    }

    #[test]
    fn test_groups_with_short_tail() {
        let sizes: Vec<usize> = Chunks::new(ok_records(7), 3)
            .unwrap()
            .map(|chunk| chunk.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_preserves_order() {
        let chunks: Vec<Vec<usize>> = Chunks::new(ok_records(5), 2)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(chunks, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let count = Chunks::new(ok_records(6), 3).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let mut chunks = Chunks::new(ok_records(0), 4).unwrap();
        assert!(chunks.next().is_none());
        assert!(chunks.is_released());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Chunks::new(ok_records(3), 0),
            Err(RwioError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_error_ends_sequence_and_drops_partial_chunk() {
        let records = vec![
            Ok(1),
            Ok(2),
            Ok(3),
            Err(RwioError::malformed_at(Path::new("x.jsonl"), 4, None, "bad")),
            Ok(5),
        ];
        let mut chunks = Chunks::new(records.into_iter(), 2).unwrap();

        assert_eq!(chunks.next().unwrap().unwrap(), vec![1, 2]);
        assert!(matches!(
            chunks.next().unwrap(),
            Err(RwioError::MalformedData { line: Some(4), .. })
        ));
        assert!(chunks.is_released());
        assert!(chunks.next().is_none());
    }
}
