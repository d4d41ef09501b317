//! Document assembly via qpdf FFI
//!
//! Builds new PDFs by copying pages out of uploaded source documents. All
//! work is in memory; the qpdf crate (vendored FFI) is the document-model
//! collaborator.

use crate::error::{Error, Result};
use qpdf::QPdf;

/// Open a PDF from memory. A source that does not load is a corrupt upload,
/// not an assembly failure.
fn open_source(data: &[u8]) -> Result<QPdf> {
    QPdf::read_from_memory(data).map_err(|e| Error::CorruptDocument {
        reason: e.to_string(),
    })
}

fn map_assembly_error(e: qpdf::QPdfError) -> Error {
    Error::AssemblyFailure {
        reason: e.to_string(),
    }
}

/// Get the page count of a PDF held in memory.
pub fn page_count(data: &[u8]) -> Result<u32> {
    let source = open_source(data)?;
    source.get_num_pages().map_err(map_assembly_error)
}

/// Copy the pages at `indices` (0-indexed), in the given order, into a new
/// document and serialize it.
///
/// The output has exactly `indices.len()` pages in `indices` order, so the
/// same routine serves ascending subsets (split) and arbitrary
/// reorder/duplication (rearrange). Callers produce `indices` via
/// [`crate::pdf::pages::parse_page_spec`], which guarantees every index is
/// in bounds for the source.
pub fn assemble_from_indices(data: &[u8], indices: &[u32]) -> Result<Vec<u8>> {
    let source = open_source(data)?;
    let num_pages = source.get_num_pages().map_err(map_assembly_error)?;

    let dest = QPdf::empty();

    for &idx in indices {
        let page = source
            .get_page(idx)
            .ok_or_else(|| Error::AssemblyFailure {
                reason: format!("page {} out of bounds (total: {})", idx + 1, num_pages),
            })?;
        let copied = dest.copy_from_foreign(&page);
        dest.add_page(&copied, false).map_err(map_assembly_error)?;
    }

    let mut writer = dest.writer();
    writer.preserve_encryption(false);
    writer.write_to_memory().map_err(map_assembly_error)
}

/// Concatenate documents strictly left-to-right in the given (upload) order,
/// copying every page of each input.
pub fn concatenate(inputs: &[&[u8]]) -> Result<Vec<u8>> {
    if inputs.is_empty() {
        return Err(Error::MissingInput {
            reason: "No input PDFs provided.".to_string(),
        });
    }

    let dest = QPdf::empty();

    for (i, input) in inputs.iter().enumerate() {
        let source = QPdf::read_from_memory(input).map_err(|e| Error::CorruptDocument {
            reason: format!("input PDF {}: {}", i + 1, e),
        })?;

        let pages = source.get_pages().map_err(map_assembly_error)?;
        for page in &pages {
            let copied = dest.copy_from_foreign(page);
            dest.add_page(&copied, false).map_err(map_assembly_error)?;
        }
    }

    let mut writer = dest.writer();
    writer.preserve_encryption(false);
    writer.write_to_memory().map_err(map_assembly_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::blank_pdf;

    #[test]
    fn page_count_reads_generated_pdf() {
        let pdf = blank_pdf(4);
        assert_eq!(page_count(&pdf).unwrap(), 4);
    }

    #[test]
    fn page_count_rejects_garbage() {
        let err = page_count(b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::CorruptDocument { .. }));
    }

    #[test]
    fn subset_assembly_keeps_index_count() {
        let pdf = blank_pdf(5);
        let out = assemble_from_indices(&pdf, &[0, 1, 2, 4]).unwrap();
        assert_eq!(page_count(&out).unwrap(), 4);
    }

    #[test]
    fn duplication_yields_one_page_per_index() {
        let pdf = blank_pdf(3);
        let out = assemble_from_indices(&pdf, &[2, 0, 2, 2]).unwrap();
        assert_eq!(page_count(&out).unwrap(), 4);
    }

    #[test]
    fn assembly_rejects_corrupt_source() {
        let err = assemble_from_indices(b"%PDF-1.7 truncated", &[0]).unwrap_err();
        assert!(matches!(err, Error::CorruptDocument { .. }));
    }

    #[test]
    fn concatenation_sums_page_counts() {
        let a = blank_pdf(2);
        let b = blank_pdf(3);
        let out = concatenate(&[&a, &b]).unwrap();
        assert_eq!(page_count(&out).unwrap(), 5);
    }

    #[test]
    fn concatenation_rejects_empty_input() {
        let err = concatenate(&[]).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }

    #[test]
    fn concatenation_names_the_bad_input() {
        let good = blank_pdf(1);
        let err = concatenate(&[&good, b"garbage"]).unwrap_err();
        match err {
            Error::CorruptDocument { reason } => assert!(reason.contains("input PDF 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn full_range_roundtrip_preserves_count() {
        let pdf = blank_pdf(3);
        let all: Vec<u32> = (0..3).collect();
        let split = assemble_from_indices(&pdf, &all).unwrap();
        let merged = concatenate(&[&split, &split]).unwrap();
        assert_eq!(page_count(&merged).unwrap(), 6);
    }
}
