//! PDF text extraction

use crate::error::{Error, Result};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the text of every page, in page order.
///
/// A page whose text cannot be extracted contributes an empty string. A file
/// that cannot be opened as a PDF at all is an error.
pub fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let doc = Document::load(path)
        .map_err(|e| Error::Pdf(format!("{}: {}", path.display(), e)))?;

    if doc.is_encrypted() {
        warn!("{} is encrypted; text extraction may fail", path.display());
    }

    let pages = doc.get_pages();
    debug!("{} has {} pages", path.display(), pages.len());

    let texts = pages
        .keys()
        .map(|&page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    "Could not extract text from page {} of {}: {}",
                    page_number,
                    path.display(),
                    e
                );
                String::new()
            }
        })
        .collect();

    Ok(texts)
}

/// Write a PDF with one Courier text line per page
#[cfg(test)]
pub fn write_text_pdf(path: &Path, pages: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};
    use tempfile::TempDir;

    #[test]
    fn test_pdf_without_pages() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.pdf");

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(&path).unwrap();

        let pages = extract_pages(&path).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_text_extracted_per_page_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("call.pdf");
        write_text_pdf(&path, &["Alpha eligibility", "Beta deadline"]);

        let pages = extract_pages(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Alpha eligibility"));
        assert!(pages[1].contains("Beta deadline"));
        assert!(!pages[0].contains("Beta"));
    }

    #[test]
    fn test_unreadable_pdf_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = extract_pages(&path).unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
    }
}
