//! PDF text layer extraction.

use std::panic;

use super::ExtractionError;

/// Extract the text layer of every page, concatenated in page order.
/// Returns the text and the number of pages seen.
pub(super) fn extract_pdf(bytes: &[u8]) -> Result<(String, usize), ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractionError::Pdf("malformed PDF structure".to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let page_count = pages.len();
    Ok((pages.concat(), page_count))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a single-page PDF whose text layer contains `text`.
    pub(crate) fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_single_page() {
        let bytes = make_test_pdf("Exclusivity for six months");
        let (text, pages) = extract_pdf(&bytes).unwrap();
        assert_eq!(pages, 1);
        assert!(text.contains("Exclusivity"), "got: {text}");
    }

    #[test]
    fn test_invalid_pdf() {
        let err = extract_pdf(b"%PDF-1.4 garbage").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_pdf(&[]).is_err());
    }
}
