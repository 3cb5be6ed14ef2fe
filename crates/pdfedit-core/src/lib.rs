//! Client-side PDF page editing
//!
//! Uploaded PDFs are kept as-is while the user reorders, deletes, rotates and
//! merges pages. Edits only change a `PageOrder`; the output document is built
//! once, on export, using lopdf.
//!
//! - `page_order`: display position -> source page bookkeeping
//! - `workspace`: uploaded documents plus their page order
//! - `export` / `merge` / `split`: building output PDFs
//! - `validation` / `page_info`: upload checks and preview geometry

pub mod command;
pub mod error;
pub mod export;
pub mod merge;
pub mod page_info;
pub mod page_order;
pub mod split;
pub mod validation;
pub mod workspace;

pub use command::{parse_commands, ExportMetrics, ExportResult, PageCommand};
pub use error::PdfEditError;
pub use export::export_pages;
pub use merge::merge_documents;
pub use page_info::{PageInfo, PageOrientation};
pub use page_order::{PageOrder, PageRef};
pub use split::split_document;
pub use validation::{load_validated, quick_validate, validate_pdf, PdfInfo};
pub use workspace::{DocumentSummary, EditorWorkspace};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfEditError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| PdfEditError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Parse page range string like "1-3, 5, 8-10" into sorted unique page numbers
pub fn parse_ranges(input: &str) -> Result<Vec<u32>, PdfEditError> {
    parse_ranges_bounded(input, None)
}

/// Like `parse_ranges`, but every page must lie in `1..=max`.
/// Bounds are checked before a range is expanded.
pub fn parse_ranges_within(input: &str, max: u32) -> Result<Vec<u32>, PdfEditError> {
    parse_ranges_bounded(input, Some(max))
}

fn parse_ranges_bounded(input: &str, max: Option<u32>) -> Result<Vec<u32>, PdfEditError> {
    use std::collections::BTreeSet;

    let mut pages = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| PdfEditError::InvalidRange(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| PdfEditError::InvalidRange(format!("Invalid end: {}", end)))?;

            if start > end {
                return Err(PdfEditError::InvalidRange(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }
            (start, end)
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| PdfEditError::InvalidRange(format!("Invalid page: {}", part)))?;
            (page, page)
        };

        if let Some(max) = max {
            if let Some(page) = [start, end].into_iter().find(|&p| p == 0 || p > max) {
                return Err(PdfEditError::InvalidRange(format!(
                    "Page {} is out of range (1-{})",
                    page, max
                )));
            }
        }

        pages.extend(start..=end);
    }

    Ok(pages.into_iter().collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory PDFs for tests

    use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

    fn text_page_content(label: &str) -> Vec<u8> {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        label.as_bytes().to_vec(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        content.encode().unwrap()
    }

    fn save(doc: &mut Document, pages_id: lopdf::ObjectId) -> Vec<u8> {
        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// A US Letter PDF whose pages each draw "<prefix>-Page-<n>"
    pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let label = format!("{}-Page-{}", prefix, i + 1);
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), text_page_content(&label)));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        save(&mut doc, pages_id)
    }

    /// An A5-ish PDF where MediaBox and Resources live on the page tree root
    pub fn create_inherited_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let label = format!("Inherited-Page-{}", i + 1);
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), text_page_content(&label)));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "F1",
                Object::Reference(font_id),
            )])),
        )]);
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(420),
                    Object::Integer(595),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        save(&mut doc, pages_id)
    }

    /// The text label drawn on each page, in page order
    pub fn page_markers(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = doc.get_page_content(page_id).unwrap();
                let text = String::from_utf8_lossy(&content);
                let start = text.find('(').unwrap() + 1;
                let end = text[start..].find(')').unwrap() + start;
                text[start..end].to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_deserializes_move() {
        let json = r#"{"type":"Move","from":2,"to":0}"#;
        let cmd: PageCommand = serde_json::from_str(json).unwrap();
        assert_eq!(cmd, PageCommand::Move { from: 2, to: 0 });
    }

    #[test]
    fn test_command_deserializes_rotate() {
        let json = r#"{"type":"Rotate","position":1,"degrees":-90}"#;
        let cmd: PageCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, PageCommand::Rotate { degrees: -90, .. }));
    }

    #[test]
    fn test_parse_commands_rejects_unknown_type() {
        assert!(parse_commands(r#"[{"type":"Explode"}]"#).is_err());
    }

    #[test]
    fn test_get_page_count() {
        let pdf = test_support::create_test_pdf(4, "C");
        assert_eq!(get_page_count(&pdf).unwrap(), 4);
        assert!(get_page_count(b"nope").is_err());
    }

    #[test]
    fn test_parse_ranges_complex() {
        let result = parse_ranges("1-3, 5, 8-10").unwrap();
        assert_eq!(result, vec![1, 2, 3, 5, 8, 9, 10]);
    }

    #[test]
    fn test_parse_ranges_deduplicates() {
        let result = parse_ranges("1-3, 2-4").unwrap();
        assert_eq!(result, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_ranges_within_checks_bounds_before_expanding() {
        assert_eq!(parse_ranges_within("1-2, 4", 4).unwrap(), vec![1, 2, 4]);
        assert_eq!(
            parse_ranges_within("1-4294967295", 3).unwrap_err(),
            PdfEditError::InvalidRange("Page 4294967295 is out of range (1-3)".into())
        );
        assert!(parse_ranges_within("0-2", 3).is_err());
        assert!(parse_ranges_within("5", 3).is_err());
        assert!(parse_ranges_within("3-1", 3).is_err());
    }

    #[test]
    fn test_parse_ranges_rejects_backwards_range() {
        assert!(parse_ranges("5-2").is_err());
        assert!(parse_ranges("a").is_err());
    }
}
