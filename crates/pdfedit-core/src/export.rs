//! Export: rebuild a PDF from a page order
//!
//! The algorithm:
//! 1. Load every source document the order still references
//! 2. Flatten inheritable attributes onto the pages we keep, since they are
//!    about to lose their original parents
//! 3. Import the source objects into one destination, offsetting object IDs
//! 4. Build a single new page tree whose Kids follow the page order
//! 5. Prune whatever is no longer reachable, compress and serialize

use crate::error::PdfEditError;
use crate::page_order::{normalize_rotation, PageOrder};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use tracing::debug;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against malformed page trees with Parent cycles
const MAX_TREE_DEPTH: usize = 64;

/// Build the output PDF for `order`, reading pages from `sources`
pub fn export_pages(sources: &[Vec<u8>], order: &PageOrder) -> Result<Vec<u8>, PdfEditError> {
    if order.is_empty() {
        return Err(PdfEditError::OperationError("No pages to export".into()));
    }

    let mut dest = Document::with_version("1.5");
    let mut imported: HashMap<(usize, u32), ObjectId> = HashMap::new();

    for doc_index in order.referenced_documents() {
        let bytes = sources
            .get(doc_index)
            .ok_or(PdfEditError::UnknownDocument(doc_index))?;

        let mut source = Document::load_mem(bytes).map_err(|e| {
            PdfEditError::ParseError(format!("Failed to load document {}: {}", doc_index, e))
        })?;
        if source.is_encrypted() {
            return Err(PdfEditError::Unsupported(format!(
                "document {} is encrypted",
                doc_index
            )));
        }
        if source.version > dest.version {
            dest.version = source.version.clone();
        }

        let source_pages = source.get_pages();
        let wanted: Vec<(u32, ObjectId)> = order
            .iter()
            .filter(|entry| entry.doc == doc_index)
            .map(|entry| {
                source_pages
                    .get(&entry.page)
                    .map(|&id| (entry.page, id))
                    .ok_or_else(|| {
                        PdfEditError::InvalidRange(format!(
                            "Page {} does not exist in document {} ({} pages)",
                            entry.page,
                            doc_index,
                            source_pages.len()
                        ))
                    })
            })
            .collect::<Result<_, _>>()?;

        for &(_, page_id) in &wanted {
            flatten_inherited_attributes(&mut source, page_id)?;
        }

        let offset = import_objects(&mut dest, source);
        for (page_num, page_id) in wanted {
            imported.insert((doc_index, page_num), (page_id.0 + offset, page_id.1));
        }

        debug!(doc = doc_index, offset, "imported source document");
    }

    let pages_id = dest.new_object_id();
    let mut kids = Vec::with_capacity(order.len());

    for entry in order.iter() {
        let page_id = *imported.get(&(entry.doc, entry.page)).ok_or_else(|| {
            PdfEditError::OperationError(format!(
                "Page {} of document {} was not imported",
                entry.page, entry.doc
            ))
        })?;
        let page = dest
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfEditError::OperationError(format!("Invalid page object: {}", e)))?;

        page.set("Parent", Object::Reference(pages_id));
        if entry.rotation != 0 {
            let current = page
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .map(normalize_rotation)
                .unwrap_or(0);
            page.set(
                "Rotate",
                Object::Integer(normalize_rotation(i64::from(current + entry.rotation)).into()),
            );
        }
        kids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    dest.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = dest.add_object(Object::Dictionary(catalog));
    dest.trailer.set("Root", Object::Reference(catalog_id));

    let pruned = dest.prune_objects();
    debug!(pruned = pruned.len(), pages = order.len(), "pruned unreachable objects");
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfEditError::OperationError(format!("Failed to save PDF: {}", e)))?;

    Ok(buffer)
}

/// Move every object of `source` into `dest` under shifted IDs.
/// Returns the offset that was added to each object number.
pub(crate) fn import_objects(dest: &mut Document, source: Document) -> u32 {
    let offset = dest.max_id;
    let source_max_id = source.max_id;

    for ((number, generation), mut object) in source.objects {
        shift_references(&mut object, offset);
        dest.objects.insert((number + offset, generation), object);
    }

    dest.max_id = dest.max_id.max(source_max_id + offset);
    offset
}

/// Recursively shift object references by `offset`
fn shift_references(object: &mut Object, offset: u32) {
    match object {
        Object::Reference(id) => id.0 += offset,
        Object::Array(items) => {
            for item in items.iter_mut() {
                shift_references(item, offset);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                shift_references(value, offset);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                shift_references(value, offset);
            }
        }
        _ => {}
    }
}

/// Copy attributes the page inherits from its ancestors onto the page itself
fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<(), PdfEditError> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| PdfEditError::ParseError(format!("Invalid page object: {}", e)))?;

    let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_object(parent_id).and_then(Object::as_dict) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    // MediaBox is required; fall back to US Letter like viewers do
    if missing.contains(&b"MediaBox".as_slice()) {
        inherited.push((
            b"MediaBox".as_slice(),
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ));
    }

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfEditError::ParseError(format!("Invalid page object: {}", e)))?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_order::PageRef;
    use crate::test_support::{create_test_pdf, page_markers};
    use pretty_assertions::assert_eq;

    fn order_of(entries: &[(usize, u32)]) -> PageOrder {
        PageOrder::from_entries(
            entries
                .iter()
                .map(|&(doc, page)| PageRef::new(doc, page))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_export_empty_order_fails() {
        let pdf = create_test_pdf(2, "A");
        let err = export_pages(&[pdf], &PageOrder::new()).unwrap_err();
        assert!(err.to_string().contains("No pages to export"));
    }

    #[test]
    fn test_export_unknown_document_fails() {
        let mut order = PageOrder::new();
        order.append_document(1, 1);
        let pdf = create_test_pdf(1, "A");
        let err = export_pages(&[pdf], &order).unwrap_err();
        assert_eq!(err, PdfEditError::UnknownDocument(1));
    }

    #[test]
    fn test_export_missing_page_fails() {
        let mut order = PageOrder::new();
        order.append_document(0, 3);
        let pdf = create_test_pdf(2, "A");
        assert!(export_pages(&[pdf], &order).is_err());
    }

    #[test]
    fn test_export_follows_page_order() {
        let a = create_test_pdf(3, "A");
        let b = create_test_pdf(2, "B");
        let order = order_of(&[(1, 2), (0, 3), (0, 1), (1, 1)]);

        let out = export_pages(&[a, b], &order).unwrap();

        assert_eq!(
            page_markers(&out),
            vec!["B-Page-2", "A-Page-3", "A-Page-1", "B-Page-1"]
        );
    }

    #[test]
    fn test_export_drops_deleted_pages() {
        let a = create_test_pdf(5, "A");
        let mut order = PageOrder::new();
        order.append_document(0, 5);
        order.delete_positions(&[1, 3]).unwrap();

        let out = export_pages(&[a], &order).unwrap();
        let doc = Document::load_mem(&out).unwrap();

        assert_eq!(doc.get_pages().len(), 3);
        assert_eq!(page_markers(&out), vec!["A-Page-1", "A-Page-3", "A-Page-5"]);
    }

    #[test]
    fn test_export_skips_unreferenced_sources() {
        let a = create_test_pdf(1, "A");
        let mut order = PageOrder::new();
        order.append_document(0, 1);
        order.append_document(1, 1);
        order.delete_page(1).unwrap();

        // Document 1 is garbage, but no page of it is referenced
        let out = export_pages(&[a, b"not a pdf".to_vec()], &order).unwrap();
        assert_eq!(page_markers(&out), vec!["A-Page-1"]);
    }

    #[test]
    fn test_export_applies_rotation() {
        let a = create_test_pdf(2, "A");
        let mut order = PageOrder::new();
        order.append_document(0, 2);
        order.rotate_page(1, 90).unwrap();

        let out = export_pages(&[a], &order).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let pages = doc.get_pages();
        let rotate_of = |num: u32| {
            doc.get_object(pages[&num])
                .and_then(Object::as_dict)
                .unwrap()
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .ok()
        };

        assert_eq!(rotate_of(1), None);
        assert_eq!(rotate_of(2), Some(90));
    }

    #[test]
    fn test_export_normalizes_out_of_range_source_rotate() {
        // /Rotate larger than i32; 4500000090 is equivalent to 90
        let mut source = Document::load_mem(&create_test_pdf(1, "A")).unwrap();
        let page_id = source.get_pages()[&1];
        source
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Rotate", Object::Integer(4_500_000_090));
        let mut bytes = Vec::new();
        source.save_to(&mut bytes).unwrap();

        let mut order = PageOrder::new();
        order.append_document(0, 1);
        order.rotate_page(0, 90).unwrap();

        let out = export_pages(&[bytes], &order).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let rotate = doc
            .get_object(doc.get_pages()[&1])
            .and_then(Object::as_dict)
            .unwrap()
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap();
        assert_eq!(rotate, 180);
    }

    #[test]
    fn test_export_keeps_inherited_media_box() {
        let pdf = crate::test_support::create_inherited_pdf(3);
        let mut order = PageOrder::new();
        order.append_document(0, 3);
        order.delete_page(0).unwrap();

        let out = export_pages(&[pdf], &order).unwrap();
        let doc = Document::load_mem(&out).unwrap();

        for (_, page_id) in doc.get_pages() {
            let page = doc.get_object(page_id).and_then(Object::as_dict).unwrap();
            let media_box = page.get(b"MediaBox").and_then(Object::as_array).unwrap();
            assert_eq!(media_box.len(), 4);
            assert_eq!(media_box[2].as_i64().unwrap(), 420);
            assert!(page.has(b"Resources"));
        }
    }
}
