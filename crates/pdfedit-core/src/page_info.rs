//! Page-level information for previews
//!
//! The browser renders thumbnails itself; it only needs the page geometry to
//! size the canvas before rendering.

use crate::error::PdfEditError;
use crate::page_order::normalize_rotation;
use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,
    pub height: f32,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    pub has_content: bool,
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

impl PageInfo {
    pub fn from_document(doc: &Document, page_num: u32) -> Result<Self, PdfEditError> {
        let pages = doc.get_pages();
        let page_id = pages.get(&page_num).ok_or_else(|| {
            PdfEditError::InvalidRange(format!("Page {} not found", page_num))
        })?;

        let page_dict = doc
            .get_object(*page_id)
            .and_then(Object::as_dict)
            .map_err(|_| PdfEditError::ParseError(format!("Page {} is not a dictionary", page_num)))?;

        let media_box = match inherited(doc, page_dict, b"MediaBox") {
            Some(obj) => parse_box(obj)?,
            // Default to US Letter size
            None => [0.0, 0.0, 612.0, 792.0],
        };
        let (width, height) = (media_box[2] - media_box[0], media_box[3] - media_box[1]);

        let rotation = inherited(doc, page_dict, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(normalize_rotation)
            .unwrap_or(0);

        Ok(Self {
            page_num,
            width: width as f32,
            height: height as f32,
            rotation,
            has_content: page_dict.has(b"Contents"),
            orientation: orientation(width, height, rotation),
        })
    }

    /// Same page with an extra editor rotation applied on top
    pub fn rotated(mut self, extra: i32) -> Self {
        self.rotation = normalize_rotation(i64::from(self.rotation) + i64::from(extra));
        self.orientation = orientation(self.width as f64, self.height as f64, self.rotation);
        self
    }
}

fn orientation(width: f64, height: f64, rotation: i32) -> PageOrientation {
    let (w, h) = if rotation == 90 || rotation == 270 {
        (height, width)
    } else {
        (width, height)
    };

    if (w - h).abs() < 1.0 {
        PageOrientation::Square
    } else if w > h {
        PageOrientation::Landscape
    } else {
        PageOrientation::Portrait
    }
}

/// Look up `key` on the page or, failing that, on its ancestors
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_object(parent_id).and_then(Object::as_dict).ok()?;
    }
    None
}

/// Parse a box array [x1, y1, x2, y2]
fn parse_box(obj: &Object) -> Result<[f64; 4], PdfEditError> {
    let array = obj
        .as_array()
        .map_err(|_| PdfEditError::ParseError("MediaBox is not an array".into()))?;
    if array.len() != 4 {
        return Err(PdfEditError::ParseError(
            "MediaBox must have 4 elements".into(),
        ));
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(PdfEditError::ParseError(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_inherited_pdf, create_test_pdf};

    #[test]
    fn test_page_info_letter_portrait() {
        let doc = Document::load_mem(&create_test_pdf(2, "I")).unwrap();
        let info = PageInfo::from_document(&doc, 2).unwrap();
        assert_eq!(info.width, 612.0);
        assert_eq!(info.height, 792.0);
        assert_eq!(info.rotation, 0);
        assert!(info.has_content);
        assert_eq!(info.orientation, PageOrientation::Portrait);
    }

    #[test]
    fn test_page_info_missing_page() {
        let doc = Document::load_mem(&create_test_pdf(1, "I")).unwrap();
        assert!(PageInfo::from_document(&doc, 2).is_err());
    }

    #[test]
    fn test_page_info_inherits_media_box() {
        let doc = Document::load_mem(&create_inherited_pdf(1)).unwrap();
        let info = PageInfo::from_document(&doc, 1).unwrap();
        assert_eq!(info.width, 420.0);
        assert_eq!(info.height, 595.0);
    }

    #[test]
    fn test_rotated_flips_orientation() {
        let doc = Document::load_mem(&create_test_pdf(1, "I")).unwrap();
        let info = PageInfo::from_document(&doc, 1).unwrap().rotated(90);
        assert_eq!(info.rotation, 90);
        assert_eq!(info.orientation, PageOrientation::Landscape);
    }

    #[test]
    fn test_rotated_with_huge_extra_rotation() {
        let doc = Document::load_mem(&create_test_pdf(1, "I")).unwrap();
        let info = PageInfo::from_document(&doc, 1)
            .unwrap()
            .rotated(270)
            .rotated(2_147_483_610);
        assert_eq!(info.rotation, 0);
        assert_eq!(info.orientation, PageOrientation::Portrait);
    }

    #[test]
    fn test_parse_box() {
        let array = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(612.0),
            Object::Real(792.0),
        ]);
        assert_eq!(parse_box(&array).unwrap(), [0.0, 0.0, 612.0, 792.0]);
        assert!(parse_box(&Object::Array(vec![Object::Integer(0)])).is_err());
    }
}
