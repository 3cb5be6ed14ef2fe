//! Page order bookkeeping
//!
//! The editor never touches the uploaded PDFs while the user works. Instead it
//! keeps a `PageOrder`: display position -> (source document, source page).
//! Moves, deletions and merges only rewrite this list; the bytes are rebuilt
//! once, on export.

use crate::command::PageCommand;
use crate::error::PdfEditError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One displayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    /// Source document index (upload order, 0-based)
    pub doc: usize,
    /// Source page number (1-based)
    pub page: u32,
    /// Extra clockwise rotation applied on export (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: i32,
}

impl PageRef {
    pub fn new(doc: usize, page: u32) -> Self {
        Self {
            doc,
            page,
            rotation: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOrder {
    entries: Vec<PageRef>,
}

impl PageOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an order from explicit entries, rejecting duplicates and
    /// rotations that are not multiples of 90 degrees
    pub fn from_entries(entries: Vec<PageRef>) -> Result<Self, PdfEditError> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if entry.page == 0 {
                return Err(PdfEditError::InvalidOrder("page numbers start at 1".into()));
            }
            if entry.rotation % 90 != 0 {
                return Err(PdfEditError::InvalidOrder(format!(
                    "rotation {} is not a multiple of 90",
                    entry.rotation
                )));
            }
            if !seen.insert((entry.doc, entry.page)) {
                return Err(PdfEditError::InvalidOrder(format!(
                    "page {} of document {} appears twice",
                    entry.page, entry.doc
                )));
            }
        }

        Ok(Self {
            entries: entries
                .into_iter()
                .map(|entry| PageRef {
                    rotation: normalize_rotation(entry.rotation.into()),
                    ..entry
                })
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PageRef] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageRef> {
        self.entries.iter()
    }

    pub fn get(&self, position: usize) -> Result<&PageRef, PdfEditError> {
        self.entries.get(position).ok_or(PdfEditError::InvalidPosition {
            position,
            len: self.entries.len(),
        })
    }

    /// Append every page of a newly uploaded document (the merge step)
    pub fn append_document(&mut self, doc: usize, page_count: u32) {
        self.entries
            .extend((1..=page_count).map(|page| PageRef::new(doc, page)));
    }

    /// Move the page at `from` so that it ends up at `to`
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), PdfEditError> {
        self.check_position(from)?;
        self.check_position(to)?;

        if from != to {
            let page = self.entries.remove(from);
            self.entries.insert(to, page);
        }
        Ok(())
    }

    pub fn delete_page(&mut self, position: usize) -> Result<PageRef, PdfEditError> {
        self.check_position(position)?;
        Ok(self.entries.remove(position))
    }

    /// Delete several positions at once.
    ///
    /// Positions refer to the order before any deletion. Either every position
    /// is valid and all of them are removed, or nothing changes.
    pub fn delete_positions(&mut self, positions: &[usize]) -> Result<usize, PdfEditError> {
        let unique: BTreeSet<usize> = positions.iter().copied().collect();
        for &position in &unique {
            self.check_position(position)?;
        }

        // Remove from the back so earlier positions stay valid
        for &position in unique.iter().rev() {
            self.entries.remove(position);
        }
        Ok(unique.len())
    }

    pub fn rotate_page(&mut self, position: usize, degrees: i32) -> Result<i32, PdfEditError> {
        if degrees % 90 != 0 {
            return Err(PdfEditError::InvalidOrder(format!(
                "Rotation must be a multiple of 90 degrees, got {}",
                degrees
            )));
        }
        self.check_position(position)?;

        let entry = &mut self.entries[position];
        entry.rotation = normalize_rotation(i64::from(entry.rotation) + i64::from(degrees));
        Ok(entry.rotation)
    }

    /// Apply a permutation: `new_order[i]` is the current position of the page
    /// that should be displayed at position `i`
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<(), PdfEditError> {
        if new_order.len() != self.entries.len() {
            return Err(PdfEditError::InvalidOrder(format!(
                "expected {} positions, got {}",
                self.entries.len(),
                new_order.len()
            )));
        }

        let mut seen = vec![false; self.entries.len()];
        for &idx in new_order {
            self.check_position(idx)?;
            if seen[idx] {
                return Err(PdfEditError::InvalidOrder(format!(
                    "duplicate position {}",
                    idx
                )));
            }
            seen[idx] = true;
        }

        self.entries = new_order.iter().map(|&idx| self.entries[idx]).collect();
        Ok(())
    }

    /// Drop all pages of `doc` and shift higher document indices down
    pub fn remove_document(&mut self, doc: usize) {
        self.entries.retain(|entry| entry.doc != doc);
        for entry in &mut self.entries {
            if entry.doc > doc {
                entry.doc -= 1;
            }
        }
    }

    /// Indices of the source documents still referenced, ascending
    pub fn referenced_documents(&self) -> Vec<usize> {
        let docs: BTreeSet<usize> = self.entries.iter().map(|e| e.doc).collect();
        docs.into_iter().collect()
    }

    pub fn apply(&mut self, command: &PageCommand) -> Result<(), PdfEditError> {
        match command {
            PageCommand::Move { from, to } => self.move_page(*from, *to),
            PageCommand::Delete { position } => self.delete_page(*position).map(|_| ()),
            PageCommand::DeleteRange { range } => {
                let positions = display_positions(range, self.entries.len())?;
                self.delete_positions(&positions).map(|_| ())
            }
            PageCommand::Rotate { position, degrees } => {
                self.rotate_page(*position, *degrees).map(|_| ())
            }
            PageCommand::Reorder { order } => self.reorder(order),
        }
    }

    /// Apply a batch of commands; on failure the order is left untouched
    pub fn apply_all(&mut self, commands: &[PageCommand]) -> Result<(), PdfEditError> {
        let mut scratch = self.clone();
        for command in commands {
            scratch.apply(command)?;
        }
        *self = scratch;
        Ok(())
    }

    fn check_position(&self, position: usize) -> Result<(), PdfEditError> {
        if position >= self.entries.len() {
            return Err(PdfEditError::InvalidPosition {
                position,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

/// Convert a 1-based range string ("2, 4-5") into 0-based display positions
pub fn display_positions(range: &str, len: usize) -> Result<Vec<usize>, PdfEditError> {
    let max = u32::try_from(len).unwrap_or(u32::MAX);
    let pages = crate::parse_ranges_within(range, max)?;
    if pages.is_empty() {
        return Err(PdfEditError::InvalidRange("No pages specified".into()));
    }

    Ok(pages.into_iter().map(|page| page as usize - 1).collect())
}

/// Normalize rotation to 0, 90, 180, or 270.
/// Takes `i64` so sums of two `i32` angles and raw PDF integers never overflow.
pub fn normalize_rotation(angle: i64) -> i32 {
    angle.rem_euclid(360) as i32
}
