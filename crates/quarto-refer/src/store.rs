/*
 * store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The reference store and citation numbering.
//!
//! All references are loaded before the document is scanned. Citing a
//! reference for the first time gives it the next citation number and
//! appends it to the cited list; the number never changes afterwards.

use crate::reference::Reference;

#[derive(Debug, Default)]
pub struct ReferenceStore {
    references: Vec<Reference>,
    /// Store indices in first-citation order; position `i` has id `i + 1`.
    cited: Vec<usize>,
}

impl ReferenceStore {
    pub fn new(references: Vec<Reference>) -> Self {
        Self {
            references,
            cited: Vec::new(),
        }
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn get(&self, index: usize) -> Option<&Reference> {
        self.references.get(index)
    }

    /// Record a citation of the reference at `index` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds; indices come from a matcher run
    /// over this store.
    pub fn cite(&mut self, index: usize) -> usize {
        let reference = &mut self.references[index];
        if let Some(id) = reference.citation_id {
            return id;
        }
        self.cited.push(index);
        let id = self.cited.len();
        reference.citation_id = Some(id);
        id
    }

    /// The reference with citation id `id`.
    pub fn cited(&self, id: usize) -> Option<&Reference> {
        let index = *self.cited.get(id.checked_sub(1)?)?;
        self.references.get(index)
    }

    /// All cited references in first-citation order.
    pub fn cited_references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.cited.iter().map(|&index| &self.references[index])
    }

    pub fn cited_count(&self) -> usize {
        self.cited.len()
    }
}
