//! Restartable segmentation cursors over a unit's sorted element list.
//!
//! Two levels: [`PolymerRangeIter`] yields maximal runs of elements covered
//! by the model's polymer ranges, and [`ResidueIter`] yields per-residue
//! runs within a window. The residue cursor is re-targeted to each polymer
//! range via [`ResidueIter::reset`]; both are plain values with O(1)
//! transition state, so abandoning one mid-run is harmless.

use crate::structure::model::Model;
use crate::structure::{ElementIndex, ResidueIndex};

/// A contiguous run of a unit's elements, as positions into the element
/// list (not element values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSegment {
    /// First covered position.
    pub start: usize,
    /// One past the last covered position.
    pub end: usize,
}

impl ElementSegment {
    /// Number of covered positions.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the segment covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Cursor over the maximal runs of a unit's elements that fall inside the
/// model's polymer ranges. Empty runs are skipped.
pub struct PolymerRangeIter<'a> {
    elements: &'a [ElementIndex],
    ranges: &'a [(ElementIndex, ElementIndex)],
    range_cursor: usize,
    element_cursor: usize,
}

impl<'a> PolymerRangeIter<'a> {
    /// Cursor over `elements` (strictly sorted) against the model's sorted
    /// polymer ranges.
    pub fn new(model: &'a Model, elements: &'a [ElementIndex]) -> Self {
        Self {
            elements,
            ranges: model.polymer_ranges(),
            range_cursor: 0,
            element_cursor: 0,
        }
    }
}

impl Iterator for PolymerRangeIter<'_> {
    type Item = ElementSegment;

    fn next(&mut self) -> Option<Self::Item> {
        while self.range_cursor < self.ranges.len() {
            let (lo, hi) = self.ranges[self.range_cursor];
            self.range_cursor += 1;

            // Both lists are sorted, so the scan never backtracks.
            while self.element_cursor < self.elements.len()
                && self.elements[self.element_cursor] < lo
            {
                self.element_cursor += 1;
            }
            let start = self.element_cursor;
            while self.element_cursor < self.elements.len()
                && self.elements[self.element_cursor] < hi
            {
                self.element_cursor += 1;
            }
            if self.element_cursor > start {
                return Some(ElementSegment {
                    start,
                    end: self.element_cursor,
                });
            }
        }
        None
    }
}

/// One residue's run of element positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueSegment {
    /// The residue all covered elements belong to.
    pub index: ResidueIndex,
    /// First covered position into the unit's element list.
    pub start: usize,
    /// One past the last covered position.
    pub end: usize,
}

/// Cursor over per-residue element runs within a window of a unit's element
/// list.
pub struct ResidueIter<'a> {
    model: &'a Model,
    elements: &'a [ElementIndex],
    cursor: usize,
    end: usize,
}

impl<'a> ResidueIter<'a> {
    /// Cursor over the full element list.
    pub fn new(model: &'a Model, elements: &'a [ElementIndex]) -> Self {
        Self {
            model,
            elements,
            cursor: 0,
            end: elements.len(),
        }
    }

    /// Re-target the cursor to a new window in O(1).
    pub fn reset(&mut self, segment: ElementSegment) {
        self.cursor = segment.start;
        self.end = segment.end.min(self.elements.len());
    }
}

impl Iterator for ResidueIter<'_> {
    type Item = ResidueSegment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let start = self.cursor;
        let residue = self.model.residue_of(self.elements[start]);
        self.cursor += 1;
        while self.cursor < self.end
            && self.model.residue_of(self.elements[self.cursor]) == residue
        {
            self.cursor += 1;
        }
        Some(ResidueSegment {
            index: residue,
            start,
            end: self.cursor,
        })
    }
}
