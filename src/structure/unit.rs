//! Units: one chain/molecule instance within a structure.

use std::sync::Arc;

use glam::Vec3;

use crate::error::StrandError;
use crate::geometry::sphere3d::Sphere3D;
use crate::structure::bonds::IntraBonds;
use crate::structure::model::Model;
use crate::structure::segment::{PolymerRangeIter, ResidueIter};
use crate::structure::{ElementIndex, UnitElementIndex, UnitId};

/// The granularity a unit's elements are modeled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Full atomic detail; carries a bond table.
    Atomic,
    /// Coarse-grained (one element per residue or bead); no bonds.
    Coarse,
}

/// One contiguous chain/molecule instance within a [`Structure`].
///
/// A unit owns a strictly sorted subset of the model's elements plus the
/// bonds among them. Units derived from the same parent keep the parent's
/// `id`, which is how picking results stay resolvable across filtered
/// structure views.
///
/// [`Structure`]: crate::structure::Structure
#[derive(Debug, Clone)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    model: Arc<Model>,
    elements: Vec<ElementIndex>,
    polymer_elements: Vec<ElementIndex>,
    bonds: IntraBonds,
    boundary: Sphere3D,
}

impl Unit {
    /// Validate and build a unit.
    ///
    /// `elements` must be strictly sorted model element indices; bond
    /// endpoints are unit-local. The polymer trace elements and the boundary
    /// sphere are derived here.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError`] for unsorted/out-of-range elements or bond
    /// endpoints outside the element list.
    pub fn new(
        id: UnitId,
        kind: UnitKind,
        model: Arc<Model>,
        elements: Vec<ElementIndex>,
        bonds: IntraBonds,
    ) -> Result<Self, StrandError> {
        for w in elements.windows(2) {
            if w[0] >= w[1] {
                return Err(StrandError::UnsortedElements { unit: id });
            }
        }
        if let Some(&last) = elements.last() {
            if last as usize >= model.atom_count() {
                return Err(StrandError::ElementOutOfRange {
                    element: last,
                    count: model.atom_count(),
                });
            }
        }
        let directed = bonds.directed_count() as usize;
        for t in 0..directed {
            for idx in [bonds.a()[t], bonds.b()[t]] {
                if idx as usize >= elements.len() {
                    return Err(StrandError::BondEndpointOutOfRange {
                        index: idx,
                        count: elements.len(),
                    });
                }
            }
        }

        let polymer_elements = derive_polymer_elements(&model, &elements);
        let boundary =
            Sphere3D::from_points(elements.iter().map(|&e| model.position(e)));

        Ok(Self {
            id,
            kind,
            model,
            elements,
            polymer_elements,
            bonds,
            boundary,
        })
    }

    /// Stable unit id, shared with parent/child views of the same unit.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Modeling granularity.
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Whether the unit carries atomic detail (and thus bonds).
    pub fn is_atomic(&self) -> bool {
        self.kind == UnitKind::Atomic
    }

    /// The shared model tables.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Strictly sorted model element indices.
    pub fn elements(&self) -> &[ElementIndex] {
        &self.elements
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Trace element per polymer residue, in chain order.
    pub fn polymer_elements(&self) -> &[ElementIndex] {
        &self.polymer_elements
    }

    /// Intra-unit bond table.
    pub fn bonds(&self) -> &IntraBonds {
        &self.bonds
    }

    /// Bounding sphere of the unit's elements.
    pub fn boundary(&self) -> Sphere3D {
        self.boundary
    }

    /// Invariant-frame position of a model element.
    pub fn position(&self, element: ElementIndex) -> Vec3 {
        self.model.position(element)
    }

    /// Unit-local index of a model element, if present.
    pub fn find_element(
        &self,
        element: ElementIndex,
    ) -> Option<UnitElementIndex> {
        self.elements
            .binary_search(&element)
            .ok()
            .map(|i| i as UnitElementIndex)
    }

    /// Model element at a unit-local index.
    pub fn element_at(&self, index: UnitElementIndex) -> ElementIndex {
        self.elements[index as usize]
    }
}

/// Collect the trace element of every polymer residue the unit covers.
fn derive_polymer_elements(
    model: &Model,
    elements: &[ElementIndex],
) -> Vec<ElementIndex> {
    let mut out = Vec::new();
    let mut residue_it = ResidueIter::new(model, elements);
    for range in PolymerRangeIter::new(model, elements) {
        residue_it.reset(range);
        for seg in &mut residue_it {
            out.push(model.trace_element(seg.index));
        }
    }
    out
}
