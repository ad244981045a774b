//! The read-only structural model: models, units, bonds, and derived
//! structure views.
//!
//! A [`Structure`] is an immutable collection of [`Unit`]s. Derived views
//! ([`Structure::filtered`]) keep unit ids stable while trimming element
//! subsets; the representation layer reconciles bond numbering between a
//! view and its root via the mappings in [`crate::repr::bond`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::StrandError;
use crate::structure::bonds::{InterUnitBonds, IntraBonds};

pub mod bonds;
pub mod model;
pub mod segment;
mod unit;

pub use unit::{Unit, UnitKind};

/// Model-level atom index.
pub type ElementIndex = u32;
/// Index into a unit's element list.
pub type UnitElementIndex = u32;
/// Model-level residue index.
pub type ResidueIndex = u32;
/// Structure-level flat element index (across all units, in unit order).
pub type SerialIndex = u32;
/// Stable unit identifier, shared between parent and derived views.
pub type UnitId = u32;
/// Identity of a structure hierarchy (root structure id).
pub type StructureId = u32;

static NEXT_STRUCTURE_ID: AtomicU32 = AtomicU32::new(1);

/// An immutable collection of units plus the tables that span them.
#[derive(Debug)]
pub struct Structure {
    id: StructureId,
    units: Vec<Unit>,
    unit_map: FxHashMap<UnitId, u32>,
    inter_unit_bonds: InterUnitBonds,
    serial_offsets: Vec<SerialIndex>,
    parent: Option<Arc<Structure>>,
}

impl Structure {
    /// Validate and assemble a root structure.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError`] on duplicate unit ids or inter-unit bonds
    /// referencing unknown units / out-of-range endpoints.
    pub fn new(
        units: Vec<Unit>,
        inter_unit_bonds: InterUnitBonds,
    ) -> Result<Self, StrandError> {
        let mut unit_map = FxHashMap::default();
        for (i, unit) in units.iter().enumerate() {
            if unit_map.insert(unit.id(), i as u32).is_some() {
                return Err(StrandError::DuplicateUnit { unit: unit.id() });
            }
        }
        for edge in inter_unit_bonds.edges() {
            for (id, index) in
                [(edge.unit_a, edge.index_a), (edge.unit_b, edge.index_b)]
            {
                let Some(&pos) = unit_map.get(&id) else {
                    return Err(StrandError::UnknownUnit { unit: id });
                };
                let count = units[pos as usize].element_count();
                if index as usize >= count {
                    return Err(StrandError::BondEndpointOutOfRange {
                        index,
                        count,
                    });
                }
            }
        }

        let serial_offsets = serial_offsets(&units);
        Ok(Self {
            id: NEXT_STRUCTURE_ID.fetch_add(1, Ordering::Relaxed),
            units,
            unit_map,
            inter_unit_bonds,
            serial_offsets,
            parent: None,
        })
    }

    /// Derive a filtered child view keeping the elements `keep` accepts.
    ///
    /// Unit ids are preserved; units left with no elements are dropped, and
    /// bonds lose every edge with a pruned endpoint. The child records
    /// `parent` as its root, so picking against the child can be remapped.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; with a well-formed parent these
    /// indicate a bug in `keep`-driven reindexing and cannot occur.
    pub fn filtered(
        parent: &Arc<Self>,
        keep: impl Fn(UnitId, ElementIndex) -> bool,
    ) -> Result<Self, StrandError> {
        let mut units = Vec::new();
        for unit in &parent.units {
            let elements: Vec<ElementIndex> = unit
                .elements()
                .iter()
                .copied()
                .filter(|&e| keep(unit.id(), e))
                .collect();
            if elements.is_empty() {
                continue;
            }

            let local_of = |e: ElementIndex| -> Option<UnitElementIndex> {
                elements.binary_search(&e).ok().map(|i| i as UnitElementIndex)
            };
            let pairs: Vec<_> = unit
                .bonds()
                .undirected_pairs()
                .filter_map(|(x, y, f)| {
                    let ex = unit.element_at(x);
                    let ey = unit.element_at(y);
                    Some((local_of(ex)?, local_of(ey)?, f))
                })
                .collect();
            let bonds = IntraBonds::from_pairs(elements.len(), &pairs)?;

            units.push(Unit::new(
                unit.id(),
                unit.kind(),
                Arc::clone(unit.model()),
                elements,
                bonds,
            )?);
        }

        let unit_index: FxHashMap<UnitId, usize> = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id(), i))
            .collect();
        let remap = |id: UnitId, parent_local: UnitElementIndex| {
            let parent_unit = parent.unit(id)?;
            let child = &units[*unit_index.get(&id)?];
            child.find_element(parent_unit.element_at(parent_local))
        };
        let inter_pairs: Vec<_> = parent
            .inter_unit_bonds
            .edges()
            .iter()
            .filter(|e| (e.unit_a, e.index_a) < (e.unit_b, e.index_b))
            .filter_map(|e| {
                let ia = remap(e.unit_a, e.index_a)?;
                let ib = remap(e.unit_b, e.index_b)?;
                Some((e.unit_a, ia, e.unit_b, ib, e.flags))
            })
            .collect();

        let serials = serial_offsets(&units);
        Ok(Self {
            id: NEXT_STRUCTURE_ID.fetch_add(1, Ordering::Relaxed),
            unit_map: unit_index
                .into_iter()
                .map(|(id, i)| (id, i as u32))
                .collect(),
            units,
            inter_unit_bonds: InterUnitBonds::from_pairs(&inter_pairs),
            serial_offsets: serials,
            parent: Some(Arc::clone(parent)),
        })
    }

    /// This structure's own id.
    pub fn id(&self) -> StructureId {
        self.id
    }

    /// The unfiltered root of this structure's hierarchy (itself, for a
    /// root).
    pub fn root(&self) -> &Structure {
        self.parent.as_deref().map_or(self, Structure::root)
    }

    /// Id of the hierarchy root; two structures are equivalent iff these
    /// match.
    pub fn root_id(&self) -> StructureId {
        self.root().id
    }

    /// Whether two structures belong to the same hierarchy.
    pub fn are_equivalent(&self, other: &Structure) -> bool {
        self.root_id() == other.root_id()
    }

    /// All units, in serial order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit by id.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unit_map.get(&id).map(|&i| &self.units[i as usize])
    }

    /// Cross-unit bond table.
    pub fn inter_unit_bonds(&self) -> &InterUnitBonds {
        &self.inter_unit_bonds
    }

    /// Flat serial index of a unit-local element.
    pub fn serial_of(
        &self,
        unit: UnitId,
        index: UnitElementIndex,
    ) -> Option<SerialIndex> {
        let &pos = self.unit_map.get(&unit)?;
        if (index as usize) < self.units[pos as usize].element_count() {
            Some(self.serial_offsets[pos as usize] + index)
        } else {
            None
        }
    }

    /// Resolve a serial index back to `(unit, unit-local element)`.
    pub fn location_of_serial(
        &self,
        serial: SerialIndex,
    ) -> Option<(UnitId, UnitElementIndex)> {
        let pos = match self.serial_offsets.binary_search(&serial) {
            Ok(p) => p,
            Err(p) => p.checked_sub(1)?,
        };
        let unit = self.units.get(pos)?;
        let local = serial - self.serial_offsets[pos];
        ((local as usize) < unit.element_count())
            .then(|| (unit.id(), local))
    }
}

fn serial_offsets(units: &[Unit]) -> Vec<SerialIndex> {
    let mut offsets = Vec::with_capacity(units.len());
    let mut total = 0;
    for unit in units {
        offsets.push(total);
        total += unit.element_count() as SerialIndex;
    }
    offsets
}

/// A group of symmetry-equivalent units rendered by one visual; the picking
/// instance id indexes into it.
#[derive(Debug, Clone)]
pub struct UnitGroup {
    units: Vec<UnitId>,
    unit_index_map: FxHashMap<UnitId, u32>,
}

impl UnitGroup {
    /// Group the given unit ids, in instance order.
    pub fn new(units: Vec<UnitId>) -> Self {
        let unit_index_map = units
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();
        Self {
            units,
            unit_index_map,
        }
    }

    /// Unit ids in instance order.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the group has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Instance index of a unit id within the group.
    pub fn index_of(&self, unit: UnitId) -> Option<u32> {
        self.unit_index_map.get(&unit).copied()
    }
}

/// A structure together with one of its unit groups; the context every
/// picking query carries.
#[derive(Debug, Clone, Copy)]
pub struct StructureGroup<'a> {
    /// The structure the group's geometry was generated against.
    pub structure: &'a Structure,
    /// The rendered unit group.
    pub group: &'a UnitGroup,
}

#[cfg(test)]
pub(crate) mod testing;
