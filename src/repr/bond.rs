//! Bond-index mapping, bond picking, and highlight propagation.
//!
//! Geometry generated against a filtered structure view tags bond primitives
//! with the view's own edge numbering, plus synthetic extension slots for
//! bonds whose partner endpoint was pruned from the view (boundary stubs).
//! [`BondIndexMapping`] reconciles that numbering with the unfiltered root's
//! so picking ids stay resolvable in both directions. Mappings are cheap
//! (O(edge count)) and computed fresh per query; they must never be cached
//! across structure changes, since unit ids are stable but element subsets
//! are not.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::repr::location::{Location, LocationIterator};
use crate::repr::loci::{BondLocation, Interval, Loci, PickingId};
use crate::structure::bonds::BondFlags;
use crate::structure::{
    ElementIndex, SerialIndex, Structure, StructureGroup, Unit,
};

/// Bond rendering/filtering props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondProps {
    /// Bond types to render.
    pub include_types: BondFlags,
    /// Bond types to suppress even when included.
    pub exclude_types: BondFlags,
    /// Whether bonds to hydrogens are suppressed.
    pub ignore_hydrogens: bool,
}

impl Default for BondProps {
    fn default() -> Self {
        Self {
            include_types: BondFlags::ALL,
            exclude_types: BondFlags::NONE,
            ignore_hydrogens: false,
        }
    }
}

/// Whether a bond type is suppressed under an include/exclude mask pair.
pub fn ignore_bond_type(
    include: BondFlags,
    exclude: BondFlags,
    flags: BondFlags,
) -> bool {
    !include.intersects(flags) || exclude.intersects(flags)
}

/// Which tests a bond filter applies. `Never` is a first-class state: the
/// filter suppresses nothing, and callers may skip the edge loop entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// No edge is ever suppressed.
    Never,
    /// Suppress by bond type masks only.
    Flags,
    /// Suppress hydrogen-terminated edges only.
    Hydrogens,
    /// Both tests.
    FlagsAndHydrogens,
}

fn filter_mode(props: &BondProps) -> FilterMode {
    let all_types =
        props.include_types.is_all() && props.exclude_types.is_none();
    match (all_types, props.ignore_hydrogens) {
        (true, false) => FilterMode::Never,
        (true, true) => FilterMode::Hydrogens,
        (false, false) => FilterMode::Flags,
        (false, true) => FilterMode::FlagsAndHydrogens,
    }
}

/// Per-edge suppression test over a unit's intra bonds.
pub struct IntraBondFilter<'a> {
    unit: &'a Unit,
    include: BondFlags,
    exclude: BondFlags,
    mode: FilterMode,
}

impl<'a> IntraBondFilter<'a> {
    /// Build the filter a unit's bond props imply.
    pub fn new(unit: &'a Unit, props: &BondProps) -> Self {
        Self {
            unit,
            include: props.include_types,
            exclude: props.exclude_types,
            mode: filter_mode(props),
        }
    }

    /// The tests this filter applies.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Whether the filter suppresses nothing.
    pub fn is_trivial(&self) -> bool {
        self.mode == FilterMode::Never
    }

    /// Whether a directed edge is suppressed.
    pub fn ignores(&self, edge: u32) -> bool {
        match self.mode {
            FilterMode::Never => false,
            FilterMode::Flags => self.ignores_type(edge),
            FilterMode::Hydrogens => self.ignores_hydrogen(edge),
            FilterMode::FlagsAndHydrogens => {
                self.ignores_hydrogen(edge) || self.ignores_type(edge)
            }
        }
    }

    fn ignores_type(&self, edge: u32) -> bool {
        ignore_bond_type(
            self.include,
            self.exclude,
            self.unit.bonds().flags()[edge as usize],
        )
    }

    fn ignores_hydrogen(&self, edge: u32) -> bool {
        let bonds = self.unit.bonds();
        let model = self.unit.model();
        let a = self.unit.element_at(bonds.a()[edge as usize]);
        let b = self.unit.element_at(bonds.b()[edge as usize]);
        model.is_hydrogen(a) || model.is_hydrogen(b)
    }
}

/// Per-edge suppression test over a structure's inter-unit bonds.
pub struct InterBondFilter<'a> {
    structure: &'a Structure,
    include: BondFlags,
    exclude: BondFlags,
    mode: FilterMode,
}

impl<'a> InterBondFilter<'a> {
    /// Build the filter a structure's bond props imply.
    pub fn new(structure: &'a Structure, props: &BondProps) -> Self {
        Self {
            structure,
            include: props.include_types,
            exclude: props.exclude_types,
            mode: filter_mode(props),
        }
    }

    /// The tests this filter applies.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Whether the filter suppresses nothing.
    pub fn is_trivial(&self) -> bool {
        self.mode == FilterMode::Never
    }

    /// Whether a directed inter-unit edge is suppressed.
    pub fn ignores(&self, edge: u32) -> bool {
        match self.mode {
            FilterMode::Never => false,
            FilterMode::Flags => self.ignores_type(edge),
            FilterMode::Hydrogens => self.ignores_hydrogen(edge),
            FilterMode::FlagsAndHydrogens => {
                self.ignores_hydrogen(edge) || self.ignores_type(edge)
            }
        }
    }

    fn ignores_type(&self, edge: u32) -> bool {
        let flags =
            self.structure.inter_unit_bonds().edges()[edge as usize].flags;
        ignore_bond_type(self.include, self.exclude, flags)
    }

    fn ignores_hydrogen(&self, edge: u32) -> bool {
        let e = &self.structure.inter_unit_bonds().edges()[edge as usize];
        let is_h = |unit_id, index| {
            self.structure.unit(unit_id).is_some_and(|u| {
                u.model().is_hydrogen(u.element_at(index))
            })
        };
        is_h(e.unit_a, e.index_a) || is_h(e.unit_b, e.index_b)
    }
}

/// What a resolved (child-view) bond index stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBond<E> {
    /// A canonical edge; carries the parent edge it maps back to.
    Canonical(u32),
    /// A synthetic boundary stub; carries the surviving endpoint.
    Boundary(E),
}

/// Bidirectional mapping between a parent structure's bond-edge numbering
/// and a child view's, including synthetic extension slots for boundary
/// stubs.
///
/// Owns the two synchronized lookup tables plus the next-free synthetic
/// counter; entries only enter through the mapping builders, which keep the
/// inverse invariant (`parent_for_index(index_for_parent(i)) == i`) by
/// construction.
#[derive(Debug, Clone)]
pub struct BondIndexMapping<E> {
    canonical_limit: u32,
    next_synthetic: u32,
    index_from_parent: FxHashMap<u32, u32>,
    parent_from_index: FxHashMap<u32, u32>,
    element_from_index: FxHashMap<u32, E>,
}

impl<E: Copy> BondIndexMapping<E> {
    fn new(canonical_limit: u32) -> Self {
        Self {
            canonical_limit,
            next_synthetic: canonical_limit,
            index_from_parent: FxHashMap::default(),
            parent_from_index: FxHashMap::default(),
            element_from_index: FxHashMap::default(),
        }
    }

    fn insert_canonical(&mut self, parent_edge: u32, index: u32) {
        let _ = self.index_from_parent.insert(parent_edge, index);
        let _ = self.parent_from_index.insert(index, parent_edge);
    }

    fn insert_boundary(&mut self, parent_edge: u32, element: E) -> u32 {
        let index = self.next_synthetic;
        self.next_synthetic += 1;
        let _ = self.element_from_index.insert(index, element);
        self.insert_canonical(parent_edge, index);
        index
    }

    /// First synthetic index; everything below is canonical child numbering.
    pub fn canonical_limit(&self) -> u32 {
        self.canonical_limit
    }

    /// Number of parent edges that resolved to a child-view index.
    pub fn mapped_count(&self) -> usize {
        self.index_from_parent.len()
    }

    /// Child-view index of a parent edge.
    pub fn index_for_parent(&self, parent_edge: u32) -> Option<u32> {
        self.index_from_parent.get(&parent_edge).copied()
    }

    /// Parent edge of a child-view index (canonical or synthetic).
    pub fn parent_for_index(&self, index: u32) -> Option<u32> {
        self.parent_from_index.get(&index).copied()
    }

    /// Surviving endpoint of a synthetic index.
    pub fn boundary_element(&self, index: u32) -> Option<E> {
        self.element_from_index.get(&index).copied()
    }

    /// Whether an index lies in the synthetic extension range.
    pub fn is_synthetic(&self, index: u32) -> bool {
        index >= self.canonical_limit
    }

    /// Resolve a child-view index to its meaning.
    pub fn lookup(&self, index: u32) -> Option<ResolvedBond<E>> {
        if self.is_synthetic(index) {
            self.boundary_element(index).map(ResolvedBond::Boundary)
        } else {
            self.parent_for_index(index).map(ResolvedBond::Canonical)
        }
    }

    #[cfg(test)]
    pub(crate) fn synthetic_indices(&self) -> Vec<u32> {
        let mut keys: Vec<u32> =
            self.element_from_index.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// Map every directed intra-unit edge of `parent` into `child`'s numbering.
///
/// Both endpoints present in the child resolve to the child's own edge
/// index; a surviving first endpoint with a pruned partner gets a synthetic
/// slot starting at `child.bonds().directed_count()`; edges fully outside
/// the child are skipped.
pub fn intra_bond_index_mapping(
    parent: &Unit,
    child: &Unit,
) -> BondIndexMapping<ElementIndex> {
    let mut mapping = BondIndexMapping::new(child.bonds().directed_count());
    let bonds = parent.bonds();
    for i in 0..bonds.directed_count() {
        let e_a = parent.element_at(bonds.a()[i as usize]);
        let e_b = parent.element_at(bonds.b()[i as usize]);
        match (child.find_element(e_a), child.find_element(e_b)) {
            (Some(a), Some(b)) => {
                if let Some(index) = child.bonds().directed_edge_index(a, b) {
                    mapping.insert_canonical(i, index);
                }
            }
            (Some(_), None) => {
                let _ = mapping.insert_boundary(i, e_a);
            }
            (None, _) => {}
        }
    }
    mapping
}

/// Map every directed inter-unit edge of `parent` into `child`'s numbering.
///
/// Synthetic slots start at `child.inter_unit_bonds().edge_count()` and
/// carry the surviving endpoint as a child serial index.
pub fn inter_bond_index_mapping(
    parent: &Structure,
    child: &Structure,
) -> BondIndexMapping<SerialIndex> {
    let mut mapping =
        BondIndexMapping::new(child.inter_unit_bonds().edge_count());

    let child_local = |unit_id, parent_local| {
        let parent_unit = parent.unit(unit_id)?;
        let child_unit = child.unit(unit_id)?;
        child_unit.find_element(parent_unit.element_at(parent_local))
    };

    for (i, edge) in parent.inter_unit_bonds().edges().iter().enumerate() {
        let i = i as u32;
        let Some(local_a) = child_local(edge.unit_a, edge.index_a) else {
            continue;
        };
        let canonical = child_local(edge.unit_b, edge.index_b).and_then(
            |local_b| {
                child.inter_unit_bonds().edge_index(
                    local_a,
                    edge.unit_a,
                    local_b,
                    edge.unit_b,
                )
            },
        );
        if let Some(index) = canonical {
            mapping.insert_canonical(i, index);
        } else if let Some(serial) = child.serial_of(edge.unit_a, local_a) {
            let _ = mapping.insert_boundary(i, serial);
        }
    }
    mapping
}

/// Location cursor for intra-bond-tagged geometry: one group per resolved
/// bond index (canonical edges first, then boundary stubs), one instance per
/// unit in the group.
pub fn bond_location_iterator_from_group(
    sg: StructureGroup<'_>,
) -> LocationIterator<'_> {
    let first = sg
        .group
        .units()
        .first()
        .and_then(|&id| sg.structure.unit(id));
    let mapping = first.and_then(|unit| {
        if !unit.is_atomic() {
            return None;
        }
        let parent = sg.structure.root().unit(unit.id())?;
        Some(intra_bond_index_mapping(parent, unit))
    });

    let group_count = mapping.as_ref().map_or(0, BondIndexMapping::mapped_count);
    let instance_count = sg.group.len();

    LocationIterator::new(group_count, instance_count, move |group, instance| {
        let Some(&unit_id) = sg.group.units().get(instance) else {
            return Location::None;
        };
        let Some(unit) = sg.structure.unit(unit_id) else {
            return Location::None;
        };
        let g = group as u32;
        if g >= unit.bonds().directed_count() {
            return mapping
                .as_ref()
                .and_then(|m| m.boundary_element(g))
                .map_or(Location::None, |element| Location::Element {
                    unit: unit_id,
                    element,
                });
        }
        Location::Bond {
            a_unit: unit_id,
            a_index: unit.bonds().a()[group],
            b_unit: unit_id,
            b_index: unit.bonds().b()[group],
        }
    })
}

/// Location cursor for inter-bond-tagged geometry: one group per resolved
/// cross-unit bond index, a single instance.
pub fn bond_location_iterator_from_structure(
    structure: &Structure,
) -> LocationIterator<'_> {
    let mapping = inter_bond_index_mapping(structure.root(), structure);
    let group_count = mapping.mapped_count();

    LocationIterator::new(group_count, 1, move |group, _| {
        let g = group as u32;
        if g >= structure.inter_unit_bonds().edge_count() {
            let resolved = mapping.boundary_element(g).and_then(|serial| {
                let (unit_id, local) = structure.location_of_serial(serial)?;
                let unit = structure.unit(unit_id)?;
                Some(Location::Element {
                    unit: unit_id,
                    element: unit.element_at(local),
                })
            });
            return resolved.unwrap_or(Location::None);
        }
        let edge = &structure.inter_unit_bonds().edges()[group];
        Location::Bond {
            a_unit: edge.unit_a,
            a_index: edge.index_a,
            b_unit: edge.unit_b,
            b_index: edge.index_b,
        }
    })
}

/// Resolve a picking id against intra-bond-tagged geometry.
///
/// Canonical group ids index the unit's own bond table; ids in the
/// synthetic extension range remap through the parent mapping and resolve
/// against the root. Both directed orderings of the picked bond are
/// returned so downstream highlighting is symmetric.
pub fn intra_bond_loci(
    picking: &PickingId,
    sg: StructureGroup<'_>,
    object_id: u32,
) -> Loci {
    if picking.object_id != object_id {
        return Loci::None;
    }
    let Some(&unit_id) = sg.group.units().get(picking.instance_id as usize)
    else {
        return Loci::None;
    };
    let Some(child) = sg.structure.unit(unit_id) else {
        return Loci::None;
    };
    if !child.is_atomic() {
        return Loci::None;
    }

    let mut unit = child;
    let mut group_id = picking.group_id;
    if group_id >= child.bonds().directed_count() {
        let root = sg.structure.root();
        let Some(parent) = root.unit(unit_id) else {
            return Loci::None;
        };
        let mapping = intra_bond_index_mapping(parent, child);
        let Some(parent_edge) = mapping.parent_for_index(group_id) else {
            // Extension-range ids always come from a mapping built over the
            // same structures; a miss means the caller held one across a
            // structure change.
            debug_assert!(false, "unmapped synthetic bond index {group_id}");
            log::warn!(
                "picking id {group_id} has no parent bond mapping; dropping"
            );
            return Loci::None;
        };
        unit = parent;
        group_id = parent_edge;
    }

    let t = group_id as usize;
    if t >= unit.bonds().directed_count() as usize {
        return Loci::None;
    }
    let location = BondLocation::intra(
        unit_id,
        unit.bonds().a()[t],
        unit.bonds().b()[t],
    );
    Loci::Bonds {
        structure: sg.structure.root_id(),
        bonds: vec![location, location.flipped()],
    }
}

/// Apply the renderer group intervals covered by a loci over intra-bond
/// geometry. Returns whether any `apply` call reported a change.
///
/// Bond locations fall back to the parent edge table (then through the
/// mapping) when the child lookup misses; element locations mark every
/// incident edge, requiring the partner endpoint in the loci when
/// `is_marking`.
pub fn each_intra_bond(
    loci: &Loci,
    sg: StructureGroup<'_>,
    apply: &mut dyn FnMut(Interval) -> bool,
    is_marking: bool,
) -> bool {
    let mut changed = false;
    match loci {
        Loci::Bonds { structure, bonds } => {
            if *structure != sg.structure.root_id() {
                return false;
            }
            let Some(unit) = sg
                .group
                .units()
                .first()
                .and_then(|&id| sg.structure.unit(id))
            else {
                return false;
            };
            if !unit.is_atomic() {
                return false;
            }
            let Some(parent) = sg.structure.root().unit(unit.id()) else {
                return false;
            };
            let mapping = intra_bond_index_mapping(parent, unit);
            let group_count = mapping.mapped_count() as u32;
            if group_count == 0 {
                return false;
            }

            for b in bonds {
                if b.a_unit != b.b_unit {
                    continue;
                }
                let Some(unit_idx) = sg.group.index_of(b.a_unit) else {
                    continue;
                };
                let idx = unit
                    .bonds()
                    .directed_edge_index(b.a_index, b.b_index)
                    .or_else(|| {
                        parent
                            .bonds()
                            .directed_edge_index(b.a_index, b.b_index)
                            .and_then(|p| mapping.index_for_parent(p))
                    });
                if let Some(idx) = idx {
                    if apply(Interval::singleton(
                        unit_idx * group_count + idx,
                    )) {
                        changed = true;
                    }
                }
            }
        }
        Loci::Elements {
            structure,
            elements,
        } => {
            if *structure != sg.structure.root_id() {
                return false;
            }
            let Some(unit) = sg
                .group
                .units()
                .first()
                .and_then(|&id| sg.structure.unit(id))
            else {
                return false;
            };
            if !unit.is_atomic() {
                return false;
            }
            let group_count = unit.bonds().directed_count();

            for entry in elements {
                let Some(unit_idx) = sg.group.index_of(entry.unit) else {
                    continue;
                };
                let offset = unit.bonds().offset();
                let targets = unit.bonds().b();
                for &v in &entry.indices {
                    let v = v as usize;
                    if v + 1 >= offset.len() {
                        continue;
                    }
                    for t in offset[v]..offset[v + 1] {
                        let selected = !is_marking
                            || entry.contains(targets[t as usize]);
                        if selected
                            && apply(Interval::singleton(
                                unit_idx * group_count + t,
                            ))
                        {
                            changed = true;
                        }
                    }
                }
            }
        }
        Loci::None => {}
    }
    changed
}

/// Resolve a picking id against inter-bond-tagged geometry.
pub fn inter_bond_loci(
    picking: &PickingId,
    structure: &Structure,
    object_id: u32,
) -> Loci {
    if picking.object_id != object_id {
        return Loci::None;
    }

    let mut resolved = structure;
    let mut group_id = picking.group_id;
    if group_id >= structure.inter_unit_bonds().edge_count() {
        let root = structure.root();
        let mapping = inter_bond_index_mapping(root, structure);
        let Some(parent_edge) = mapping.parent_for_index(group_id) else {
            debug_assert!(false, "unmapped synthetic bond index {group_id}");
            log::warn!(
                "picking id {group_id} has no parent bond mapping; dropping"
            );
            return Loci::None;
        };
        resolved = root;
        group_id = parent_edge;
    }

    let Some(edge) =
        resolved.inter_unit_bonds().edges().get(group_id as usize)
    else {
        return Loci::None;
    };
    let location = BondLocation {
        a_unit: edge.unit_a,
        a_index: edge.index_a,
        b_unit: edge.unit_b,
        b_index: edge.index_b,
    };
    Loci::Bonds {
        structure: structure.root_id(),
        bonds: vec![location, location.flipped()],
    }
}

/// Apply the renderer group intervals covered by a loci over inter-bond
/// geometry. Returns whether any `apply` call reported a change.
pub fn each_inter_bond(
    loci: &Loci,
    structure: &Structure,
    apply: &mut dyn FnMut(Interval) -> bool,
    is_marking: bool,
) -> bool {
    let mut changed = false;
    match loci {
        Loci::Bonds {
            structure: loci_structure,
            bonds,
        } => {
            if *loci_structure != structure.root_id() {
                return false;
            }
            let root = structure.root();
            let mapping = inter_bond_index_mapping(root, structure);
            for b in bonds {
                let idx = structure
                    .inter_unit_bonds()
                    .edge_index(b.a_index, b.a_unit, b.b_index, b.b_unit)
                    .or_else(|| {
                        root.inter_unit_bonds()
                            .edge_index(
                                b.a_index, b.a_unit, b.b_index, b.b_unit,
                            )
                            .and_then(|p| mapping.index_for_parent(p))
                    });
                if let Some(idx) = idx {
                    if apply(Interval::singleton(idx)) {
                        changed = true;
                    }
                }
            }
        }
        Loci::Elements {
            structure: loci_structure,
            elements,
        } => {
            if *loci_structure != structure.root_id() {
                return false;
            }
            // A single unit cannot contribute a marked cross-unit bond.
            if is_marking && elements.len() == 1 {
                return false;
            }

            let by_unit: FxHashMap<_, _> =
                elements.iter().map(|e| (e.unit, e)).collect();
            for entry in elements {
                let atomic = structure
                    .unit(entry.unit)
                    .is_some_and(Unit::is_atomic);
                if !atomic {
                    continue;
                }
                for &edge_idx in structure
                    .inter_unit_bonds()
                    .edges_from_unit(entry.unit)
                {
                    let edge = &structure.inter_unit_bonds().edges()
                        [edge_idx as usize];
                    if !entry.contains(edge.index_a) {
                        continue;
                    }
                    let other = by_unit.get(&edge.unit_b);
                    let partner_selected =
                        other.is_some_and(|o| o.contains(edge.index_b));
                    if (!is_marking || partner_selected)
                        && apply(Interval::singleton(edge_idx))
                    {
                        changed = true;
                    }
                }
            }
        }
        Loci::None => {}
    }
    changed
}
