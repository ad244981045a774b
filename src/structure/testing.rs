//! Shared test fixtures: small synthetic chains with predictable layout.
//!
//! Chain convention: residue `r` owns atoms `2r` (trace) and `2r + 1`
//! (side). Bonds: trace-side within each residue plus trace-trace between
//! adjacent residues. Trace atoms sit 3.8 apart on the x axis.

use std::sync::Arc;

use glam::Vec3;

use crate::structure::bonds::{BondFlags, InterUnitBonds, IntraBonds};
use crate::structure::model::{Model, ModelData, MoleculeType};
use crate::structure::{ElementIndex, Structure, Unit, UnitId, UnitKind};

/// Spacing between consecutive trace atoms.
pub(crate) const TRACE_SPACING: f32 = 3.8;

/// Model data for an `n`-residue chain, open for per-test tweaks.
pub(crate) fn chain_model_data(n: usize) -> ModelData {
    let mut positions = Vec::with_capacity(n * 2);
    let mut atom_residue = Vec::with_capacity(n * 2);
    for r in 0..n {
        let x = r as f32 * TRACE_SPACING;
        positions.push(Vec3::new(x, 0.0, 0.0));
        positions.push(Vec3::new(x, 1.5, 0.0));
        atom_residue.push(r as u32);
        atom_residue.push(r as u32);
    }
    ModelData {
        positions,
        atom_residue,
        atomic_number: vec![6; n * 2],
        trace_element: (0..n).map(|r| (r * 2) as ElementIndex).collect(),
        molecule_type: vec![MoleculeType::Protein; n],
        cyclic_polymer_map: vec![],
        polymer_ranges: vec![(0, (n * 2) as ElementIndex)],
    }
}

/// An `n`-residue chain model, optionally customized before validation.
pub(crate) fn chain_model_with(
    n: usize,
    tweak: impl FnOnce(&mut ModelData),
) -> Arc<Model> {
    let mut data = chain_model_data(n);
    tweak(&mut data);
    Arc::new(Model::new(data).unwrap())
}

/// An `n`-residue chain model with default tables.
pub(crate) fn chain_model(n: usize) -> Arc<Model> {
    chain_model_with(n, |_| {})
}

/// The standard bond list for a full `n`-residue chain unit.
pub(crate) fn chain_bond_pairs(n: usize) -> Vec<(u32, u32, BondFlags)> {
    let mut pairs = Vec::new();
    for r in 0..n as u32 {
        pairs.push((r * 2, r * 2 + 1, BondFlags::COVALENT));
        if r + 1 < n as u32 {
            pairs.push((r * 2, r * 2 + 2, BondFlags::COVALENT));
        }
    }
    pairs
}

/// A full-chain atomic unit over `model`.
pub(crate) fn chain_unit(model: &Arc<Model>, id: UnitId) -> Unit {
    let n = model.residue_count();
    let bonds = IntraBonds::from_pairs(n * 2, &chain_bond_pairs(n)).unwrap();
    Unit::new(
        id,
        UnitKind::Atomic,
        Arc::clone(model),
        (0..(n * 2) as ElementIndex).collect(),
        bonds,
    )
    .unwrap()
}

/// A single-unit structure over an `n`-residue default chain.
pub(crate) fn chain_structure(n: usize) -> Structure {
    structure_of(&chain_model(n))
}

/// A single-unit structure over the given chain model.
pub(crate) fn structure_of(model: &Arc<Model>) -> Structure {
    Structure::new(vec![chain_unit(model, 0)], InterUnitBonds::empty())
        .unwrap()
}

/// Filter a structure, dropping the listed model elements everywhere.
pub(crate) fn drop_elements(
    parent: &Arc<Structure>,
    dropped: &[ElementIndex],
) -> Structure {
    Structure::filtered(parent, |_, e| !dropped.contains(&e)).unwrap()
}

/// A 4-residue chain split across two units (ids 0 and 1, two residues
/// each) with one inter-unit bond linking the trace atoms at the seam.
pub(crate) fn two_unit_structure() -> Structure {
    let model = chain_model(4);
    let half_bonds = || {
        IntraBonds::from_pairs(
            4,
            &[
                (0, 1, BondFlags::COVALENT),
                (0, 2, BondFlags::COVALENT),
                (2, 3, BondFlags::COVALENT),
            ],
        )
        .unwrap()
    };
    let unit0 = Unit::new(
        0,
        UnitKind::Atomic,
        Arc::clone(&model),
        vec![0, 1, 2, 3],
        half_bonds(),
    )
    .unwrap();
    let unit1 = Unit::new(
        1,
        UnitKind::Atomic,
        Arc::clone(&model),
        vec![4, 5, 6, 7],
        half_bonds(),
    )
    .unwrap();
    // unit 0 local 2 = element 2 (trace of residue 1);
    // unit 1 local 0 = element 4 (trace of residue 2)
    let inter =
        InterUnitBonds::from_pairs(&[(0, 2, 1, 0, BondFlags::COVALENT)]);
    Structure::new(vec![unit0, unit1], inter).unwrap()
}
