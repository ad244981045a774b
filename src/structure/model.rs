//! Shared per-model tables: atom conformation, residue segmentation, and the
//! derived residue properties the backbone generators consume.
//!
//! A [`Model`] is immutable after construction and shared between every
//! [`Unit`](crate::structure::Unit) instanced from it via `Arc`. All
//! structural preconditions are checked here, once; downstream iteration
//! trusts the tables.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::error::StrandError;
use crate::structure::{ElementIndex, ResidueIndex};

/// Atomic number of hydrogen.
const HYDROGEN: u8 = 1;

/// Coarse molecule classification per residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeType {
    /// Monoatomic ion.
    Ion,
    /// Water molecule.
    Water,
    /// Amino acid in a peptide chain.
    Protein,
    /// Nucleotide in a DNA chain.
    Dna,
    /// Nucleotide in an RNA chain.
    Rna,
    /// Sugar residue.
    Saccharide,
    /// Anything else (ligands, lipids, unknowns).
    Other,
}

impl MoleculeType {
    /// Whether this residue type belongs to a nucleic acid chain.
    pub fn is_nucleic(self) -> bool {
        matches!(self, Self::Dna | Self::Rna)
    }
}

/// Raw construction tables for a [`Model`].
///
/// Per-atom tables (`positions`, `atom_residue`, `atomic_number`) must share
/// one length; per-residue tables (`trace_element`, `molecule_type`) another.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// Atom positions in the invariant (untransformed) frame.
    pub positions: Vec<Vec3>,
    /// Residue index per atom; must be non-decreasing.
    pub atom_residue: Vec<ResidueIndex>,
    /// Atomic number per atom.
    pub atomic_number: Vec<u8>,
    /// Representative (trace) atom per residue, e.g. the C-alpha.
    pub trace_element: Vec<ElementIndex>,
    /// Molecule classification per residue.
    pub molecule_type: Vec<MoleculeType>,
    /// Ring-closure partners: last residue of a cyclic chain → first.
    pub cyclic_polymer_map: Vec<(ResidueIndex, ResidueIndex)>,
    /// Half-open element ranges covering polymeric stretches, sorted and
    /// non-overlapping.
    pub polymer_ranges: Vec<(ElementIndex, ElementIndex)>,
}

/// Immutable per-model tables shared by all units of a structure.
#[derive(Debug)]
pub struct Model {
    positions: Vec<Vec3>,
    atom_residue: Vec<ResidueIndex>,
    atomic_number: Vec<u8>,
    trace_element: Vec<ElementIndex>,
    molecule_type: Vec<MoleculeType>,
    cyclic_polymer_map: FxHashMap<ResidueIndex, ResidueIndex>,
    polymer_ranges: Vec<(ElementIndex, ElementIndex)>,
}

impl Model {
    /// Validate the tables and build a model.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError`] when table lengths disagree or any index
    /// points outside its table.
    pub fn new(data: ModelData) -> Result<Self, StrandError> {
        let atom_count = data.positions.len();
        let residue_count = data.trace_element.len();

        check_len("atom_residue", atom_count, data.atom_residue.len())?;
        check_len("atomic_number", atom_count, data.atomic_number.len())?;
        check_len("molecule_type", residue_count, data.molecule_type.len())?;

        for &r in &data.atom_residue {
            check_residue(r, residue_count)?;
        }
        for &e in &data.trace_element {
            check_element(e, atom_count)?;
        }
        for &(last, first) in &data.cyclic_polymer_map {
            check_residue(last, residue_count)?;
            check_residue(first, residue_count)?;
        }
        for &(start, end) in &data.polymer_ranges {
            if end > atom_count as ElementIndex || start > end {
                return Err(StrandError::ElementOutOfRange {
                    element: end,
                    count: atom_count,
                });
            }
        }

        Ok(Self {
            positions: data.positions,
            atom_residue: data.atom_residue,
            atomic_number: data.atomic_number,
            trace_element: data.trace_element,
            molecule_type: data.molecule_type,
            cyclic_polymer_map: data.cyclic_polymer_map.into_iter().collect(),
            polymer_ranges: data.polymer_ranges,
        })
    }

    /// Number of atoms.
    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of residues.
    pub fn residue_count(&self) -> usize {
        self.trace_element.len()
    }

    /// Invariant-frame position of an atom.
    pub fn position(&self, element: ElementIndex) -> Vec3 {
        self.positions[element as usize]
    }

    /// Residue an atom belongs to.
    pub fn residue_of(&self, element: ElementIndex) -> ResidueIndex {
        self.atom_residue[element as usize]
    }

    /// Trace atom of a residue. Guaranteed valid for polymer residues.
    pub fn trace_element(&self, residue: ResidueIndex) -> ElementIndex {
        self.trace_element[residue as usize]
    }

    /// Molecule classification of a residue.
    pub fn molecule_type(&self, residue: ResidueIndex) -> MoleculeType {
        self.molecule_type[residue as usize]
    }

    /// Ring-closure partner of a chain's last residue, if any.
    pub fn cyclic_partner(&self, residue: ResidueIndex) -> Option<ResidueIndex> {
        self.cyclic_polymer_map.get(&residue).copied()
    }

    /// Whether an atom is a hydrogen.
    pub fn is_hydrogen(&self, element: ElementIndex) -> bool {
        self.atomic_number[element as usize] == HYDROGEN
    }

    /// Sorted half-open element ranges covering polymeric stretches.
    pub fn polymer_ranges(&self) -> &[(ElementIndex, ElementIndex)] {
        &self.polymer_ranges
    }
}

fn check_len(
    table: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), StrandError> {
    if expected == actual {
        Ok(())
    } else {
        Err(StrandError::TableLength {
            table,
            expected,
            actual,
        })
    }
}

fn check_element(e: ElementIndex, count: usize) -> Result<(), StrandError> {
    if (e as usize) < count {
        Ok(())
    } else {
        Err(StrandError::ElementOutOfRange { element: e, count })
    }
}

fn check_residue(r: ResidueIndex, count: usize) -> Result<(), StrandError> {
    if (r as usize) < count {
        Ok(())
    } else {
        Err(StrandError::ResidueOutOfRange { residue: r, count })
    }
}
