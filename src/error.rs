//! Crate-level error types.
//!
//! Only model-layer constructors return errors: structural preconditions are
//! validated once, at construction, so the generation and mapping hot paths
//! never re-check them. Expected degenerate inputs (empty units, picking
//! misses) are values, not errors.

use std::fmt;

use crate::structure::{ElementIndex, ResidueIndex, UnitId};

/// Errors produced by the strand crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrandError {
    /// A per-atom or per-residue table has the wrong length.
    TableLength {
        /// Name of the offending table.
        table: &'static str,
        /// Length the table must have.
        expected: usize,
        /// Length the table actually has.
        actual: usize,
    },
    /// An element index points past the model's atom tables.
    ElementOutOfRange {
        /// The offending element index.
        element: ElementIndex,
        /// Number of atoms in the model.
        count: usize,
    },
    /// A residue index points past the model's residue tables.
    ResidueOutOfRange {
        /// The offending residue index.
        residue: ResidueIndex,
        /// Number of residues in the model.
        count: usize,
    },
    /// A unit's element list is not strictly sorted.
    UnsortedElements {
        /// The offending unit.
        unit: UnitId,
    },
    /// A bond endpoint points past a unit's element list.
    BondEndpointOutOfRange {
        /// The offending unit-local endpoint index.
        index: u32,
        /// Number of elements in the unit.
        count: usize,
    },
    /// Two units in one structure share an id.
    DuplicateUnit {
        /// The duplicated unit id.
        unit: UnitId,
    },
    /// An inter-unit bond references a unit the structure does not contain.
    UnknownUnit {
        /// The missing unit id.
        unit: UnitId,
    },
}

impl fmt::Display for StrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableLength {
                table,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "table `{table}` has length {actual}, expected {expected}"
                )
            }
            Self::ElementOutOfRange { element, count } => {
                write!(f, "element index {element} out of range ({count} atoms)")
            }
            Self::ResidueOutOfRange { residue, count } => {
                write!(
                    f,
                    "residue index {residue} out of range ({count} residues)"
                )
            }
            Self::UnsortedElements { unit } => {
                write!(f, "unit {unit} has an unsorted element list")
            }
            Self::BondEndpointOutOfRange { index, count } => {
                write!(
                    f,
                    "bond endpoint {index} out of range ({count} elements)"
                )
            }
            Self::DuplicateUnit { unit } => {
                write!(f, "duplicate unit id {unit}")
            }
            Self::UnknownUnit { unit } => {
                write!(f, "inter-unit bond references unknown unit {unit}")
            }
        }
    }
}

impl std::error::Error for StrandError {}
