//! Bond tables: intra-unit directed edge lists in CSR layout and the
//! cross-unit bond set.
//!
//! Every undirected bond is stored as two directed entries so that a
//! "half-bond" (one direction, one group id) is directly addressable - the
//! picking and highlighting paths index directed entries throughout.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::StrandError;
use crate::structure::{UnitElementIndex, UnitId};

/// Bond type bitmask.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct BondFlags(u8);

impl BondFlags {
    /// No bond type.
    pub const NONE: Self = Self(0);
    /// Covalent bond.
    pub const COVALENT: Self = Self(1);
    /// Metal coordination.
    pub const METALLIC: Self = Self(2);
    /// Hydrogen bond.
    pub const HYDROGEN_BOND: Self = Self(4);
    /// Disulfide bridge.
    pub const DISULFIDE: Self = Self(8);
    /// Aromatic bond.
    pub const AROMATIC: Self = Self(16);
    /// Computed (distance-inferred) bond.
    pub const COMPUTED: Self = Self(32);
    /// Every bond type.
    pub const ALL: Self = Self(63);

    /// Union of two masks.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the two masks share any set bit.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every bond type is included.
    pub fn is_all(self) -> bool {
        self.0 & Self::ALL.0 == Self::ALL.0
    }

    /// Whether no bond type is included.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Default for BondFlags {
    fn default() -> Self {
        Self::COVALENT
    }
}

/// Intra-unit bonds: `edge_count` undirected edges stored as
/// `2 * edge_count` directed entries in parallel endpoint arrays, grouped by
/// source element (CSR).
#[derive(Debug, Clone)]
pub struct IntraBonds {
    edge_count: u32,
    a: Vec<UnitElementIndex>,
    b: Vec<UnitElementIndex>,
    flags: Vec<BondFlags>,
    offset: Vec<u32>,
}

impl IntraBonds {
    /// A bond table with no edges over `element_count` elements.
    pub fn empty(element_count: usize) -> Self {
        Self {
            edge_count: 0,
            a: Vec::new(),
            b: Vec::new(),
            flags: Vec::new(),
            offset: vec![0; element_count + 1],
        }
    }

    /// Build the directed CSR table from undirected endpoint pairs.
    ///
    /// Endpoints are unit-local element indices; each pair contributes both
    /// directions.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::BondEndpointOutOfRange`] when an endpoint
    /// points past the unit's element list.
    pub fn from_pairs(
        element_count: usize,
        pairs: &[(UnitElementIndex, UnitElementIndex, BondFlags)],
    ) -> Result<Self, StrandError> {
        for &(x, y, _) in pairs {
            for idx in [x, y] {
                if idx as usize >= element_count {
                    return Err(StrandError::BondEndpointOutOfRange {
                        index: idx,
                        count: element_count,
                    });
                }
            }
        }

        let directed = pairs.len() * 2;
        let mut counts = vec![0u32; element_count + 1];
        for &(x, y, _) in pairs {
            counts[x as usize + 1] += 1;
            counts[y as usize + 1] += 1;
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let offset = counts.clone();

        let mut a = vec![0; directed];
        let mut b = vec![0; directed];
        let mut flags = vec![BondFlags::NONE; directed];
        let mut cursor = offset.clone();
        for &(x, y, f) in pairs {
            for (src, dst) in [(x, y), (y, x)] {
                let slot = cursor[src as usize] as usize;
                cursor[src as usize] += 1;
                a[slot] = src;
                b[slot] = dst;
                flags[slot] = f;
            }
        }

        Ok(Self {
            edge_count: pairs.len() as u32,
            a,
            b,
            flags,
            offset,
        })
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> u32 {
        self.edge_count
    }

    /// Number of directed entries (`2 * edge_count`).
    pub fn directed_count(&self) -> u32 {
        self.edge_count * 2
    }

    /// Source endpoint per directed entry.
    pub fn a(&self) -> &[UnitElementIndex] {
        &self.a
    }

    /// Target endpoint per directed entry.
    pub fn b(&self) -> &[UnitElementIndex] {
        &self.b
    }

    /// Bond type per directed entry.
    pub fn flags(&self) -> &[BondFlags] {
        &self.flags
    }

    /// CSR offsets: directed entries with source `i` live at
    /// `offset[i]..offset[i + 1]`.
    pub fn offset(&self) -> &[u32] {
        &self.offset
    }

    /// Index of the directed entry `i → j`, if the edge exists.
    pub fn directed_edge_index(
        &self,
        i: UnitElementIndex,
        j: UnitElementIndex,
    ) -> Option<u32> {
        let start = *self.offset.get(i as usize)? as usize;
        let end = *self.offset.get(i as usize + 1)? as usize;
        (start..end).find(|&t| self.b[t] == j).map(|t| t as u32)
    }

    /// Iterate the undirected endpoint pairs (each edge once, `a < b` or in
    /// first-encounter order).
    pub fn undirected_pairs(
        &self,
    ) -> impl Iterator<Item = (UnitElementIndex, UnitElementIndex, BondFlags)> + '_
    {
        (0..self.a.len())
            .filter(move |&t| self.a[t] < self.b[t])
            .map(move |t| (self.a[t], self.b[t], self.flags[t]))
    }
}

/// One directed cross-unit bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterBondEdge {
    /// Source unit.
    pub unit_a: UnitId,
    /// Source endpoint, local to `unit_a`'s element list.
    pub index_a: UnitElementIndex,
    /// Target unit.
    pub unit_b: UnitId,
    /// Target endpoint, local to `unit_b`'s element list.
    pub index_b: UnitElementIndex,
    /// Bond type.
    pub flags: BondFlags,
}

/// Bonds connecting elements across different units.
///
/// Like [`IntraBonds`], each undirected bond appears once per direction, so
/// `edge_count` counts directed entries.
#[derive(Debug, Clone, Default)]
pub struct InterUnitBonds {
    edges: Vec<InterBondEdge>,
    lookup: FxHashMap<(UnitId, UnitElementIndex, UnitId, UnitElementIndex), u32>,
    by_unit: FxHashMap<UnitId, Vec<u32>>,
}

impl InterUnitBonds {
    /// An empty cross-unit bond set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from undirected endpoint pairs; each contributes both
    /// directions.
    pub fn from_pairs(
        pairs: &[(UnitId, UnitElementIndex, UnitId, UnitElementIndex, BondFlags)],
    ) -> Self {
        let mut edges = Vec::with_capacity(pairs.len() * 2);
        for &(ua, ia, ub, ib, f) in pairs {
            edges.push(InterBondEdge {
                unit_a: ua,
                index_a: ia,
                unit_b: ub,
                index_b: ib,
                flags: f,
            });
            edges.push(InterBondEdge {
                unit_a: ub,
                index_a: ib,
                unit_b: ua,
                index_b: ia,
                flags: f,
            });
        }
        Self::from_edges(edges)
    }

    fn from_edges(edges: Vec<InterBondEdge>) -> Self {
        let mut lookup = FxHashMap::default();
        let mut by_unit: FxHashMap<UnitId, Vec<u32>> = FxHashMap::default();
        for (i, e) in edges.iter().enumerate() {
            let _prev = lookup
                .insert((e.unit_a, e.index_a, e.unit_b, e.index_b), i as u32);
            by_unit.entry(e.unit_a).or_default().push(i as u32);
        }
        Self {
            edges,
            lookup,
            by_unit,
        }
    }

    /// Number of directed cross-unit bond entries.
    pub fn edge_count(&self) -> u32 {
        self.edges.len() as u32
    }

    /// All directed entries.
    pub fn edges(&self) -> &[InterBondEdge] {
        &self.edges
    }

    /// Index of the directed entry `(unit_a, index_a) → (unit_b, index_b)`.
    pub fn edge_index(
        &self,
        index_a: UnitElementIndex,
        unit_a: UnitId,
        index_b: UnitElementIndex,
        unit_b: UnitId,
    ) -> Option<u32> {
        self.lookup.get(&(unit_a, index_a, unit_b, index_b)).copied()
    }

    /// Directed entries whose source is `unit`.
    pub fn edges_from_unit(&self, unit: UnitId) -> &[u32] {
        self.by_unit.get(&unit).map_or(&[], Vec::as_slice)
    }
}
