//! Size theming: the per-entity render size the mesh generators consult.
//!
//! The trait is the seam to the external theme system; the implementations
//! here cover the common cases without pulling that system in.

use std::sync::Arc;

use crate::repr::location::Location;
use crate::structure::model::Model;

/// Per-entity render size.
pub trait SizeTheme {
    /// Size for a resolved location, in model units.
    fn size(&self, location: &Location) -> f32;
}

/// The same size everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSizeTheme {
    /// The size returned for every location.
    pub value: f32,
}

impl Default for UniformSizeTheme {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl SizeTheme for UniformSizeTheme {
    fn size(&self, _location: &Location) -> f32 {
        self.value
    }
}

/// Element sizes scaled down for hydrogens, uniform otherwise.
///
/// A small stand-in for a full van-der-Waals theme: it only needs the model
/// tables this crate already carries.
#[derive(Debug, Clone)]
pub struct ElementSizeTheme {
    model: Arc<Model>,
    /// Size for heavy atoms.
    pub heavy: f32,
    /// Size for hydrogens.
    pub hydrogen: f32,
}

impl ElementSizeTheme {
    /// A theme over the given model with default sizes.
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            model,
            heavy: 1.0,
            hydrogen: 0.6,
        }
    }
}

impl SizeTheme for ElementSizeTheme {
    fn size(&self, location: &Location) -> f32 {
        match location {
            Location::Element { element, .. } => {
                if self.model.is_hydrogen(*element) {
                    self.hydrogen
                } else {
                    self.heavy
                }
            }
            _ => self.heavy,
        }
    }
}
