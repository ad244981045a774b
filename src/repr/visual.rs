//! Visual wrappers: strategy selection and geometry lifecycle.
//!
//! A visual owns one unit group's rendered geometry. The impostor-vs-mesh
//! strategy is chosen once at construction from props plus a capability
//! snapshot of the backend; it is only re-evaluated through
//! `must_recreate`, never inside the generation loops. Geometry is replaced
//! wholesale on rebuild (the renderer observes either the old or the new
//! value, never a partial one).

use crate::geometry::cylinders::Cylinders;
use crate::geometry::mesh::Mesh;
use crate::geometry::spheres::Spheres;
use crate::repr::backbone_cylinder::{
    create_backbone_cylinder_impostor, create_backbone_cylinder_mesh,
    BackboneCylinderProps,
};
use crate::repr::backbone_sphere::{
    create_backbone_sphere_impostor, create_backbone_sphere_mesh,
    BackboneSphereProps,
};
use crate::repr::location::LocationIterator;
use crate::repr::loci::{Interval, Loci, PickingId};
use crate::repr::polymer::{
    each_polymer_element, polymer_element_loci, polymer_location_iterator,
};
use crate::structure::{Structure, StructureGroup, Unit};
use crate::theme::SizeTheme;

/// Capability snapshot of the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCaps {
    /// Whether the backend can write fragment depth (required for
    /// ray-cast impostors).
    pub frag_depth: bool,
}

/// How a visual's geometry is realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryStrategy {
    /// Ray-cast impostor primitives.
    Impostor,
    /// Triangulated mesh.
    Mesh,
}

/// The rebuild decision record `set_update_state` fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualUpdateState {
    /// Whether the geometry must be regenerated.
    pub create_geometry: bool,
}

fn impostor_capable(caps: Option<&RenderCaps>) -> bool {
    caps.is_some_and(|c| c.frag_depth)
}

fn select_strategy(
    try_use_impostor: bool,
    caps: Option<&RenderCaps>,
) -> GeometryStrategy {
    if try_use_impostor && impostor_capable(caps) {
        GeometryStrategy::Impostor
    } else {
        GeometryStrategy::Mesh
    }
}

fn strategy_mismatch(
    strategy: GeometryStrategy,
    try_use_impostor: bool,
    caps: Option<&RenderCaps>,
) -> bool {
    select_strategy(try_use_impostor, caps) != strategy
}

/// Backbone cylinder geometry under either strategy.
#[derive(Debug, Clone)]
pub enum BackboneCylinderGeometry {
    /// Impostor path.
    Cylinders(Cylinders),
    /// Mesh path.
    Mesh(Mesh),
}

/// Backbone-as-cylinders visual for one unit group.
pub struct BackboneCylinderVisual {
    object_id: u32,
    strategy: GeometryStrategy,
    props: BackboneCylinderProps,
    geometry: BackboneCylinderGeometry,
    built: bool,
}

impl BackboneCylinderVisual {
    /// Create the visual, selecting the strategy from props and backend
    /// capabilities. `object_id` is the render object identity picking ids
    /// are matched against.
    pub fn new(
        object_id: u32,
        props: BackboneCylinderProps,
        caps: Option<&RenderCaps>,
    ) -> Self {
        let strategy = select_strategy(props.try_use_impostor, caps);
        log::debug!(
            "backbone cylinder visual {object_id}: strategy {strategy:?}"
        );
        let geometry = match strategy {
            GeometryStrategy::Impostor => {
                BackboneCylinderGeometry::Cylinders(Cylinders::empty(None))
            }
            GeometryStrategy::Mesh => {
                BackboneCylinderGeometry::Mesh(Mesh::empty(None))
            }
        };
        Self {
            object_id,
            strategy,
            props,
            geometry,
            built: false,
        }
    }

    /// Render object identity.
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// The strategy selected at construction.
    pub fn strategy(&self) -> GeometryStrategy {
        self.strategy
    }

    /// Current props.
    pub fn props(&self) -> &BackboneCylinderProps {
        &self.props
    }

    /// Current geometry (empty until the first `update`).
    pub fn geometry(&self) -> &BackboneCylinderGeometry {
        &self.geometry
    }

    /// Whether changed props/capabilities force constructing a new visual
    /// (the strategy no longer matches).
    pub fn must_recreate(
        &self,
        props: &BackboneCylinderProps,
        caps: Option<&RenderCaps>,
    ) -> bool {
        strategy_mismatch(self.strategy, props.try_use_impostor, caps)
    }

    /// Record whether `new` props require regenerating geometry.
    ///
    /// The impostor path never rebuilds on prop changes (sizing happens in
    /// the backend's vertex stage); the mesh path rebuilds when the baked
    /// radius or tessellation changes.
    pub fn set_update_state(
        &self,
        state: &mut VisualUpdateState,
        new: &BackboneCylinderProps,
    ) {
        match self.strategy {
            GeometryStrategy::Impostor => {}
            GeometryStrategy::Mesh => {
                state.create_geometry = new.size_factor
                    != self.props.size_factor
                    || new.radial_segments != self.props.radial_segments;
            }
        }
    }

    /// Run the update pipeline: decide, regenerate if needed (reusing the
    /// previous geometry's storage), and swap the new geometry in.
    pub fn update(
        &mut self,
        unit: &Unit,
        structure: &Structure,
        theme: &dyn SizeTheme,
        props: BackboneCylinderProps,
    ) -> &BackboneCylinderGeometry {
        let mut state = VisualUpdateState {
            create_geometry: !self.built,
        };
        if self.built {
            self.set_update_state(&mut state, &props);
        }

        if state.create_geometry {
            let previous = std::mem::replace(
                &mut self.geometry,
                BackboneCylinderGeometry::Cylinders(Cylinders::empty(None)),
            );
            self.geometry = match self.strategy {
                GeometryStrategy::Impostor => {
                    let prev = match previous {
                        BackboneCylinderGeometry::Cylinders(c) => Some(c),
                        BackboneCylinderGeometry::Mesh(_) => None,
                    };
                    BackboneCylinderGeometry::Cylinders(
                        create_backbone_cylinder_impostor(
                            unit, structure, &props, prev,
                        ),
                    )
                }
                GeometryStrategy::Mesh => {
                    let prev = match previous {
                        BackboneCylinderGeometry::Mesh(m) => Some(m),
                        BackboneCylinderGeometry::Cylinders(_) => None,
                    };
                    BackboneCylinderGeometry::Mesh(
                        create_backbone_cylinder_mesh(
                            unit, structure, theme, &props, prev,
                        ),
                    )
                }
            };
            self.built = true;
        }
        self.props = props;
        &self.geometry
    }

    /// Resolve a picking id against this visual's geometry.
    pub fn get_loci(
        &self,
        picking: &PickingId,
        sg: StructureGroup<'_>,
    ) -> Loci {
        polymer_element_loci(picking, sg, self.object_id)
    }

    /// Apply the group intervals a loci covers in this visual's geometry.
    pub fn each_location(
        &self,
        loci: &Loci,
        sg: StructureGroup<'_>,
        apply: &mut dyn FnMut(Interval) -> bool,
    ) -> bool {
        each_polymer_element(loci, sg, apply)
    }

    /// Location cursor over this visual's group/instance space.
    pub fn location_iterator(
        sg: StructureGroup<'_>,
    ) -> LocationIterator<'_> {
        polymer_location_iterator(sg)
    }
}

/// Backbone sphere geometry under either strategy.
#[derive(Debug, Clone)]
pub enum BackboneSphereGeometry {
    /// Impostor path.
    Spheres(Spheres),
    /// Mesh path.
    Mesh(Mesh),
}

/// Backbone-as-spheres visual for one unit group.
pub struct BackboneSphereVisual {
    object_id: u32,
    strategy: GeometryStrategy,
    props: BackboneSphereProps,
    geometry: BackboneSphereGeometry,
    built: bool,
}

impl BackboneSphereVisual {
    /// Create the visual, selecting the strategy from props and backend
    /// capabilities.
    pub fn new(
        object_id: u32,
        props: BackboneSphereProps,
        caps: Option<&RenderCaps>,
    ) -> Self {
        let strategy = select_strategy(props.try_use_impostor, caps);
        log::debug!(
            "backbone sphere visual {object_id}: strategy {strategy:?}"
        );
        let geometry = match strategy {
            GeometryStrategy::Impostor => {
                BackboneSphereGeometry::Spheres(Spheres::empty(None))
            }
            GeometryStrategy::Mesh => {
                BackboneSphereGeometry::Mesh(Mesh::empty(None))
            }
        };
        Self {
            object_id,
            strategy,
            props,
            geometry,
            built: false,
        }
    }

    /// Render object identity.
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// The strategy selected at construction.
    pub fn strategy(&self) -> GeometryStrategy {
        self.strategy
    }

    /// Current props.
    pub fn props(&self) -> &BackboneSphereProps {
        &self.props
    }

    /// Current geometry (empty until the first `update`).
    pub fn geometry(&self) -> &BackboneSphereGeometry {
        &self.geometry
    }

    /// Whether changed props/capabilities force constructing a new visual.
    pub fn must_recreate(
        &self,
        props: &BackboneSphereProps,
        caps: Option<&RenderCaps>,
    ) -> bool {
        strategy_mismatch(self.strategy, props.try_use_impostor, caps)
    }

    /// Record whether `new` props require regenerating geometry.
    pub fn set_update_state(
        &self,
        state: &mut VisualUpdateState,
        new: &BackboneSphereProps,
    ) {
        match self.strategy {
            GeometryStrategy::Impostor => {}
            GeometryStrategy::Mesh => {
                state.create_geometry = new.size_factor
                    != self.props.size_factor
                    || new.detail != self.props.detail;
            }
        }
    }

    /// Run the update pipeline: decide, regenerate if needed, swap in.
    pub fn update(
        &mut self,
        unit: &Unit,
        structure: &Structure,
        theme: &dyn SizeTheme,
        props: BackboneSphereProps,
    ) -> &BackboneSphereGeometry {
        let mut state = VisualUpdateState {
            create_geometry: !self.built,
        };
        if self.built {
            self.set_update_state(&mut state, &props);
        }

        if state.create_geometry {
            let previous = std::mem::replace(
                &mut self.geometry,
                BackboneSphereGeometry::Spheres(Spheres::empty(None)),
            );
            self.geometry = match self.strategy {
                GeometryStrategy::Impostor => {
                    let prev = match previous {
                        BackboneSphereGeometry::Spheres(s) => Some(s),
                        BackboneSphereGeometry::Mesh(_) => None,
                    };
                    BackboneSphereGeometry::Spheres(
                        create_backbone_sphere_impostor(
                            unit, structure, &props, prev,
                        ),
                    )
                }
                GeometryStrategy::Mesh => {
                    let prev = match previous {
                        BackboneSphereGeometry::Mesh(m) => Some(m),
                        BackboneSphereGeometry::Spheres(_) => None,
                    };
                    BackboneSphereGeometry::Mesh(
                        create_backbone_sphere_mesh(
                            unit, structure, theme, &props, prev,
                        ),
                    )
                }
            };
            self.built = true;
        }
        self.props = props;
        &self.geometry
    }

    /// Resolve a picking id against this visual's geometry.
    pub fn get_loci(
        &self,
        picking: &PickingId,
        sg: StructureGroup<'_>,
    ) -> Loci {
        polymer_element_loci(picking, sg, self.object_id)
    }

    /// Apply the group intervals a loci covers in this visual's geometry.
    pub fn each_location(
        &self,
        loci: &Loci,
        sg: StructureGroup<'_>,
        apply: &mut dyn FnMut(Interval) -> bool,
    ) -> bool {
        each_polymer_element(loci, sg, apply)
    }

    /// Location cursor over this visual's group/instance space.
    pub fn location_iterator(
        sg: StructureGroup<'_>,
    ) -> LocationIterator<'_> {
        polymer_location_iterator(sg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::testing::chain_structure;
    use crate::structure::UnitGroup;
    use crate::theme::UniformSizeTheme;

    const IMPOSTOR_CAPS: RenderCaps = RenderCaps { frag_depth: true };
    const NO_FRAG_DEPTH: RenderCaps = RenderCaps { frag_depth: false };

    #[test]
    fn test_strategy_selection() {
        let props = BackboneCylinderProps::default();
        let impostor =
            BackboneCylinderVisual::new(1, props, Some(&IMPOSTOR_CAPS));
        assert_eq!(impostor.strategy(), GeometryStrategy::Impostor);

        let no_caps = BackboneCylinderVisual::new(1, props, None);
        assert_eq!(no_caps.strategy(), GeometryStrategy::Mesh);

        let no_depth =
            BackboneCylinderVisual::new(1, props, Some(&NO_FRAG_DEPTH));
        assert_eq!(no_depth.strategy(), GeometryStrategy::Mesh);

        let opted_out = BackboneCylinderVisual::new(
            1,
            BackboneCylinderProps {
                try_use_impostor: false,
                ..props
            },
            Some(&IMPOSTOR_CAPS),
        );
        assert_eq!(opted_out.strategy(), GeometryStrategy::Mesh);
    }

    #[test]
    fn test_must_recreate_on_strategy_mismatch() {
        let props = BackboneCylinderProps::default();
        let impostor =
            BackboneCylinderVisual::new(1, props, Some(&IMPOSTOR_CAPS));
        assert!(!impostor.must_recreate(&props, Some(&IMPOSTOR_CAPS)));
        assert!(impostor.must_recreate(&props, None));
        assert!(impostor.must_recreate(
            &BackboneCylinderProps {
                try_use_impostor: false,
                ..props
            },
            Some(&IMPOSTOR_CAPS)
        ));

        let mesh = BackboneCylinderVisual::new(1, props, None);
        assert!(!mesh.must_recreate(&props, None));
        assert!(mesh.must_recreate(&props, Some(&IMPOSTOR_CAPS)));
    }

    #[test]
    fn test_mesh_update_state_tracks_baked_props() {
        let props = BackboneCylinderProps::default();
        let mesh = BackboneCylinderVisual::new(1, props, None);
        let mut state = VisualUpdateState::default();

        mesh.set_update_state(&mut state, &props);
        assert!(!state.create_geometry);

        mesh.set_update_state(
            &mut state,
            &BackboneCylinderProps {
                size_factor: 0.5,
                ..props
            },
        );
        assert!(state.create_geometry);

        let impostor =
            BackboneCylinderVisual::new(1, props, Some(&IMPOSTOR_CAPS));
        let mut state = VisualUpdateState::default();
        impostor.set_update_state(
            &mut state,
            &BackboneCylinderProps {
                size_factor: 0.5,
                ..props
            },
        );
        assert!(!state.create_geometry);
    }

    #[test]
    fn test_update_builds_once_and_rebuilds_on_prop_change() {
        let structure = chain_structure(3);
        let unit = structure.unit(0).unwrap();
        let theme = UniformSizeTheme::default();
        let props = BackboneCylinderProps::default();
        let mut visual = BackboneCylinderVisual::new(1, props, None);

        let vertex_count = |g: &BackboneCylinderGeometry| match g {
            BackboneCylinderGeometry::Mesh(m) => m.vertex_count(),
            BackboneCylinderGeometry::Cylinders(_) => 0,
        };

        let first = vertex_count(visual.update(unit, &structure, &theme, props));
        assert!(first > 0);

        // Same props: no rebuild (geometry object unchanged).
        let again =
            vertex_count(visual.update(unit, &structure, &theme, props));
        assert_eq!(again, first);

        // Coarser tessellation: rebuild with fewer vertices.
        let rebuilt = vertex_count(visual.update(
            unit,
            &structure,
            &theme,
            BackboneCylinderProps {
                radial_segments: 4,
                ..props
            },
        ));
        assert!(rebuilt < first);
    }

    #[test]
    fn test_sphere_visual_lifecycle() {
        let structure = chain_structure(3);
        let unit = structure.unit(0).unwrap();
        let theme = UniformSizeTheme::default();
        let props = BackboneSphereProps::default();

        let mut visual =
            BackboneSphereVisual::new(2, props, Some(&IMPOSTOR_CAPS));
        assert_eq!(visual.strategy(), GeometryStrategy::Impostor);

        let geometry = visual.update(unit, &structure, &theme, props);
        match geometry {
            BackboneSphereGeometry::Spheres(s) => {
                assert_eq!(s.sphere_count(), 3);
            }
            BackboneSphereGeometry::Mesh(_) => panic!("expected impostors"),
        }
    }

    #[test]
    fn test_visual_picking_delegates_to_polymer_loci() {
        let structure = chain_structure(3);
        let unit = structure.unit(0).unwrap();
        let theme = UniformSizeTheme::default();
        let group = UnitGroup::new(vec![0]);
        let sg = StructureGroup {
            structure: &structure,
            group: &group,
        };
        let props = BackboneCylinderProps::default();
        let mut visual = BackboneCylinderVisual::new(7, props, None);
        let _ = visual.update(unit, &structure, &theme, props);

        let hit = visual.get_loci(
            &PickingId {
                object_id: 7,
                instance_id: 0,
                group_id: 1,
            },
            sg,
        );
        assert!(!hit.is_none());

        let mut applied = 0;
        let changed = visual.each_location(&hit, sg, &mut |_| {
            applied += 1;
            true
        });
        assert!(changed);
        assert_eq!(applied, 1);

        let miss = visual.get_loci(
            &PickingId {
                object_id: 8,
                instance_id: 0,
                group_id: 1,
            },
            sg,
        );
        assert!(miss.is_none());
    }
}
