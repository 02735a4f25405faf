mod helpers {
    use crate::cube::edit::get_cube;
    use crate::cube::types::{Cube, Face, Layer, Leaf, MaterialId, VolumeId};
    use crate::spatial::math::CubePos;

    pub fn vol(id: u64) -> VolumeId {
        VolumeId(id)
    }

    pub fn face(material: u64) -> Face {
        Face {
            base: Layer {
                material: MaterialId(material),
                ..Layer::default()
            },
            overlay: Layer::default(),
        }
    }

    pub fn leaf_cube(volume: VolumeId, faces: [Face; 3]) -> Cube {
        Cube::from_leaf(Leaf { volume, faces })
    }

    pub fn leaf_at(root: &Cube, pos: CubePos, depth: u32) -> Leaf {
        get_cube(root, pos, depth)
            .as_leaf()
            .expect("expected a leaf at the given position")
            .clone()
    }
}

mod point_tests {
    use super::helpers::*;
    use crate::cube::edit::{cube_apply, get_cube, put_cube};
    use crate::cube::types::Cube;
    use crate::spatial::math::CubePos;

    #[test]
    fn test_get_cube_stops_at_leaf() {
        let root = Cube::leaf(vol(1));
        let pos = CubePos::new(123, 456, 789);
        assert!(get_cube(&root, pos, 10).ptr_eq(&root));
    }

    #[test]
    fn test_cube_apply_identity_keeps_root() {
        let root = Cube::uniform_branch(&Cube::leaf(vol(1)));
        let pos = CubePos::from_child_index(5);
        let unchanged = cube_apply(&root, pos, 3, |cube| cube.clone());
        assert!(unchanged.ptr_eq(&root));
    }

    #[test]
    fn test_put_cube_subdivides_and_shares() {
        let root = Cube::leaf(vol(1));
        let put = Cube::leaf(vol(2));
        let pos = CubePos::from_child_index(6);
        let edited = put_cube(&root, pos, 1, &put);
        let children = edited.children().expect("the leaf root must split");
        for (i, child) in children.iter().enumerate() {
            if i == 6 {
                assert!(child.ptr_eq(&put));
            } else {
                assert!(child.ptr_eq(&root));
            }
        }
        // placing an identical leaf changes nothing
        let same = put_cube(&edited, pos, 1, &Cube::leaf(vol(2)));
        assert!(same.ptr_eq(&edited));
    }
}

mod region_tests {
    use super::helpers::*;
    use crate::cube::edit::{box_apply, get_cube, put_faces, put_volumes};
    use crate::cube::edit::simplify;
    use crate::cube::types::{Cube, CubeModel, Face};
    use crate::spatial::math::CubePos;

    #[test]
    fn test_round_trip_put_get() {
        let root = Cube::leaf(vol(1));
        let pos = CubePos::new(0x4000_0000, 0x8000_0000, 0xC000_0000);
        let depth = 3;
        let min = pos.floor(depth);
        let max = min + CubePos::unit(CubePos::cube_size(depth));
        let edited = put_volumes(&root, min, max, vol(2));
        assert_eq!(leaf_at(&edited, pos, depth).volume, vol(2));
        // a point outside the box still reads the old volume
        let outside = CubePos::new(0, 0x8000_0000, 0xC000_0000);
        assert_eq!(leaf_at(&edited, outside, depth).volume, vol(1));
    }

    #[test]
    fn test_put_same_volume_is_noop() {
        let root = Cube::leaf(vol(1));
        // a max equal to min spans the whole axis, so this covers the root
        let same = put_volumes(&root, CubePos::ZERO, CubePos::ZERO, vol(1));
        assert!(same.ptr_eq(&root));
    }

    #[test]
    fn test_put_volumes_shares_siblings() {
        let a_leaf = Cube::leaf(vol(1));
        let root = Cube::uniform_branch(&a_leaf);
        let min = CubePos::from_child_index(3);
        let max = min + CubePos::unit(CubePos::cube_size(1));
        let edited = put_volumes(&root, min, max, vol(2));
        let children = edited.children().expect("root must stay a branch");
        for (i, child) in children.iter().enumerate() {
            if i == 3 {
                assert_eq!(child.as_leaf().unwrap().volume, vol(2));
            } else {
                assert!(child.ptr_eq(&a_leaf));
            }
        }
        // differing children must survive a simplify pass
        let model = CubeModel {
            root: edited,
            root_depth: 4,
            root_pos: CubePos::ZERO,
            void_volume: vol(0),
        };
        assert!(simplify(&model).root.is_branch());
    }

    #[test]
    fn test_box_apply_visits_contained_cubes() {
        let root = Cube::uniform_branch(&Cube::leaf(vol(1)));
        // full X span, negative halves of Y and Z: children 0 and 1
        let min = CubePos::ZERO;
        let max = CubePos::new(0, 1 << 31, 1 << 31);
        let mut visited = Vec::new();
        let result = box_apply(&root, min, max, 0, &mut |_cube, pos, depth| {
            visited.push((pos, depth));
            true
        });
        assert_eq!(
            visited,
            vec![
                (CubePos::from_child_index(0), 1),
                (CubePos::from_child_index(1), 1)
            ]
        );
        // a read-only traversal allocates nothing
        assert!(result.ptr_eq(&root));
    }

    #[test]
    fn test_box_apply_descends_into_straddled_leaves() {
        let root = Cube::leaf(vol(1));
        let min = CubePos::unit(CubePos::cube_size(2));
        let max = min + CubePos::unit(CubePos::cube_size(2));
        let mut visited = Vec::new();
        let result = box_apply(&root, min, max, 0, &mut |_cube, pos, depth| {
            visited.push((pos, depth));
            true
        });
        assert_eq!(visited, vec![(min, 2)]);
        assert!(result.ptr_eq(&root));
    }

    #[test]
    fn test_put_faces_updates_all_sides() {
        let size = CubePos::cube_size(3);
        let cell = CubePos::unit(3 * size);
        let cell_max = cell + CubePos::unit(size);
        let root = put_volumes(&Cube::leaf(vol(1)), cell, cell_max, vol(2));
        let painted = put_faces(&root, cell, cell_max, face(9));

        // the cell's own negative-side faces
        assert_eq!(leaf_at(&painted, cell, 3).faces, [face(9); 3]);
        // the positive sides live on the three skin neighbors
        for axis in 0..3 {
            let skin = leaf_at(&painted, cell + CubePos::axis_size(axis, 3), 3);
            assert_eq!(skin.faces[axis], face(9));
        }
        // cubes before the box minimum are untouched
        let before = leaf_at(&painted, cell - CubePos::axis_size(0, 3), 3);
        assert_eq!(before.faces, [Face::default(); 3]);
        assert_eq!(
            get_cube(&painted, cell, 3).as_leaf().unwrap().volume,
            vol(2)
        );
    }
}

mod transfer_tests {
    use super::helpers::*;
    use crate::cube::edit::{transfer_box, transfer_extended_edge, transfer_faces};
    use crate::cube::types::{Cube, Face};
    use crate::spatial::math::CubePos;

    #[test]
    fn test_transfer_faces_copies_boundary() {
        let src_min = Cube::leaf(vol(1));
        let src_max = leaf_cube(vol(2), [face(7), face(8), face(9)]);
        let dst = Cube::leaf(vol(1));
        let out = transfer_faces(&src_min, &src_max, &dst, 0);
        let leaf = out.as_leaf().unwrap();
        assert_eq!(leaf.faces[0], face(7));
        assert_eq!(leaf.faces[1], Face::default());
    }

    #[test]
    fn test_transfer_faces_equal_volumes_untouched() {
        let src_min = Cube::leaf(vol(1));
        let src_max = leaf_cube(vol(1), [face(7); 3]);
        let dst = leaf_cube(vol(3), [face(1); 3]);
        let out = transfer_faces(&src_min, &src_max, &dst, 0);
        assert!(out.ptr_eq(&dst));
    }

    #[test]
    fn test_transfer_faces_lock_step_depths() {
        // source max side is subdivided; only two of its negative-X children
        // have a boundary against the uniform source min side
        let src_min = Cube::leaf(vol(1));
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(1)));
        children[2] = leaf_cube(vol(2), [face(7); 3]);
        children[4] = leaf_cube(vol(2), [face(8); 3]);
        let src_max = Cube::branch(children);
        let dst = Cube::leaf(vol(5));
        let out = transfer_faces(&src_min, &src_max, &dst, 0);
        let out_children = out.children().expect("dst must subdivide to match");
        assert_eq!(out_children[2].as_leaf().unwrap().faces[0], face(7));
        assert_eq!(out_children[4].as_leaf().unwrap().faces[0], face(8));
        for i in [0, 1, 3, 5, 6, 7] {
            assert!(out_children[i].ptr_eq(&dst));
        }
    }

    #[test]
    fn test_transfer_extended_edge_replicates() {
        // edge between child pair (0, 1) on the X face of the sources,
        // extended along Z across the destination's Y face
        let src_min = Cube::leaf(vol(1));
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(1)));
        children[0] = leaf_cube(vol(2), [face(7); 3]);
        let src_max = Cube::branch(children);
        let dst = Cube::leaf(vol(1));
        let out = transfer_extended_edge(&src_min, &src_max, &dst, 0, 0, 1, 2);
        let out_children = out.children().unwrap();
        // the edge value lands on both Z halves of the Y face
        assert_eq!(out_children[0].as_leaf().unwrap().faces[1], face(7));
        assert_eq!(out_children[4].as_leaf().unwrap().faces[1], face(7));
        for i in [1, 2, 3, 5, 6, 7] {
            assert!(out_children[i].ptr_eq(&dst));
        }
    }

    /// A solid cell with distinct faces on every side, surrounded by empty
    /// space that stores its positive faces.
    fn solid_cell_root() -> (Cube, CubePos, u32) {
        use crate::cube::edit::put_cube;
        let size = CubePos::cube_size(3);
        let cell = CubePos::unit(3 * size);
        let mut root = Cube::leaf(vol(1));
        root = put_cube(&root, cell, 3, &leaf_cube(vol(2), [face(10), face(11), face(12)]));
        for axis in 0..3 {
            let mut faces = [Face::default(); 3];
            faces[axis] = face(20 + axis as u64);
            root = put_cube(
                &root,
                cell + CubePos::axis_size(axis, 3),
                3,
                &leaf_cube(vol(1), faces),
            );
        }
        (root, cell, 3)
    }

    #[test]
    fn test_transfer_box_copies_content_and_boundaries() {
        let (root, cell, depth) = solid_cell_root();
        let size = CubePos::cube_size(depth);
        let dst = CubePos::new(5 * size, 3 * size, 3 * size);
        let out = transfer_box(&root, cell, cell + CubePos::unit(size), &root, dst, 0);

        let pasted = leaf_at(&out, dst, depth);
        assert_eq!(pasted.volume, vol(2));
        assert_eq!(pasted.faces, [face(10), face(11), face(12)]);
        // the skin past each maximum side receives the source's boundary
        for axis in 0..3 {
            let skin = leaf_at(&out, dst + CubePos::axis_size(axis, depth), depth);
            assert_eq!(skin.faces[axis], face(20 + axis as u64));
        }
        // the source cell is untouched
        assert_eq!(leaf_at(&out, cell, depth).volume, vol(2));
    }

    #[test]
    fn test_transfer_box_scales_across_depths() {
        let (root, cell, depth) = solid_cell_root();
        let size = CubePos::cube_size(depth);
        let dst = CubePos::new(5 * size, 3 * size, 3 * size);
        // depth_diff of 1: the pasted copy is half the source size
        let out = transfer_box(&root, cell, cell + CubePos::unit(size), &root, dst, 1);
        assert_eq!(leaf_at(&out, dst, depth + 1).volume, vol(2));
        // the rest of the coarse cell stays empty
        let half = CubePos::cube_size(depth + 1);
        assert_eq!(
            leaf_at(&out, dst + CubePos::unit(half), depth + 1).volume,
            vol(1)
        );
    }
}

mod extrude_tests {
    use super::helpers::*;
    use crate::cube::edit::{extrude, put_cube};
    use crate::cube::types::{Cube, Face};
    use crate::spatial::math::CubePos;

    fn solid_cell_root() -> (Cube, CubePos, u32) {
        let size = CubePos::cube_size(3);
        let cell = CubePos::unit(3 * size);
        let mut root = Cube::leaf(vol(1));
        root = put_cube(&root, cell, 3, &leaf_cube(vol(2), [face(10), face(11), face(12)]));
        for axis in 0..3 {
            let mut faces = [Face::default(); 3];
            faces[axis] = face(20 + axis as u64);
            root = put_cube(
                &root,
                cell + CubePos::axis_size(axis, 3),
                3,
                &leaf_cube(vol(1), faces),
            );
        }
        (root, cell, 3)
    }

    #[test]
    fn test_extrude_positive_direction() {
        let (root, cell, depth) = solid_cell_root();
        let size = CubePos::cube_size(depth);
        let out = extrude(&root, &root, cell, cell + CubePos::unit(size), depth, 0, true);

        let slab_pos = cell + CubePos::axis_size(0, depth);
        let slab = leaf_at(&out, slab_pos, depth);
        assert_eq!(slab.volume, vol(2));
        // lateral faces continue the original cube's sides
        assert_eq!(slab.faces[1], face(11));
        assert_eq!(slab.faces[2], face(12));
        // the far face carries the boundary that was extruded
        let far = leaf_at(&out, slab_pos + CubePos::axis_size(0, depth), depth);
        assert_eq!(far.volume, vol(1));
        assert_eq!(far.faces[0], face(20));
        // so do the slab's positive lateral skins
        let y_skin = leaf_at(&out, slab_pos + CubePos::axis_size(1, depth), depth);
        assert_eq!(y_skin.faces[1], face(21));
        let z_skin = leaf_at(&out, slab_pos + CubePos::axis_size(2, depth), depth);
        assert_eq!(z_skin.faces[2], face(22));
        // the original cell is still in place
        assert_eq!(leaf_at(&out, cell, depth).volume, vol(2));
    }

    #[test]
    fn test_extrude_negative_direction() {
        let (root, cell, depth) = solid_cell_root();
        let size = CubePos::cube_size(depth);
        let out = extrude(&root, &root, cell, cell + CubePos::unit(size), depth, 0, false);

        let slab_pos = cell - CubePos::axis_size(0, depth);
        let slab = leaf_at(&out, slab_pos, depth);
        assert_eq!(slab.volume, vol(2));
        // the slab replaces the old cube wholesale, so its own negative side
        // carries the extruded boundary
        assert_eq!(slab.faces[0], face(10));
        assert_eq!(slab.faces[1], face(11));
        let y_skin = leaf_at(&out, slab_pos + CubePos::axis_size(1, depth), depth);
        assert_eq!(y_skin.faces[1], face(21));
        assert_eq!(leaf_at(&out, cell, depth).volume, vol(2));
    }
}

mod simplify_tests {
    use super::helpers::*;
    use crate::cube::edit::{put_cube, put_volumes, simplify, simplify_cube};
    use crate::cube::types::{Cube, CubeModel};
    use crate::spatial::math::CubePos;

    fn void_context(volume: u64) -> [Cube; 3] {
        let void_leaf = Cube::leaf(vol(volume));
        [void_leaf.clone(), void_leaf.clone(), void_leaf]
    }

    #[test]
    fn test_simplify_merges_uniform_branch() {
        let leaf = Cube::leaf(vol(1));
        let root = Cube::uniform_branch(&leaf);
        let simplified = simplify_cube(&root, &void_context(0));
        assert!(simplified.ptr_eq(&leaf));
    }

    #[test]
    fn test_simplify_face_conflict_blocks_merge() {
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(1)));
        children[0] = leaf_cube(vol(1), [face(7), Default::default(), Default::default()]);
        children[2] = leaf_cube(vol(1), [face(8), Default::default(), Default::default()]);
        let root = Cube::branch(children);
        // boundary against the void neighbor exists, and the faces disagree
        let simplified = simplify_cube(&root, &void_context(0));
        assert!(simplified.is_branch());
    }

    #[test]
    fn test_simplify_ignores_faces_without_boundary() {
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(1)));
        children[0] = leaf_cube(vol(1), [face(7), Default::default(), Default::default()]);
        children[2] = leaf_cube(vol(1), [face(8), Default::default(), Default::default()]);
        let root = Cube::branch(children);
        // the neighbors share the volume, so no boundary face is ever read
        let simplified = simplify_cube(&root, &void_context(1));
        assert!(simplified.is_leaf());
        assert_eq!(simplified.as_leaf().unwrap().volume, vol(1));
    }

    #[test]
    fn test_simplify_merges_consistent_boundary() {
        // every child agrees on the boundary face, so the merge keeps it and
        // reuses the first child outright
        let shared = leaf_cube(vol(1), [face(7), Default::default(), Default::default()]);
        let root = Cube::uniform_branch(&shared);
        let simplified = simplify_cube(&root, &void_context(0));
        assert!(simplified.ptr_eq(&shared));
        assert_eq!(simplified.as_leaf().unwrap().faces[0], face(7));
    }

    #[test]
    fn test_simplify_idempotent() {
        let size = CubePos::cube_size(3);
        let cell = CubePos::unit(3 * size);
        let mut root = Cube::leaf(vol(0));
        root = put_volumes(&root, cell, cell + CubePos::unit(size), vol(2));
        root = put_cube(
            &root,
            cell + CubePos::axis_size(1, 3),
            3,
            &leaf_cube(vol(3), [face(1), face(2), face(3)]),
        );
        let model = CubeModel {
            root,
            root_depth: 8,
            root_pos: CubePos::HALF,
            void_volume: vol(0),
        };
        let once = simplify(&model);
        let twice = simplify(&once);
        assert_eq!(once, twice);
    }
}
