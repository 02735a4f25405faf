mod model_tests {
    use crate::cube::types::{CubeModel, VolumeId};
    use crate::spatial::math::CubePos;

    fn vol(id: u64) -> VolumeId {
        VolumeId(id)
    }

    #[test]
    fn test_new_world_shape() {
        let model = CubeModel::new_world(vol(1), vol(2));
        assert_eq!(model.root_depth, CubeModel::UNIT_DEPTH - 3);
        assert_eq!(model.root_pos, CubePos::HALF);
        assert_eq!(model.void_volume, vol(2));
        let children = model.root.children().expect("new world root is a branch");
        assert_eq!(children[0].as_leaf().unwrap().volume, vol(1));
        for child in children.iter().skip(1) {
            assert_eq!(child.as_leaf().unwrap().volume, vol(2));
        }
    }

    #[test]
    fn test_contains() {
        let model = CubeModel::new_world(vol(1), vol(2));
        let size = CubePos::cube_size(model.root_depth);
        assert!(model.contains(CubePos::HALF));
        assert!(model.contains(CubePos::HALF + CubePos::unit(size - 1)));
        assert!(!model.contains(CubePos::HALF + CubePos::unit(size)));
        assert!(!model.contains(CubePos::HALF - CubePos::unit(1)));
    }

    #[test]
    fn test_to_root_mapping() {
        let model = CubeModel::new_world(vol(1), vol(2));
        assert_eq!(model.to_root(model.root_pos), CubePos::ZERO);
        // one root-size step lands on the far corner of root space
        let inner = model.root_pos + CubePos::unit(CubePos::cube_size(model.root_depth + 1));
        assert_eq!(model.to_root(inner), CubePos::HALF);
        // clamping keeps out-of-root points just inside
        let outside = model.root_pos - CubePos::unit(5);
        assert_eq!(model.to_root_clamped(outside), CubePos::ZERO);
    }
}

mod expand_shrink_tests {
    use crate::cube::edit::{expand_model, get_cube, shrink_model};
    use crate::cube::types::{Cube, CubeModel, VolumeId};
    use crate::spatial::math::CubePos;

    fn vol(id: u64) -> VolumeId {
        VolumeId(id)
    }

    /// A model whose root branch holds one solid corner leaf, everything
    /// else void.
    fn corner_model() -> CubeModel {
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(0)));
        children[0] = Cube::leaf(vol(1));
        CubeModel {
            root: Cube::branch(children),
            root_depth: 8,
            root_pos: CubePos::HALF,
            void_volume: vol(0),
        }
    }

    #[test]
    fn test_expand_noop_for_contained_points() {
        let model = corner_model();
        let (expanded, old_pos, depth) = expand_model(&model, &[CubePos::HALF]);
        assert_eq!(expanded, model);
        assert_eq!(old_pos, CubePos::ZERO);
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_expand_wraps_root_toward_point() {
        let model = corner_model();
        let point = CubePos::HALF - CubePos::unit(1);
        let (expanded, old_pos, depth) = expand_model(&model, &[point]);
        assert!(expanded.contains(point));
        assert_eq!(depth, 1);
        assert_eq!(expanded.root_depth, 7);
        // the old root sits in the positive corner of the new one
        assert_eq!(old_pos, CubePos::HALF);
        let children = expanded.root.children().unwrap();
        assert!(children[7].ptr_eq(&model.root));
        for child in children.iter().take(7) {
            assert_eq!(child.as_leaf().unwrap().volume, vol(0));
        }
        // existing content kept its global position, one level deeper
        let solid = get_cube(&expanded.root, expanded.to_root(CubePos::HALF), 2);
        assert_eq!(solid.as_leaf().unwrap().volume, vol(1));
    }

    #[test]
    fn test_shrink_undoes_expand() {
        let model = corner_model();
        let point = CubePos::HALF - CubePos::unit(1);
        let (expanded, _, _) = expand_model(&model, &[point]);
        let (shrunk, new_pos, depth) = shrink_model(&expanded);
        assert_eq!(shrunk, model);
        assert_eq!(depth, 1);
        assert_eq!(new_pos, CubePos::HALF);
    }

    #[test]
    fn test_shrink_keeps_content_on_max_sides() {
        // the kept child's positive sides carry solid cubes whose boundary
        // faces live in the sibling leaves; shrinking would lose them
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(0)));
        children[0] = Cube::uniform_branch(&Cube::leaf(vol(1)));
        let model = CubeModel {
            root: Cube::branch(children),
            root_depth: 8,
            root_pos: CubePos::HALF,
            void_volume: vol(0),
        };
        let (shrunk, new_pos, depth) = shrink_model(&model);
        assert_eq!(shrunk, model);
        assert_eq!(new_pos, CubePos::ZERO);
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_shrink_pulls_up_interior_content() {
        // content only in the kept child's own negative corner: safe to pull up
        let mut inner: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(0)));
        inner[0] = Cube::leaf(vol(1));
        let mut children: [Cube; 8] = std::array::from_fn(|_| Cube::leaf(vol(0)));
        children[0] = Cube::branch(inner);
        let kept = children[0].clone();
        let model = CubeModel {
            root: Cube::branch(children),
            root_depth: 8,
            root_pos: CubePos::HALF,
            void_volume: vol(0),
        };
        let (shrunk, _, depth) = shrink_model(&model);
        assert_eq!(depth, 1);
        assert_eq!(shrunk.root_depth, 9);
        assert_eq!(shrunk.root_pos, CubePos::HALF);
        assert!(shrunk.root.ptr_eq(&kept));
    }
}

mod stats_tests {
    use crate::cube::stats;
    use crate::cube::types::{Cube, VolumeId};

    #[test]
    fn test_operation_alloc_count() {
        stats::begin_operation();
        let leaf = Cube::leaf(VolumeId(1));
        let _branch = Cube::uniform_branch(&leaf);
        assert_eq!(stats::end_operation("test"), 2);
        // counts reset per operation
        stats::begin_operation();
        assert_eq!(stats::end_operation("empty"), 0);
    }
}
