//! Shape maintenance: merging redundant branches and fitting the model root
//! to its content. None of this changes the 3D content of a model.

use crate::cube::detail::max_side_volume_equal;
use crate::cube::types::{Cube, CubeModel, Leaf};
use crate::spatial::{math::cycle_index, math::CubePos};

/// Reduces 8 leaf children to a single equivalent leaf if possible, without
/// recursion.
///
/// The merge requires one shared volume, and per axis the children on that
/// axis's negative side must either have no boundary against the fixed
/// neighbor (`min_cubes`) or agree on a single boundary face; conflicting
/// faces block the merge.
fn simplify_shallow(children: &[Cube; 8], min_cubes: &[Cube; 3]) -> Option<Cube> {
    let leaf0 = children[0].as_leaf()?;
    for child in children.iter().skip(1) {
        let child_leaf = child.as_leaf()?;
        if child_leaf.volume != leaf0.volume {
            return None;
        }
    }
    let mut faces = leaf0.faces;
    let mut modified = false;
    for axis in 0..3 {
        let min_leaf = min_cubes[axis].as_leaf();
        let mut has_boundary = false;
        for i in 0..4 {
            let child_leaf = children[cycle_index(i, axis + 1)].as_leaf()?;
            if let Some(min_leaf) = min_leaf {
                if child_leaf.volume == min_leaf.volume {
                    continue; // no boundary, the face is never read
                }
            }
            if child_leaf.faces[axis] != faces[axis] {
                if has_boundary {
                    return None; // boundaries differ, can't merge
                }
                faces[axis] = child_leaf.faces[axis];
                modified = true;
            }
            has_boundary = true;
        }
    }
    if !modified {
        return Some(children[0].clone()); // avoid allocation
    }
    Some(Cube::from_leaf(Leaf {
        volume: leaf0.volume,
        faces,
    }))
}

/// Builds an equivalent cube containing as few branches as possible.
///
/// `min_cubes` are the cubes adjacent to this one along each axis, on the
/// negative side. Children reuse their already-simplified lower-index
/// siblings as neighbor context, so the walk stays linear in the tree size.
pub fn simplify_cube(cube: &Cube, min_cubes: &[Cube; 3]) -> Cube {
    let Cube::Branch(branch) = cube else {
        return cube.clone();
    };
    let mut children = (**branch).clone();
    let mut changed = false;
    for i in 0..8 {
        let child_min: [Cube; 3] = std::array::from_fn(|axis| {
            if i & (1 << axis) != 0 {
                // lower index, already simplified
                children[i & !(1 << axis)].clone()
            } else {
                min_cubes[axis].child_or_self(i | (1 << axis)).clone()
            }
        });
        let new_child = simplify_cube(&branch[i], &child_min);
        if !new_child.ptr_eq(&children[i]) {
            changed = true;
        }
        children[i] = new_child;
    }
    if let Some(leaf) = simplify_shallow(&children, min_cubes) {
        return leaf;
    }
    if !changed {
        return cube.clone(); // avoid allocation
    }
    Cube::branch(children)
}

/// Removes as many branch cubes as possible from the model without changing
/// its 3D content, then shrinks the root to fit.
pub fn simplify(model: &CubeModel) -> CubeModel {
    let void_leaf = Cube::leaf(model.void_volume);
    let root = simplify_cube(
        &model.root,
        &[void_leaf.clone(), void_leaf.clone(), void_leaf],
    );
    let (model, _, _) = shrink_model(&CubeModel {
        root,
        ..model.clone()
    });
    model
}

/// Expands the root of the model until it contains every given point (global
/// coordinates), keeping existing cubes at the same position and size: the
/// current root becomes one child of a new, coarser branch whose other 7
/// children are void leaves.
///
/// Besides the expanded model, returns the position and depth of the
/// previous root within the new one (`(CubePos::ZERO, 0)` when nothing
/// changed), so callers can remap positions they were holding.
pub fn expand_model(model: &CubeModel, points: &[CubePos]) -> (CubeModel, CubePos, u32) {
    let mut model = model.clone();
    let mut old_root_pos = CubePos::ZERO;
    let mut depth = 0;
    for &point in points {
        while model.root_depth > 0 && !model.contains(point) {
            let mut child_i = 0;
            for axis in 0..3 {
                if point[axis] < model.root_pos[axis] {
                    child_i |= 1 << axis;
                }
            }
            let void_leaf = Cube::leaf(model.void_volume);
            let mut children: [Cube; 8] = std::array::from_fn(|_| void_leaf.clone());
            children[child_i] = model.root;
            model.root = Cube::branch(children);
            model.root_pos =
                model.root_pos - CubePos::index_offset(child_i, model.root_depth);
            model.root_depth -= 1;
            old_root_pos = old_root_pos.to_parent(child_i);
            depth += 1;
        }
    }
    (model, old_root_pos, depth)
}

/// Reduces the size of the model root as much as possible without affecting
/// its content: while the root holds a single branch child surrounded by
/// void leaves, and no content of that child touches a side that would end
/// up against the implicit outside void, the child becomes the root.
///
/// Returns the position and depth of the new root within the previous one;
/// `(CubePos::ZERO, 0)` when nothing changed.
pub fn shrink_model(model: &CubeModel) -> (CubeModel, CubePos, u32) {
    let mut model = model.clone();
    let mut new_root_pos = CubePos::ZERO;
    let mut depth = 0;
    'shrink: while let Cube::Branch(branch) = &model.root {
        let mut single_branch_i = None;
        for (i, child) in branch.iter().enumerate() {
            match child {
                Cube::Branch(_) => {
                    if single_branch_i.is_some() {
                        break 'shrink; // two branch children, can't shrink
                    }
                    single_branch_i = Some(i);
                }
                Cube::Leaf(leaf) => {
                    if leaf.volume != model.void_volume {
                        break 'shrink;
                    }
                }
            }
        }
        let Some(child_i) = single_branch_i else {
            break; // all void, nothing left to pull up
        };
        let child = branch[child_i].clone();
        for axis in 0..3 {
            if child_i & (1 << axis) == 0
                && !max_side_volume_equal(&child, axis, model.void_volume)
            {
                // content on this side would lose its boundary faces, which
                // are stored in the sibling about to be dropped
                break 'shrink;
            }
        }
        model.root = child;
        model.root_depth += 1;
        model.root_pos = model.root_pos + CubePos::index_offset(child_i, model.root_depth);
        new_root_pos = new_root_pos.to_parent(child_i);
        depth += 1;
    }
    (model, new_root_pos, depth)
}
