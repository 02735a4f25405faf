//! Operations on cube trees and models.
//!
//! Everything here takes immutable values and returns new ones; unchanged
//! subtrees are shared by reference between the old and the new tree, and
//! every algorithm returns its input handle untouched when it had no effect.

pub mod extrude;
pub mod region;
pub mod simplify;
pub mod transfer;

#[cfg(test)]
mod tests;

pub use extrude::{extrude, extrude_rect};
pub use region::{apply_faces, box_apply, max_side_box_apply, put_faces, put_volumes};
pub use simplify::{expand_model, shrink_model, simplify, simplify_cube};
pub use transfer::{transfer_box, transfer_extended_edge, transfer_faces};

use crate::cube::types::Cube;
use crate::spatial::{math::CubePos, MAX_DEPTH};

/// Finds the cube at the given position in the root, no deeper than the given
/// depth. A leaf terminates the search early: it implicitly represents all
/// deeper sub-cubes as identical.
///
/// # Panics
/// If `depth` exceeds [`MAX_DEPTH`].
pub fn get_cube<'a>(root: &'a Cube, pos: CubePos, depth: u32) -> &'a Cube {
    assert!(depth <= MAX_DEPTH, "cube depth {} exceeds the addressing width", depth);
    match root {
        Cube::Branch(children) if depth > 0 => {
            get_cube(&children[pos.child_index()], pos.to_child(), depth - 1)
        }
        _ => root,
    }
}

/// Applies a function to the cube at the given position and depth, producing
/// a new root with the function applied. Leaves on the way are subdivided,
/// unless the function leaves the target unchanged, in which case the
/// original root handle is returned and nothing is allocated.
///
/// # Panics
/// If `depth` exceeds [`MAX_DEPTH`].
pub fn cube_apply<F>(root: &Cube, pos: CubePos, depth: u32, func: F) -> Cube
where
    F: FnOnce(&Cube) -> Cube,
{
    assert!(depth <= MAX_DEPTH, "cube depth {} exceeds the addressing width", depth);
    if depth == 0 {
        return func(root);
    }
    let mut children = root.children_or_uniform();
    let child_i = pos.child_index();
    let new_child = cube_apply(&children[child_i], pos.to_child(), depth - 1, func);
    if new_child.ptr_eq(&children[child_i]) {
        return root.clone(); // avoid allocation
    }
    children[child_i] = new_child;
    Cube::branch(children)
}

/// Places a cube at the given position and depth, creating branches as
/// necessary. Placing a leaf identical to the existing one returns the
/// original root handle.
pub fn put_cube(root: &Cube, pos: CubePos, depth: u32, put: &Cube) -> Cube {
    cube_apply(root, pos, depth, |current| {
        if let (Cube::Leaf(cur), Cube::Leaf(new)) = (current, put) {
            if cur == new {
                return current.clone(); // help cube_apply avoid allocation
            }
        }
        put.clone()
    })
}
