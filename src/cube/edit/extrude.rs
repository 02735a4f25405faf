//! Growing a selection by one grid step along an axis.

use crate::cube::edit::{
    cube_apply, get_cube, put_cube, transfer_extended_edge, transfer_faces,
};
use crate::cube::types::Cube;
use crate::spatial::{math::cycle_index, math::CubePos, MAX_DEPTH};

/// Builds the cube that results from extruding one side of the given cube
/// through its full depth: every leaf along the extrusion axis becomes
/// identical, so the new slab has no internal structure along that axis.
///
/// * `axis` - axis of the side to be extruded
/// * `dir` - true extrudes the positive side, false the negative
pub(crate) fn make_extruded(cube: &Cube, axis: usize, dir: bool) -> Cube {
    let Cube::Branch(branch) = cube else {
        return cube.clone();
    };
    let mut children = (**branch).clone();
    let mut changed = false;
    for i in 0..4 {
        let min_i = cycle_index(i, axis + 1);
        let max_i = min_i | (1 << axis);
        let from_i = if dir { max_i } else { min_i };
        let child = make_extruded(&branch[from_i], axis, dir);
        if !child.ptr_eq(&children[min_i]) || !child.ptr_eq(&children[max_i]) {
            changed = true;
        }
        children[min_i] = child.clone();
        children[max_i] = child;
    }
    if !changed {
        return cube.clone(); // avoid allocation
    }
    Cube::branch(children)
}

/// Extrudes the side of one grid cell into the adjacent cell, including the
/// faces and volumes along that side.
///
/// `pos` addresses the cube whose negative side on `axis` is the face being
/// extruded. The `side_min`/`side_max` flags tell which of the 4 lateral
/// sides of the new slab cell face outward from the overall selection; the
/// lateral repairs only run there, interior cell boundaries are carried by
/// the extruded copies themselves.
fn extrude_cell(
    src_root: &Cube,
    mut dst_root: Cube,
    pos: CubePos,
    depth: u32,
    axis: usize,
    dir: bool,
    side_min: [bool; 2],
    side_max: [bool; 2],
) -> Cube {
    let axis_off = CubePos::axis_size(axis, depth);
    let min_pos = pos - axis_off;
    let (from_pos, to_pos) = if dir { (min_pos, pos) } else { (pos, min_pos) };
    let min_cube = get_cube(src_root, min_pos, depth);
    let max_cube = get_cube(src_root, pos, depth);
    let (from_cube, to_cube) = if dir {
        (min_cube, max_cube)
    } else {
        (max_cube, min_cube)
    };

    let mut extruded = make_extruded(from_cube, axis, dir);
    if dir {
        // the original boundary lands on the cube past the new slab
        dst_root = cube_apply(&dst_root, to_pos + axis_off, depth, |c| {
            transfer_faces(min_cube, max_cube, c, axis)
        });
    } else {
        // the extruded cube replaces to_cube wholesale, so its own negative
        // side must pick up both the surrounding and the original boundary
        extruded = transfer_faces(
            get_cube(src_root, to_pos - axis_off, depth),
            to_cube,
            &extruded,
            axis,
        );
        extruded = transfer_faces(min_cube, max_cube, &extruded, axis);
    }

    let side_child_i = if dir { 1 << axis } else { 0 };
    for i in 0..2 {
        let side_axis = (axis + i + 1) % 3;
        let side_off = CubePos::axis_size(side_axis, depth);
        if side_min[i] {
            // existing lateral boundary around the replaced cube
            extruded = transfer_faces(
                get_cube(src_root, to_pos - side_off, depth),
                to_cube,
                &extruded,
                side_axis,
            );
            // extend the front face around the slab's min edge
            extruded = transfer_extended_edge(
                min_cube, max_cube, &extruded, 0, axis, side_axis, axis,
            );
            // extend the source cell's own lateral side
            extruded = transfer_extended_edge(
                get_cube(src_root, from_pos - side_off, depth),
                from_cube,
                &extruded,
                side_child_i,
                side_axis,
                side_axis,
                axis,
            );
        }
        if side_max[i] {
            dst_root = cube_apply(&dst_root, to_pos + side_off, depth, |c| {
                let c = transfer_extended_edge(
                    min_cube, max_cube, c, 1 << side_axis, axis, side_axis, axis,
                );
                transfer_extended_edge(
                    from_cube,
                    get_cube(src_root, from_pos + side_off, depth),
                    &c,
                    side_child_i,
                    side_axis,
                    side_axis,
                    axis,
                )
            });
        }
    }
    put_cube(&dst_root, to_pos, depth, &extruded)
}

/// Extrudes a rectangular (2D) face selection by one grid step along its
/// normal axis.
///
/// `min`/`max` describe the rectangle: equal on `axis` (the face plane) and
/// spanning the selected cells on the other two axes, at the grid defined by
/// `depth`. `dir` true grows in the positive direction. The selection and
/// the cells it grows into must lie inside the root; expand the model first.
///
/// # Panics
/// If `depth` is 0 or exceeds [`MAX_DEPTH`].
pub fn extrude_rect(
    src_root: &Cube,
    dst_root: &Cube,
    min: CubePos,
    max: CubePos,
    depth: u32,
    axis: usize,
    dir: bool,
) -> Cube {
    assert!(depth >= 1 && depth <= MAX_DEPTH, "invalid extrusion grid depth {}", depth);
    debug_assert_eq!(min[axis], max[axis]);
    let size = CubePos::cube_size(depth);
    let side1 = (axis + 1) % 3;
    let side2 = (axis + 2) % 3;
    let steps1 = max[side1].wrapping_sub(min[side1]) / size;
    let steps2 = max[side2].wrapping_sub(min[side2]) / size;
    let mut result = dst_root.clone();
    for i in 0..steps1 {
        for j in 0..steps2 {
            let mut pos = min;
            pos[side1] = min[side1].wrapping_add(i * size);
            pos[side2] = min[side2].wrapping_add(j * size);
            result = extrude_cell(
                src_root,
                result,
                pos,
                depth,
                axis,
                dir,
                [i == 0, j == 0],
                [i == steps1 - 1, j == steps2 - 1],
            );
        }
    }
    result
}

/// Extrudes one side of a box selection by one grid step: the near face
/// layer is duplicated into the adjacent layer outside the box, growing the
/// selection along `axis` in direction `dir`.
pub fn extrude(
    src_root: &Cube,
    dst_root: &Cube,
    min: CubePos,
    max: CubePos,
    depth: u32,
    axis: usize,
    dir: bool,
) -> Cube {
    let mut rect_min = min;
    let mut rect_max = max;
    let plane = if dir { max[axis] } else { min[axis] };
    rect_min[axis] = plane;
    rect_max[axis] = plane;
    extrude_rect(src_root, dst_root, rect_min, rect_max, depth, axis, dir)
}
