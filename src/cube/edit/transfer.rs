//! Boundary-face propagation between adjacent cubes, and the box copy built
//! on top of it.
//!
//! The three trees involved may have different local subdivision depth; the
//! walks advance in lock-step, treating a leaf as repeating uniformly across
//! the children of whichever sibling is a branch (`Cube::child_or_self`).

use crate::cube::detail::set_all_faces;
use crate::cube::edit::{box_apply, get_cube, max_side_box_apply};
use crate::cube::types::Cube;
use crate::spatial::{math::cycle_index, math::CubePos, MAX_DEPTH};

/// Transfers any boundary faces between two adjacent cubes to a third cube.
/// A boundary face is a face between two different volumes; where the source
/// pair has equal volumes nothing is read or written and the destination is
/// returned unchanged.
///
/// `src_min` and `src_max` are adjacent along `axis`, negative side first;
/// the transferred values land on the destination's negative side of `axis`.
pub fn transfer_faces(src_min: &Cube, src_max: &Cube, dst: &Cube, axis: usize) -> Cube {
    if let (Cube::Leaf(leaf_min), Cube::Leaf(leaf_max)) = (src_min, src_max) {
        return if leaf_min.volume == leaf_max.volume {
            dst.clone()
        } else {
            set_all_faces(dst, axis, leaf_max.faces[axis])
        };
    }
    let mut children = dst.children_or_uniform();
    let mut changed = false;
    for i in 0..4 {
        let max_i = cycle_index(i, axis + 1);
        let child_min = src_min.child_or_self(max_i | (1 << axis));
        let child_max = src_max.child_or_self(max_i);
        let new_child = transfer_faces(child_min, child_max, &children[max_i], axis);
        if !new_child.ptr_eq(&children[max_i]) {
            changed = true;
        }
        children[max_i] = new_child;
    }
    if !changed {
        return dst.clone(); // avoid allocation
    }
    Cube::branch(children)
}

/// Copies the boundary faces along one edge of a side between two cubes onto
/// the side of another cube, extending them along the perpendicular axis so
/// the faces along any line in that direction are identical. This is what
/// makes extrusion seamless along the edges and corners of the extruded
/// region, not just its interior.
///
/// * `src_child_i` - the lower of the two adjacent child indices defining
///   the source edge
/// * `src_face_axis` - side of the source cubes whose edge is extended, also
///   the axis on which they are adjacent
/// * `dst_face_axis` - side of the destination cube receiving the faces
/// * `ext_axis` - direction along the destination in which the edge is
///   extended; the axis parallel to the edge is perpendicular to both
///   `dst_face_axis` and `ext_axis`
pub fn transfer_extended_edge(
    src_min: &Cube,
    src_max: &Cube,
    dst: &Cube,
    src_child_i: usize,
    src_face_axis: usize,
    dst_face_axis: usize,
    ext_axis: usize,
) -> Cube {
    if let (Cube::Leaf(leaf_min), Cube::Leaf(leaf_max)) = (src_min, src_max) {
        return if leaf_min.volume == leaf_max.volume {
            dst.clone()
        } else {
            set_all_faces(dst, dst_face_axis, leaf_max.faces[src_face_axis])
        };
    }
    let mut children = dst.children_or_uniform();
    let edge_i = 7 & !(1 << dst_face_axis) & !(1 << ext_axis);
    let mut changed = false;
    for i in 0..2 {
        let src_max_i = (edge_i * i) | src_child_i;
        let child_min = src_min.child_or_self(src_max_i | (1 << src_face_axis));
        let child_max = src_max.child_or_self(src_max_i);
        let dst_i1 = edge_i * i;
        let dst_i2 = dst_i1 | (1 << ext_axis);
        for dst_i in [dst_i1, dst_i2] {
            let new_child = transfer_extended_edge(
                child_min,
                child_max,
                &children[dst_i],
                src_child_i,
                src_face_axis,
                dst_face_axis,
                ext_axis,
            );
            if !new_child.ptr_eq(&children[dst_i]) {
                changed = true;
            }
            children[dst_i] = new_child;
        }
    }
    if !changed {
        return dst.clone(); // avoid allocation
    }
    Cube::branch(children)
}

/// Maps destination nodes of a box copy back to their source nodes, scaled
/// across a depth difference.
struct BoxMap {
    src_min: CubePos,
    dst_min: CubePos,
    /// Destination grid depth minus source grid depth; positive means the
    /// pasted copy is finer (smaller) than the source.
    depth_diff: i32,
}

impl BoxMap {
    /// Scales a source-box extent to the destination box.
    fn dst_extent(&self, extent: CubePos) -> CubePos {
        if self.depth_diff >= 0 {
            extent >> self.depth_diff as u32
        } else {
            extent << (-self.depth_diff) as u32
        }
    }

    /// The source node matching a destination node, or None when the source
    /// tree has no aligned node at this granularity yet and the destination
    /// walk needs to subdivide further.
    fn src_node(&self, pos: CubePos, depth: u32) -> Option<(CubePos, u32)> {
        let src_depth = depth as i32 - self.depth_diff;
        if src_depth < 0 {
            return None;
        }
        let src_depth = src_depth as u32;
        let mut offset = pos - self.dst_min;
        if self.depth_diff >= 0 {
            offset = offset << self.depth_diff as u32;
        } else {
            let shift = (-self.depth_diff) as u32;
            let mask = (1u32 << shift) - 1;
            if (0..3).any(|axis| offset[axis] & mask != 0) {
                return None;
            }
            offset = offset >> shift;
        }
        let src_pos = self.src_min + offset;
        let size = 1u64 << (32 - src_depth.min(MAX_DEPTH));
        if (0..3).any(|axis| (src_pos[axis] as u64) % size != 0) {
            return None;
        }
        Some((src_pos, src_depth))
    }
}

/// Copies the content of a source box into a destination box, possibly at a
/// different subdivision depth (scaled by `depth_diff = dst grid depth - src
/// grid depth`), then repairs the boundary faces of the pasted region: the
/// cubes along the box's minimum faces pick up boundaries from both the
/// pre-existing destination neighbors and the source's own neighbors, and
/// the skin just past the maximum faces receives the source's outward
/// boundaries.
pub fn transfer_box(
    src_root: &Cube,
    src_min: CubePos,
    src_max: CubePos,
    dst_root: &Cube,
    dst_min: CubePos,
    depth_diff: i32,
) -> Cube {
    let map = BoxMap {
        src_min,
        dst_min,
        depth_diff,
    };
    let dst_max = dst_min + map.dst_extent(src_max - src_min);
    let old_dst = dst_root.clone();

    // copy the content, aligned subtree by aligned subtree
    let mut result = box_apply(dst_root, dst_min, dst_max, 0, &mut |cube, pos, depth| {
        match map.src_node(pos, depth) {
            Some((src_pos, src_depth)) => {
                let copied = get_cube(src_root, src_pos, src_depth.min(MAX_DEPTH));
                if !cube.ptr_eq(copied) {
                    if let (Cube::Leaf(cur), Cube::Leaf(new)) = (&*cube, copied) {
                        if cur == new {
                            return true; // avoid allocation
                        }
                    }
                    *cube = copied.clone();
                }
                true
            }
            None => false,
        }
    });

    for axis in 0..3 {
        let axis_bit = 1 << axis;

        // cubes inside the box along its minimum face: combine the boundary
        // that was already present in the destination with the boundary the
        // source had there, source winning where both exist
        let mut flat_max = dst_max;
        flat_max[axis] = dst_min[axis];
        result = box_apply(&result, dst_min, flat_max, axis_bit, &mut |cube, pos, depth| {
            let Some((src_pos, src_depth)) = map.src_node(pos, depth) else {
                return false;
            };
            if src_depth > MAX_DEPTH {
                return true;
            }
            if pos[axis] != 0 {
                let neighbor = get_cube(&old_dst, pos - CubePos::axis_size(axis, depth), depth);
                let old_here = get_cube(&old_dst, pos, depth);
                *cube = transfer_faces(neighbor, old_here, cube, axis);
            }
            if src_pos[axis] != 0 {
                let neighbor =
                    get_cube(src_root, src_pos - CubePos::axis_size(axis, src_depth), src_depth);
                let src_here = get_cube(src_root, src_pos, src_depth);
                *cube = transfer_faces(neighbor, src_here, cube, axis);
            }
            true
        });

        // the skin just past the box maximum stores the pasted region's
        // positive faces; give it the source's outward boundary
        result = max_side_box_apply(&result, dst_min, dst_max, axis_bit, &mut |cube, pos, depth| {
            let inside_pos = pos - CubePos::axis_size(axis, depth);
            let Some((src_pos, src_depth)) = map.src_node(inside_pos, depth) else {
                return false;
            };
            if src_depth > MAX_DEPTH {
                return true;
            }
            let src_size = 1u64 << (32 - src_depth);
            if src_pos[axis] as u64 + src_size >= 1 << 32 {
                return true; // source box ends at the edge of the space
            }
            let src_here = get_cube(src_root, src_pos, src_depth);
            let src_beyond =
                get_cube(src_root, src_pos + CubePos::axis_size(axis, src_depth), src_depth);
            *cube = transfer_faces(src_here, src_beyond, cube, axis);
            true
        });
    }
    result
}
