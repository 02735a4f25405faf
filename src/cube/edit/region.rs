//! Generic region traversal and the box-shaped bulk edits built on it.

use crate::cube::types::{Cube, Face, Leaf, VolumeId};
use crate::spatial::{math::CubePos, MAX_DEPTH};

/// How a cube's interval relates to the query box.
enum Overlap {
    Outside,
    Partial,
    Inside,
}

/// A box query in root space, widened to 64 bits so the far edge of the
/// addressable space (2^32) stays representable. On a non-flattened axis a
/// `max` coordinate not above `min` denotes a span running to the end of the
/// space. This is the only wrap case the engine supports; boxes never cross
/// the 0 / 2^32 edge. On a flattened axis the box has zero width and selects the
/// cubes whose minimum boundary lies exactly on the plane.
struct BoxSpan {
    min: [u64; 3],
    max: [u64; 3],
    flatten: u8,
}

impl BoxSpan {
    fn new(min: CubePos, max: CubePos, flatten: u8) -> Self {
        let mut span = BoxSpan {
            min: [0; 3],
            max: [0; 3],
            flatten,
        };
        for axis in 0..3 {
            span.min[axis] = min[axis] as u64;
            span.max[axis] = max[axis] as u64;
            if flatten & (1 << axis) == 0 && span.max[axis] <= span.min[axis] {
                span.max[axis] += 1 << 32;
            }
        }
        span
    }

    fn classify(&self, pos: CubePos, depth: u32) -> Overlap {
        let size = 1u64 << (32 - depth);
        let mut inside = true;
        for axis in 0..3 {
            let cube_min = pos[axis] as u64;
            let cube_max = cube_min + size;
            if self.flatten & (1 << axis) != 0 {
                let plane = self.min[axis];
                if plane < cube_min || plane >= cube_max {
                    return Overlap::Outside;
                }
                if plane != cube_min {
                    inside = false;
                }
            } else {
                if cube_min >= self.max[axis] || cube_max <= self.min[axis] {
                    return Overlap::Outside;
                }
                if cube_min < self.min[axis] || cube_max > self.max[axis] {
                    inside = false;
                }
            }
        }
        if inside {
            Overlap::Inside
        } else {
            Overlap::Partial
        }
    }
}

/// The single generic primitive underlying all box-shaped edits.
///
/// Walks the tree and invokes `func` on every maximal cube whose interval is
/// fully contained in `[min, max)`; cubes entirely outside the box are
/// returned unchanged without being visited. The callback may replace the
/// cube it is handed and returns `true` to keep the node as final, or `false`
/// to force subdivision and be called again on each child. Cubes straddling
/// the box boundary are subdivided automatically. Subtrees the callback
/// leaves untouched are shared with the input tree.
///
/// Axes set in `flatten` collapse the box to zero width on that axis (the
/// `min` coordinate is the plane): the traversal then selects the cubes whose
/// minimum boundary lies on that plane, which turns the same walk into a 2D
/// rectangle or 1D line query.
pub fn box_apply<F>(cube: &Cube, min: CubePos, max: CubePos, flatten: u8, func: &mut F) -> Cube
where
    F: FnMut(&mut Cube, CubePos, u32) -> bool,
{
    let span = BoxSpan::new(min, max, flatten);
    box_apply_at(cube, &span, func, CubePos::ZERO, 0)
}

fn box_apply_at<F>(cube: &Cube, span: &BoxSpan, func: &mut F, pos: CubePos, depth: u32) -> Cube
where
    F: FnMut(&mut Cube, CubePos, u32) -> bool,
{
    let mut base = cube.clone();
    match span.classify(pos, depth) {
        Overlap::Outside => return base,
        Overlap::Inside => {
            if func(&mut base, pos, depth) {
                return base;
            }
            // the callback wants finer granularity; subdivide and descend
        }
        Overlap::Partial => {}
    }
    debug_assert!(depth < MAX_DEPTH);
    if depth >= MAX_DEPTH {
        return base; // nothing below the addressing width to subdivide
    }
    let mut children = base.children_or_uniform();
    let mut changed = !base.ptr_eq(cube);
    for (i, child) in children.iter_mut().enumerate() {
        let child_pos = pos | CubePos::index_offset(i, depth + 1);
        let new_child = box_apply_at(child, span, func, child_pos, depth + 1);
        if !new_child.ptr_eq(child) {
            changed = true;
        }
        *child = new_child;
    }
    if !changed {
        return cube.clone(); // avoid allocation
    }
    Cube::branch(children)
}

/// Restricts a box query to the cubes abutting the maximum boundary of the
/// box along the axes in `axes`: the outward-facing skin of the region,
/// whose stored negative faces are the region's positive faces.
pub fn max_side_box_apply<F>(
    cube: &Cube,
    min: CubePos,
    max: CubePos,
    axes: u8,
    func: &mut F,
) -> Cube
where
    F: FnMut(&mut Cube, CubePos, u32) -> bool,
{
    let mut side_min = min;
    for axis in 0..3 {
        if axes & (1 << axis) != 0 {
            side_min[axis] = max[axis];
        }
    }
    box_apply(cube, side_min, max, axes, func)
}

/// Sets the volume of everything within the box.
///
/// Subtrees strictly inside the box collapse to a single uniform leaf; cubes
/// touching the box's minimum boundary are written leaf by leaf instead, so
/// the boundary faces they store stay intact. Writing a volume that is
/// already present returns the original handle.
pub fn put_volumes(root: &Cube, min: CubePos, max: CubePos, volume: VolumeId) -> Cube {
    box_apply(root, min, max, 0, &mut |cube, pos, _depth| match cube {
        Cube::Leaf(leaf) => {
            if leaf.volume != volume {
                let mut new_leaf = (**leaf).clone();
                new_leaf.volume = volume;
                *cube = Cube::from_leaf(new_leaf);
            }
            true
        }
        Cube::Branch(_) => {
            if (0..3).any(|axis| pos[axis] == min[axis]) {
                false // keep per-leaf faces along the box minimum
            } else {
                *cube = Cube::leaf(volume);
                true
            }
        }
    })
}

/// Applies a function to every face within the box: one pass per axis over
/// the box's maximum-side skin (where the region's positive faces are
/// physically stored), then a final pass over all 3 stored faces of every
/// leaf inside.
pub fn apply_faces<F>(root: &Cube, min: CubePos, max: CubePos, func: F) -> Cube
where
    F: Fn(Face) -> Face,
{
    let mut result = root.clone();
    for axis in 0..3 {
        result = max_side_box_apply(&result, min, max, 1 << axis, &mut |cube, _pos, _depth| {
            match cube {
                Cube::Leaf(leaf) => {
                    let new_face = func(leaf.faces[axis]);
                    if new_face != leaf.faces[axis] {
                        let mut new_leaf = (**leaf).clone();
                        new_leaf.faces[axis] = new_face;
                        *cube = Cube::from_leaf(new_leaf);
                    }
                    true
                }
                Cube::Branch(_) => false,
            }
        });
    }
    box_apply(&result, min, max, 0, &mut |cube, _pos, _depth| match cube {
        Cube::Leaf(leaf) => {
            let mut faces = leaf.faces;
            for face in faces.iter_mut() {
                *face = func(*face);
            }
            if faces != leaf.faces {
                *cube = Cube::from_leaf(Leaf {
                    volume: leaf.volume,
                    faces,
                });
            }
            true
        }
        Cube::Branch(_) => false,
    })
}

/// Replaces every face within the box with the given value.
pub fn put_faces(root: &Cube, min: CubePos, max: CubePos, face: Face) -> Cube {
    apply_faces(root, min, max, move |_| face)
}
