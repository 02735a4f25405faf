use crate::cube::stats;
use crate::cube::types::{Cube, Face, Leaf, VolumeId};
use crate::spatial::math::cycle_index;
use std::rc::Rc;

///####################################################################################
/// Cube
///####################################################################################

impl Cube {
    /// A leaf with the given volume and default faces.
    pub fn leaf(volume: VolumeId) -> Cube {
        Cube::from_leaf(Leaf::new(volume))
    }

    pub fn from_leaf(leaf: Leaf) -> Cube {
        stats::count_alloc();
        Cube::Leaf(Rc::new(leaf))
    }

    pub fn branch(children: [Cube; 8]) -> Cube {
        stats::count_alloc();
        Cube::Branch(Rc::new(children))
    }

    /// A branch with all 8 children sharing one handle, the result of
    /// subdividing `cube` without changing its content.
    pub fn uniform_branch(cube: &Cube) -> Cube {
        Cube::branch(std::array::from_fn(|_| cube.clone()))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Cube::Leaf(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Cube::Branch(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Cube::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Cube; 8]> {
        match self {
            Cube::Branch(children) => Some(children),
            _ => None,
        }
    }

    /// The real child for a branch, the cube itself for a leaf: a leaf at
    /// depth `d` is definitionally identical to 8 leaves at depth `d + 1`.
    /// All the lock-step walks over trees of differing local depth go
    /// through here.
    pub fn child_or_self(&self, index: usize) -> &Cube {
        match self {
            Cube::Branch(children) => &children[index],
            _ => self,
        }
    }

    /// The children of a branch, or 8 clones of a leaf (subdivision-on-write).
    pub(crate) fn children_or_uniform(&self) -> [Cube; 8] {
        match self {
            Cube::Branch(children) => (**children).clone(),
            _ => std::array::from_fn(|_| self.clone()),
        }
    }

    /// Handle identity: true if both values share the same node.
    pub fn ptr_eq(&self, other: &Cube) -> bool {
        match (self, other) {
            (Cube::Branch(a), Cube::Branch(b)) => Rc::ptr_eq(a, b),
            (Cube::Leaf(a), Cube::Leaf(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

///####################################################################################
/// Side walks
///####################################################################################

/// Sets all faces coplanar with the negative side of the given axis,
/// recursively. Returns the input handle unchanged if every face already
/// matches.
pub(crate) fn set_all_faces(cube: &Cube, axis: usize, face: Face) -> Cube {
    match cube {
        Cube::Leaf(leaf) => {
            if leaf.faces[axis] == face {
                return cube.clone();
            }
            let mut new_leaf = (**leaf).clone();
            new_leaf.faces[axis] = face;
            Cube::from_leaf(new_leaf)
        }
        Cube::Branch(branch) => {
            let mut children = (**branch).clone();
            let mut changed = false;
            for i in 0..4 {
                let child_i = cycle_index(i, axis + 1);
                let new_child = set_all_faces(&branch[child_i], axis, face);
                if !new_child.ptr_eq(&children[child_i]) {
                    changed = true;
                }
                children[child_i] = new_child;
            }
            if !changed {
                return cube.clone();
            }
            Cube::branch(children)
        }
    }
}

/// True if every cube bordering the positive side of the given axis has the
/// given volume.
pub(crate) fn max_side_volume_equal(cube: &Cube, axis: usize, volume: VolumeId) -> bool {
    match cube {
        Cube::Leaf(leaf) => leaf.volume == volume,
        Cube::Branch(branch) => (0..4).all(|i| {
            let child_i = cycle_index(i, axis + 1) | (1 << axis);
            max_side_volume_equal(&branch[child_i], axis, volume)
        }),
    }
}
