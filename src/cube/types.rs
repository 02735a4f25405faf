use crate::spatial::math::CubePos;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of the substance filling a volume of space
/// (e.g. empty, solid, fluid). The engine only ever compares these.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VolumeId(pub u64);

/// Opaque identifier of a surface material, resolved by the renderer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct MaterialId(pub u64);

/// One material layer of a face, with its UV placement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Layer {
    pub material: MaterialId,
    /// Combination of the `ORIENT_*` flags below.
    pub orientation: u8,
    pub u_offset: i8,
    pub v_offset: i8,
}

impl Layer {
    pub const ORIENT_FLIP_U: u8 = 1;
    pub const ORIENT_FLIP_V: u8 = 2;
    pub const ORIENT_SWAP_UV: u8 = 4;
}

/// The boundary surface between two adjacent cubes of differing volume:
/// a solid base layer and a translucent overlay on top of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Face {
    pub base: Layer,
    pub overlay: Layer,
}

/// A uniform sub-volume of the tree.
///
/// Only the faces on the negative X, negative Y and negative Z sides are
/// stored here; the other 3 sides live on the adjacent cubes in those
/// directions. A face is only meaningful while the two cubes it separates
/// have different volumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Leaf {
    pub volume: VolumeId,
    pub faces: [Face; 3],
}

impl Leaf {
    pub fn new(volume: VolumeId) -> Self {
        Self {
            volume,
            faces: [Face::default(); 3],
        }
    }
}

/// An immutable node in the cube octree, shared by reference.
///
/// Branches are divided into 8 equally-sized child cubes along the 3
/// axis-aligned planes. Children are ordered based on which side of these
/// planes they are on: negative first, then positive, with the Z plane taking
/// highest precedence, then Y, then X: bit 0/1/2 of the child index select
/// the positive X/Y/Z half.
///
/// Nodes are never mutated after construction, so edits that leave a subtree
/// untouched return the same handle, and handle identity (`ptr_eq`) is a
/// valid "did this change" check across a single edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Cube {
    Branch(Rc<[Cube; 8]>),
    Leaf(Rc<Leaf>),
}

/// The top-level volume container: a root cube positioned somewhere in the
/// global addressing space, and the volume implied everywhere outside it.
///
/// `root_depth` is the depth at which the root cube sits in the global
/// `CubePos` space, `root_pos` its origin there; `root_pos` stays aligned to
/// the root's own size. Any point outside the root is implicitly
/// `void_volume` and needs a root expansion before it can be written.
/// Every edit produces a new model value; retaining previous values (for
/// undo) is cheap because unchanged subtrees are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubeModel {
    pub root: Cube,
    pub root_depth: u32,
    pub root_pos: CubePos,
    pub void_volume: VolumeId,
}

/// Error types during usage of the cube model
#[derive(Debug)]
pub enum CubeError {
    /// The tree reaches past the 32 bit addressing width; the content is too
    /// large or too finely subdivided to represent.
    DepthExceeded { depth: u32 },
    /// An index-width-limited object table overflowed while interning values.
    TooManyObjects { kind: &'static str, count: usize },
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeError::DepthExceeded { depth } => {
                write!(f, "cube tree deeper than the addressable {} levels (reached {})",
                    crate::spatial::MAX_DEPTH, depth)
            }
            CubeError::TooManyObjects { kind, count } => {
                write!(f, "too many unique {} objects for the index width ({})", kind, count)
            }
        }
    }
}

impl Error for CubeError {}
