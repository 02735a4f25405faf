pub mod edit;
pub mod stats;
pub mod types;

pub(crate) mod detail;

#[cfg(feature = "bytecode")]
pub mod convert;

#[cfg(test)]
mod tests;

pub use types::{Cube, CubeError, CubeModel, Face, Layer, Leaf, MaterialId, VolumeId};

use crate::spatial::math::CubePos;

#[cfg(feature = "bytecode")]
use bendy::{decoding::FromBencode, encoding::ToBencode};

impl CubeModel {
    /// Depth in the global addressing space whose cube size is one model
    /// unit.
    pub const UNIT_DEPTH: u32 = 24;

    /// A fresh model: one corner cube of `inner_volume` inside a root of
    /// `void_volume`, 8 units across, centered on the model origin.
    pub fn new_world(inner_volume: VolumeId, void_volume: VolumeId) -> CubeModel {
        let inner = Cube::leaf(inner_volume);
        let outer = Cube::leaf(void_volume);
        let mut children: [Cube; 8] = std::array::from_fn(|_| outer.clone());
        children[0] = inner;
        CubeModel {
            root: Cube::branch(children),
            root_depth: Self::UNIT_DEPTH - 3,
            root_pos: CubePos::HALF,
            void_volume,
        }
    }

    /// True if the point lies inside the root cube. Everything outside is
    /// implicitly `void_volume`.
    pub fn contains(&self, pos: CubePos) -> bool {
        let size = if self.root_depth == 0 {
            1u64 << 32
        } else {
            CubePos::cube_size(self.root_depth) as u64
        };
        (0..3).all(|axis| {
            let p = pos[axis] as u64;
            let lo = self.root_pos[axis] as u64;
            p >= lo && p < lo + size
        })
    }

    /// Converts a global-space position to the root cube's own space, where
    /// the root spans the full coordinate range.
    pub fn to_root(&self, pos: CubePos) -> CubePos {
        (pos - self.root_pos) << self.root_depth
    }

    /// Clamps the position to the bounds of the root, then converts to root
    /// space.
    pub fn to_root_clamped(&self, pos: CubePos) -> CubePos {
        let min_pos = self.root_pos;
        let max_pos =
            self.root_pos + CubePos::unit(CubePos::cube_size(self.root_depth).wrapping_sub(1));
        self.to_root(CubePos::max(CubePos::min(pos, max_pos), min_pos))
    }
}

#[cfg(feature = "bytecode")]
impl CubeModel {
    /// Converts the model to its byte representation.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bendy::encoding::Error> {
        self.to_bencode()
    }

    /// Parses a model from its byte representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bendy::decoding::Error> {
        Self::from_bencode(bytes)
    }

    /// Saves the model to the given file path.
    pub fn save(&self, path: &str) -> Result<(), std::io::Error> {
        use std::fs::File;
        use std::io::Write;
        let bytes = self
            .to_bytes()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Loads a model from the given file path.
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        use std::fs::File;
        use std::io::Read;
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}
