//! Byte representation of a cube model.
//!
//! All repeated values are deduplicated into index-referenced tables: one
//! table of opaque ids (volumes and materials), one of faces, one of leaves
//! and one of cube nodes in child-before-parent order, so shared subtrees are
//! stored once and decoding restores the sharing. Table indices are 16 bits
//! wide; overflowing one fails the encode with `CubeError::TooManyObjects`.

use crate::cube::types::{Cube, CubeError, CubeModel, Face, Layer, Leaf, MaterialId, VolumeId};
use crate::spatial::{math::CubePos, MAX_DEPTH};
use bendy::{
    decoding::{FromBencode, Object},
    encoding::{Error as BencodeError, SingleItemEncoder, ToBencode},
};
use std::collections::HashMap;
use std::rc::Rc;

///####################################################################################
/// Object tables
///####################################################################################

struct ObjectCache<T> {
    objects: Vec<T>,
    indices: HashMap<T, u16>,
}

impl<T: Clone + Eq + std::hash::Hash> ObjectCache<T> {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            indices: HashMap::new(),
        }
    }

    fn intern(&mut self, object: T, kind: &'static str) -> Result<u16, CubeError> {
        if let Some(&index) = self.indices.get(&object) {
            return Ok(index);
        }
        let index = self.objects.len();
        if index >= u16::MAX as usize {
            return Err(CubeError::TooManyObjects { kind, count: index });
        }
        self.objects.push(object.clone());
        self.indices.insert(object, index as u16);
        Ok(index as u16)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct LayerEntry {
    material: u16,
    orientation: u8,
    u_offset: i8,
    v_offset: i8,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct FaceEntry {
    base: LayerEntry,
    overlay: LayerEntry,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct LeafEntry {
    volume: u16,
    faces: [u16; 3],
}

#[derive(Clone, Copy)]
enum CubeEntry {
    Leaf(u16),
    Branch([u16; 8]),
}

/// Cube node identity, used to store each shared subtree only once.
fn cube_key(cube: &Cube) -> *const () {
    match cube {
        Cube::Branch(children) => Rc::as_ptr(children) as *const (),
        Cube::Leaf(leaf) => Rc::as_ptr(leaf) as *const (),
    }
}

struct Tables {
    ids: Vec<u64>,
    id_indices: HashMap<u64, u16>,
    faces: ObjectCache<FaceEntry>,
    leaves: ObjectCache<LeafEntry>,
    cubes: Vec<CubeEntry>,
    cube_indices: HashMap<*const (), u16>,
}

impl Tables {
    fn new() -> Self {
        Self {
            ids: Vec::new(),
            id_indices: HashMap::new(),
            faces: ObjectCache::new(),
            leaves: ObjectCache::new(),
            cubes: Vec::new(),
            cube_indices: HashMap::new(),
        }
    }

    fn add_id(&mut self, id: u64) -> Result<u16, CubeError> {
        if let Some(&index) = self.id_indices.get(&id) {
            return Ok(index);
        }
        let index = self.ids.len();
        if index >= u16::MAX as usize {
            return Err(CubeError::TooManyObjects {
                kind: "id",
                count: index,
            });
        }
        self.ids.push(id);
        self.id_indices.insert(id, index as u16);
        Ok(index as u16)
    }

    fn add_layer(&mut self, layer: &Layer) -> Result<LayerEntry, CubeError> {
        Ok(LayerEntry {
            material: self.add_id(layer.material.0)?,
            orientation: layer.orientation,
            u_offset: layer.u_offset,
            v_offset: layer.v_offset,
        })
    }

    fn add_face(&mut self, face: &Face) -> Result<u16, CubeError> {
        let entry = FaceEntry {
            base: self.add_layer(&face.base)?,
            overlay: self.add_layer(&face.overlay)?,
        };
        self.faces.intern(entry, "face")
    }

    fn add_leaf(&mut self, leaf: &Leaf) -> Result<u16, CubeError> {
        let entry = LeafEntry {
            volume: self.add_id(leaf.volume.0)?,
            faces: [
                self.add_face(&leaf.faces[0])?,
                self.add_face(&leaf.faces[1])?,
                self.add_face(&leaf.faces[2])?,
            ],
        };
        self.leaves.intern(entry, "leaf")
    }

    fn add_cube(&mut self, cube: &Cube, depth: u32) -> Result<u16, CubeError> {
        if depth > MAX_DEPTH {
            return Err(CubeError::DepthExceeded { depth });
        }
        if let Some(&index) = self.cube_indices.get(&cube_key(cube)) {
            return Ok(index);
        }
        let entry = match cube {
            Cube::Leaf(leaf) => CubeEntry::Leaf(self.add_leaf(leaf)?),
            Cube::Branch(children) => {
                let mut indices = [0u16; 8];
                for (slot, child) in indices.iter_mut().zip(children.iter()) {
                    *slot = self.add_cube(child, depth + 1)?;
                }
                CubeEntry::Branch(indices)
            }
        };
        let index = self.cubes.len();
        if index >= u16::MAX as usize {
            return Err(CubeError::TooManyObjects {
                kind: "cube",
                count: index,
            });
        }
        self.cubes.push(entry);
        self.cube_indices.insert(cube_key(cube), index as u16);
        Ok(index as u16)
    }
}

///####################################################################################
/// Encoding
///####################################################################################

impl ToBencode for LayerEntry {
    const MAX_DEPTH: usize = 2;
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_list(|e| {
            e.emit_int(self.material)?;
            e.emit_int(self.orientation)?;
            e.emit_int(self.u_offset)?;
            e.emit_int(self.v_offset)
        })
    }
}

impl ToBencode for FaceEntry {
    const MAX_DEPTH: usize = 3;
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_list(|e| {
            e.emit(self.base)?;
            e.emit(self.overlay)
        })
    }
}

impl ToBencode for LeafEntry {
    const MAX_DEPTH: usize = 2;
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        encoder.emit_list(|e| {
            e.emit_int(self.volume)?;
            for face in self.faces {
                e.emit_int(face)?;
            }
            Ok(())
        })
    }
}

impl ToBencode for CubeEntry {
    const MAX_DEPTH: usize = 2;
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        match self {
            CubeEntry::Leaf(leaf) => encoder.emit_list(|e| {
                e.emit_str("#l")?;
                e.emit_int(*leaf)
            }),
            CubeEntry::Branch(children) => encoder.emit_list(|e| {
                e.emit_str("#b")?;
                for child in children {
                    e.emit_int(*child)?;
                }
                Ok(())
            }),
        }
    }
}

impl ToBencode for CubeModel {
    const MAX_DEPTH: usize = 8;
    fn encode(&self, encoder: SingleItemEncoder) -> Result<(), BencodeError> {
        let mut tables = Tables::new();
        let root_index = tables
            .add_cube(&self.root, 0)
            .map_err(BencodeError::malformed_content)?;
        let void_index = tables
            .add_id(self.void_volume.0)
            .map_err(BencodeError::malformed_content)?;
        encoder.emit_list(|e| {
            e.emit_list(|e| {
                for id in &tables.ids {
                    e.emit_int(*id)?;
                }
                Ok(())
            })?;
            e.emit_list(|e| {
                for face in &tables.faces.objects {
                    e.emit(*face)?;
                }
                Ok(())
            })?;
            e.emit_list(|e| {
                for leaf in &tables.leaves.objects {
                    e.emit(*leaf)?;
                }
                Ok(())
            })?;
            e.emit_list(|e| {
                for cube in &tables.cubes {
                    e.emit(*cube)?;
                }
                Ok(())
            })?;
            e.emit_int(root_index)?;
            e.emit_int(self.root_depth)?;
            e.emit_int(self.root_pos.x)?;
            e.emit_int(self.root_pos.y)?;
            e.emit_int(self.root_pos.z)?;
            e.emit_int(void_index)
        })
    }
}

///####################################################################################
/// Decoding
///####################################################################################

fn next<'obj, 'ser>(
    list: &'obj mut bendy::decoding::ListDecoder<'_, 'ser>,
    what: &'static str,
) -> Result<Object<'obj, 'ser>, bendy::decoding::Error> {
    list.next_object()?
        .ok_or_else(|| bendy::decoding::Error::unexpected_token(what, "end of list"))
}

fn next_int<T: std::str::FromStr>(
    list: &mut bendy::decoding::ListDecoder<'_, '_>,
    field: &'static str,
) -> Result<T, bendy::decoding::Error>
where
    bendy::decoding::Error: From<T::Err>,
{
    match list.next_object()? {
        Some(Object::Integer(i)) => Ok(i.parse::<T>()?),
        _ => Err(bendy::decoding::Error::unexpected_token(
            format!("int field {}", field),
            "Something else",
        )),
    }
}

fn table_item<'a, T>(
    table: &'a [T],
    index: u16,
    kind: &'static str,
) -> Result<&'a T, bendy::decoding::Error> {
    table.get(index as usize).ok_or_else(|| {
        bendy::decoding::Error::unexpected_token(
            format!("valid {} table index", kind),
            format!("index {} of {}", index, table.len()),
        )
    })
}

impl FromBencode for LayerEntry {
    fn decode_bencode_object(data: Object) -> Result<Self, bendy::decoding::Error> {
        match data {
            Object::List(mut list) => Ok(Self {
                material: next_int(&mut list, "material")?,
                orientation: next_int(&mut list, "orientation")?,
                u_offset: next_int(&mut list, "u_offset")?,
                v_offset: next_int(&mut list, "v_offset")?,
            }),
            _ => Err(bendy::decoding::Error::unexpected_token(
                "List of Layer fields",
                "Something else",
            )),
        }
    }
}

impl FromBencode for FaceEntry {
    fn decode_bencode_object(data: Object) -> Result<Self, bendy::decoding::Error> {
        match data {
            Object::List(mut list) => {
                let base = match list.next_object()? {
                    Some(object) => LayerEntry::decode_bencode_object(object),
                    None => Err(bendy::decoding::Error::unexpected_token(
                        "base Layer",
                        "end of list",
                    )),
                }?;
                let overlay = match list.next_object()? {
                    Some(object) => LayerEntry::decode_bencode_object(object),
                    None => Err(bendy::decoding::Error::unexpected_token(
                        "overlay Layer",
                        "end of list",
                    )),
                }?;
                Ok(Self { base, overlay })
            }
            _ => Err(bendy::decoding::Error::unexpected_token(
                "List of Face fields",
                "Something else",
            )),
        }
    }
}

impl FromBencode for LeafEntry {
    fn decode_bencode_object(data: Object) -> Result<Self, bendy::decoding::Error> {
        match data {
            Object::List(mut list) => Ok(Self {
                volume: next_int(&mut list, "volume")?,
                faces: [
                    next_int(&mut list, "face")?,
                    next_int(&mut list, "face")?,
                    next_int(&mut list, "face")?,
                ],
            }),
            _ => Err(bendy::decoding::Error::unexpected_token(
                "List of Leaf fields",
                "Something else",
            )),
        }
    }
}

impl FromBencode for CubeEntry {
    fn decode_bencode_object(data: Object) -> Result<Self, bendy::decoding::Error> {
        match data {
            Object::List(mut list) => {
                let is_leaf = match list.next_object()? {
                    Some(Object::Bytes(tag)) if tag == b"#l" => Ok(true),
                    Some(Object::Bytes(tag)) if tag == b"#b" => Ok(false),
                    Some(Object::Bytes(tag)) => Err(bendy::decoding::Error::unexpected_token(
                        "Cube node tag #l or #b",
                        String::from_utf8_lossy(tag).to_string(),
                    )),
                    _ => Err(bendy::decoding::Error::unexpected_token(
                        "Cube node tag",
                        "Something else",
                    )),
                }?;
                if is_leaf {
                    Ok(CubeEntry::Leaf(next_int(&mut list, "leaf")?))
                } else {
                    let mut children = [0u16; 8];
                    for child in children.iter_mut() {
                        *child = next_int(&mut list, "child")?;
                    }
                    Ok(CubeEntry::Branch(children))
                }
            }
            _ => Err(bendy::decoding::Error::unexpected_token(
                "List of Cube node fields",
                "Something else",
            )),
        }
    }
}

impl FromBencode for CubeModel {
    fn decode_bencode_object(data: Object) -> Result<Self, bendy::decoding::Error> {
        let Object::List(mut list) = data else {
            return Err(bendy::decoding::Error::unexpected_token(
                "List of CubeModel tables",
                "Something else",
            ));
        };
        let ids = Vec::<u64>::decode_bencode_object(next(&mut list, "id table")?)?;
        let face_entries =
            Vec::<FaceEntry>::decode_bencode_object(next(&mut list, "face table")?)?;
        let leaf_entries =
            Vec::<LeafEntry>::decode_bencode_object(next(&mut list, "leaf table")?)?;
        let cube_entries =
            Vec::<CubeEntry>::decode_bencode_object(next(&mut list, "cube table")?)?;
        let root_index: u16 = next_int(&mut list, "root")?;
        let root_depth: u32 = next_int(&mut list, "root_depth")?;
        let root_pos = CubePos::new(
            next_int(&mut list, "root_pos.x")?,
            next_int(&mut list, "root_pos.y")?,
            next_int(&mut list, "root_pos.z")?,
        );
        let void_index: u16 = next_int(&mut list, "void_volume")?;

        let layer = |entry: &LayerEntry| -> Result<Layer, bendy::decoding::Error> {
            Ok(Layer {
                material: MaterialId(*table_item(&ids, entry.material, "id")?),
                orientation: entry.orientation,
                u_offset: entry.u_offset,
                v_offset: entry.v_offset,
            })
        };
        let mut faces = Vec::with_capacity(face_entries.len());
        for entry in &face_entries {
            faces.push(Face {
                base: layer(&entry.base)?,
                overlay: layer(&entry.overlay)?,
            });
        }
        // one cube value per unique leaf, so equal leaves stay shared
        let mut leaves = Vec::with_capacity(leaf_entries.len());
        for entry in &leaf_entries {
            leaves.push(Cube::from_leaf(Leaf {
                volume: VolumeId(*table_item(&ids, entry.volume, "id")?),
                faces: [
                    *table_item(&faces, entry.faces[0], "face")?,
                    *table_item(&faces, entry.faces[1], "face")?,
                    *table_item(&faces, entry.faces[2], "face")?,
                ],
            }));
        }
        // children precede their parents in the table
        let mut cubes: Vec<Cube> = Vec::with_capacity(cube_entries.len());
        for entry in &cube_entries {
            let cube = match entry {
                CubeEntry::Leaf(leaf) => table_item(&leaves, *leaf, "leaf")?.clone(),
                CubeEntry::Branch(children) => Cube::branch([
                    table_item(&cubes, children[0], "cube")?.clone(),
                    table_item(&cubes, children[1], "cube")?.clone(),
                    table_item(&cubes, children[2], "cube")?.clone(),
                    table_item(&cubes, children[3], "cube")?.clone(),
                    table_item(&cubes, children[4], "cube")?.clone(),
                    table_item(&cubes, children[5], "cube")?.clone(),
                    table_item(&cubes, children[6], "cube")?.clone(),
                    table_item(&cubes, children[7], "cube")?.clone(),
                ]),
            };
            cubes.push(cube);
        }
        Ok(CubeModel {
            root: table_item(&cubes, root_index, "cube")?.clone(),
            root_depth,
            root_pos,
            void_volume: VolumeId(*table_item(&ids, void_index, "id")?),
        })
    }
}
