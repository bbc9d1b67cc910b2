//! On-disk serialization of a built [`Bvh`].
//!
//! The layout is fixed so cached trees can be handed to the GPU uploader
//! without re-packing: `node_count` and `index_count` as `u32`, then every
//! arena node as `min.xyz : f32`, `left_or_first : u32`, `max.xyz : f32`,
//! `count_and_axis : u32`, then the index permutation as `u32`s. Everything
//! is little-endian.
//!
//! The arena length is not stored: it is `1` for a single-leaf tree and
//! `node_count + 1` otherwise (the slot 1 alignment hole).

use std::io::{self, BufReader, BufWriter, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::vec3;

use super::{node::BvhNode, Bvh};

pub fn write_bvh<W: Write>(writer: &mut W, bvh: &Bvh) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);

    writer.write_u32::<LittleEndian>(bvh.node_count())?;
    writer.write_u32::<LittleEndian>(bvh.index_count())?;

    for node in &bvh.nodes {
        for c in node.aabb_min.to_array() {
            writer.write_f32::<LittleEndian>(c)?;
        }
        writer.write_u32::<LittleEndian>(node.left_or_first)?;
        for c in node.aabb_max.to_array() {
            writer.write_f32::<LittleEndian>(c)?;
        }
        writer.write_u32::<LittleEndian>(node.count_and_axis)?;
    }

    for &index in &bvh.primitive_indices {
        writer.write_u32::<LittleEndian>(index)?;
    }

    writer.flush()
}

pub fn read_bvh<R: Read>(reader: &mut R) -> io::Result<Bvh> {
    let mut reader = BufReader::new(reader);

    let node_count = reader.read_u32::<LittleEndian>()? as usize;
    let index_count = reader.read_u32::<LittleEndian>()? as usize;
    if index_count == 0 || node_count == 0 || node_count > 2 * index_count - 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid bvh counts: {node_count} nodes over {index_count} indices"),
        ));
    }

    let arena_len = if node_count == 1 { 1 } else { node_count + 1 };
    let mut nodes = Vec::with_capacity(arena_len);
    for _ in 0..arena_len {
        let mut min = [0.0; 3];
        for c in &mut min {
            *c = reader.read_f32::<LittleEndian>()?;
        }
        let left_or_first = reader.read_u32::<LittleEndian>()?;
        let mut max = [0.0; 3];
        for c in &mut max {
            *c = reader.read_f32::<LittleEndian>()?;
        }
        let count_and_axis = reader.read_u32::<LittleEndian>()?;
        nodes.push(BvhNode {
            aabb_min: vec3(min[0], min[1], min[2]),
            left_or_first,
            aabb_max: vec3(max[0], max[1], max[2]),
            count_and_axis,
        });
    }

    let mut primitive_indices = Vec::with_capacity(index_count);
    for _ in 0..index_count {
        primitive_indices.push(reader.read_u32::<LittleEndian>()?);
    }

    Ok(Bvh {
        nodes,
        primitive_indices,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bvh::builder::build_bvh_from_tris;
    use crate::test_util::geometry::{random_triangles, unit_triangle_at};
    use glam::Vec3A;

    #[test]
    fn round_trip() {
        let tris = random_triangles(32, 5.0, 3);
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        let mut bytes = Vec::new();
        write_bvh(&mut bytes, &bvh).unwrap();
        let expected_len =
            8 + bvh.nodes.len() * 32 + bvh.primitive_indices.len() * 4;
        assert_eq!(bytes.len(), expected_len);

        let restored = read_bvh(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, bvh);
    }

    #[test]
    fn round_trip_single_leaf() {
        let tris = vec![unit_triangle_at(Vec3A::ZERO)];
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();
        assert_eq!(bvh.nodes.len(), 1);

        let mut bytes = Vec::new();
        write_bvh(&mut bytes, &bvh).unwrap();
        let restored = read_bvh(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, bvh);
    }

    #[test]
    fn rejects_bad_counts() {
        let bytes = [0u8; 8];
        assert!(read_bvh(&mut bytes.as_slice()).is_err());
    }
}
