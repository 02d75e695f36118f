//! Reading and writing the compact binary form of a [`Bvh`].
//!
//! The layout is flat and little-endian: a `u32` node count, that many
//! `{min.xyz, max.xyz, offset: u32, count: u16, axis: u16}` records, a `u32`
//! triangle count, and that many `{p0.xyz, p1.xyz, p2.xyz, index: u32}`
//! records, where every coordinate is an `f32`.
//!
//! [`Bvh`]: struct.Bvh.html

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::aabb::Aabb;
use crate::bvh::{Bvh, BvhNode, Triangle};
use crate::Point3;

/// Failure while decoding a serialized [`Bvh`].
///
/// [`Bvh`]: struct.Bvh.html
#[derive(Debug, Error)]
pub enum ReadError {
    /// The underlying reader failed or the stream was truncated.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A serialized hierarchy always has at least the root node.
    #[error("node array is empty")]
    NoNodes,

    /// An inner node referenced a child index outside the node array, or
    /// one not following its parent.
    #[error("node {node} references child {child} (node count {count})")]
    ChildOutOfRange {
        /// Index of the offending inner node.
        node: u32,
        /// The child index it carries.
        child: u32,
        /// Total number of nodes read.
        count: u32,
    },

    /// An inner node carried a split axis outside `0..3`.
    #[error("node {node} carries split axis {axis}")]
    InvalidAxis {
        /// Index of the offending inner node.
        node: u32,
        /// The axis value it carries.
        axis: u16,
    },

    /// A leaf referenced triangle records outside the triangle array.
    #[error("leaf {node} references triangles {first}..{last} (triangle count {count})")]
    TrianglesOutOfRange {
        /// Index of the offending leaf.
        node: u32,
        /// First referenced triangle record.
        first: u32,
        /// One past the last referenced triangle record.
        last: u64,
        /// Total number of triangle records read.
        count: u32,
    },
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_u16<W: Write>(writer: &mut W, value: u16) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_point<W: Write>(writer: &mut W, point: &Point3) -> io::Result<()> {
    for axis in 0..3 {
        writer.write_all(&point[axis].to_le_bytes())?;
    }
    Ok(())
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

fn read_u16<R: Read>(reader: &mut R) -> io::Result<u16> {
    Ok(u16::from_le_bytes(read_array(reader)?))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    Ok(f32::from_le_bytes(read_array(reader)?))
}

fn read_point<R: Read>(reader: &mut R) -> io::Result<Point3> {
    Ok(Point3::new(
        read_f32(reader)?,
        read_f32(reader)?,
        read_f32(reader)?,
    ))
}

impl Bvh {
    /// Writes this hierarchy to `writer` in the compact little-endian
    /// layout.
    pub fn write_into<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u32(writer, self.nodes.len() as u32)?;
        for node in &self.nodes {
            write_point(writer, &node.aabb.min)?;
            write_point(writer, &node.aabb.max)?;
            write_u32(writer, node.offset)?;
            write_u16(writer, node.count)?;
            write_u16(writer, node.axis)?;
        }

        write_u32(writer, self.triangles.len() as u32)?;
        for triangle in &self.triangles {
            write_point(writer, &triangle.p0)?;
            write_point(writer, &triangle.p1)?;
            write_point(writer, &triangle.p2)?;
            write_u32(writer, triangle.index)?;
        }

        Ok(())
    }

    /// Reads a hierarchy from `reader`, validating the tree structure so
    /// that traversal can trust every index it follows.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Bvh, ReadError> {
        let node_count = read_u32(reader)?;
        if node_count == 0 {
            return Err(ReadError::NoNodes);
        }

        let mut nodes = Vec::new();
        for _ in 0..node_count {
            let min = read_point(reader)?;
            let max = read_point(reader)?;
            nodes.push(BvhNode {
                aabb: Aabb::with_bounds(min, max),
                offset: read_u32(reader)?,
                count: read_u16(reader)?,
                axis: read_u16(reader)?,
            });
        }

        let triangle_count = read_u32(reader)?;
        let mut triangles = Vec::new();
        for _ in 0..triangle_count {
            let p0 = read_point(reader)?;
            let p1 = read_point(reader)?;
            let p2 = read_point(reader)?;
            triangles.push(Triangle {
                p0,
                p1,
                p2,
                index: read_u32(reader)?,
            });
        }

        for (index, node) in nodes.iter().enumerate() {
            let index = index as u32;
            if node.is_leaf() {
                let first = node.offset;
                let last = u64::from(first) + u64::from(node.count);
                if last > u64::from(triangle_count) {
                    return Err(ReadError::TrianglesOutOfRange {
                        node: index,
                        first,
                        last,
                        count: triangle_count,
                    });
                }
            } else if node_count == 1 && triangle_count == 0 {
                // The lone node of an empty hierarchy carries no children.
            } else {
                // Children always follow their parent; the left child is
                // checked implicitly because `offset` exceeds it.
                let right = node.offset;
                if right <= index + 1 || right >= node_count {
                    return Err(ReadError::ChildOutOfRange {
                        node: index,
                        child: right,
                        count: node_count,
                    });
                }
                if node.axis > 2 {
                    return Err(ReadError::InvalidAxis {
                        node: index,
                        axis: node.axis,
                    });
                }
            }
        }

        Ok(Bvh { nodes, triangles })
    }
}
