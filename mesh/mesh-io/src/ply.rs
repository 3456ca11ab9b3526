//! PLY (Polygon File Format) support.
//!
//! Meshes are written with one `vertex` element and one `face` element.
//!
//! # Written Properties
//!
//! - Vertex positions (`x`, `y`, `z`) - always
//! - Vertex normals (`nx`, `ny`, `nz`) - when the buffer has normals
//! - Texture coordinates (`u`, `v`) - when the buffer has UVs
//! - Face indices (`vertex_indices`) - `uchar` count (always 3) and `uint` indices
//!
//! Vertex colors are not written to PLY; use the serialized container for
//! colored meshes.
//!
//! # Format Variants
//!
//! - **Binary Little Endian** - Compact, default for export
//! - **ASCII** - Human-readable, useful for inspection
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_ply, save_ply};
//!
//! let buffer = load_ply("model.ply").unwrap();
//! save_ply(&buffer, "output.ply", true).unwrap(); // Binary
//! ```

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{GeometryBuffer, GeometryError, Point2, Point3, Vector3};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{IoError, IoResult};
use crate::{create_file, mesh_name_from_path, open_file};

/// Comment line placed in every PLY header.
pub const PLY_COMMENT: &str = "generated by scenepack";

/// Load a triangle mesh from a PLY file.
///
/// Supports ASCII, binary little-endian, and binary big-endian formats.
/// Reads positions, and normals and `u`/`v` texture coordinates when the
/// vertex element declares them. The buffer is named after the file stem.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file is not valid PLY format
/// - A face is not a triangle ([`GeometryError::NonTriangularFace`])
/// - A face references a missing vertex
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_ply;
///
/// let buffer = load_ply("model.ply").unwrap();
/// println!("Loaded {} vertices, {} triangles", buffer.vertex_count(), buffer.triangle_count());
/// ```
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<GeometryBuffer> {
    let path = path.as_ref();
    let mut reader = BufReader::new(open_file(path)?);

    let parser = Parser::<DefaultElement>::new();

    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("failed to parse PLY header: {e}")))?;

    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let declares = |name: &str| {
        header
            .elements
            .get("vertex")
            .is_some_and(|def| def.properties.contains_key(name))
    };
    let has_normals = declares("nx");
    let has_uvs = declares("u") && declares("v");

    let mut buffer = GeometryBuffer::new(mesh_name_from_path(path), Vec::new(), Vec::new());

    if let Some(vertex_elements) = payload.get("vertex") {
        buffer.vertices.reserve(vertex_elements.len());
        let mut normals = Vec::new();
        let mut uvs = Vec::new();

        for element in vertex_elements {
            let x = get_float_property(element, "x").unwrap_or(0.0);
            let y = get_float_property(element, "y").unwrap_or(0.0);
            let z = get_float_property(element, "z").unwrap_or(0.0);
            buffer.vertices.push(Point3::new(x, y, z));

            if has_normals {
                normals.push(Vector3::new(
                    get_float_property(element, "nx").unwrap_or(0.0),
                    get_float_property(element, "ny").unwrap_or(0.0),
                    get_float_property(element, "nz").unwrap_or(0.0),
                ));
            }
            if has_uvs {
                uvs.push(Point2::new(
                    get_float_property(element, "u").unwrap_or(0.0),
                    get_float_property(element, "v").unwrap_or(0.0),
                ));
            }
        }

        buffer.normals = has_normals.then_some(normals);
        buffer.uvs = has_uvs.then_some(uvs);
    }

    if let Some(face_elements) = payload.get("face") {
        buffer.indices.reserve(face_elements.len() * 3);
        for (face, element) in face_elements.iter().enumerate() {
            let indices = get_index_list(element);
            if indices.len() != 3 {
                return Err(GeometryError::NonTriangularFace {
                    mesh: buffer.name,
                    face,
                    arity: indices.len(),
                }
                .into());
            }
            buffer.indices.extend_from_slice(&indices);
        }
    }

    buffer.validate()?;
    Ok(buffer)
}

/// Extract a float property from a PLY element.
fn get_float_property(element: &DefaultElement, key: &str) -> Option<f32> {
    match element.get(key)? {
        Property::Float(v) => Some(*v),
        Property::Double(v) => {
            #[allow(clippy::cast_possible_truncation)]
            let narrowed = *v as f32;
            Some(narrowed)
        }
        _ => None,
    }
}

/// Extract the vertex index list from a face element.
///
/// Negative indices map to `u32::MAX` so that validation reports them as out
/// of range instead of wrapping to a valid vertex.
fn get_index_list(element: &DefaultElement) -> Vec<u32> {
    fn widen<T: Copy>(values: &[T]) -> Vec<u32>
    where
        u32: TryFrom<T>,
    {
        values
            .iter()
            .map(|&i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect()
    }

    for key in ["vertex_indices", "vertex_index"] {
        let Some(prop) = element.get(key) else {
            continue;
        };
        match prop {
            Property::ListUInt(v) => return v.clone(),
            Property::ListInt(v) => return widen(v),
            Property::ListUChar(v) => return widen(v),
            Property::ListChar(v) => return widen(v),
            Property::ListShort(v) => return widen(v),
            Property::ListUShort(v) => return widen(v),
            _ => {}
        }
    }
    Vec::new()
}

/// Save a geometry buffer to a PLY file.
///
/// The face element holds `buffer.triangle_count()` faces, so a buffer that
/// went through deduplication writes the reduced triangle set.
///
/// # Arguments
///
/// * `buffer` - The geometry to save
/// * `path` - Output file path (created or truncated)
/// * `binary` - If true, save as binary little-endian; if false, save as ASCII
///
/// # Errors
///
/// - [`IoError::Geometry`] if the buffer fails validation
/// - [`IoError::Create`] naming the path if it cannot be opened
/// - [`IoError::Io`] if writing fails
///
/// # Example
///
/// ```no_run
/// use mesh_io::{load_ply, save_ply};
///
/// let buffer = load_ply("input.ply").unwrap();
/// save_ply(&buffer, "output.ply", true).unwrap(); // Binary
/// save_ply(&buffer, "output_ascii.ply", false).unwrap(); // ASCII
/// ```
pub fn save_ply<P: AsRef<Path>>(buffer: &GeometryBuffer, path: P, binary: bool) -> IoResult<()> {
    buffer.validate()?;
    let mut writer = BufWriter::new(create_file(path.as_ref())?);
    write_ply_validated(buffer, &mut writer, binary)?;
    writer.flush()?;
    Ok(())
}

/// Write a geometry buffer as PLY to any writer.
///
/// The buffer is validated before anything is written.
///
/// # Errors
///
/// - [`IoError::Geometry`] if the buffer fails validation
/// - [`IoError::Io`] if writing fails
pub fn write_ply<W: Write>(buffer: &GeometryBuffer, writer: &mut W, binary: bool) -> IoResult<()> {
    buffer.validate()?;
    write_ply_validated(buffer, writer, binary)
}

fn write_ply_validated<W: Write>(buffer: &GeometryBuffer, writer: &mut W, binary: bool) -> IoResult<()> {
    if binary {
        write_ply_binary(buffer, writer)
    } else {
        write_ply_ascii(buffer, writer)
    }
}

/// Write binary little-endian PLY.
///
/// Note: We implement this manually because ply-rs has a bug with binary list
/// property writing where it uses element count instead of list length.
fn write_ply_binary<W: Write>(buffer: &GeometryBuffer, writer: &mut W) -> IoResult<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "comment {PLY_COMMENT}")?;
    writeln!(writer, "element vertex {}", buffer.vertex_count())?;
    for name in vertex_property_names(buffer) {
        writeln!(writer, "property float {name}")?;
    }
    writeln!(writer, "element face {}", buffer.triangle_count())?;
    writeln!(writer, "property list uchar uint vertex_indices")?;
    writeln!(writer, "end_header")?;

    // Vertex records are interleaved: position, then normal, then uv
    for (i, p) in buffer.vertices.iter().enumerate() {
        for value in [p.x, p.y, p.z] {
            writer.write_all(&value.to_le_bytes())?;
        }
        if let Some(n) = buffer.normals.as_ref().and_then(|normals| normals.get(i)) {
            for value in [n.x, n.y, n.z] {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        if let Some(uv) = buffer.uvs.as_ref().and_then(|uvs| uvs.get(i)) {
            writer.write_all(&uv.x.to_le_bytes())?;
            writer.write_all(&uv.y.to_le_bytes())?;
        }
    }

    for [i0, i1, i2] in buffer.triangles() {
        writer.write_all(&[3u8])?;
        writer.write_all(&i0.to_le_bytes())?;
        writer.write_all(&i1.to_le_bytes())?;
        writer.write_all(&i2.to_le_bytes())?;
    }

    Ok(())
}

/// Write ASCII PLY using ply-rs.
fn write_ply_ascii<W: Write>(buffer: &GeometryBuffer, writer: &mut W) -> IoResult<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header.comments.push(PLY_COMMENT.to_string());

    let property_names = vertex_property_names(buffer);

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for name in &property_names {
        vertex_def.properties.add(PropertyDef::new(
            (*name).to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    vertex_def.count = buffer.vertex_count();
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::UInt),
    ));
    face_def.count = buffer.triangle_count();
    ply.header.elements.add(face_def);

    let mut vertex_elements = Vec::with_capacity(buffer.vertex_count());
    for i in 0..buffer.vertex_count() {
        let values = vertex_record(buffer, i);
        let mut element = DefaultElement::new();
        for (name, value) in property_names.iter().zip(values) {
            element.insert((*name).to_string(), Property::Float(value));
        }
        vertex_elements.push(element);
    }
    ply.payload.insert("vertex".to_string(), vertex_elements);

    let mut face_elements = Vec::with_capacity(buffer.triangle_count());
    for face in buffer.triangles() {
        let mut element = DefaultElement::new();
        element.insert("vertex_indices".to_string(), Property::ListUInt(face.to_vec()));
        face_elements.push(element);
    }
    ply.payload.insert("face".to_string(), face_elements);

    let ply_writer = Writer::new();
    ply_writer
        .write_ply(writer, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("failed to write PLY: {e}")))?;

    Ok(())
}

/// Vertex property names in write order.
fn vertex_property_names(buffer: &GeometryBuffer) -> Vec<&'static str> {
    let mut names = vec!["x", "y", "z"];
    if buffer.has_normals() {
        names.extend(["nx", "ny", "nz"]);
    }
    if buffer.has_uvs() {
        names.extend(["u", "v"]);
    }
    names
}

/// Flattened vertex record matching [`vertex_property_names`].
fn vertex_record(buffer: &GeometryBuffer, i: usize) -> Vec<f32> {
    let p = buffer.vertices[i];
    let mut values = vec![p.x, p.y, p.z];
    if let Some(n) = buffer.normals.as_ref().and_then(|normals| normals.get(i)) {
        values.extend([n.x, n.y, n.z]);
    }
    if let Some(uv) = buffer.uvs.as_ref().and_then(|uvs| uvs.get(i)) {
        values.extend([uv.x, uv.y]);
    }
    values
}
