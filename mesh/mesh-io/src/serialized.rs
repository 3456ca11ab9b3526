//! Serialized mesh container (version 4).
//!
//! A compact, zlib-compressed single-mesh container understood by the
//! renderer's native `serialized` shape loader.
//!
//! # Layout
//!
//! All integers are little-endian.
//!
//! ```text
//! u16  magic    0x041C
//! u16  version  0x0004
//! ...  zlib stream of the payload
//! u64  offset of the first mesh (always 0)
//! u32  mesh count (always 1)
//! ```
//!
//! The payload holds, in order: the [`SerializedFlags`] word, the mesh name
//! (NUL-terminated UTF-8), the vertex and triangle counts (`u64`), the
//! positions, then normals, UVs and colors when flagged, then the indices.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_serialized, save_serialized};
//!
//! let buffer = load_serialized("mesh0.serialized").unwrap();
//! save_serialized(&buffer, "copy.serialized").unwrap();
//! ```

use std::fmt;
use std::io::{BufWriter, Read, Write};
use std::ops::BitOr;
use std::path::Path;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use mesh_types::{GeometryBuffer, Point2, Point3, Vector3, VertexColor};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::{create_file, open_file};

/// Magic number opening every serialized container.
pub const SERIALIZED_MAGIC: u16 = 0x041C;

/// Container version written by [`encode_serialized`].
pub const SERIALIZED_VERSION: u16 = 4;

/// Size of the uncompressed trailer: first mesh offset and mesh count.
const TRAILER_LEN: usize = 8 + 4;

/// Attribute flags stored at the start of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SerializedFlags(u32);

impl SerializedFlags {
    /// Per-vertex normals present.
    pub const VERTEX_NORMALS: Self = Self(0x0001);
    /// Two-component texture coordinates present.
    pub const TEXCOORDS: Self = Self(0x0002);
    /// Per-vertex RGB colors present.
    pub const VERTEX_COLORS: Self = Self(0x0008);
    /// Face normals should be used instead of vertex normals.
    pub const FACE_NORMALS: Self = Self(0x0010);
    /// Floating point data is `f32`.
    pub const SINGLE_PRECISION: Self = Self(0x1000);
    /// Floating point data is `f64`.
    pub const DOUBLE_PRECISION: Self = Self(0x2000);

    /// No flags set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap a raw flag word.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw flag word.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags describing what [`encode_serialized`] writes for `buffer`.
    ///
    /// Single precision is always set.
    #[must_use]
    pub fn for_buffer(buffer: &GeometryBuffer) -> Self {
        let mut flags = Self::SINGLE_PRECISION;
        if buffer.has_normals() {
            flags = flags | Self::VERTEX_NORMALS;
        }
        if buffer.has_uvs() {
            flags = flags | Self::TEXCOORDS;
        }
        if buffer.has_colors() {
            flags = flags | Self::VERTEX_COLORS;
        }
        flags
    }
}

impl BitOr for SerializedFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for SerializedFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Encode a geometry buffer as a complete serialized container.
///
/// The triangle count field is taken from the index buffer being written,
/// so a deduplicated buffer stays self-consistent.
///
/// # Errors
///
/// - [`IoError::Geometry`] if the buffer fails validation
/// - [`IoError::Compression`] if deflating the payload fails
pub fn encode_serialized(buffer: &GeometryBuffer) -> IoResult<Vec<u8>> {
    buffer.validate()?;

    let flags = SerializedFlags::for_buffer(buffer);
    let payload = build_payload(buffer, flags);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&payload).map_err(IoError::Compression)?;
    let compressed = encoder.finish().map_err(IoError::Compression)?;

    debug!(
        mesh = %buffer.name,
        %flags,
        payload_bytes = payload.len(),
        compressed_bytes = compressed.len(),
        "Encoded serialized mesh"
    );

    let mut out = Vec::with_capacity(4 + compressed.len() + TRAILER_LEN);
    out.extend_from_slice(&SERIALIZED_MAGIC.to_le_bytes());
    out.extend_from_slice(&SERIALIZED_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    Ok(out)
}

/// Write a serialized container to any writer.
///
/// # Errors
///
/// See [`encode_serialized`]; also fails if writing fails.
pub fn write_serialized<W: Write>(buffer: &GeometryBuffer, writer: &mut W) -> IoResult<()> {
    let bytes = encode_serialized(buffer)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Save a geometry buffer as a serialized container.
///
/// The buffer is encoded before the destination is opened, so invalid
/// geometry never leaves an empty file behind.
///
/// # Errors
///
/// - [`IoError::Geometry`] if the buffer fails validation
/// - [`IoError::Create`] naming the path if it cannot be opened
/// - [`IoError::Compression`] or [`IoError::Io`] if encoding or writing fails
pub fn save_serialized<P: AsRef<Path>>(buffer: &GeometryBuffer, path: P) -> IoResult<()> {
    let bytes = encode_serialized(buffer)?;
    let mut writer = BufWriter::new(create_file(path.as_ref())?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn build_payload(buffer: &GeometryBuffer, flags: SerializedFlags) -> Vec<u8> {
    let v = buffer.vertex_count();
    let mut per_vertex = 3;
    if buffer.has_normals() {
        per_vertex += 3;
    }
    if buffer.has_uvs() {
        per_vertex += 2;
    }
    if buffer.has_colors() {
        per_vertex += 3;
    }
    let header_len = 4 + buffer.name.len() + 1 + 16;
    let mut out = Vec::with_capacity(header_len + v * per_vertex * 4 + buffer.indices.len() * 4);

    out.extend_from_slice(&flags.bits().to_le_bytes());
    out.extend_from_slice(buffer.name.as_bytes());
    out.push(0);
    out.extend_from_slice(&(v as u64).to_le_bytes());
    out.extend_from_slice(&(buffer.triangle_count() as u64).to_le_bytes());

    let mut put = |values: &[f32]| {
        for value in values {
            out.extend_from_slice(&value.to_le_bytes());
        }
    };

    for p in &buffer.vertices {
        put(&[p.x, p.y, p.z]);
    }
    if let Some(normals) = &buffer.normals {
        for n in normals {
            put(&[n.x, n.y, n.z]);
        }
    }
    if let Some(uvs) = &buffer.uvs {
        for uv in uvs {
            put(&[uv.x, uv.y]);
        }
    }
    if let Some(colors) = &buffer.colors {
        for c in colors {
            put(&c.to_array());
        }
    }

    for index in &buffer.indices {
        out.extend_from_slice(&index.to_le_bytes());
    }
    out
}

/// Decode a serialized container.
///
/// Accepts version 3 (no name field) and version 4 containers holding a
/// single mesh in single or double precision. Double precision data is
/// narrowed to `f32`. A version 3 mesh gets an empty name.
///
/// # Errors
///
/// - [`IoError::BadMagic`] / [`IoError::UnsupportedVersion`] for foreign data
/// - [`IoError::Compression`] if the payload does not inflate
/// - [`IoError::UnexpectedEof`] if the payload is truncated
/// - [`IoError::InvalidContent`] for multi-mesh containers or bad counts
/// - [`IoError::Geometry`] if the decoded streams are inconsistent
pub fn decode_serialized(bytes: &[u8]) -> IoResult<GeometryBuffer> {
    let mut header = ByteReader::new(bytes);
    let magic = header.read_u16()?;
    if magic != SERIALIZED_MAGIC {
        return Err(IoError::BadMagic { found: magic });
    }
    let version = header.read_u16()?;
    if !(3..=SERIALIZED_VERSION).contains(&version) {
        return Err(IoError::UnsupportedVersion { found: version });
    }

    let body = &bytes[4..];
    let Some(stream_len) = body.len().checked_sub(TRAILER_LEN) else {
        return Err(IoError::UnexpectedEof {
            position: bytes.len() as u64,
        });
    };
    let mut trailer = ByteReader::new(&body[stream_len..]);
    let first_offset = trailer.read_u64()?;
    let mesh_count = trailer.read_u32()?;
    if mesh_count != 1 || first_offset != 0 {
        return Err(IoError::invalid_content(format!(
            "expected a single mesh at offset 0, found {mesh_count} mesh(es) at offset {first_offset}"
        )));
    }

    let mut payload = Vec::new();
    ZlibDecoder::new(&body[..stream_len])
        .read_to_end(&mut payload)
        .map_err(IoError::Compression)?;

    let buffer = parse_payload(&payload, version)?;
    buffer.validate()?;
    Ok(buffer)
}

/// Load a serialized container from disk.
///
/// # Errors
///
/// [`IoError::FileNotFound`] if the path does not exist, otherwise see
/// [`decode_serialized`].
pub fn load_serialized<P: AsRef<Path>>(path: P) -> IoResult<GeometryBuffer> {
    let mut bytes = Vec::new();
    open_file(path.as_ref())?.read_to_end(&mut bytes)?;
    decode_serialized(&bytes)
}

fn parse_payload(payload: &[u8], version: u16) -> IoResult<GeometryBuffer> {
    let mut reader = ByteReader::new(payload);
    let flags = SerializedFlags::from_bits(reader.read_u32()?);
    let name = if version >= 4 {
        reader.read_cstr()?
    } else {
        String::new()
    };
    let vertex_count = reader.read_count()?;
    let triangle_count = reader.read_count()?;

    let double = flags.contains(SerializedFlags::DOUBLE_PRECISION);
    let scalar = if double { 8 } else { 4 };
    let mut per_vertex = 3;
    for (flag, n) in [
        (SerializedFlags::VERTEX_NORMALS, 3),
        (SerializedFlags::TEXCOORDS, 2),
        (SerializedFlags::VERTEX_COLORS, 3),
    ] {
        if flags.contains(flag) {
            per_vertex += n;
        }
    }
    let needed = vertex_count
        .checked_mul(per_vertex * scalar)
        .and_then(|n| triangle_count.checked_mul(12).and_then(|m| n.checked_add(m)));
    if needed.is_none_or(|n| n > reader.remaining()) {
        return Err(IoError::UnexpectedEof {
            position: reader.position(),
        });
    }

    let read_vec3 = |reader: &mut ByteReader<'_>| -> IoResult<[f32; 3]> {
        Ok([
            reader.read_float(double)?,
            reader.read_float(double)?,
            reader.read_float(double)?,
        ])
    };

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let [x, y, z] = read_vec3(&mut reader)?;
        vertices.push(Point3::new(x, y, z));
    }

    let normals = if flags.contains(SerializedFlags::VERTEX_NORMALS) {
        let mut normals = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let [x, y, z] = read_vec3(&mut reader)?;
            normals.push(Vector3::new(x, y, z));
        }
        Some(normals)
    } else {
        None
    };

    let uvs = if flags.contains(SerializedFlags::TEXCOORDS) {
        let mut uvs = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            uvs.push(Point2::new(reader.read_float(double)?, reader.read_float(double)?));
        }
        Some(uvs)
    } else {
        None
    };

    let colors = if flags.contains(SerializedFlags::VERTEX_COLORS) {
        let mut colors = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            colors.push(VertexColor::from(read_vec3(&mut reader)?));
        }
        Some(colors)
    } else {
        None
    };

    let mut indices = Vec::with_capacity(triangle_count * 3);
    for _ in 0..triangle_count * 3 {
        indices.push(reader.read_u32()?);
    }

    Ok(GeometryBuffer {
        name,
        vertices,
        normals,
        uvs,
        colors,
        indices,
    })
}

/// Little-endian cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    const fn position(&self) -> u64 {
        self.pos as u64
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let chunk = self
            .bytes
            .get(self.pos..self.pos + N)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or(IoError::UnexpectedEof {
                position: self.position(),
            })?;
        self.pos += N;
        Ok(chunk)
    }

    fn read_u16(&mut self) -> IoResult<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> IoResult<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> IoResult<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> IoResult<usize> {
        let count = self.read_u64()?;
        usize::try_from(count)
            .map_err(|_| IoError::invalid_content(format!("element count {count} too large")))
    }

    fn read_float(&mut self, double: bool) -> IoResult<f32> {
        if double {
            #[allow(clippy::cast_possible_truncation)]
            let narrowed = f64::from_le_bytes(self.take()?) as f32;
            Ok(narrowed)
        } else {
            self.take().map(f32::from_le_bytes)
        }
    }

    fn read_cstr(&mut self) -> IoResult<String> {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(IoError::UnexpectedEof {
                position: self.bytes.len() as u64,
            })?;
        let name = String::from_utf8(rest[..len].to_vec())?;
        self.pos += len + 1;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{SourceMesh, UvChannel};

    fn triangle() -> GeometryBuffer {
        GeometryBuffer::new(
            "tri",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    fn inflate(bytes: &[u8]) -> Vec<u8> {
        let stream = &bytes[4..bytes.len() - TRAILER_LEN];
        let mut payload = Vec::new();
        ZlibDecoder::new(stream).read_to_end(&mut payload).unwrap();
        payload
    }

    #[test]
    fn header_and_trailer() {
        let bytes = encode_serialized(&triangle()).unwrap();

        assert_eq!(&bytes[0..2], &[0x1C, 0x04]);
        assert_eq!(&bytes[2..4], &[0x04, 0x00]);

        let trailer = &bytes[bytes.len() - TRAILER_LEN..];
        assert_eq!(&trailer[..8], &0u64.to_le_bytes());
        assert_eq!(&trailer[8..], &1u32.to_le_bytes());
    }

    #[test]
    fn payload_layout_positions_only() {
        let payload = inflate(&encode_serialized(&triangle()).unwrap());

        assert_eq!(&payload[0..4], &0x1000u32.to_le_bytes());
        assert_eq!(&payload[4..8], b"tri\0");
        assert_eq!(&payload[8..16], &3u64.to_le_bytes());
        assert_eq!(&payload[16..24], &1u64.to_le_bytes());
        // 9 position floats then 3 indices
        assert_eq!(payload.len(), 24 + 9 * 4 + 3 * 4);
        assert_eq!(&payload[24 + 3 * 4..24 + 4 * 4], &1.0f32.to_le_bytes());
        assert_eq!(&payload[payload.len() - 4..], &2u32.to_le_bytes());
    }

    #[test]
    fn flags_for_buffer() {
        let buffer = triangle()
            .with_normals(vec![Vector3::z(); 3])
            .with_colors(vec![VertexColor::WHITE; 3]);
        let flags = SerializedFlags::for_buffer(&buffer);

        assert!(flags.contains(SerializedFlags::VERTEX_NORMALS));
        assert!(flags.contains(SerializedFlags::VERTEX_COLORS));
        assert!(flags.contains(SerializedFlags::SINGLE_PRECISION));
        assert!(!flags.contains(SerializedFlags::TEXCOORDS));
        assert_eq!(flags.bits(), 0x1009);
    }

    #[test]
    fn roundtrip_all_streams_bit_exact() {
        let original = triangle()
            .with_normals(vec![
                Vector3::new(0.1, 0.2, 0.97),
                Vector3::new(-0.0, 0.0, 1.0),
                Vector3::new(0.577, 0.577, 0.577),
            ])
            .with_uvs(vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.25),
                Point2::new(0.333, 1.0),
            ])
            .with_colors(vec![
                VertexColor::new(1.0, 0.0, 0.0),
                VertexColor::new(0.0, 1.0, 0.0),
                VertexColor::new(0.0, 0.0, 1.0),
            ]);

        let decoded = decode_serialized(&encode_serialized(&original).unwrap()).unwrap();

        assert_eq!(decoded, original);
        let n1 = decoded.normals.as_ref().unwrap()[1];
        assert_eq!(n1.x.to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn three_component_uvs_are_omitted() {
        let source = SourceMesh::from_triangles("volume_uv", triangle().vertices, &[[0, 1, 2]])
            .with_uv_channel(UvChannel {
                components: 3,
                coords: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.5], [0.0, 1.0, 1.0]],
            });
        let buffer = GeometryBuffer::from_source(&source).unwrap();
        let bytes = encode_serialized(&buffer).unwrap();
        let payload = inflate(&bytes);

        let flags = SerializedFlags::from_bits(u32::from_le_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ]));
        assert!(!flags.contains(SerializedFlags::TEXCOORDS));
        let header = 4 + "volume_uv".len() + 1 + 16;
        assert_eq!(payload.len(), header + 9 * 4 + 3 * 4);
        assert!(!decode_serialized(&bytes).unwrap().has_uvs());
    }

    #[test]
    fn triangle_count_follows_written_indices() {
        let mut buffer = triangle();
        buffer.indices = vec![0, 1, 2, 0, 2, 1];
        buffer.replace_indices(vec![0, 1, 2]);

        let bytes = encode_serialized(&buffer).unwrap();
        assert_eq!(&inflate(&bytes)[16..24], &1u64.to_le_bytes());
        assert_eq!(decode_serialized(&bytes).unwrap().triangle_count(), 1);
    }

    #[test]
    fn encode_rejects_invalid_buffer() {
        let mut buffer = triangle();
        buffer.indices = vec![0, 1, 7];
        assert!(matches!(
            encode_serialized(&buffer),
            Err(IoError::Geometry(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = encode_serialized(&triangle()).unwrap();
        bytes[0] = 0xFF;
        assert!(matches!(
            decode_serialized(&bytes),
            Err(IoError::BadMagic { found: 0x04FF })
        ));
    }

    #[test]
    fn decode_rejects_future_version() {
        let mut bytes = encode_serialized(&triangle()).unwrap();
        bytes[2] = 5;
        assert!(matches!(
            decode_serialized(&bytes),
            Err(IoError::UnsupportedVersion { found: 5 })
        ));
    }

    #[test]
    fn decode_rejects_truncated_container() {
        let bytes = encode_serialized(&triangle()).unwrap();
        assert!(matches!(
            decode_serialized(&bytes[..6]),
            Err(IoError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn decode_rejects_short_payload() {
        // Claims 1000 vertices but carries none
        let mut payload = Vec::new();
        payload.extend_from_slice(&0x1000u32.to_le_bytes());
        payload.extend_from_slice(b"x\0");
        payload.extend_from_slice(&1000u64.to_le_bytes());
        payload.extend_from_slice(&0u64.to_le_bytes());

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&payload).unwrap();
        let mut bytes = vec![0x1C, 0x04, 0x04, 0x00];
        bytes.extend(encoder.finish().unwrap());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());

        assert!(matches!(
            decode_serialized(&bytes),
            Err(IoError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn decode_double_precision_version_3() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0x2000u32.to_le_bytes());
        payload.extend_from_slice(&3u64.to_le_bytes());
        payload.extend_from_slice(&1u64.to_le_bytes());
        for value in [0.0f64, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0] {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        for index in [0u32, 1, 2] {
            payload.extend_from_slice(&index.to_le_bytes());
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let mut bytes = vec![0x1C, 0x04, 0x03, 0x00];
        bytes.extend(encoder.finish().unwrap());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());

        let decoded = decode_serialized(&bytes).unwrap();
        assert_eq!(decoded.name, "");
        assert_eq!(decoded.vertices[1], Point3::new(2.0, 0.0, 0.0));
        assert_eq!(decoded.indices, vec![0, 1, 2]);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh0.serialized");

        save_serialized(&triangle(), &path).unwrap();
        let loaded = load_serialized(&path).unwrap();
        assert_eq!(loaded, triangle());
    }

    #[test]
    fn save_invalid_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.serialized");
        let mut buffer = triangle();
        buffer.indices.pop();

        assert!(save_serialized(&buffer, &path).is_err());
        assert!(!path.exists());
    }
}
