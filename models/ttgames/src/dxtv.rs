use log::debug;

use ultraviolet::vec::Vec4;

use mdkit_core::io_ext::{
	ByteCursor,
	CursorError,
	Endian
};

use crate::TTImportError;

pub const SIGNATURE: [u8; 4] = *b"DXTV";
/// Padding between the attribute list and the vertex payload
pub const HEADER_PAD: usize = 6;
/// Padding after the last vertex of a buffer
pub const TRAILING_PAD: usize = 16;

/// Vertex attribute semantic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
	Position,
	Normal,
	ColorSet0,
	Tangent,
	ColorSet1,
	UvSet0,
	Unknown6,
	UvSet1,
	Unknown8,
	BlendIndices0,
	BlendWeight0,
	Unknown11,
	LightDirSet,
	LightColSet,
	Other(u8),
}

impl From<u8> for AttributeType {
	fn from(b: u8) -> Self {
		match b {
			0 => AttributeType::Position,
			1 => AttributeType::Normal,
			2 => AttributeType::ColorSet0,
			3 => AttributeType::Tangent,
			4 => AttributeType::ColorSet1,
			5 => AttributeType::UvSet0,
			6 => AttributeType::Unknown6,
			7 => AttributeType::UvSet1,
			8 => AttributeType::Unknown8,
			9 => AttributeType::BlendIndices0,
			10 => AttributeType::BlendWeight0,
			11 => AttributeType::Unknown11,
			12 => AttributeType::LightDirSet,
			13 => AttributeType::LightColSet,
			_ => AttributeType::Other(b),
		}
	}
}

/// Numeric encoding of one attribute value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeFormat {
	Vec2Float = 2,
	Vec3Float,
	Vec4Float,
	Vec2Half,
	Vec4Half,
	Vec4Byte,
	/// Bytes mapped to `0.0..=1.0`
	Vec4ByteNorm,
	Color4Byte,
}

impl AttributeFormat {
	pub const ALL: [AttributeFormat; 8] = [
		AttributeFormat::Vec2Float,
		AttributeFormat::Vec3Float,
		AttributeFormat::Vec4Float,
		AttributeFormat::Vec2Half,
		AttributeFormat::Vec4Half,
		AttributeFormat::Vec4Byte,
		AttributeFormat::Vec4ByteNorm,
		AttributeFormat::Color4Byte,
	];

	pub fn from_u8(b: u8) -> Result<AttributeFormat, TTImportError> {
		AttributeFormat::ALL.iter().copied().find(|f| *f as u8 == b)
			.ok_or(TTImportError::UnknownAttributeFormat(b))
	}

	/// Size in bytes of one value
	pub fn width(&self) -> usize {
		match self {
			AttributeFormat::Vec2Float => 8,
			AttributeFormat::Vec3Float => 12,
			AttributeFormat::Vec4Float => 16,
			AttributeFormat::Vec2Half => 4,
			AttributeFormat::Vec4Half => 8,
			AttributeFormat::Vec4Byte | AttributeFormat::Vec4ByteNorm |
				AttributeFormat::Color4Byte => 4,
		}
	}

	/// Number of meaningful components, the rest of a decoded value is zero
	pub fn components(&self) -> usize {
		match self {
			AttributeFormat::Vec2Float | AttributeFormat::Vec2Half => 2,
			AttributeFormat::Vec3Float => 3,
			_ => 4,
		}
	}

	/// Decodes one value using the cursor's current byte order
	pub fn read(&self, buf: &mut ByteCursor) -> Result<Vec4, CursorError> {
		let n = self.components();
		let mut v = [0.0; 4];

		match self {
			AttributeFormat::Vec2Float | AttributeFormat::Vec3Float | AttributeFormat::Vec4Float => {
				return buf.read_vec4_f32(n);
			},
			AttributeFormat::Vec2Half | AttributeFormat::Vec4Half => for c in v.iter_mut().take(n) {
				*c = buf.read_f16()?;
			},
			AttributeFormat::Vec4Byte | AttributeFormat::Color4Byte => for c in v.iter_mut() {
				*c = buf.read_u8()? as f32;
			},
			AttributeFormat::Vec4ByteNorm => for c in v.iter_mut() {
				*c = buf.read_u8()? as f32 / 255.0;
			},
		}

		Ok(Vec4::new(v[0], v[1], v[2], v[3]))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
	pub kind: AttributeType,
	pub format: AttributeFormat,
	/// Offset within one vertex record
	pub offset: u8,
	/// One value per vertex
	pub data: Vec<Vec4>,
}

impl Attribute {
	fn read(buf: &mut ByteCursor) -> Result<Attribute, TTImportError> {
		let kind = AttributeType::from(buf.read_u8()?);
		let format = AttributeFormat::from_u8(buf.read_u8()?)?;

		Ok(Attribute {
			kind: kind,
			format: format,
			offset: buf.read_u8()?,
			data: vec![],
		})
	}
}

/// Size of one vertex record holding `attrs`
pub fn stride(attrs: &[Attribute]) -> usize {
	attrs.iter().map(|a| a.format.width()).sum()
}

#[derive(Clone, Debug, PartialEq)]
pub struct VertexBuffer {
	pub version: u32,
	pub attributes: Vec<Attribute>,
	pub stride: usize,
}

impl VertexBuffer {
	/// Reads a buffer holding `num_verts` vertices, leaving the cursor after its trailing padding
	pub fn read(buf: &mut ByteCursor, num_verts: usize) -> Result<VertexBuffer, TTImportError> {
		let sig_offset = buf.position();
		let sig = buf.read_array::<4>()?;
		if sig != SIGNATURE {
			return Err(TTImportError::InvalidSignature {
				expected: "DXTV",
				found: sig.iter().map(|b| *b as char).collect(),
				offset: sig_offset,
			});
		}

		let version = buf.read_u32()?;
		let num_attrs = buf.read_u32()?;

		let mut attrs = vec![];
		for _ in 0..num_attrs {
			attrs.push(Attribute::read(buf)?);
		}
		buf.seek_relative(HEADER_PAD as i64)?;

		let stride = stride(&attrs);
		let start = buf.position();
		debug!("DXTV at {:#X}: version {}, {} attribute(s), stride {}, payload at {:#X}", sig_offset,
			version, attrs.len(), stride, start);
		for a in attrs.iter() {
			debug!("\t{:?} {:?} at +{}", a.kind, a.format, a.offset);
		}

		let end = start + stride * num_verts + TRAILING_PAD;
		if end > buf.len() {
			return Err(CursorError::OutOfData {
				offset: start,
				wanted: end - start,
				len: buf.len(),
			}.into());
		}

		buf.with_endian(Endian::Little, |buf| -> Result<(), CursorError> {
			if attrs.is_empty() {
				return Ok(());
			}

			for a in attrs.iter_mut() {
				a.data.reserve(num_verts);
			}

			for v in 0..num_verts {
				for a in attrs.iter_mut() {
					buf.seek_absolute(start + stride * v + a.offset as usize)?;
					a.data.push(a.format.read(buf)?);
				}
			}

			Ok(())
		})?;

		buf.seek_absolute(end)?;

		Ok(VertexBuffer {
			version: version,
			attributes: attrs,
			stride: stride,
		})
	}

	pub fn find(&self, kind: AttributeType) -> Option<&Attribute> {
		self.attributes.iter().find(|a| a.kind == kind)
	}
}

/// Reads the `count` buffers of a sub-mesh
pub fn read_buffers(buf: &mut ByteCursor, count: usize, num_verts: usize)
	-> Result<Vec<VertexBuffer>, TTImportError>
{
	let mut buffers = vec![];
	for i in 0..count {
		debug!("Buffer {}/{}", i + 1, count);
		buffers.push(VertexBuffer::read(buf, num_verts)?);
	}

	Ok(buffers)
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::Vec4;

	use mdkit_core::io_ext::{
		ByteCursor,
		Endian
	};

	use crate::{
		fixture::{
			BufferSpec,
			Bytes
		},
		TTImportError
	};

	use super::*;

	fn buffer_bytes(spec: &BufferSpec) -> Vec<u8> {
		let mut b = Bytes::new();
		b.bytes(&SIGNATURE).u32_be(7).u32_be(spec.attrs.len() as u32);
		for (kind, format, offset) in spec.attrs.iter() {
			b.u8(*kind).u8(*format).u8(*offset);
		}
		b.zeros(HEADER_PAD).bytes(&spec.payload).zeros(TRAILING_PAD);
		b.build()
	}

	#[test]
	fn test_format_widths() {
		let data = [0x3Cu8; 16];

		for format in AttributeFormat::ALL.iter() {
			let mut buf = ByteCursor::new(&data);
			buf.set_endian(Endian::Little);
			format.read(&mut buf).unwrap();
			assert_eq!(format.width(), buf.position(), "{:?}", format);
		}
	}

	#[test]
	fn test_format_codes() {
		assert_eq!(AttributeFormat::Vec2Float, AttributeFormat::from_u8(2).unwrap());
		assert_eq!(AttributeFormat::Color4Byte, AttributeFormat::from_u8(9).unwrap());
		assert!(matches!(AttributeFormat::from_u8(1), Err(TTImportError::UnknownAttributeFormat(1))));
		assert!(matches!(AttributeFormat::from_u8(10), Err(TTImportError::UnknownAttributeFormat(10))));
	}

	#[test]
	fn test_attribute_types() {
		assert_eq!(AttributeType::UvSet0, AttributeType::from(5));
		assert_eq!(AttributeType::UvSet1, AttributeType::from(7));
		assert_eq!(AttributeType::LightColSet, AttributeType::from(13));
		assert_eq!(AttributeType::Other(200), AttributeType::from(200));
	}

	#[test]
	fn test_decode_values() {
		let data = Bytes::new()
			.u16_le(0x3C00).u16_le(0xC000)
			.bytes(&[0, 51, 255, 128])
			.bytes(&[0, 51, 255, 128])
			.f32_le(0.5).f32_le(-1.5)
			.build();
		let mut buf = ByteCursor::new(&data);
		buf.set_endian(Endian::Little);

		assert_eq!(Vec4::new(1.0, -2.0, 0.0, 0.0), AttributeFormat::Vec2Half.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(0.0, 0.2, 1.0, 128.0 / 255.0),
			AttributeFormat::Vec4ByteNorm.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(0.0, 51.0, 255.0, 128.0), AttributeFormat::Color4Byte.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(0.5, -1.5, 0.0, 0.0), AttributeFormat::Vec2Float.read(&mut buf).unwrap());
	}

	#[test]
	fn test_decode_wide_values() {
		let data = Bytes::new()
			.u16_le(0x3C00).u16_le(0xC000).u16_le(0x3800).u16_le(0x7BFF)
			.bytes(&[1, 2, 3, 250])
			.f32_le(1.5).f32_le(-2.25).f32_le(3.0)
			.f32_le(0.5).f32_le(1.0).f32_le(2.0).f32_le(-4.0)
			.build();
		let mut buf = ByteCursor::new(&data);
		buf.set_endian(Endian::Little);

		assert_eq!(Vec4::new(1.0, -2.0, 0.5, 65504.0), AttributeFormat::Vec4Half.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(1.0, 2.0, 3.0, 250.0), AttributeFormat::Vec4Byte.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(1.5, -2.25, 3.0, 0.0), AttributeFormat::Vec3Float.read(&mut buf).unwrap());
		assert_eq!(Vec4::new(0.5, 1.0, 2.0, -4.0), AttributeFormat::Vec4Float.read(&mut buf).unwrap());
		assert!(buf.is_eof());
	}

	#[test]
	fn test_buffer_without_attributes() {
		let data = buffer_bytes(&BufferSpec {
			attrs: vec![],
			payload: vec![],
		});
		let mut buf = ByteCursor::new(&data);

		let vb = VertexBuffer::read(&mut buf, u32::MAX as usize).unwrap();
		assert_eq!(0, vb.stride);
		assert!(buf.is_eof());
	}

	#[test]
	fn test_stride_order_independent() {
		let mk = |format| Attribute {
			kind: AttributeType::Position,
			format: format,
			offset: 0,
			data: vec![],
		};
		let mut attrs: Vec<Attribute> = AttributeFormat::ALL.iter().map(|f| mk(*f)).collect();
		let forward = stride(&attrs);
		attrs.reverse();
		assert_eq!(forward, stride(&attrs));
		attrs.swap(1, 5);
		assert_eq!(forward, stride(&attrs));
		assert_eq!(8 + 12 + 16 + 4 + 8 + 4 + 4 + 4, forward);
	}

	#[test]
	fn test_interleaved_buffer() {
		// position at +8, uv at +0
		let mut payload = Bytes::new();
		for i in 0..2 {
			let f = i as f32;
			payload.f32_le(f).f32_le(-f).f32_le(10.0 + f).f32_le(20.0 + f).f32_le(30.0 + f);
		}
		let spec = BufferSpec {
			attrs: vec![(0, 3, 8), (5, 2, 0)],
			payload: payload.build(),
		};
		let mut data = buffer_bytes(&spec);
		data.push(0xAB);
		let mut buf = ByteCursor::new(&data);

		let vb = VertexBuffer::read(&mut buf, 2).unwrap();
		assert_eq!(7, vb.version);
		assert_eq!(20, vb.stride);
		let pos = vb.find(AttributeType::Position).unwrap();
		assert_eq!(vec![Vec4::new(10.0, 20.0, 30.0, 0.0), Vec4::new(11.0, 21.0, 31.0, 0.0)], pos.data);
		let uv = vb.find(AttributeType::UvSet0).unwrap();
		assert_eq!(vec![Vec4::new(0.0, 0.0, 0.0, 0.0), Vec4::new(1.0, -1.0, 0.0, 0.0)], uv.data);

		// left after the trailing padding, back in big endian mode
		assert_eq!(Some(0xAB), buf.peek_u8());
		assert_eq!(Endian::Big, buf.endian());
	}

	#[test]
	fn test_bad_signature() {
		let mut data = buffer_bytes(&BufferSpec::positions(&[[0.0; 3]]));
		data[0] = b'X';
		let mut buf = ByteCursor::new(&data);

		assert!(matches!(VertexBuffer::read(&mut buf, 1),
			Err(TTImportError::InvalidSignature { offset: 0, .. })));
	}

	#[test]
	fn test_truncated_payload() {
		let data = buffer_bytes(&BufferSpec::positions(&[[0.0; 3]]));
		let mut buf = ByteCursor::new(&data);

		assert!(VertexBuffer::read(&mut buf, 2).is_err());
		assert_eq!(Endian::Big, buf.endian());
	}
}
