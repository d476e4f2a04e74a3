use byteorder::{
	BE,
	ByteOrder,
	LE
};

use thiserror::Error;

use ultraviolet::vec::Vec4;

use crate::f16_to_f32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
	Big,
	Little,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CursorError {
	#[error("Out of data at {offset:#X}: wanted {wanted} byte(s), stream is {len} byte(s)")]
	OutOfData {
		offset: usize,
		wanted: usize,
		len: usize,
	},
	#[error("Seek target {target} outside of stream (length {len})")]
	SeekOutOfRange {
		target: i64,
		len: usize,
	},
}

/// A position-tracked reader over an in-memory byte buffer, with a byte order that can be
/// changed between reads.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
	data: &'a [u8],
	pos: usize,
	endian: Endian,
}

impl<'a> ByteCursor<'a> {
	/// Creates a big endian cursor positioned at the start of `data`
	pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
		ByteCursor {
			data: data,
			pos: 0,
			endian: Endian::Big,
		}
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn remaining(&self) -> usize {
		self.data.len().saturating_sub(self.pos)
	}

	pub fn is_eof(&self) -> bool {
		self.pos >= self.data.len()
	}

	pub fn endian(&self) -> Endian {
		self.endian
	}

	pub fn set_endian(&mut self, endian: Endian) {
		self.endian = endian;
	}

	pub fn set_big_endian(&mut self, big: bool) {
		self.endian = if big { Endian::Big } else { Endian::Little };
	}

	/// Runs `f` with the given byte order, restoring the previous one afterwards, whether `f`
	/// succeeded or not.
	pub fn with_endian<T, E, F>(&mut self, endian: Endian, f: F) -> Result<T, E>
	where
		F: FnOnce(&mut ByteCursor<'a>) -> Result<T, E>,
	{
		let prev = self.endian;
		self.endian = endian;
		let res = f(self);
		self.endian = prev;

		res
	}

	pub fn seek_absolute(&mut self, pos: usize) -> Result<(), CursorError> {
		if pos > self.data.len() {
			return Err(CursorError::SeekOutOfRange {
				target: pos as i64,
				len: self.data.len(),
			});
		}

		self.pos = pos;
		Ok(())
	}

	/// Moves the cursor by `n` bytes, backwards if negative
	pub fn seek_relative(&mut self, n: i64) -> Result<(), CursorError> {
		let target = self.pos as i64 + n;
		if target < 0 || target > self.data.len() as i64 {
			return Err(CursorError::SeekOutOfRange {
				target: target,
				len: self.data.len(),
			});
		}

		self.pos = target as usize;
		Ok(())
	}

	/// Borrows the next `n` bytes and advances past them
	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
		let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len())
			.ok_or(CursorError::OutOfData {
				offset: self.pos,
				wanted: n,
				len: self.data.len(),
			})?;

		let bytes = &self.data[self.pos..end];
		self.pos = end;

		Ok(bytes)
	}

	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
		let mut arr = [0; N];
		arr.copy_from_slice(self.read_bytes(N)?);

		Ok(arr)
	}

	pub fn peek_u8(&self) -> Option<u8> {
		self.data.get(self.pos).copied()
	}

	pub fn read_u8(&mut self) -> Result<u8, CursorError> {
		Ok(self.read_bytes(1)?[0])
	}

	pub fn read_u16(&mut self) -> Result<u16, CursorError> {
		let b = self.read_bytes(2)?;
		Ok(match self.endian {
			Endian::Big => BE::read_u16(b),
			Endian::Little => LE::read_u16(b),
		})
	}

	pub fn read_i16(&mut self) -> Result<i16, CursorError> {
		let b = self.read_bytes(2)?;
		Ok(match self.endian {
			Endian::Big => BE::read_i16(b),
			Endian::Little => LE::read_i16(b),
		})
	}

	pub fn read_u32(&mut self) -> Result<u32, CursorError> {
		let b = self.read_bytes(4)?;
		Ok(match self.endian {
			Endian::Big => BE::read_u32(b),
			Endian::Little => LE::read_u32(b),
		})
	}

	pub fn read_f32(&mut self) -> Result<f32, CursorError> {
		let b = self.read_bytes(4)?;
		Ok(match self.endian {
			Endian::Big => BE::read_f32(b),
			Endian::Little => LE::read_f32(b),
		})
	}

	/// Reads an IEEE 754 half precision float, widened to `f32`
	pub fn read_f16(&mut self) -> Result<f32, CursorError> {
		Ok(f16_to_f32(self.read_u16()?))
	}

	/// Reads a fixed-length single byte encoded string, keeping embedded nulls
	pub fn read_fixed_string(&mut self, len: usize) -> Result<String, CursorError> {
		Ok(self.read_bytes(len)?.iter().map(|b| *b as char).collect())
	}

	/// Reads a null-terminated string
	pub fn read_cstr(&mut self) -> Result<String, CursorError> {
		let mut s = String::new();

		loop {
			match self.read_u8()? {
				0 => break,
				b => s.push(b as char),
			}
		}

		Ok(s)
	}

	/// Reads a null-terminated string followed by a second one, which is discarded
	pub fn read_cstr_pair(&mut self) -> Result<String, CursorError> {
		let s = self.read_cstr()?;
		self.read_cstr()?;

		Ok(s)
	}

	/// Reads up to four little endian floats, zero-filling the rest
	pub fn read_vec4_f32(&mut self, n: usize) -> Result<Vec4, CursorError> {
		let mut v = [0.0; 4];
		for c in v.iter_mut().take(n) {
			*c = self.read_f32()?;
		}

		Ok(Vec4::new(v[0], v[1], v[2], v[3]))
	}
}
