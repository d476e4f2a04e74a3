use log::debug;

use mdkit_core::io_ext::{
	ByteCursor,
	CursorError,
	Endian
};

use crate::{
	FormatProfile,
	TTImportError
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum IndexFormat {
	U16 = 2,
	U32 = 4,
}

impl IndexFormat {
	/// Resolves a format code, rejecting the ones `profile` doesn't accept
	pub fn from_code(code: u32, profile: &FormatProfile) -> Result<IndexFormat, TTImportError> {
		if !profile.accepts_index_format(code) {
			return Err(TTImportError::UnsupportedIndexFormat(code));
		}

		match code {
			2 => Ok(IndexFormat::U16),
			4 => Ok(IndexFormat::U32),
			_ => Err(TTImportError::UnsupportedIndexFormat(code)),
		}
	}

	pub fn width(&self) -> usize {
		*self as usize
	}
}

/// Reads the index section of a sub-mesh: a big endian count and format, then the little endian
/// indices.
pub fn read_indices(buf: &mut ByteCursor, profile: &FormatProfile)
	-> Result<(IndexFormat, Vec<u32>), TTImportError>
{
	let count = buf.read_u32()? as usize;
	let code = buf.read_u32()?;
	let format = IndexFormat::from_code(code, profile)?;
	debug!("{} index(es) of format {} at {:#X}", count, code, buf.position());

	if count * format.width() > buf.remaining() {
		return Err(CursorError::OutOfData {
			offset: buf.position(),
			wanted: count * format.width(),
			len: buf.len(),
		}.into());
	}

	let indices = buf.with_endian(Endian::Little, |buf| {
		let mut indices = Vec::with_capacity(count);
		for _ in 0..count {
			indices.push(match format {
				IndexFormat::U16 => buf.read_u16()? as u32,
				IndexFormat::U32 => buf.read_u32()?,
			});
		}

		Ok::<_, CursorError>(indices)
	})?;

	Ok((format, indices))
}
