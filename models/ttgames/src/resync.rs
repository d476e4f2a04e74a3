use log::{
	debug,
	warn
};

use mdkit_core::io_ext::{
	ByteCursor,
	CursorError
};

/// Marker opening every sub-mesh header
pub const MARKER: [u8; 4] = *b"SMNR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resync {
	/// Marker found, `skipped` bytes in front of it
	Found {
		offset: usize,
		skipped: usize,
	},
	/// No marker within reach, the cursor was moved to the predicted offset instead
	Fallback {
		from: usize,
		to: usize,
	},
}

/// Scans forward for `marker`, leaving the cursor on its first byte. The marker must start no more
/// than `max_lookahead` bytes past the current position; otherwise, or when the stream ends first,
/// the cursor goes back to where the scan began and advances by `fallback_offset`.
pub fn seek_to_marker(buf: &mut ByteCursor, marker: &[u8], max_lookahead: usize,
	fallback_offset: usize) -> Result<Resync, CursorError>
{
	let start = buf.position();
	let mut k = 0;

	if !marker.is_empty() {
		for _ in 0..(max_lookahead + marker.len()) {
			let b = match buf.read_u8() {
				Ok(b) => b,
				Err(_) => break,
			};

			if b == marker[k] {
				k += 1;
			} else {
				k = (b == marker[0]) as usize;
			}

			if k == marker.len() {
				buf.seek_relative(-(marker.len() as i64))?;
				let offset = buf.position();
				debug!("Sub-mesh marker at {:#X}, {} byte(s) past {:#X}", offset, offset - start, start);

				return Ok(Resync::Found {
					offset: offset,
					skipped: offset - start,
				});
			}
		}
	}

	buf.seek_absolute(start)?;
	buf.seek_relative(fallback_offset as i64)?;
	warn!("No sub-mesh marker within {} bytes of {:#X}, falling back to {:#X}", max_lookahead, start,
		buf.position());

	Ok(Resync::Fallback {
		from: start,
		to: buf.position(),
	})
}
