use log::debug;

use mdkit_core::io_ext::ByteCursor;

use crate::TTImportError;

/// Reads the asset name out of a resource hierarchy chunk
pub fn read_name(buf: &mut ByteCursor) -> Result<String, TTImportError> {
	let label = buf.read_cstr()?;
	debug!("Resource hierarchy label {:?}", label);

	let name = buf.read_cstr_pair()?;
	debug!("Asset name {:?}", name);

	Ok(name)
}

#[cfg(test)]
mod tests {
	use mdkit_core::io_ext::ByteCursor;

	use crate::fixture::Bytes;

	#[test]
	fn test_read_name() {
		let data = Bytes::new().cstr("label").cstr("-Assets/x.model").cstr("tail").u8(9).build();
		let mut buf = ByteCursor::new(&data);

		assert_eq!("-Assets/x.model", super::read_name(&mut buf).unwrap());
		assert_eq!(Some(9), buf.peek_u8());
	}

	#[test]
	fn test_read_name_truncated() {
		let data = Bytes::new().cstr("label").bytes(b"-Assets").build();
		let mut buf = ByteCursor::new(&data);

		assert!(super::read_name(&mut buf).is_err());
	}
}
