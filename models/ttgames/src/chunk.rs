use log::{
	debug,
	trace,
	warn
};

use mdkit_core::io_ext::ByteCursor;

use crate::TTImportError;

/// Bytes of `size | tag | version`
pub const HEADER_SIZE: usize = 20;
/// Bytes following every chunk that its declared size doesn't cover
pub const TRAILER_SIZE: usize = 4;

pub const TAG_HIERARCHY: [u8; 12] = *b".CC4HSERHSER";
pub const TAG_SCENE: [u8; 12] = *b".CC4HSER2CSG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
	/// Resource hierarchy, holds the asset name
	Hierarchy,
	/// Scene data, holds materials and sub-meshes
	Scene,
	Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
	pub offset: usize,
	pub size: u32,
	pub tag: [u8; 12],
	pub version: u32,
}

impl ChunkHeader {
	fn read(buf: &mut ByteCursor) -> Result<ChunkHeader, TTImportError> {
		Ok(ChunkHeader {
			offset: buf.position(),
			size: buf.read_u32()?,
			tag: buf.read_array::<12>()?,
			version: buf.read_u32()?,
		})
	}

	pub fn kind(&self) -> ChunkKind {
		match &self.tag {
			t if *t == TAG_HIERARCHY => ChunkKind::Hierarchy,
			t if *t == TAG_SCENE => ChunkKind::Scene,
			_ => ChunkKind::Unknown,
		}
	}

	pub fn tag_str(&self) -> String {
		self.tag.iter().map(|b| *b as char).collect()
	}

	/// Offset of the following chunk
	pub fn end(&self) -> usize {
		self.offset + self.size as usize + TRAILER_SIZE
	}
}

/// Walks every chunk of the stream, handing each one to `handler` with the cursor placed right
/// after its header. The next chunk is always read from [`ChunkHeader::end`], no matter how much
/// the handler consumed. A chunk declared past the end of the stream is still handed over and
/// ends the walk.
pub fn walk<'a, F>(buf: &mut ByteCursor<'a>, mut handler: F) -> Result<Vec<ChunkHeader>, TTImportError>
where
	F: FnMut(&ChunkHeader, &mut ByteCursor<'a>) -> Result<(), TTImportError>,
{
	let mut chunks = vec![];

	while buf.position() < buf.len() {
		let header = ChunkHeader::read(buf)?;
		debug!("Chunk at {:#X}: size {}, type {}, version {}", header.offset, header.size,
			header.tag_str(), header.version);

		if header.end() < header.offset + HEADER_SIZE {
			warn!("Chunk at {:#X} declares size {}, the next one starts inside its header",
				header.offset, header.size);
		}

		match header.kind() {
			ChunkKind::Unknown => trace!("Skipping unknown chunk {}", header.tag_str()),
			_ => handler(&header, buf)?,
		}
		chunks.push(header);

		if header.end() > buf.len() {
			warn!("Chunk at {:#X} ends {} byte(s) past the end of the stream", header.offset,
				header.end() - buf.len());
			buf.seek_absolute(buf.len())?;
			break;
		}
		buf.seek_absolute(header.end())?;
	}

	Ok(chunks)
}
