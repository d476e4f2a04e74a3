#[cfg(feature = "io_ext")]
pub mod io_ext;

pub mod export;
pub mod scene;

/// Converts a 4-byte string into a 32-bit big endian integer.
/// Byte strings longer than 4 bytes are truncated.
#[macro_export]
macro_rules! tag4 {
	($b4: literal) => {
		u32::from_be_bytes([$b4[0], $b4[1], $b4[2], $b4[3]])
	}
}

/// Widens an IEEE 754 binary16 value to `f32`
pub fn f16_to_f32(h: u16) -> f32 {
	let sign = ((h & 0x8000) as u32) << 16;
	let exp = ((h >> 10) & 0x1F) as u32;
	let frac = (h & 0x3FF) as u32;

	let bits = match (exp, frac) {
		(0, 0) => sign,
		(0, _) => {
			// subnormal, renormalize
			let mut e = 127 - 15 + 1;
			let mut f = frac;
			while f & 0x400 == 0 {
				f <<= 1;
				e -= 1;
			}
			sign | (e << 23) | ((f & 0x3FF) << 13)
		},
		(0x1F, _) => sign | 0x7F80_0000 | (frac << 13),
		_ => sign | ((exp + 127 - 15) << 23) | (frac << 13),
	};

	f32::from_bits(bits)
}
