pub mod errors;
pub mod raw;
pub mod schema;

mod utilities;

pub use errors::{ClassError, Result};

#[cfg(feature = "memmap2")]
pub fn map_file(path: impl AsRef<std::path::Path>) -> Result<memmap2::Mmap> {
	let file = std::fs::File::open(path)?;
	Ok(unsafe { memmap2::Mmap::map(&file) }?)
}
