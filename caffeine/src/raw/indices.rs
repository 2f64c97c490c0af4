pub mod pool_index {
	use std::fmt::{Debug, Formatter};
	use std::io::Cursor;

	use paste::paste;

	use crate::errors::Result;
	use crate::utilities::FromByteStream;

	/// Generates one transparent index wrapper per constant-pool variant a
	/// raw `u16` may be expected to point at. The wrapper is exactly as
	/// large as the bare index; the variant lives only in the type.
	macro_rules! define_pool_indices {
		($($id: ident),* $(,)?) => {
			paste! {
				$(
					#[repr(transparent)]
					#[derive(Copy, Clone, Eq, PartialEq, Hash)]
					pub struct [<$id Index>](pub u16);

					impl [<$id Index>] {
						/// Raw index zero, the format's spelling for "not present".
						pub const ABSENT: Self = Self(0);

						#[inline]
						pub fn is_absent(&self) -> bool {
							self.0 == 0
						}

						#[inline]
						pub fn raw(&self) -> u16 {
							self.0
						}
					}

					impl Debug for [<$id Index>] {
						fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
							write!(f, concat!(stringify!($id), "Index("))?;
							self.0.fmt(f)?;
							write!(f, ")")
						}
					}

					impl<'l> FromByteStream<'l> for [<$id Index>] {
						type Deps = ();
						#[inline]
						fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
							Ok(Self(u16::read(stream, &())?))
						}
					}
				)*
			}
		};
	}

	define_pool_indices! {
		Utf8,
		Class,
		NameAndType,
		MethodHandle,
		Module,
		Package,
	}

}
