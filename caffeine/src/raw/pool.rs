use std::io::Cursor;

use paste::paste;

use crate::errors::{ClassError, Result};
use crate::raw::indices::pool_index::{
	ClassIndex, MethodHandleIndex, ModuleIndex, NameAndTypeIndex, PackageIndex, Utf8Index,
};
use crate::utilities::{define_from_repr_enum, read_bytes_slice_from_stream, FromByteStream};

define_from_repr_enum! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub enum ConstantKind: u8 {
		/// The second slot of a `Long`/`Double`. Never a valid tag byte.
		Unusable = 0,
		Utf8 = 1,
		Integer = 3,
		Float = 4,
		Long = 5,
		Double = 6,
		Class = 7,
		String = 8,
		FieldRef = 9,
		MethodRef = 10,
		InterfaceMethodRef = 11,
		NameAndType = 12,
		MethodHandle = 15,
		MethodType = 16,
		Dynamic = 17,
		InvokeDynamic = 18,
		Module = 19,
		Package = 20,
	}
}

define_from_repr_enum! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub enum ReferenceKind: u8 {
		GetField = 1,
		GetStatic = 2,
		PutField = 3,
		PutStatic = 4,
		InvokeVirtual = 5,
		InvokeStatic = 6,
		InvokeSpecial = 7,
		NewInvokeSpecial = 8,
		InvokeInterface = 9,
	}
}

/// The two big-endian halves of a `Long` or `Double` entry, kept raw; how
/// they combine is up to the consumer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Wide {
	pub high_bytes: u32,
	pub low_bytes: u32,
}

impl Wide {
	#[inline]
	pub fn as_u64(&self) -> u64 {
		((self.high_bytes as u64) << 32) | self.low_bytes as u64
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Class {
	pub name: Utf8Index,
}

/// Shared shape of `FieldRef`, `MethodRef` and `InterfaceMethodRef`; the
/// three remain distinct variants of [`Constant`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MemberRef {
	pub class: ClassIndex,
	pub name_and_type: NameAndTypeIndex,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NameAndType {
	pub name: Utf8Index,
	pub descriptor: Utf8Index,
}

/// The reference index constraint depends on `kind` (fields for kinds 1-4,
/// methods for 5-8, interface methods for 9), so it stays a raw index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MethodHandle {
	pub kind: ReferenceKind,
	pub reference: u16,
}

/// Shared shape of `Dynamic` and `InvokeDynamic`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DynamicCallSite {
	pub bootstrap_method_attr: u16,
	pub name_and_type: NameAndTypeIndex,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ModuleRef {
	pub name: Utf8Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PackageRef {
	pub name: Utf8Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Constant<'l> {
	/// Modified UTF-8 bytes, borrowed verbatim from the class file.
	Utf8(&'l [u8]),
	Integer(u32),
	Float(u32),
	Long(Wide),
	Double(Wide),
	Class(Class),
	String { value: Utf8Index },
	FieldRef(MemberRef),
	MethodRef(MemberRef),
	InterfaceMethodRef(MemberRef),
	NameAndType(NameAndType),
	MethodHandle(MethodHandle),
	MethodType { descriptor: Utf8Index },
	Dynamic(DynamicCallSite),
	InvokeDynamic(DynamicCallSite),
	Module(ModuleRef),
	Package(PackageRef),
	/// Placeholder filling the slot after a `Long`/`Double`. Dereferencing
	/// it through any accessor is an `InvalidCPIndex`.
	Unusable,
}

impl Constant<'_> {
	pub fn kind(&self) -> ConstantKind {
		match self {
			Constant::Utf8(_) => ConstantKind::Utf8,
			Constant::Integer(_) => ConstantKind::Integer,
			Constant::Float(_) => ConstantKind::Float,
			Constant::Long(_) => ConstantKind::Long,
			Constant::Double(_) => ConstantKind::Double,
			Constant::Class(_) => ConstantKind::Class,
			Constant::String { .. } => ConstantKind::String,
			Constant::FieldRef(_) => ConstantKind::FieldRef,
			Constant::MethodRef(_) => ConstantKind::MethodRef,
			Constant::InterfaceMethodRef(_) => ConstantKind::InterfaceMethodRef,
			Constant::NameAndType(_) => ConstantKind::NameAndType,
			Constant::MethodHandle(_) => ConstantKind::MethodHandle,
			Constant::MethodType { .. } => ConstantKind::MethodType,
			Constant::Dynamic(_) => ConstantKind::Dynamic,
			Constant::InvokeDynamic(_) => ConstantKind::InvokeDynamic,
			Constant::Module(_) => ConstantKind::Module,
			Constant::Package(_) => ConstantKind::Package,
			Constant::Unusable => ConstantKind::Unusable,
		}
	}
}

impl<'l> FromByteStream<'l> for Constant<'l> {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let tag = u8::read(stream, &())?;
		let Some(kind) = ConstantKind::from_repr(tag) else {
			return Err(ClassError::UnknownConstantTag(tag));
		};

		Ok(match kind {
			ConstantKind::Utf8 => {
				let length = u16::read(stream, &())? as usize;
				Constant::Utf8(read_bytes_slice_from_stream(stream, length)?)
			},
			ConstantKind::Integer => Constant::Integer(u32::read(stream, &())?),
			ConstantKind::Float => Constant::Float(u32::read(stream, &())?),
			ConstantKind::Long => Constant::Long(Wide::read(stream, &())?),
			ConstantKind::Double => Constant::Double(Wide::read(stream, &())?),
			ConstantKind::Class => Constant::Class(Class {
				name: Utf8Index::read(stream, &())?,
			}),
			ConstantKind::String => Constant::String {
				value: Utf8Index::read(stream, &())?,
			},
			ConstantKind::FieldRef => Constant::FieldRef(MemberRef::read(stream, &())?),
			ConstantKind::MethodRef => Constant::MethodRef(MemberRef::read(stream, &())?),
			ConstantKind::InterfaceMethodRef => {
				Constant::InterfaceMethodRef(MemberRef::read(stream, &())?)
			},
			ConstantKind::NameAndType => Constant::NameAndType(NameAndType {
				name: Utf8Index::read(stream, &())?,
				descriptor: Utf8Index::read(stream, &())?,
			}),
			ConstantKind::MethodHandle => {
				let kind = u8::read(stream, &())?;
				let Some(kind) = ReferenceKind::from_repr(kind) else {
					return Err(ClassError::UnknownReferenceKind(kind));
				};
				Constant::MethodHandle(MethodHandle {
					kind,
					reference: u16::read(stream, &())?,
				})
			},
			ConstantKind::MethodType => Constant::MethodType {
				descriptor: Utf8Index::read(stream, &())?,
			},
			ConstantKind::Dynamic => Constant::Dynamic(DynamicCallSite::read(stream, &())?),
			ConstantKind::InvokeDynamic => {
				Constant::InvokeDynamic(DynamicCallSite::read(stream, &())?)
			},
			ConstantKind::Module => Constant::Module(ModuleRef {
				name: Utf8Index::read(stream, &())?,
			}),
			ConstantKind::Package => Constant::Package(PackageRef {
				name: Utf8Index::read(stream, &())?,
			}),
			ConstantKind::Unusable => return Err(ClassError::UnknownConstantTag(tag)),
		})
	}
}

impl<'l> FromByteStream<'l> for Wide {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			high_bytes: u32::read(stream, &())?,
			low_bytes: u32::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for MemberRef {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			class: ClassIndex::read(stream, &())?,
			name_and_type: NameAndTypeIndex::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for DynamicCallSite {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			bootstrap_method_attr: u16::read(stream, &())?,
			name_and_type: NameAndTypeIndex::read(stream, &())?,
		})
	}
}

/// The class file's symbol table. Logically 1-indexed with `count - 1`
/// entries; `Long`/`Double` entries are followed by a [`Constant::Unusable`]
/// slot so that raw indices keep their on-disk meaning.
#[derive(Debug, Clone)]
pub struct ConstantPool<'l> {
	entries: Vec<Constant<'l>>,
}

impl<'l> FromByteStream<'l> for ConstantPool<'l> {
	type Deps = ();
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let count = u16::read(stream, &())? as usize;
		let mut entries = Vec::with_capacity(count.saturating_sub(1));
		while entries.len() + 1 < count {
			let constant = Constant::read(stream, &())?;
			let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
			entries.push(constant);
			if wide {
				entries.push(Constant::Unusable);
			}
		}
		Ok(Self { entries })
	}
}

#[allow(clippy::len_without_is_empty)]
impl<'l> ConstantPool<'l> {
	/// Number of occupied slots, unusable placeholders included.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Constant<'l>> {
		self.entries.iter()
	}

	/// Raw 1-indexed slot access with the absence rules applied.
	fn entry(&self, index: u16) -> Result<&Constant<'l>> {
		if index == 0 {
			return Err(ClassError::InvalidCPIndex(index));
		}
		match self.entries.get(index as usize - 1) {
			None | Some(Constant::Unusable) => Err(ClassError::InvalidCPIndex(index)),
			Some(entry) => Ok(entry),
		}
	}

	/// Fast path of [`Self::try_get_utf8`]; panics instead of returning the
	/// index/variant errors.
	pub fn get_utf8(&self, index: Utf8Index) -> &'l [u8] {
		match self.try_get_utf8(index) {
			Ok(value) => value,
			Err(err) => panic!("constant pool access failed: {err:?}"),
		}
	}

	pub fn try_get_utf8(&self, index: Utf8Index) -> Result<&'l [u8]> {
		match self.entry(index.0)? {
			Constant::Utf8(value) => Ok(*value),
			entry => Err(ClassError::WrongCPType {
				expected: ConstantKind::Utf8,
				found: entry.kind(),
			}),
		}
	}
}

macro_rules! impl_pool_accessors {
	($($name: ident: $index: ty => $variant: ident -> $ret: ty),* $(,)?) => {
		paste! {
			impl ConstantPool<'_> {$(
				#[doc = concat!("Fast path of [`Self::try_get_", stringify!($name), "`]; panics instead of returning the index/variant errors.")]
				pub fn [<get_ $name>](&self, index: $index) -> $ret {
					match self.[<try_get_ $name>](index) {
						Ok(value) => value,
						Err(err) => panic!("constant pool access failed: {err:?}"),
					}
				}

				pub fn [<try_get_ $name>](&self, index: $index) -> Result<$ret> {
					match self.entry(index.0)? {
						Constant::$variant(value) => Ok(*value),
						entry => Err(ClassError::WrongCPType {
							expected: ConstantKind::$variant,
							found: entry.kind(),
						}),
					}
				}
			)*}
		}
	};
}

impl_pool_accessors! {
	class: ClassIndex => Class -> Class,
	name_and_type: NameAndTypeIndex => NameAndType -> NameAndType,
	method_handle: MethodHandleIndex => MethodHandle -> MethodHandle,
	module: ModuleIndex => Module -> ModuleRef,
	package: PackageIndex => Package -> PackageRef,
}

#[cfg(test)]
mod test {
	use super::*;

	fn pool_from(bytes: &[u8]) -> ConstantPool {
		let mut stream = Cursor::new(bytes);
		ConstantPool::read(&mut stream, &()).unwrap()
	}

	#[test]
	fn wide_entries_occupy_two_slots() {
		// count 5: Long at 1 (slot 2 unusable), Class at 3 -> Utf8 at 4
		let bytes = [
			0x00, 0x05, // count
			5, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, // Long(1, 2)
			7, 0x00, 0x04, // Class -> 4
			1, 0x00, 0x03, b'F', b'o', b'o', // Utf8 "Foo"
		];
		let pool = pool_from(&bytes);
		assert_eq!(pool.len(), 4);

		let Constant::Long(wide) = pool.entry(1).unwrap() else {
			panic!("expected a long at slot 1");
		};
		assert_eq!(wide.as_u64(), 0x0000_0001_0000_0002);

		// the slot after the long is unusable through every accessor
		assert!(matches!(
			pool.try_get_utf8(Utf8Index(2)),
			Err(ClassError::InvalidCPIndex(2))
		));
		assert!(matches!(
			pool.try_get_class(ClassIndex(2)),
			Err(ClassError::InvalidCPIndex(2))
		));

		let class = pool.try_get_class(ClassIndex(3)).unwrap();
		assert_eq!(pool.try_get_utf8(class.name).unwrap(), b"Foo");
	}

	#[test]
	fn index_zero_and_out_of_range_are_invalid() {
		let bytes = [0x00, 0x02, 1, 0x00, 0x01, b'A'];
		let pool = pool_from(&bytes);
		assert!(matches!(
			pool.try_get_utf8(Utf8Index(0)),
			Err(ClassError::InvalidCPIndex(0))
		));
		assert!(matches!(
			pool.try_get_utf8(Utf8Index(2)),
			Err(ClassError::InvalidCPIndex(2))
		));
		assert_eq!(pool.try_get_utf8(Utf8Index(1)).unwrap(), b"A");
	}

	#[test]
	fn variant_mismatch() {
		let bytes = [0x00, 0x02, 1, 0x00, 0x01, b'A'];
		let pool = pool_from(&bytes);
		assert!(matches!(
			pool.try_get_class(ClassIndex(1)),
			Err(ClassError::WrongCPType {
				expected: ConstantKind::Class,
				found: ConstantKind::Utf8,
			})
		));
	}

	#[test]
	#[should_panic]
	fn unchecked_access_panics_on_mismatch() {
		let bytes = [0x00, 0x02, 1, 0x00, 0x01, b'A'];
		let pool = pool_from(&bytes);
		pool.get_class(ClassIndex(1));
	}

	#[test]
	fn method_handle_reference_kinds() {
		let bytes = [0x00, 0x02, 15, 6, 0x00, 0x01];
		let pool = pool_from(&bytes);
		let handle = pool.try_get_method_handle(super::MethodHandleIndex(1)).unwrap();
		assert_eq!(handle.kind, ReferenceKind::InvokeStatic);
		assert_eq!(handle.reference, 1);

		let bad = [0x00u8, 0x02, 15, 10, 0x00, 0x01];
		let mut stream = Cursor::new(bad.as_slice());
		assert!(matches!(
			ConstantPool::read(&mut stream, &()),
			Err(ClassError::UnknownReferenceKind(10))
		));
	}

	#[test]
	fn unknown_tag() {
		let bytes = [0x00, 0x02, 2, 0x00, 0x00];
		let mut stream = Cursor::new(bytes.as_slice());
		assert!(matches!(
			ConstantPool::read(&mut stream, &()),
			Err(ClassError::UnknownConstantTag(2))
		));
	}

	#[test]
	fn truncated_utf8_body() {
		let bytes = [0x00, 0x02, 1, 0x00, 0x05, b'A'];
		let mut stream = Cursor::new(bytes.as_slice());
		assert!(matches!(
			ConstantPool::read(&mut stream, &()),
			Err(ClassError::UnexpectedEof)
		));
	}
}
