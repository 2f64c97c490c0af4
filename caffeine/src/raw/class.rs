use std::io::Cursor;

use bitflags::bitflags;

use crate::errors::{ClassError, Result};
use crate::raw::attributes::Attribute;
use crate::raw::indices::pool_index::{ClassIndex, Utf8Index};
use crate::raw::pool::ConstantPool;
use crate::utilities::{
	read_flags_from_stream, read_u16_prefixed_seq_from_stream, FromByteStream,
};

const MAGIC: u32 = 0xCAFEBABE;

/// Class-file versions 45 (JDK 1.1) through 65 (Java SE 21).
const MAJOR_VERSIONS: std::ops::RangeInclusive<u16> = 45..=65;

bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct ClassFlags: u16 {
		const PUBLIC = 0x0001;
		const FINAL = 0x0010;
		const SUPER = 0x0020;
		const INTERFACE = 0x0200;
		const ABSTRACT = 0x0400;
		const SYNTHETIC = 0x1000;
		const ANNOTATION = 0x2000;
		const ENUM = 0x4000;
		const MODULE = 0x8000;
	}

	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct FieldFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const VOLATILE = 0x0040;
		const TRANSIENT = 0x0080;
		const SYNTHETIC = 0x1000;
		const ENUM = 0x4000;
	}

	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct MethodFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const SYNCHRONIZED = 0x0020;
		const BRIDGE = 0x0040;
		const VARARGS = 0x0080;
		const NATIVE = 0x0100;
		const ABSTRACT = 0x0400;
		const STRICT = 0x0800;
		const SYNTHETIC = 0x1000;
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo<'l> {
	pub access_flags: FieldFlags,
	pub name: Utf8Index,
	pub descriptor: Utf8Index,
	pub attributes: Vec<Attribute<'l>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo<'l> {
	pub access_flags: MethodFlags,
	pub name: Utf8Index,
	pub descriptor: Utf8Index,
	pub attributes: Vec<Attribute<'l>>,
}

/// A fully decoded class file. Scalar values are owned; byte-slice leaves
/// (Utf8 bodies, code arrays, raw attribute payloads) borrow from the input
/// buffer, which must outlive this value.
#[derive(Debug, Clone)]
pub struct ClassFile<'l> {
	minor_version: u16,
	major_version: u16,
	constant_pool: ConstantPool<'l>,
	access_flags: ClassFlags,
	this_class: ClassIndex,
	/// Zero for `java/lang/Object` itself.
	super_class: ClassIndex,
	interfaces: Vec<ClassIndex>,
	fields: Vec<FieldInfo<'l>>,
	methods: Vec<MethodInfo<'l>>,
	attributes: Vec<Attribute<'l>>,
}

impl<'l> FromByteStream<'l> for ClassFile<'l> {
	type Deps = ();
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		if u32::read(stream, &())? != MAGIC {
			return Err(ClassError::InvalidHeader);
		}

		let minor_version = u16::read(stream, &())?;
		let major_version = u16::read(stream, &())?;
		if !MAJOR_VERSIONS.contains(&major_version) {
			return Err(ClassError::InvalidMajorVersion(major_version));
		}

		let constant_pool = ConstantPool::read(stream, &())?;
		let access_flags = read_flags_from_stream(stream)?;
		let this_class = ClassIndex::read(stream, &())?;
		let super_class = ClassIndex::read(stream, &())?;
		let interfaces = read_u16_prefixed_seq_from_stream(stream, &())?;
		let fields = read_u16_prefixed_seq_from_stream(stream, &constant_pool)?;
		let methods = read_u16_prefixed_seq_from_stream(stream, &constant_pool)?;
		let attributes = read_u16_prefixed_seq_from_stream(stream, &constant_pool)?;

		// trailing bytes are ignored
		Ok(Self {
			minor_version,
			major_version,
			constant_pool,
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		})
	}
}

impl<'l> ClassFile<'l> {
	pub fn from_bytes(bytes: &'l [u8]) -> Result<Self> {
		let mut stream = Cursor::new(bytes);
		Self::read(&mut stream, &())
	}

	pub fn minor_version(&self) -> u16 {
		self.minor_version
	}
	pub fn major_version(&self) -> u16 {
		self.major_version
	}
	pub fn constant_pool(&self) -> &ConstantPool<'l> {
		&self.constant_pool
	}
	pub fn access_flags(&self) -> ClassFlags {
		self.access_flags
	}
	pub fn this_class(&self) -> ClassIndex {
		self.this_class
	}
	pub fn super_class(&self) -> ClassIndex {
		self.super_class
	}
	pub fn interfaces(&self) -> &[ClassIndex] {
		&self.interfaces
	}
	pub fn fields(&self) -> &[FieldInfo<'l>] {
		&self.fields
	}
	pub fn methods(&self) -> &[MethodInfo<'l>] {
		&self.methods
	}
	pub fn attributes(&self) -> &[Attribute<'l>] {
		&self.attributes
	}
}

impl<'l> FromByteStream<'l> for FieldInfo<'l> {
	type Deps = ConstantPool<'l>;
	fn read(stream: &mut Cursor<&'l [u8]>, pool: &Self::Deps) -> Result<Self> {
		Ok(Self {
			access_flags: read_flags_from_stream(stream)?,
			name: Utf8Index::read(stream, &())?,
			descriptor: Utf8Index::read(stream, &())?,
			attributes: read_u16_prefixed_seq_from_stream(stream, pool)?,
		})
	}
}

impl<'l> FromByteStream<'l> for MethodInfo<'l> {
	type Deps = ConstantPool<'l>;
	fn read(stream: &mut Cursor<&'l [u8]>, pool: &Self::Deps) -> Result<Self> {
		Ok(Self {
			access_flags: read_flags_from_stream(stream)?,
			name: Utf8Index::read(stream, &())?,
			descriptor: Utf8Index::read(stream, &())?,
			attributes: read_u16_prefixed_seq_from_stream(stream, pool)?,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	const MINIMAL: [u8; 24] = [
		0xCA, 0xFE, 0xBA, 0xBE, // magic
		0x00, 0x00, // minor 0
		0x00, 0x34, // major 52
		0x00, 0x01, // empty constant pool
		0x00, 0x20, // SUPER
		0x00, 0x00, // this
		0x00, 0x00, // super
		0x00, 0x00, // interfaces
		0x00, 0x00, // fields
		0x00, 0x00, // methods
		0x00, 0x00, // attributes
	];

	#[test]
	fn minimal_class() {
		let class = ClassFile::from_bytes(&MINIMAL).unwrap();
		assert_eq!(class.minor_version(), 0);
		assert_eq!(class.major_version(), 52);
		assert_eq!(class.constant_pool().len(), 0);
		assert_eq!(class.access_flags(), ClassFlags::SUPER);
		assert_eq!(class.this_class().raw(), 0);
		assert_eq!(class.super_class().raw(), 0);
		assert!(class.interfaces().is_empty());
		assert!(class.fields().is_empty());
		assert!(class.methods().is_empty());
		assert!(class.attributes().is_empty());
	}

	#[test]
	fn bad_magic() {
		let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x34];
		assert!(matches!(
			ClassFile::from_bytes(&bytes),
			Err(ClassError::InvalidHeader)
		));
	}

	#[test]
	fn version_window() {
		for (major, valid) in [(44u16, false), (45, true), (65, true), (66, false)] {
			let mut bytes = MINIMAL;
			bytes[6..8].copy_from_slice(&major.to_be_bytes());
			let decoded = ClassFile::from_bytes(&bytes);
			match valid {
				true => assert!(decoded.is_ok(), "major {major} should decode"),
				false => assert!(
					matches!(decoded, Err(ClassError::InvalidMajorVersion(m)) if m == major),
					"major {major} should be rejected",
				),
			}
		}
	}

	#[test]
	fn undefined_access_flag_bits() {
		// 0x0002 is not a sanctioned class-level bit
		let mut bytes = MINIMAL;
		bytes[10..12].copy_from_slice(&0x0022u16.to_be_bytes());
		assert!(matches!(
			ClassFile::from_bytes(&bytes),
			Err(ClassError::InvalidAccessFlags(0x0022))
		));
	}

	#[test]
	fn every_truncation_is_a_short_read() {
		for length in 0..MINIMAL.len() {
			assert!(
				matches!(
					ClassFile::from_bytes(&MINIMAL[..length]),
					Err(ClassError::UnexpectedEof)
				),
				"truncation to {length} bytes should fail",
			);
		}
	}

	#[test]
	fn trailing_bytes_are_ignored() {
		let mut bytes = MINIMAL.to_vec();
		bytes.extend_from_slice(&[1, 2, 3, 4]);
		assert!(ClassFile::from_bytes(&bytes).is_ok());
	}

	#[test]
	fn fields_and_methods_carry_their_flag_sets() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&MINIMAL[..8]);
		// pool: Utf8 "x", Utf8 "I", Utf8 "f", Utf8 "()V"
		bytes.extend_from_slice(&[0x00, 0x05]);
		bytes.extend_from_slice(&[1, 0x00, 0x01, b'x']);
		bytes.extend_from_slice(&[1, 0x00, 0x01, b'I']);
		bytes.extend_from_slice(&[1, 0x00, 0x01, b'f']);
		bytes.extend_from_slice(&[1, 0x00, 0x03, b'(', b')', b'V']);
		bytes.extend_from_slice(&[0x00, 0x20]); // SUPER
		bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // this, super
		bytes.extend_from_slice(&[0x00, 0x00]); // interfaces
		// one field: private static x I
		bytes.extend_from_slice(&[0x00, 0x01]);
		bytes.extend_from_slice(&[0x00, 0x0A, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00]);
		// one method: public final f ()V
		bytes.extend_from_slice(&[0x00, 0x01]);
		bytes.extend_from_slice(&[0x00, 0x11, 0x00, 0x03, 0x00, 0x04, 0x00, 0x00]);
		bytes.extend_from_slice(&[0x00, 0x00]); // attributes

		let class = ClassFile::from_bytes(&bytes).unwrap();
		assert_eq!(
			class.fields()[0].access_flags,
			FieldFlags::PRIVATE | FieldFlags::STATIC
		);
		assert_eq!(
			class.methods()[0].access_flags,
			MethodFlags::PUBLIC | MethodFlags::FINAL
		);

		// 0x0200 is an interface bit, illegal on a field
		let field_flags_at = 8 + 2 + 4 + 4 + 4 + 6 + 2 + 4 + 2 + 2;
		bytes[field_flags_at..field_flags_at + 2].copy_from_slice(&0x0200u16.to_be_bytes());
		assert!(matches!(
			ClassFile::from_bytes(&bytes),
			Err(ClassError::InvalidAccessFlags(0x0200))
		));
	}
}
