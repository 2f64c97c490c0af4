use std::io::Cursor;

use bitflags::bitflags;
use derivative::Derivative;

use crate::errors::{ClassError, Result};
use crate::raw::annotations::{Annotation, ElementValue, ParameterAnnotation, TypeAnnotation};
use crate::raw::indices::pool_index::{
	ClassIndex, MethodHandleIndex, ModuleIndex, NameAndTypeIndex, PackageIndex, Utf8Index,
};
use crate::raw::pool::ConstantPool;
use crate::raw::stackmap::StackMapFrame;
use crate::utilities::{
	ensure_remaining, read_bytes_slice_from_stream, read_flags_from_stream, read_seq_from_stream,
	read_u16_from_stream_unchecked, read_u16_prefixed_seq_from_stream, FromByteStream,
};

bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct InnerClassFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const INTERFACE = 0x0200;
		const ABSTRACT = 0x0400;
		const SYNTHETIC = 0x1000;
		const ANNOTATION = 0x2000;
		const ENUM = 0x4000;
	}

	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct ModuleFlags: u16 {
		const OPEN = 0x0020;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}

	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct RequiresFlags: u16 {
		const TRANSITIVE = 0x0020;
		const STATIC_PHASE = 0x0040;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}

	/// Shared by `exports` and `opens` entries, whose sanctioned bits agree.
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct ExportsFlags: u16 {
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}

	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct ParameterFlags: u16 {
		const FINAL = 0x0010;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}
}

/// One decoded attribute. Unrecognized names degrade to [`Attribute::Unknown`]
/// with the payload kept raw; they never fail the decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'l> {
	ConstantValue(ConstantValue),
	Code(Code<'l>),
	StackMapTable(StackMapTable),
	Exceptions(Exceptions),
	InnerClasses(InnerClasses),
	EnclosingMethod(EnclosingMethod),
	Synthetic(Synthetic),
	Signature(Signature),
	SourceFile(SourceFile),
	SourceDebugExtension(SourceDebugExtension<'l>),
	LineNumberTable(LineNumberTable),
	LocalVariableTable(LocalVariableTable),
	LocalVariableTypeTable(LocalVariableTypeTable),
	Deprecated(Deprecated),
	RuntimeVisibleAnnotations(RuntimeVisibleAnnotations),
	RuntimeInvisibleAnnotations(RuntimeInvisibleAnnotations),
	RuntimeVisibleParameterAnnotations(RuntimeVisibleParameterAnnotations),
	RuntimeInvisibleParameterAnnotations(RuntimeInvisibleParameterAnnotations),
	RuntimeVisibleTypeAnnotations(RuntimeVisibleTypeAnnotations),
	RuntimeInvisibleTypeAnnotations(RuntimeInvisibleTypeAnnotations),
	AnnotationDefault(AnnotationDefault),
	BootstrapMethods(BootstrapMethods),
	MethodParameters(MethodParameters),
	Module(Box<Module>),
	ModulePackages(ModulePackages),
	ModuleMainClass(ModuleMainClass),
	NestHost(NestHost),
	NestMembers(NestMembers),
	Record(Record<'l>),
	PermittedSubclasses(PermittedSubclasses),
	Unknown(Unknown<'l>),
}

/// The pool variant behind the index depends on the enclosing field's
/// descriptor, so the index stays raw; the correspondence is not checked.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConstantValue {
	pub value: u16,
}

#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct Code<'l> {
	pub max_stack: u16,
	pub max_locals: u16,
	/// Raw bytecode, borrowed from the class file; see [`crate::raw::il`].
	#[derivative(Debug(format_with = "crate::utilities::fmt_bytes_len"))]
	pub code: &'l [u8],
	pub exception_table: Vec<ExceptionHandler>,
	pub attributes: Vec<Attribute<'l>>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExceptionHandler {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	/// Zero means the handler catches everything.
	pub catch_type: ClassIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackMapTable {
	pub frames: Vec<StackMapFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exceptions {
	pub exceptions: Vec<ClassIndex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClasses {
	pub classes: Vec<InnerClass>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InnerClass {
	pub inner_class: ClassIndex,
	/// Zero when the inner class is not a member of its outer class.
	pub outer_class: ClassIndex,
	/// Zero when the inner class is anonymous.
	pub inner_name: Utf8Index,
	pub access_flags: InnerClassFlags,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EnclosingMethod {
	pub class: ClassIndex,
	/// Zero when the class is not immediately enclosed by a method or
	/// constructor.
	pub method: NameAndTypeIndex,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Synthetic;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Deprecated;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Signature {
	pub signature: Utf8Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SourceFile {
	pub source_file: Utf8Index,
}

#[derive(Derivative, Copy, Clone, PartialEq)]
#[derivative(Debug)]
pub struct SourceDebugExtension<'l> {
	/// Modified UTF-8, preserved verbatim.
	#[derivative(Debug(format_with = "crate::utilities::fmt_bytes_len"))]
	pub debug_extension: &'l [u8],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineNumberTable {
	pub entries: Vec<LineNumberEntry>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineNumberEntry {
	pub start_pc: u16,
	pub line_number: u16,
}

/// Entry shape shared by `LocalVariableTable` and `LocalVariableTypeTable`;
/// in the latter the descriptor slot holds a signature instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LocalVariableEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name: Utf8Index,
	pub descriptor: Utf8Index,
	pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableTable {
	pub entries: Vec<LocalVariableEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableTypeTable {
	pub entries: Vec<LocalVariableEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeVisibleAnnotations {
	pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInvisibleAnnotations {
	pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeVisibleParameterAnnotations {
	pub parameters: Vec<ParameterAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInvisibleParameterAnnotations {
	pub parameters: Vec<ParameterAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeVisibleTypeAnnotations {
	pub annotations: Vec<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInvisibleTypeAnnotations {
	pub annotations: Vec<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDefault {
	pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethods {
	pub methods: Vec<BootstrapMethod>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
	pub method: MethodHandleIndex,
	/// Raw pool indices; the sanctioned variants depend on the bootstrap
	/// method being invoked.
	pub arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameters {
	pub parameters: Vec<MethodParameter>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MethodParameter {
	/// Zero for a formal parameter with no name.
	pub name: Utf8Index,
	pub access_flags: ParameterFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
	pub name: ModuleIndex,
	pub flags: ModuleFlags,
	/// Zero when no version is recorded.
	pub version: Utf8Index,
	pub requires: Vec<ModuleRequires>,
	pub exports: Vec<PackageGrant>,
	pub opens: Vec<PackageGrant>,
	pub uses: Vec<ClassIndex>,
	pub provides: Vec<ModuleProvides>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModuleRequires {
	pub module: ModuleIndex,
	pub flags: RequiresFlags,
	/// Zero when no version is recorded.
	pub version: Utf8Index,
}

/// Shape shared by `exports` and `opens` entries: a package made available
/// to everyone (`to` empty) or to the named modules only.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageGrant {
	pub package: PackageIndex,
	pub flags: ExportsFlags,
	pub to: Vec<ModuleIndex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProvides {
	pub service: ClassIndex,
	pub with: Vec<ClassIndex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModulePackages {
	pub packages: Vec<PackageIndex>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModuleMainClass {
	pub main_class: ClassIndex,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NestHost {
	pub host: ClassIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestMembers {
	pub classes: Vec<ClassIndex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record<'l> {
	pub components: Vec<RecordComponent<'l>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent<'l> {
	pub name: Utf8Index,
	pub descriptor: Utf8Index,
	pub attributes: Vec<Attribute<'l>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermittedSubclasses {
	pub classes: Vec<ClassIndex>,
}

#[derive(Derivative, Copy, Clone, PartialEq)]
#[derivative(Debug)]
pub struct Unknown<'l> {
	pub name: &'l [u8],
	#[derivative(Debug(format_with = "crate::utilities::fmt_bytes_len"))]
	pub info: &'l [u8],
}

impl<'l> FromByteStream<'l> for Attribute<'l> {
	type Deps = ConstantPool<'l>;
	fn read(stream: &mut Cursor<&'l [u8]>, pool: &Self::Deps) -> Result<Self> {
		let name = Utf8Index::read(stream, &())?;
		let length = u32::read(stream, &())? as usize;
		ensure_remaining(stream, length)?;
		let name = pool.try_get_utf8(name)?;

		Ok(match name {
			b"ConstantValue" => Attribute::ConstantValue(ConstantValue {
				value: read_pool_index_unchecked(stream, length)?,
			}),
			b"Code" => Attribute::Code(Code::read(stream, pool)?),
			b"StackMapTable" => Attribute::StackMapTable(StackMapTable {
				frames: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"Exceptions" => Attribute::Exceptions(Exceptions {
				exceptions: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"InnerClasses" => Attribute::InnerClasses(InnerClasses {
				classes: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"EnclosingMethod" => Attribute::EnclosingMethod(EnclosingMethod {
				class: ClassIndex(read_pool_index_unchecked(stream, length)?),
				method: NameAndTypeIndex::read(stream, &())?,
			}),
			b"Synthetic" => Attribute::Synthetic(Synthetic),
			b"Signature" => Attribute::Signature(Signature {
				signature: Utf8Index(read_pool_index_unchecked(stream, length)?),
			}),
			b"SourceFile" => Attribute::SourceFile(SourceFile {
				source_file: Utf8Index(read_pool_index_unchecked(stream, length)?),
			}),
			b"SourceDebugExtension" => Attribute::SourceDebugExtension(SourceDebugExtension {
				debug_extension: read_bytes_slice_from_stream(stream, length)?,
			}),
			b"LineNumberTable" => Attribute::LineNumberTable(LineNumberTable {
				entries: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"LocalVariableTable" => Attribute::LocalVariableTable(LocalVariableTable {
				entries: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"LocalVariableTypeTable" => {
				Attribute::LocalVariableTypeTable(LocalVariableTypeTable {
					entries: read_u16_prefixed_seq_from_stream(stream, &())?,
				})
			},
			b"Deprecated" => Attribute::Deprecated(Deprecated),
			b"RuntimeVisibleAnnotations" => {
				Attribute::RuntimeVisibleAnnotations(RuntimeVisibleAnnotations {
					annotations: read_u16_prefixed_seq_from_stream(stream, &())?,
				})
			},
			b"RuntimeInvisibleAnnotations" => {
				Attribute::RuntimeInvisibleAnnotations(RuntimeInvisibleAnnotations {
					annotations: read_u16_prefixed_seq_from_stream(stream, &())?,
				})
			},
			b"RuntimeVisibleParameterAnnotations" => {
				Attribute::RuntimeVisibleParameterAnnotations(
					RuntimeVisibleParameterAnnotations {
						parameters: read_parameter_annotations(stream)?,
					},
				)
			},
			b"RuntimeInvisibleParameterAnnotations" => {
				Attribute::RuntimeInvisibleParameterAnnotations(
					RuntimeInvisibleParameterAnnotations {
						parameters: read_parameter_annotations(stream)?,
					},
				)
			},
			b"RuntimeVisibleTypeAnnotations" => {
				Attribute::RuntimeVisibleTypeAnnotations(RuntimeVisibleTypeAnnotations {
					annotations: read_u16_prefixed_seq_from_stream(stream, &())?,
				})
			},
			b"RuntimeInvisibleTypeAnnotations" => {
				Attribute::RuntimeInvisibleTypeAnnotations(RuntimeInvisibleTypeAnnotations {
					annotations: read_u16_prefixed_seq_from_stream(stream, &())?,
				})
			},
			b"AnnotationDefault" => Attribute::AnnotationDefault(AnnotationDefault {
				value: ElementValue::read(stream, &())?,
			}),
			b"BootstrapMethods" => Attribute::BootstrapMethods(BootstrapMethods {
				methods: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"MethodParameters" => {
				let count = u8::read(stream, &())? as usize;
				Attribute::MethodParameters(MethodParameters {
					parameters: read_seq_from_stream(stream, count, &())?,
				})
			},
			b"Module" => Attribute::Module(Box::new(Module::read(stream, &())?)),
			b"ModulePackages" => Attribute::ModulePackages(ModulePackages {
				packages: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"ModuleMainClass" => Attribute::ModuleMainClass(ModuleMainClass {
				main_class: ClassIndex(read_pool_index_unchecked(stream, length)?),
			}),
			b"NestHost" => Attribute::NestHost(NestHost {
				host: ClassIndex(read_pool_index_unchecked(stream, length)?),
			}),
			b"NestMembers" => Attribute::NestMembers(NestMembers {
				classes: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			b"Record" => Attribute::Record(Record {
				components: read_u16_prefixed_seq_from_stream(stream, pool)?,
			}),
			b"PermittedSubclasses" => Attribute::PermittedSubclasses(PermittedSubclasses {
				classes: read_u16_prefixed_seq_from_stream(stream, &())?,
			}),
			_ => Attribute::Unknown(Unknown {
				name,
				info: read_bytes_slice_from_stream(stream, length)?,
			}),
		})
	}
}

/// Fast path for the attributes whose payload starts with a single pool
/// index. The enclosing declared length has been checked against the
/// buffer; it only remains to check the index fits inside it.
#[inline]
fn read_pool_index_unchecked(stream: &mut Cursor<&[u8]>, length: usize) -> Result<u16> {
	match length >= 2 {
		true => Ok(unsafe { read_u16_from_stream_unchecked(stream) }),
		false => Err(ClassError::UnexpectedEof),
	}
}

fn read_parameter_annotations<'l>(
	stream: &mut Cursor<&'l [u8]>,
) -> Result<Vec<ParameterAnnotation>> {
	let count = u8::read(stream, &())? as usize;
	read_seq_from_stream(stream, count, &())
}

impl<'l> FromByteStream<'l> for Code<'l> {
	type Deps = ConstantPool<'l>;
	fn read(stream: &mut Cursor<&'l [u8]>, pool: &Self::Deps) -> Result<Self> {
		let max_stack = u16::read(stream, &())?;
		let max_locals = u16::read(stream, &())?;
		let code_length = u32::read(stream, &())? as usize;
		Ok(Self {
			max_stack,
			max_locals,
			code: read_bytes_slice_from_stream(stream, code_length)?,
			exception_table: read_u16_prefixed_seq_from_stream(stream, &())?,
			attributes: read_u16_prefixed_seq_from_stream(stream, pool)?,
		})
	}
}

impl<'l> FromByteStream<'l> for ExceptionHandler {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			start_pc: u16::read(stream, &())?,
			end_pc: u16::read(stream, &())?,
			handler_pc: u16::read(stream, &())?,
			catch_type: ClassIndex::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for InnerClass {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			inner_class: ClassIndex::read(stream, &())?,
			outer_class: ClassIndex::read(stream, &())?,
			inner_name: Utf8Index::read(stream, &())?,
			access_flags: read_flags_from_stream(stream)?,
		})
	}
}

impl<'l> FromByteStream<'l> for LineNumberEntry {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			start_pc: u16::read(stream, &())?,
			line_number: u16::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for LocalVariableEntry {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			start_pc: u16::read(stream, &())?,
			length: u16::read(stream, &())?,
			name: Utf8Index::read(stream, &())?,
			descriptor: Utf8Index::read(stream, &())?,
			index: u16::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for BootstrapMethod {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			method: MethodHandleIndex::read(stream, &())?,
			arguments: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for MethodParameter {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			name: Utf8Index::read(stream, &())?,
			access_flags: read_flags_from_stream(stream)?,
		})
	}
}

impl<'l> FromByteStream<'l> for Module {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			name: ModuleIndex::read(stream, &())?,
			flags: read_flags_from_stream(stream)?,
			version: Utf8Index::read(stream, &())?,
			requires: read_u16_prefixed_seq_from_stream(stream, &())?,
			exports: read_u16_prefixed_seq_from_stream(stream, &())?,
			opens: read_u16_prefixed_seq_from_stream(stream, &())?,
			uses: read_u16_prefixed_seq_from_stream(stream, &())?,
			provides: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for ModuleRequires {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			module: ModuleIndex::read(stream, &())?,
			flags: read_flags_from_stream(stream)?,
			version: Utf8Index::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for PackageGrant {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			package: PackageIndex::read(stream, &())?,
			flags: read_flags_from_stream(stream)?,
			to: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for ModuleProvides {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			service: ClassIndex::read(stream, &())?,
			with: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for RecordComponent<'l> {
	type Deps = ConstantPool<'l>;
	fn read(stream: &mut Cursor<&'l [u8]>, pool: &Self::Deps) -> Result<Self> {
		Ok(Self {
			name: Utf8Index::read(stream, &())?,
			descriptor: Utf8Index::read(stream, &())?,
			attributes: read_u16_prefixed_seq_from_stream(stream, pool)?,
		})
	}
}
