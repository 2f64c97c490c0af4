use std::io::Cursor;

use crate::errors::{ClassError, Result};
use crate::raw::indices::pool_index::Utf8Index;
use crate::utilities::{
	define_from_repr_enum, read_u16_prefixed_seq_from_stream, FromByteStream,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
	pub type_descriptor: Utf8Index,
	pub element_values: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
	pub name: Utf8Index,
	pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
	/// Tags `B C D F I J S Z s`. The pool variant the index must resolve
	/// to depends on the tag, so the index stays raw.
	Constant { tag: u8, index: u16 },
	EnumConstant {
		type_name: Utf8Index,
		const_name: Utf8Index,
	},
	ClassInfo { descriptor: Utf8Index },
	Annotation(Box<Annotation>),
	Array(Vec<ElementValue>),
}

/// Per-parameter annotation list of the parameter-annotation attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAnnotation {
	pub annotations: Vec<Annotation>,
}

impl<'l> FromByteStream<'l> for Annotation {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			type_descriptor: Utf8Index::read(stream, &())?,
			element_values: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for ElementValuePair {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			name: Utf8Index::read(stream, &())?,
			value: ElementValue::read(stream, &())?,
		})
	}
}

impl<'l> FromByteStream<'l> for ElementValue {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let tag = u8::read(stream, &())?;
		Ok(match tag {
			b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
				ElementValue::Constant {
					tag,
					index: u16::read(stream, &())?,
				}
			},
			b'e' => ElementValue::EnumConstant {
				type_name: Utf8Index::read(stream, &())?,
				const_name: Utf8Index::read(stream, &())?,
			},
			b'c' => ElementValue::ClassInfo {
				descriptor: Utf8Index::read(stream, &())?,
			},
			b'@' => ElementValue::Annotation(Box::new(Annotation::read(stream, &())?)),
			b'[' => ElementValue::Array(read_u16_prefixed_seq_from_stream(stream, &())?),
			_ => return Err(ClassError::UnknownElementValueTag(tag)),
		})
	}
}

impl<'l> FromByteStream<'l> for ParameterAnnotation {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			annotations: read_u16_prefixed_seq_from_stream(stream, &())?,
		})
	}
}

define_from_repr_enum! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub enum TargetType: u8 {
		ClassTypeParameter = 0x00,
		MethodTypeParameter = 0x01,
		ClassExtends = 0x10,
		ClassTypeParameterBound = 0x11,
		MethodTypeParameterBound = 0x12,
		Field = 0x13,
		MethodReturn = 0x14,
		MethodReceiver = 0x15,
		MethodFormalParameter = 0x16,
		Throws = 0x17,
		LocalVariable = 0x40,
		ResourceVariable = 0x41,
		ExceptionParameter = 0x42,
		Instanceof = 0x43,
		New = 0x44,
		ConstructorReference = 0x45,
		MethodReference = 0x46,
		Cast = 0x47,
		ConstructorInvocationTypeArgument = 0x48,
		MethodInvocationTypeArgument = 0x49,
		ConstructorReferenceTypeArgument = 0x4A,
		MethodReferenceTypeArgument = 0x4B,
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetInfo {
	TypeParameter { index: u16 },
	/// 65535 denotes the extends clause rather than an interface.
	SuperType { index: u16 },
	TypeParameterBound { parameter: u16, bound: u16 },
	Empty,
	FormalParameter { index: u16 },
	/// Index into the enclosing method's `Exceptions` attribute table.
	Throws { index: u16 },
	LocalVar(Vec<LocalVarTargetEntry>),
	Catch { exception_table_index: u16 },
	Offset(u16),
	TypeArgument { offset: u16, index: u16 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LocalVarTargetEntry {
	pub start_pc: u16,
	pub length: u16,
	pub index: u16,
}

impl<'l> FromByteStream<'l> for LocalVarTargetEntry {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		Ok(Self {
			start_pc: u16::read(stream, &())?,
			length: u16::read(stream, &())?,
			index: u16::read(stream, &())?,
		})
	}
}

define_from_repr_enum! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub enum TypePathKind: u8 {
		ArrayType = 0,
		NestedType = 1,
		Wildcard = 2,
		Parameterized = 3,
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TypePathSegment {
	pub kind: TypePathKind,
	/// Kept verbatim for every kind; meaningful only for `Parameterized`.
	pub argument_index: u8,
}

impl<'l> FromByteStream<'l> for TypePathSegment {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let kind = u8::read(stream, &())?;
		let Some(kind) = TypePathKind::from_repr(kind) else {
			return Err(ClassError::InvalidPathKind(kind));
		};
		Ok(Self {
			kind,
			argument_index: u8::read(stream, &())?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
	pub target_type: TargetType,
	pub target_info: TargetInfo,
	pub type_path: Vec<TypePathSegment>,
	pub annotation: Annotation,
}

impl<'l> FromByteStream<'l> for TypeAnnotation {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let target_type = u8::read(stream, &())?;
		let Some(target_type) = TargetType::from_repr(target_type) else {
			return Err(ClassError::InvalidTargetType(target_type));
		};

		let target_info = match target_type {
			TargetType::ClassTypeParameter | TargetType::MethodTypeParameter => {
				TargetInfo::TypeParameter {
					index: u16::read(stream, &())?,
				}
			},
			TargetType::ClassExtends => TargetInfo::SuperType {
				index: u16::read(stream, &())?,
			},
			TargetType::ClassTypeParameterBound | TargetType::MethodTypeParameterBound => {
				TargetInfo::TypeParameterBound {
					parameter: u16::read(stream, &())?,
					bound: u16::read(stream, &())?,
				}
			},
			TargetType::Field | TargetType::MethodReturn | TargetType::MethodReceiver => {
				TargetInfo::Empty
			},
			TargetType::MethodFormalParameter => TargetInfo::FormalParameter {
				index: u16::read(stream, &())?,
			},
			TargetType::Throws => TargetInfo::Throws {
				index: u16::read(stream, &())?,
			},
			TargetType::LocalVariable | TargetType::ResourceVariable => {
				TargetInfo::LocalVar(read_u16_prefixed_seq_from_stream(stream, &())?)
			},
			TargetType::ExceptionParameter => TargetInfo::Catch {
				exception_table_index: u16::read(stream, &())?,
			},
			TargetType::Instanceof
			| TargetType::New
			| TargetType::ConstructorReference
			| TargetType::MethodReference => TargetInfo::Offset(u16::read(stream, &())?),
			TargetType::Cast
			| TargetType::ConstructorInvocationTypeArgument
			| TargetType::MethodInvocationTypeArgument
			| TargetType::ConstructorReferenceTypeArgument
			| TargetType::MethodReferenceTypeArgument => TargetInfo::TypeArgument {
				offset: u16::read(stream, &())?,
				index: u16::read(stream, &())?,
			},
		};

		Ok(Self {
			target_type,
			target_info,
			type_path: read_u16_prefixed_seq_from_stream(stream, &())?,
			annotation: Annotation::read(stream, &())?,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn element_value_tags() {
		let mut stream = Cursor::new([b'I', 0x00, 0x07].as_slice());
		assert_eq!(
			ElementValue::read(&mut stream, &()).unwrap(),
			ElementValue::Constant { tag: b'I', index: 7 }
		);

		let mut stream = Cursor::new([b'e', 0x00, 0x01, 0x00, 0x02].as_slice());
		assert_eq!(
			ElementValue::read(&mut stream, &()).unwrap(),
			ElementValue::EnumConstant {
				type_name: Utf8Index(1),
				const_name: Utf8Index(2),
			}
		);

		let mut stream = Cursor::new([b'x', 0x00, 0x01].as_slice());
		assert!(matches!(
			ElementValue::read(&mut stream, &()),
			Err(ClassError::UnknownElementValueTag(b'x'))
		));
	}

	#[test]
	fn nested_element_values() {
		// [ of two 'Z' constants
		let bytes = [
			b'[', 0x00, 0x02,
			b'Z', 0x00, 0x03,
			b'Z', 0x00, 0x04,
		];
		let mut stream = Cursor::new(bytes.as_slice());
		let ElementValue::Array(values) = ElementValue::read(&mut stream, &()).unwrap() else {
			panic!("expected an array value");
		};
		assert_eq!(values.len(), 2);

		// @ wrapping an annotation with zero pairs
		let bytes = [b'@', 0x00, 0x09, 0x00, 0x00];
		let mut stream = Cursor::new(bytes.as_slice());
		let ElementValue::Annotation(annotation) =
			ElementValue::read(&mut stream, &()).unwrap()
		else {
			panic!("expected a nested annotation");
		};
		assert_eq!(annotation.type_descriptor, Utf8Index(9));
		assert!(annotation.element_values.is_empty());
	}

	#[test]
	fn annotation_with_pairs() {
		let bytes = [
			0x00, 0x05, // type descriptor
			0x00, 0x01, // one pair
			0x00, 0x06, b's', 0x00, 0x07, // name -> string constant
		];
		let mut stream = Cursor::new(bytes.as_slice());
		let annotation = Annotation::read(&mut stream, &()).unwrap();
		assert_eq!(annotation.type_descriptor, Utf8Index(5));
		assert_eq!(
			annotation.element_values,
			vec![ElementValuePair {
				name: Utf8Index(6),
				value: ElementValue::Constant { tag: b's', index: 7 },
			}]
		);
	}

	#[test]
	fn type_annotation_local_var_target() {
		let bytes = [
			0x40, // LocalVariable
			0x00, 0x01, // one table entry
			0x00, 0x02, 0x00, 0x08, 0x00, 0x01, // start_pc, length, index
			0x00, 0x01, // one path segment
			0x03, 0x01, // Parameterized, argument 1
			0x00, 0x05, 0x00, 0x00, // annotation: type 5, zero pairs
		];
		let mut stream = Cursor::new(bytes.as_slice());
		let annotation = TypeAnnotation::read(&mut stream, &()).unwrap();
		assert_eq!(annotation.target_type, TargetType::LocalVariable);
		assert_eq!(
			annotation.target_info,
			TargetInfo::LocalVar(vec![LocalVarTargetEntry {
				start_pc: 2,
				length: 8,
				index: 1,
			}])
		);
		assert_eq!(
			annotation.type_path,
			vec![TypePathSegment {
				kind: TypePathKind::Parameterized,
				argument_index: 1,
			}]
		);
	}

	#[test]
	fn type_annotation_empty_and_supertype_targets() {
		let bytes = [0x13, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00];
		let mut stream = Cursor::new(bytes.as_slice());
		let annotation = TypeAnnotation::read(&mut stream, &()).unwrap();
		assert_eq!(annotation.target_info, TargetInfo::Empty);

		let bytes = [0x10, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00];
		let mut stream = Cursor::new(bytes.as_slice());
		let annotation = TypeAnnotation::read(&mut stream, &()).unwrap();
		assert_eq!(annotation.target_info, TargetInfo::SuperType { index: 65535 });
	}

	#[test]
	fn unsanctioned_target_and_path_kind() {
		let mut stream = Cursor::new([0x02].as_slice());
		assert!(matches!(
			TypeAnnotation::read(&mut stream, &()),
			Err(ClassError::InvalidTargetType(0x02))
		));

		let mut stream = Cursor::new([4, 0].as_slice());
		assert!(matches!(
			TypePathSegment::read(&mut stream, &()),
			Err(ClassError::InvalidPathKind(4))
		));
	}
}
