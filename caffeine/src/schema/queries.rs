//! Lookup helpers over a decoded class file: name resolution through the
//! constant pool, member lookup by unqualified name, and typed retrieval of
//! the first attribute of a given payload kind.

use crate::errors::Result;
use crate::raw::attributes::*;
use crate::raw::class::{ClassFile, FieldInfo, MethodInfo};
use crate::raw::indices::pool_index::Utf8Index;

/// Selects one attribute payload type out of the [`Attribute`] union.
pub trait AttributeValue<'l>: Sized {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self>;
}

macro_rules! impl_attribute_value {
	($($variant: ident),* $(,)?) => {$(
		impl<'l> AttributeValue<'l> for $variant {
			fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
				match attribute {
					Attribute::$variant(value) => Some(value),
					_ => None,
				}
			}
		}
	)*};
}

impl_attribute_value! {
	ConstantValue,
	StackMapTable,
	Exceptions,
	InnerClasses,
	EnclosingMethod,
	Synthetic,
	Signature,
	SourceFile,
	LineNumberTable,
	LocalVariableTable,
	LocalVariableTypeTable,
	Deprecated,
	RuntimeVisibleAnnotations,
	RuntimeInvisibleAnnotations,
	RuntimeVisibleParameterAnnotations,
	RuntimeInvisibleParameterAnnotations,
	RuntimeVisibleTypeAnnotations,
	RuntimeInvisibleTypeAnnotations,
	AnnotationDefault,
	BootstrapMethods,
	MethodParameters,
	ModulePackages,
	ModuleMainClass,
	NestHost,
	NestMembers,
	PermittedSubclasses,
}

impl<'l> AttributeValue<'l> for Code<'l> {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
		match attribute {
			Attribute::Code(value) => Some(value),
			_ => None,
		}
	}
}

impl<'l> AttributeValue<'l> for SourceDebugExtension<'l> {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
		match attribute {
			Attribute::SourceDebugExtension(value) => Some(value),
			_ => None,
		}
	}
}

impl<'l> AttributeValue<'l> for Record<'l> {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
		match attribute {
			Attribute::Record(value) => Some(value),
			_ => None,
		}
	}
}

impl<'l> AttributeValue<'l> for Unknown<'l> {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
		match attribute {
			Attribute::Unknown(value) => Some(value),
			_ => None,
		}
	}
}

impl<'l> AttributeValue<'l> for Module {
	fn select<'a>(attribute: &'a Attribute<'l>) -> Option<&'a Self> {
		match attribute {
			Attribute::Module(value) => Some(value.as_ref()),
			_ => None,
		}
	}
}

/// Anything carrying an attribute table.
pub trait Attributes<'l> {
	fn attributes(&self) -> &[Attribute<'l>];

	/// First attribute whose payload is of type `T`, if any.
	fn attribute<'s, T: AttributeValue<'l>>(&'s self) -> Option<&'s T>
	where
		'l: 's,
	{
		for attribute in self.attributes() {
			if let Some(value) = T::select(attribute) {
				return Some(value);
			}
		}
		None
	}
}

impl<'l> Attributes<'l> for ClassFile<'l> {
	fn attributes(&self) -> &[Attribute<'l>] {
		ClassFile::attributes(self)
	}
}

impl<'l> Attributes<'l> for FieldInfo<'l> {
	fn attributes(&self) -> &[Attribute<'l>] {
		&self.attributes
	}
}

impl<'l> Attributes<'l> for MethodInfo<'l> {
	fn attributes(&self) -> &[Attribute<'l>] {
		&self.attributes
	}
}

impl<'l> Attributes<'l> for Code<'l> {
	fn attributes(&self) -> &[Attribute<'l>] {
		&self.attributes
	}
}

impl<'l> Attributes<'l> for RecordComponent<'l> {
	fn attributes(&self) -> &[Attribute<'l>] {
		&self.attributes
	}
}

impl<'l> ClassFile<'l> {
	/// Internal-form name of the decoded class.
	pub fn this_class_name(&self) -> Result<&'l [u8]> {
		let class = self.constant_pool().try_get_class(self.this_class())?;
		self.constant_pool().try_get_utf8(class.name)
	}

	/// Internal-form name of the direct superclass. A zero pointer means
	/// the class is `java/lang/Object`, which is what it extends.
	pub fn super_class_name(&self) -> Result<&'l [u8]> {
		if self.super_class().is_absent() {
			return Ok(b"java/lang/Object");
		}
		let class = self.constant_pool().try_get_class(self.super_class())?;
		self.constant_pool().try_get_utf8(class.name)
	}

	pub fn utf8(&self, index: Utf8Index) -> Result<&'l [u8]> {
		self.constant_pool().try_get_utf8(index)
	}

	/// First field with the given unqualified name.
	pub fn field(&self, name: &[u8]) -> Option<&FieldInfo<'l>> {
		self.fields().iter().find(|field| {
			self.constant_pool()
				.try_get_utf8(field.name)
				.is_ok_and(|n| n == name)
		})
	}

	/// First method with the given unqualified name. Overloads share a
	/// name; disambiguating by descriptor is up to the caller.
	pub fn method(&self, name: &[u8]) -> Option<&MethodInfo<'l>> {
		self.methods().iter().find(|method| {
			self.constant_pool()
				.try_get_utf8(method.name)
				.is_ok_and(|n| n == name)
		})
	}
}
