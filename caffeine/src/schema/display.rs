//! Compact human-readable rendering of a decoded class file, in the spirit
//! of `javap` without flags.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::raw::attributes::Attribute;
use crate::raw::class::{ClassFile, ClassFlags, FieldFlags, MethodFlags};
use crate::raw::pool::ConstantPool;

pub fn display_class<W: Write>(mut w: W, class: &ClassFile) -> io::Result<()> {
	writeln!(
		w,
		".class file version {}.{}",
		class.major_version(),
		class.minor_version()
	)?;
	writeln!(w)?;

	let modifiers = class_modifiers(class.access_flags());
	writeln!(
		w,
		"{}class {} extends {}{} {{",
		modifiers,
		name_or_placeholder(class.this_class_name().ok()),
		name_or_placeholder(class.super_class_name().ok()),
		interfaces_clause(class),
	)?;

	writeln!(w, " Attributes:")?;
	for attribute in class.attributes() {
		writeln!(w, "  {}", attribute_name(attribute))?;
	}
	writeln!(w)?;

	writeln!(w, " Fields:")?;
	for field in class.fields() {
		writeln!(
			w,
			"  {}{} {}",
			field_modifiers(field.access_flags),
			name_or_placeholder(class.utf8(field.descriptor).ok()),
			name_or_placeholder(class.utf8(field.name).ok()),
		)?;
	}
	writeln!(w)?;

	writeln!(w, " Methods:")?;
	for method in class.methods() {
		writeln!(
			w,
			"  {}{} {}",
			method_modifiers(method.access_flags),
			name_or_placeholder(class.utf8(method.descriptor).ok()),
			name_or_placeholder(class.utf8(method.name).ok()),
		)?;
	}

	writeln!(w, "}}")
}

fn name_or_placeholder(name: Option<&[u8]>) -> Cow<'_, str> {
	match name {
		Some(bytes) => String::from_utf8_lossy(bytes),
		None => Cow::Borrowed("<unresolved>"),
	}
}

fn interfaces_clause(class: &ClassFile) -> String {
	if class.interfaces().is_empty() {
		return String::new();
	}
	let names: Vec<_> = class
		.interfaces()
		.iter()
		.map(|index| {
			let name = class
				.constant_pool()
				.try_get_class(*index)
				.and_then(|entry| class.constant_pool().try_get_utf8(entry.name));
			name_or_placeholder(name.ok()).into_owned()
		})
		.collect();
	format!(" implements {}", names.join(", "))
}

fn class_modifiers(flags: ClassFlags) -> String {
	let mut parts = Vec::new();
	for (flag, keyword) in [
		(ClassFlags::PUBLIC, "public"),
		(ClassFlags::FINAL, "final"),
		(ClassFlags::INTERFACE, "interface"),
		(ClassFlags::ABSTRACT, "abstract"),
		(ClassFlags::ANNOTATION, "@interface"),
		(ClassFlags::ENUM, "enum"),
	] {
		if flags.contains(flag) {
			parts.push(keyword);
		}
	}
	joined_modifiers(parts)
}

fn field_modifiers(flags: FieldFlags) -> String {
	let mut parts = Vec::new();
	for (flag, keyword) in [
		(FieldFlags::PUBLIC, "public"),
		(FieldFlags::PRIVATE, "private"),
		(FieldFlags::PROTECTED, "protected"),
		(FieldFlags::STATIC, "static"),
		(FieldFlags::FINAL, "final"),
		(FieldFlags::VOLATILE, "volatile"),
		(FieldFlags::TRANSIENT, "transient"),
	] {
		if flags.contains(flag) {
			parts.push(keyword);
		}
	}
	joined_modifiers(parts)
}

fn method_modifiers(flags: MethodFlags) -> String {
	let mut parts = Vec::new();
	for (flag, keyword) in [
		(MethodFlags::PUBLIC, "public"),
		(MethodFlags::PRIVATE, "private"),
		(MethodFlags::PROTECTED, "protected"),
		(MethodFlags::STATIC, "static"),
		(MethodFlags::FINAL, "final"),
		(MethodFlags::SYNCHRONIZED, "synchronized"),
		(MethodFlags::NATIVE, "native"),
		(MethodFlags::ABSTRACT, "abstract"),
	] {
		if flags.contains(flag) {
			parts.push(keyword);
		}
	}
	joined_modifiers(parts)
}

fn joined_modifiers(parts: Vec<&str>) -> String {
	match parts.is_empty() {
		true => String::new(),
		false => format!("{} ", parts.join(" ")),
	}
}

fn attribute_name<'a>(attribute: &'a Attribute) -> Cow<'a, str> {
	let name = match attribute {
		Attribute::ConstantValue(_) => "ConstantValue",
		Attribute::Code(_) => "Code",
		Attribute::StackMapTable(_) => "StackMapTable",
		Attribute::Exceptions(_) => "Exceptions",
		Attribute::InnerClasses(_) => "InnerClasses",
		Attribute::EnclosingMethod(_) => "EnclosingMethod",
		Attribute::Synthetic(_) => "Synthetic",
		Attribute::Signature(_) => "Signature",
		Attribute::SourceFile(_) => "SourceFile",
		Attribute::SourceDebugExtension(_) => "SourceDebugExtension",
		Attribute::LineNumberTable(_) => "LineNumberTable",
		Attribute::LocalVariableTable(_) => "LocalVariableTable",
		Attribute::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
		Attribute::Deprecated(_) => "Deprecated",
		Attribute::RuntimeVisibleAnnotations(_) => "RuntimeVisibleAnnotations",
		Attribute::RuntimeInvisibleAnnotations(_) => "RuntimeInvisibleAnnotations",
		Attribute::RuntimeVisibleParameterAnnotations(_) => {
			"RuntimeVisibleParameterAnnotations"
		},
		Attribute::RuntimeInvisibleParameterAnnotations(_) => {
			"RuntimeInvisibleParameterAnnotations"
		},
		Attribute::RuntimeVisibleTypeAnnotations(_) => "RuntimeVisibleTypeAnnotations",
		Attribute::RuntimeInvisibleTypeAnnotations(_) => "RuntimeInvisibleTypeAnnotations",
		Attribute::AnnotationDefault(_) => "AnnotationDefault",
		Attribute::BootstrapMethods(_) => "BootstrapMethods",
		Attribute::MethodParameters(_) => "MethodParameters",
		Attribute::Module(_) => "Module",
		Attribute::ModulePackages(_) => "ModulePackages",
		Attribute::ModuleMainClass(_) => "ModuleMainClass",
		Attribute::NestHost(_) => "NestHost",
		Attribute::NestMembers(_) => "NestMembers",
		Attribute::Record(_) => "Record",
		Attribute::PermittedSubclasses(_) => "PermittedSubclasses",
		Attribute::Unknown(unknown) => return String::from_utf8_lossy(unknown.name),
	};
	Cow::Borrowed(name)
}

/// Leaves the pool in decode order with raw 1-based slot numbers, one line
/// per usable entry.
pub fn display_constant_pool<W: Write>(mut w: W, pool: &ConstantPool) -> io::Result<()> {
	for (slot, entry) in pool.iter().enumerate() {
		writeln!(w, "  #{} = {:?}", slot + 1, entry)?;
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn renders_an_empty_class() {
		let bytes = [
			0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34, 0x00, 0x01, 0x00, 0x21, 0x00,
			0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
		];
		let class = ClassFile::from_bytes(&bytes).unwrap();

		let mut rendered = Vec::new();
		display_class(&mut rendered, &class).unwrap();
		assert_eq!(
			String::from_utf8(rendered).unwrap(),
			"\
.class file version 52.0

public class <unresolved> extends java/lang/Object {
 Attributes:

 Fields:

 Methods:
}
",
		);
	}

	#[test]
	fn modifier_keywords() {
		assert_eq!(
			class_modifiers(ClassFlags::PUBLIC | ClassFlags::FINAL),
			"public final "
		);
		assert_eq!(class_modifiers(ClassFlags::SUPER), "");
		assert_eq!(
			method_modifiers(MethodFlags::PRIVATE | MethodFlags::SYNCHRONIZED),
			"private synchronized "
		);
	}
}
