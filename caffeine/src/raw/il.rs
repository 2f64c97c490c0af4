use crate::errors::{ClassError, Result};

/// Operand footprint of an opcode: a fixed byte count, a count that must be
/// resolved against the code stream, or a reserved code that a conforming
/// class file never contains.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OperandWidth {
	Fixed(u8),
	Variable,
	Reserved,
}

macro_rules! operand_width {
	(dynamic) => {
		OperandWidth::Variable
	};
	(reserved) => {
		OperandWidth::Reserved
	};
	($count: literal) => {
		OperandWidth::Fixed($count)
	};
}

macro_rules! define_opcodes {
	(
		enum $name: ident {
			$(
				$(#[$attr: meta])*
				$ident: ident [$operands: tt] = $discriminant: literal
			),* $(,)?
		}
	) => {
		#[repr(u8)]
		#[allow(non_camel_case_types)]
		#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
		pub enum $name {
			$(
				$(#[$attr])*
				$ident = $discriminant
			),*
		}

		impl $name {
			pub fn from_repr(discriminant: u8) -> Option<Self> {
				match discriminant {
					$($discriminant => Some($name::$ident),)*
					_ => None,
				}
			}

			/// Operand bytes following the opcode byte.
			pub const fn operands(&self) -> OperandWidth {
				match self {
					$($name::$ident => operand_width!($operands),)*
				}
			}
		}
	};
}

define_opcodes! {
	enum Opcode {
		/// Do nothing.
		nop [0] = 0x00,
		/// Push null.
		aconst_null [0] = 0x01,
		/// Push int constant -1.
		iconst_m1 [0] = 0x02,
		/// Push int constant 0.
		iconst_0 [0] = 0x03,
		/// Push int constant 1.
		iconst_1 [0] = 0x04,
		/// Push int constant 2.
		iconst_2 [0] = 0x05,
		/// Push int constant 3.
		iconst_3 [0] = 0x06,
		/// Push int constant 4.
		iconst_4 [0] = 0x07,
		/// Push int constant 5.
		iconst_5 [0] = 0x08,
		/// Push long constant 0.
		lconst_0 [0] = 0x09,
		/// Push long constant 1.
		lconst_1 [0] = 0x0A,
		/// Push float constant 0.0.
		fconst_0 [0] = 0x0B,
		/// Push float constant 1.0.
		fconst_1 [0] = 0x0C,
		/// Push float constant 2.0.
		fconst_2 [0] = 0x0D,
		/// Push double constant 0.0.
		dconst_0 [0] = 0x0E,
		/// Push double constant 1.0.
		dconst_1 [0] = 0x0F,
		/// Push a sign-extended byte.
		bipush [1] = 0x10,
		/// Push a sign-extended short.
		sipush [2] = 0x11,
		/// Push an item from the constant pool, one-byte index.
		ldc [1] = 0x12,
		/// Push an item from the constant pool, two-byte index.
		ldc_w [2] = 0x13,
		/// Push a long or double from the constant pool.
		ldc2_w [2] = 0x14,
		/// Load int from local variable.
		iload [1] = 0x15,
		/// Load long from local variable.
		lload [1] = 0x16,
		/// Load float from local variable.
		fload [1] = 0x17,
		/// Load double from local variable.
		dload [1] = 0x18,
		/// Load reference from local variable.
		aload [1] = 0x19,
		/// Load int from local variable 0.
		iload_0 [0] = 0x1A,
		/// Load int from local variable 1.
		iload_1 [0] = 0x1B,
		/// Load int from local variable 2.
		iload_2 [0] = 0x1C,
		/// Load int from local variable 3.
		iload_3 [0] = 0x1D,
		/// Load long from local variable 0.
		lload_0 [0] = 0x1E,
		/// Load long from local variable 1.
		lload_1 [0] = 0x1F,
		/// Load long from local variable 2.
		lload_2 [0] = 0x20,
		/// Load long from local variable 3.
		lload_3 [0] = 0x21,
		/// Load float from local variable 0.
		fload_0 [0] = 0x22,
		/// Load float from local variable 1.
		fload_1 [0] = 0x23,
		/// Load float from local variable 2.
		fload_2 [0] = 0x24,
		/// Load float from local variable 3.
		fload_3 [0] = 0x25,
		/// Load double from local variable 0.
		dload_0 [0] = 0x26,
		/// Load double from local variable 1.
		dload_1 [0] = 0x27,
		/// Load double from local variable 2.
		dload_2 [0] = 0x28,
		/// Load double from local variable 3.
		dload_3 [0] = 0x29,
		/// Load reference from local variable 0.
		aload_0 [0] = 0x2A,
		/// Load reference from local variable 1.
		aload_1 [0] = 0x2B,
		/// Load reference from local variable 2.
		aload_2 [0] = 0x2C,
		/// Load reference from local variable 3.
		aload_3 [0] = 0x2D,
		/// Load int from array.
		iaload [0] = 0x2E,
		/// Load long from array.
		laload [0] = 0x2F,
		/// Load float from array.
		faload [0] = 0x30,
		/// Load double from array.
		daload [0] = 0x31,
		/// Load reference from array.
		aaload [0] = 0x32,
		/// Load byte or boolean from array.
		baload [0] = 0x33,
		/// Load char from array.
		caload [0] = 0x34,
		/// Load short from array.
		saload [0] = 0x35,
		/// Store int into local variable.
		istore [1] = 0x36,
		/// Store long into local variable.
		lstore [1] = 0x37,
		/// Store float into local variable.
		fstore [1] = 0x38,
		/// Store double into local variable.
		dstore [1] = 0x39,
		/// Store reference into local variable.
		astore [1] = 0x3A,
		/// Store int into local variable 0.
		istore_0 [0] = 0x3B,
		/// Store int into local variable 1.
		istore_1 [0] = 0x3C,
		/// Store int into local variable 2.
		istore_2 [0] = 0x3D,
		/// Store int into local variable 3.
		istore_3 [0] = 0x3E,
		/// Store long into local variable 0.
		lstore_0 [0] = 0x3F,
		/// Store long into local variable 1.
		lstore_1 [0] = 0x40,
		/// Store long into local variable 2.
		lstore_2 [0] = 0x41,
		/// Store long into local variable 3.
		lstore_3 [0] = 0x42,
		/// Store float into local variable 0.
		fstore_0 [0] = 0x43,
		/// Store float into local variable 1.
		fstore_1 [0] = 0x44,
		/// Store float into local variable 2.
		fstore_2 [0] = 0x45,
		/// Store float into local variable 3.
		fstore_3 [0] = 0x46,
		/// Store double into local variable 0.
		dstore_0 [0] = 0x47,
		/// Store double into local variable 1.
		dstore_1 [0] = 0x48,
		/// Store double into local variable 2.
		dstore_2 [0] = 0x49,
		/// Store double into local variable 3.
		dstore_3 [0] = 0x4A,
		/// Store reference into local variable 0.
		astore_0 [0] = 0x4B,
		/// Store reference into local variable 1.
		astore_1 [0] = 0x4C,
		/// Store reference into local variable 2.
		astore_2 [0] = 0x4D,
		/// Store reference into local variable 3.
		astore_3 [0] = 0x4E,
		/// Store into int array.
		iastore [0] = 0x4F,
		/// Store into long array.
		lastore [0] = 0x50,
		/// Store into float array.
		fastore [0] = 0x51,
		/// Store into double array.
		dastore [0] = 0x52,
		/// Store into reference array.
		aastore [0] = 0x53,
		/// Store into byte or boolean array.
		bastore [0] = 0x54,
		/// Store into char array.
		castore [0] = 0x55,
		/// Store into short array.
		sastore [0] = 0x56,
		/// Pop the top stack value.
		pop [0] = 0x57,
		/// Pop the top one or two stack values.
		pop2 [0] = 0x58,
		/// Duplicate the top stack value.
		dup [0] = 0x59,
		/// Duplicate the top stack value and insert it one value down.
		dup_x1 [0] = 0x5A,
		/// Duplicate the top stack value and insert it two values down.
		dup_x2 [0] = 0x5B,
		/// Duplicate the top one or two stack values.
		dup2 [0] = 0x5C,
		/// Duplicate the top one or two stack values and insert below.
		dup2_x1 [0] = 0x5D,
		/// Duplicate the top one or two stack values and insert further below.
		dup2_x2 [0] = 0x5E,
		/// Swap the top two stack values.
		swap [0] = 0x5F,
		/// Add int.
		iadd [0] = 0x60,
		/// Add long.
		ladd [0] = 0x61,
		/// Add float.
		fadd [0] = 0x62,
		/// Add double.
		dadd [0] = 0x63,
		/// Subtract int.
		isub [0] = 0x64,
		/// Subtract long.
		lsub [0] = 0x65,
		/// Subtract float.
		fsub [0] = 0x66,
		/// Subtract double.
		dsub [0] = 0x67,
		/// Multiply int.
		imul [0] = 0x68,
		/// Multiply long.
		lmul [0] = 0x69,
		/// Multiply float.
		fmul [0] = 0x6A,
		/// Multiply double.
		dmul [0] = 0x6B,
		/// Divide int.
		idiv [0] = 0x6C,
		/// Divide long.
		ldiv [0] = 0x6D,
		/// Divide float.
		fdiv [0] = 0x6E,
		/// Divide double.
		ddiv [0] = 0x6F,
		/// Remainder int.
		irem [0] = 0x70,
		/// Remainder long.
		lrem [0] = 0x71,
		/// Remainder float.
		frem [0] = 0x72,
		/// Remainder double.
		drem [0] = 0x73,
		/// Negate int.
		ineg [0] = 0x74,
		/// Negate long.
		lneg [0] = 0x75,
		/// Negate float.
		fneg [0] = 0x76,
		/// Negate double.
		dneg [0] = 0x77,
		/// Shift int left.
		ishl [0] = 0x78,
		/// Shift long left.
		lshl [0] = 0x79,
		/// Arithmetic shift int right.
		ishr [0] = 0x7A,
		/// Arithmetic shift long right.
		lshr [0] = 0x7B,
		/// Logical shift int right.
		iushr [0] = 0x7C,
		/// Logical shift long right.
		lushr [0] = 0x7D,
		/// Boolean AND int.
		iand [0] = 0x7E,
		/// Boolean AND long.
		land [0] = 0x7F,
		/// Boolean OR int.
		ior [0] = 0x80,
		/// Boolean OR long.
		lor [0] = 0x81,
		/// Boolean XOR int.
		ixor [0] = 0x82,
		/// Boolean XOR long.
		lxor [0] = 0x83,
		/// Increment local variable by a constant.
		iinc [2] = 0x84,
		/// Convert int to long.
		i2l [0] = 0x85,
		/// Convert int to float.
		i2f [0] = 0x86,
		/// Convert int to double.
		i2d [0] = 0x87,
		/// Convert long to int.
		l2i [0] = 0x88,
		/// Convert long to float.
		l2f [0] = 0x89,
		/// Convert long to double.
		l2d [0] = 0x8A,
		/// Convert float to int.
		f2i [0] = 0x8B,
		/// Convert float to long.
		f2l [0] = 0x8C,
		/// Convert float to double.
		f2d [0] = 0x8D,
		/// Convert double to int.
		d2i [0] = 0x8E,
		/// Convert double to long.
		d2l [0] = 0x8F,
		/// Convert double to float.
		d2f [0] = 0x90,
		/// Convert int to byte.
		i2b [0] = 0x91,
		/// Convert int to char.
		i2c [0] = 0x92,
		/// Convert int to short.
		i2s [0] = 0x93,
		/// Compare long.
		lcmp [0] = 0x94,
		/// Compare float, -1 on NaN.
		fcmpl [0] = 0x95,
		/// Compare float, 1 on NaN.
		fcmpg [0] = 0x96,
		/// Compare double, -1 on NaN.
		dcmpl [0] = 0x97,
		/// Compare double, 1 on NaN.
		dcmpg [0] = 0x98,
		/// Branch if int is zero.
		ifeq [2] = 0x99,
		/// Branch if int is non-zero.
		ifne [2] = 0x9A,
		/// Branch if int is less than zero.
		iflt [2] = 0x9B,
		/// Branch if int is greater than or equal to zero.
		ifge [2] = 0x9C,
		/// Branch if int is greater than zero.
		ifgt [2] = 0x9D,
		/// Branch if int is less than or equal to zero.
		ifle [2] = 0x9E,
		/// Branch if ints are equal.
		if_icmpeq [2] = 0x9F,
		/// Branch if ints are unequal.
		if_icmpne [2] = 0xA0,
		/// Branch if int is less than the other.
		if_icmplt [2] = 0xA1,
		/// Branch if int is greater than or equal to the other.
		if_icmpge [2] = 0xA2,
		/// Branch if int is greater than the other.
		if_icmpgt [2] = 0xA3,
		/// Branch if int is less than or equal to the other.
		if_icmple [2] = 0xA4,
		/// Branch if references are equal.
		if_acmpeq [2] = 0xA5,
		/// Branch if references are unequal.
		if_acmpne [2] = 0xA6,
		/// Branch always.
		goto [2] = 0xA7,
		/// Jump subroutine.
		jsr [2] = 0xA8,
		/// Return from subroutine.
		ret [1] = 0xA9,
		/// Access jump table by index and jump.
		tableswitch [dynamic] = 0xAA,
		/// Access jump table by key match and jump.
		lookupswitch [dynamic] = 0xAB,
		/// Return int from method.
		ireturn [0] = 0xAC,
		/// Return long from method.
		lreturn [0] = 0xAD,
		/// Return float from method.
		freturn [0] = 0xAE,
		/// Return double from method.
		dreturn [0] = 0xAF,
		/// Return reference from method.
		areturn [0] = 0xB0,
		/// Return void from method.
		r#return [0] = 0xB1,
		/// Get static field from class.
		getstatic [2] = 0xB2,
		/// Set static field in class.
		putstatic [2] = 0xB3,
		/// Fetch field from object.
		getfield [2] = 0xB4,
		/// Set field in object.
		putfield [2] = 0xB5,
		/// Invoke instance method with dynamic dispatch.
		invokevirtual [2] = 0xB6,
		/// Invoke instance method with static dispatch.
		invokespecial [2] = 0xB7,
		/// Invoke a class (static) method.
		invokestatic [2] = 0xB8,
		/// Invoke interface method.
		invokeinterface [4] = 0xB9,
		/// Invoke a dynamically-computed call site.
		invokedynamic [4] = 0xBA,
		/// Create new object.
		new [2] = 0xBB,
		/// Create new array of primitive type.
		newarray [1] = 0xBC,
		/// Create new array of reference type.
		anewarray [2] = 0xBD,
		/// Get length of array.
		arraylength [0] = 0xBE,
		/// Throw exception or error.
		athrow [0] = 0xBF,
		/// Check whether object is of given type.
		checkcast [2] = 0xC0,
		/// Determine if object is of given type.
		instanceof [2] = 0xC1,
		/// Enter monitor for object.
		monitorenter [0] = 0xC2,
		/// Exit monitor for object.
		monitorexit [0] = 0xC3,
		/// Extend local variable index by additional bytes.
		wide [dynamic] = 0xC4,
		/// Create new multidimensional array.
		multianewarray [3] = 0xC5,
		/// Branch if reference is null.
		ifnull [2] = 0xC6,
		/// Branch if reference is non-null.
		ifnonnull [2] = 0xC7,
		/// Branch always, wide offset.
		goto_w [4] = 0xC8,
		/// Jump subroutine, wide offset.
		jsr_w [4] = 0xC9,
		/// Reserved for debuggers; must not appear in a class file.
		breakpoint [reserved] = 0xCA,
		/// Reserved for implementation-specific use; must not appear in a class file.
		impdep1 [reserved] = 0xFE,
		/// Reserved for implementation-specific use; must not appear in a class file.
		impdep2 [reserved] = 0xFF,
	}
}

/// Resolves the full footprint (opcode byte included) of the instruction at
/// `offset`. The offset is relative to the method's code origin; the
/// switch-instruction padding depends on it.
///
/// Panics on the reserved opcodes, which never occur in a conforming class
/// file.
pub fn instruction_size(code: &[u8], offset: usize) -> Result<usize> {
	let Some(&byte) = code.get(offset) else {
		return Err(ClassError::UnexpectedEof);
	};
	let Some(opcode) = Opcode::from_repr(byte) else {
		return Err(ClassError::UnknownOpcode(byte));
	};
	match opcode.operands() {
		OperandWidth::Fixed(count) => Ok(1 + count as usize),
		OperandWidth::Reserved => panic!("reserved opcode {opcode:?} at offset {offset}"),
		OperandWidth::Variable => variable_instruction_size(code, offset, opcode),
	}
}

fn variable_instruction_size(code: &[u8], offset: usize, opcode: Opcode) -> Result<usize> {
	// 0-3 padding bytes align the 32-bit operands to the code origin
	let padding = 3 - offset % 4;
	let operands = offset + 1 + padding;
	match opcode {
		Opcode::tableswitch => {
			let low = read_code_i32(code, operands + 4)?;
			let high = read_code_i32(code, operands + 8)?;
			let entries = usize::try_from(i64::from(high) - i64::from(low) + 1)
				.map_err(|_| ClassError::UnexpectedEof)?;
			entries
				.checked_mul(4)
				.and_then(|table| table.checked_add(1 + padding + 12))
				.ok_or(ClassError::UnexpectedEof)
		},
		Opcode::lookupswitch => {
			let npairs = usize::try_from(read_code_i32(code, operands + 4)?)
				.map_err(|_| ClassError::UnexpectedEof)?;
			npairs
				.checked_mul(8)
				.and_then(|pairs| pairs.checked_add(1 + padding + 8))
				.ok_or(ClassError::UnexpectedEof)
		},
		Opcode::wide => match code.get(offset + 1) {
			Some(&modified) if modified == Opcode::iinc as u8 => Ok(6),
			Some(_) => Ok(4),
			None => Err(ClassError::UnexpectedEof),
		},
		_ => unreachable!(),
	}
}

fn read_code_i32(code: &[u8], offset: usize) -> Result<i32> {
	let end = offset.checked_add(4).ok_or(ClassError::UnexpectedEof)?;
	match code.get(offset..end) {
		Some(bytes) => Ok(i32::from_be_bytes(bytes.try_into().unwrap())),
		None => Err(ClassError::UnexpectedEof),
	}
}

/// Steps over a raw code array instruction by instruction, yielding each
/// opcode with its code-relative offset. Stops after the first error.
#[derive(Debug, Clone)]
pub struct OpcodeIterator<'l> {
	code: &'l [u8],
	offset: usize,
}

impl<'l> OpcodeIterator<'l> {
	pub fn new(code: &'l [u8]) -> Self {
		Self { code, offset: 0 }
	}
}

impl Iterator for OpcodeIterator<'_> {
	type Item = Result<(usize, Opcode)>;
	fn next(&mut self) -> Option<Self::Item> {
		if self.offset >= self.code.len() {
			return None;
		}
		let offset = self.offset;
		let byte = self.code[offset];
		let Some(opcode) = Opcode::from_repr(byte) else {
			self.offset = self.code.len();
			return Some(Err(ClassError::UnknownOpcode(byte)));
		};
		match instruction_size(self.code, offset) {
			Ok(size) => {
				self.offset += size;
				Some(Ok((offset, opcode)))
			},
			Err(err) => {
				self.offset = self.code.len();
				Some(Err(err))
			},
		}
	}
}
