use crate::raw::pool::ConstantKind;

pub type Result<T> = std::result::Result<T, ClassError>;

#[derive(Debug)]
pub enum ClassError {
	/// A read requested more bytes than remain in the buffer.
	UnexpectedEof,
	/// The file does not start with `0xCAFEBABE`.
	InvalidHeader,
	InvalidMajorVersion(u16),
	/// A constant-pool index is zero, out of range, or lands on the
	/// unusable slot following a `Long`/`Double` entry.
	InvalidCPIndex(u16),
	WrongCPType {
		expected: ConstantKind,
		found: ConstantKind,
	},
	InvalidAccessFlags(u16),

	UnknownConstantTag(u8),
	UnknownReferenceKind(u8),
	UnknownVerificationTypeInfoTag(u8),
	ReservedFrameType(u8),
	UnknownFrameType(u8),
	UnknownElementValueTag(u8),
	InvalidTargetType(u8),
	InvalidPathKind(u8),
	UnknownOpcode(u8),

	/// Reserved for callers that require an attribute the decoder is
	/// free to leave absent.
	MissingAttribute(&'static str),

	IoError(std::io::Error),
}

impl From<std::io::Error> for ClassError {
	fn from(value: std::io::Error) -> Self {
		Self::IoError(value)
	}
}
