use std::io::Cursor;

use crate::errors::{ClassError, Result};
use crate::raw::indices::pool_index::ClassIndex;
use crate::utilities::{read_seq_from_stream, read_u16_prefixed_seq_from_stream, FromByteStream};

/// The verifier's notion of one local/stack slot type.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VerificationType {
	Top,
	Integer,
	Float,
	Double,
	Long,
	Null,
	UninitializedThis,
	Object(ClassIndex),
	/// Offset of the `new` instruction that produced the value.
	Uninitialized(u16),
}

impl<'l> FromByteStream<'l> for VerificationType {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let tag = u8::read(stream, &())?;
		Ok(match tag {
			0 => VerificationType::Top,
			1 => VerificationType::Integer,
			2 => VerificationType::Float,
			3 => VerificationType::Double,
			4 => VerificationType::Long,
			5 => VerificationType::Null,
			6 => VerificationType::UninitializedThis,
			7 => VerificationType::Object(ClassIndex::read(stream, &())?),
			8 => VerificationType::Uninitialized(u16::read(stream, &())?),
			_ => return Err(ClassError::UnknownVerificationTypeInfoTag(tag)),
		})
	}
}

/// One stack-map frame, decoded from its tag-range family.
#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame {
	/// Tags 0-63; the offset delta is the tag itself.
	Same { offset_delta: u8 },
	/// Tags 64-127; the offset delta is the tag minus 64.
	SameLocals1StackItem {
		offset_delta: u8,
		stack: VerificationType,
	},
	/// Tag 247.
	SameLocals1StackItemExtended {
		offset_delta: u16,
		stack: VerificationType,
	},
	/// Tags 248-250; `absent` locals (251 minus the tag) are chopped.
	Chop { absent: u8, offset_delta: u16 },
	/// Tag 251.
	SameExtended { offset_delta: u16 },
	/// Tags 252-254; `tag - 251` locals are appended.
	Append {
		offset_delta: u16,
		locals: Vec<VerificationType>,
	},
	/// Tag 255.
	Full {
		offset_delta: u16,
		locals: Vec<VerificationType>,
		stack: Vec<VerificationType>,
	},
}

impl<'l> FromByteStream<'l> for StackMapFrame {
	type Deps = ();
	fn read(stream: &mut Cursor<&'l [u8]>, _: &Self::Deps) -> Result<Self> {
		let tag = u8::read(stream, &())?;
		Ok(match tag {
			0..=63 => StackMapFrame::Same { offset_delta: tag },
			64..=127 => StackMapFrame::SameLocals1StackItem {
				offset_delta: tag - 64,
				stack: VerificationType::read(stream, &())?,
			},
			128..=246 => return Err(ClassError::ReservedFrameType(tag)),
			247 => StackMapFrame::SameLocals1StackItemExtended {
				offset_delta: u16::read(stream, &())?,
				stack: VerificationType::read(stream, &())?,
			},
			248..=250 => StackMapFrame::Chop {
				absent: 251 - tag,
				offset_delta: u16::read(stream, &())?,
			},
			251 => StackMapFrame::SameExtended {
				offset_delta: u16::read(stream, &())?,
			},
			252..=254 => StackMapFrame::Append {
				offset_delta: u16::read(stream, &())?,
				locals: read_seq_from_stream(stream, (tag - 251) as usize, &())?,
			},
			255 => StackMapFrame::Full {
				offset_delta: u16::read(stream, &())?,
				locals: read_u16_prefixed_seq_from_stream(stream, &())?,
				stack: read_u16_prefixed_seq_from_stream(stream, &())?,
			},
		})
	}
}
