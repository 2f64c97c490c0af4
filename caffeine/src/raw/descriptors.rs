//! One-pass validators for the type-coded descriptor grammars. Descriptors
//! are validated, never decoded; the bytes stay in the constant pool.

const MAX_ARRAY_DEPTH: usize = 255;

/// Whether `descriptor` is exactly one field descriptor:
/// a base type (`B C D F I J S Z`), `L<classname>;`, or up to 255 `[`
/// prefixes over either.
pub fn is_valid_field_descriptor(descriptor: &[u8]) -> bool {
	matches!(field_descriptor_end(descriptor), Some(end) if end == descriptor.len())
}

/// Whether `descriptor` is exactly one method descriptor:
/// `(` field descriptors `)` followed by a field descriptor or `V`.
pub fn is_valid_method_descriptor(descriptor: &[u8]) -> bool {
	if descriptor.first() != Some(&b'(') {
		return false;
	}

	let mut position = 1;
	loop {
		match descriptor.get(position) {
			None => return false,
			Some(b')') => {
				position += 1;
				break;
			},
			// parameters are scanned partially; trailing bytes belong to
			// the next parameter or the closing parenthesis
			Some(_) => match field_descriptor_end(&descriptor[position..]) {
				Some(consumed) => position += consumed,
				None => return false,
			},
		}
	}

	match &descriptor[position..] {
		[b'V'] => true,
		rest => is_valid_field_descriptor(rest),
	}
}

/// Scans one field descriptor at the start of `bytes` and returns how many
/// bytes it spans, or `None` if no valid descriptor starts there.
fn field_descriptor_end(bytes: &[u8]) -> Option<usize> {
	let mut depth = 0;
	while bytes.get(depth) == Some(&b'[') {
		depth += 1;
		if depth > MAX_ARRAY_DEPTH {
			return None;
		}
	}

	match bytes.get(depth)? {
		b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => Some(depth + 1),
		b'L' => {
			let name_start = depth + 1;
			let name_len = bytes[name_start..].iter().position(|b| *b == b';')?;
			let name = &bytes[name_start..name_start + name_len];
			match is_valid_internal_name(name) {
				true => Some(name_start + name_len + 1),
				false => None,
			}
		},
		_ => None,
	}
}

/// Internal-form class names: one or more bytes from `[A-Za-z/]`, with `/`
/// neither first nor last.
fn is_valid_internal_name(name: &[u8]) -> bool {
	if name.is_empty() || name.first() == Some(&b'/') || name.last() == Some(&b'/') {
		return false;
	}
	name.iter()
		.all(|b| b.is_ascii_alphabetic() || *b == b'/')
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn accepted_field_descriptors() {
		for descriptor in [
			"Ljava/lang/Object;",
			"[[[D",
			"[Ljava/lang/Object;",
			"I",
			"[I",
			"Z",
			"La;",
		] {
			assert!(
				is_valid_field_descriptor(descriptor.as_bytes()),
				"{descriptor} should be accepted"
			);
		}
	}

	#[test]
	fn rejected_field_descriptors() {
		for descriptor in [
			"Ljava/lang.String;",
			"L;",
			"[",
			"",
			"L/;",
			"L/a;",
			"La/;",
			"II",
			"Ia",
			"V",
			"Ljava/lang/Object",
			"X",
		] {
			assert!(
				!is_valid_field_descriptor(descriptor.as_bytes()),
				"{descriptor} should be rejected"
			);
		}
	}

	#[test]
	fn array_depth_cap() {
		let mut deep = vec![b'['; MAX_ARRAY_DEPTH];
		deep.push(b'I');
		assert!(is_valid_field_descriptor(&deep));

		let mut too_deep = vec![b'['; MAX_ARRAY_DEPTH + 1];
		too_deep.push(b'I');
		assert!(!is_valid_field_descriptor(&too_deep));
	}

	#[test]
	fn method_descriptors() {
		for descriptor in [
			"()V",
			"(I)V",
			"(IDLjava/lang/Thread;)Ljava/lang/Object;",
			"([[[D[I)[J",
			"()Ljava/lang/String;",
		] {
			assert!(
				is_valid_method_descriptor(descriptor.as_bytes()),
				"{descriptor} should be accepted"
			);
		}

		for descriptor in ["", "()", "I", "(V)V", "(I", "(I)", "()VV", "()v", "V()"] {
			assert!(
				!is_valid_method_descriptor(descriptor.as_bytes()),
				"{descriptor} should be rejected"
			);
		}
	}

	#[test]
	fn validation_is_pure() {
		let descriptor = b"[Ljava/lang/Object;";
		assert_eq!(
			is_valid_field_descriptor(descriptor),
			is_valid_field_descriptor(descriptor)
		);
	}
}
