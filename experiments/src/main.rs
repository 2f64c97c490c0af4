use std::io::Cursor;
use std::time::SystemTime;

use memory_stats::memory_stats;
use tracing::info;

use caffeine::raw::class::ClassFile;
use caffeine::raw::il::OpcodeIterator;
use caffeine::raw::FromByteStream;
use caffeine::schema::Attributes;

fn main() {
	tracing_subscriber::fmt().init();

	let path = std::env::args()
		.nth(1)
		.expect("usage: experiments <file.class>");

	let mapping = caffeine::map_file(&path).unwrap();
	info!("mapped {} bytes from {path}", mapping.len());

	let start = SystemTime::now();
	let mut cursor = Cursor::new(mapping.as_ref());
	let class = ClassFile::read(&mut cursor, &()).unwrap();

	println! {
		"Decode time: {:?}, RAM: {}MB",
		start.elapsed().unwrap(),
		memory_stats().unwrap().physical_mem as f32 / 1000000.0,
	}

	println!(
		"{} (major {}, minor {})",
		String::from_utf8_lossy(class.this_class_name().unwrap()),
		class.major_version(),
		class.minor_version(),
	);
	println!(
		"extends {}, {} constants, {} fields, {} methods",
		String::from_utf8_lossy(class.super_class_name().unwrap()),
		class.constant_pool().len(),
		class.fields().len(),
		class.methods().len(),
	);

	for method in class.methods() {
		let name = class.utf8(method.name).unwrap();
		match method.attribute::<caffeine::raw::attributes::Code>() {
			None => println!("  {} (no code)", String::from_utf8_lossy(name)),
			Some(code) => {
				let instructions = OpcodeIterator::new(code.code)
					.take_while(|decoded| decoded.is_ok())
					.count();
				println! {
					"  {}: {} bytes, {} instructions",
					String::from_utf8_lossy(name),
					code.code.len(),
					instructions,
				}
			},
		}
	}
}
