use caffeine::raw::class::ClassFile;
use caffeine::raw::FromByteStream;
use caffeine::schema::{display_class, display_constant_pool};
use std::io::Cursor;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "Test.class".into());
    let bytes = std::fs::read(path).unwrap();
    let mut cursor = Cursor::new(bytes.as_slice());
    let class = ClassFile::read(&mut cursor, &()).unwrap();

    let stdout = std::io::stdout();
    display_class(&stdout, &class).unwrap();
    println!(" Constant pool:");
    display_constant_pool(&stdout, class.constant_pool()).unwrap();
}
