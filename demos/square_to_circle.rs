use morphway::output::{write_frames, DirectoryWriter, SvgEncoder};
use morphway::*;
use rgb::RGB8;
use std::env::args;

fn main() {
	// usage: square_to_circle [output directory]
	let dir = args().nth(1).unwrap_or_else(|| "frames".into());

	let red = Stroker::new(RGB8::new(255, 0, 0), 2.0);
	let blue = Stroker::new(RGB8::new(0, 0, 255), 6.0);

	let square = Shape::polygon(&[
		Couple::new(0.0, 0.0),
		Couple::new(100.0, 0.0),
		Couple::new(100.0, 100.0),
		Couple::new(0.0, 100.0),
	], red).unwrap();

	let circle = Shape::circle(C_ZERO, 30.0, blue);

	let config = MorphConfig {
		frame_count: 50,
		..MorphConfig::default()
	};

	let morph = Morph::new(&square, &circle, config).unwrap();
	let encoder = SvgEncoder { canvas_size: config.canvas_size };
	let mut writer = DirectoryWriter::new(&dir).skip_existing(true);

	let written = write_frames(morph.frames(), "square_to_circle", &encoder, &mut writer).unwrap();
	println!("{} frames in {}", written, dir);
}
