use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use csv::Writer;
use image::{GrayImage, Luma};
use loomgen::{GenerateResult, Params, Pin};

#[derive(Debug, Clone, Parser)]
#[clap(author, version, about = "Turn a photograph into a thread-art pin sequence", long_about = None)]
struct Opt {
    /// Path to the target image
    #[clap(parse(from_os_str))]
    path: PathBuf,

    /// Number of pins on the loom
    #[clap(short, long, default_value = "300")]
    pins: u32,

    /// Number of threads (lines) to draw
    #[clap(short = 'l', long, default_value = "3000")]
    lines: u32,

    /// Darkness removed per line-pixel, in [1,255]
    #[clap(short = 'w', long, default_value = "20")]
    weight: u8,

    /// Minimum ring distance between consecutive pins
    #[clap(short = 'd', long, default_value = "20")]
    min_distance: u32,

    /// Canonicalised image side, in pixels
    #[clap(short, long, default_value = "500")]
    size: u32,

    /// Physical hoop diameter, used only to scale the reported thread length
    #[clap(long, default_value = "500.0")]
    hoop_diameter: f64,

    /// Pin index to start the walk from
    #[clap(long, default_value = "0")]
    start_pin: u32,

    /// Path to write the rendered thread pattern (PNG)
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Path to write the pin sequence as CSV
    #[clap(long, parse(from_os_str))]
    csv: Option<PathBuf>,

    /// When writing CSV, emit pixel coordinates of each thread's endpoints instead of pin indices
    #[clap(long, requires = "csv")]
    write_coords: bool,
}

fn main() {
    env_logger::init();
    let opt = Opt::parse();

    let params = Params {
        n_pins: opt.pins,
        n_lines: opt.lines,
        line_weight: opt.weight,
        min_distance: opt.min_distance,
        img_size: opt.size,
        hoop_diameter: opt.hoop_diameter,
        start_pin: opt.start_pin,
    };

    let image = image::open(&opt.path).expect("couldn't load target image");

    let outcome = loomgen::validate(&params, Some((image.width(), image.height())));
    if !outcome.is_valid {
        for error in &outcome.errors {
            eprintln!("error: {error}");
        }
        std::process::exit(1);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&cancel)) {
        log::warn!("failed to install Ctrl-C handler: {e}");
    }

    let result = loomgen::generate(
        &image,
        params,
        |progress, _sequence, _pins| {
            eprint!(
                "\r[{:>6}/{:<6}] {:>5.1}%  pin {:<4}  thread {:>8.1}",
                progress.lines_drawn,
                progress.total_lines,
                progress.percent_complete,
                progress.current_pin,
                progress.thread_length,
            );
            let _ = std::io::stderr().flush();
        },
        &cancel,
    );
    eprintln!();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if result.line_sequence.len() < (params.n_lines as usize + 1) {
        eprintln!(
            "warning: solver stopped early at {} of {} lines (candidates exhausted)",
            result.line_sequence.len().saturating_sub(1),
            params.n_lines
        );
    }

    println!(
        "drew {} lines, {:.1} units of thread, {:.0}ms",
        result.line_sequence.len().saturating_sub(1),
        result.total_thread_length,
        result.processing_time_ms
    );

    if let Some(output) = &opt.output {
        write_img(output, &result);
    }
    if let Some(csv_path) = &opt.csv {
        write_csv(csv_path, &result, opt.write_coords);
    }
}

fn write_img(path: &PathBuf, result: &GenerateResult) {
    let size = result.parameters.img_size;
    let mut canvas = GrayImage::from_pixel(size, size, Luma([255]));
    for pair in result.line_sequence.windows(2) {
        draw_line(
            &mut canvas,
            result.pin_coordinates[pair[0]],
            result.pin_coordinates[pair[1]],
        );
    }
    canvas.save(path).expect("failed to save threaded image");
}

/// Same "linspace with floor" discretisation the solver's line cache uses,
/// so the rendered preview matches the pin sequence pixel-for-pixel.
fn draw_line(canvas: &mut GrayImage, a: Pin, b: Pin) {
    let d = a.distance(b).floor() as usize;
    if d == 0 {
        return;
    }
    let xs = ndarray::Array1::linspace(f64::from(a.x), f64::from(b.x), d.max(1));
    let ys = ndarray::Array1::linspace(f64::from(a.y), f64::from(b.y), d.max(1));
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let (x, y) = (x.floor() as u32, y.floor() as u32);
        if x < canvas.width() && y < canvas.height() {
            canvas.put_pixel(x, y, Luma([0]));
        }
    }
}

fn write_csv(path: &PathBuf, result: &GenerateResult, write_coords: bool) {
    let mut writer = Writer::from_path(path).expect("failed to open CSV for writing");

    if write_coords {
        writer
            .write_record(["x1", "y1", "x2", "y2"])
            .expect("failed to write header");
        for pair in result.line_sequence.windows(2) {
            let a = result.pin_coordinates[pair[0]];
            let b = result.pin_coordinates[pair[1]];
            writer
                .write_record(&[a.x.to_string(), a.y.to_string(), b.x.to_string(), b.y.to_string()])
                .expect("failed to write thread");
        }
    } else {
        writer
            .write_record(["pin"])
            .expect("failed to write header");
        for &pin in &result.line_sequence {
            writer
                .write_record(&[pin.to_string()])
                .expect("failed to write thread");
        }
    }
}
