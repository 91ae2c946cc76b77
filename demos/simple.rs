use std::{io::Write, thread, time::Duration};

use clap::Parser;
use progline::{Bar, Config};

/// Single progress bar with other output printed concurrently.
#[derive(Parser)]
struct Args {
    /// Use colors in the progress bar
    #[arg(long)]
    color: bool,
    /// Delay between progress bar updates, in milliseconds
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
    /// Print extra stuff every this many milliseconds
    #[arg(long, default_value_t = 1000)]
    every_ms: u64,
    /// Disable ANSI escape codes (colors and cursor movement)
    #[arg(long)]
    no_ansi: bool,
    /// Demo in place cursor moves instead of the writer
    #[arg(long)]
    moveup: bool,
}

fn print_stuff(bar: Bar, every: Duration) {
    let mut out = bar.writer();
    for i in 1.. {
        let _ = writeln!(out, "[{i}] Just an extra demo print every {every:?}");
        bar.update_prefix(format!("{i:>3} "));
        thread::sleep(every);
    }
}

fn main() {
    let args = Args::parse();
    let cfg = Config::default()
        .with_screen(progline::ScreenWriter::stdout())
        .with_colors(args.color)
        .with_no_ansi(args.no_ansi);
    let bar = cfg.new_bar();
    let mut out = bar.writer();
    let _ = writeln!(out, "Single progress bar example");
    if args.moveup {
        let _ = writeln!(out, "This line for space to demo move_cursor_up");
    } else {
        let bar = bar.clone();
        let every = Duration::from_millis(args.every_ms);
        thread::spawn(move || print_stuff(bar, every));
    }
    // Exact number of sub-cell steps, to show every smooth step.
    let n = progline::DEFAULT_WIDTH * 8;
    for i in 0..=n {
        bar.progress(100.0 * i as f64 / n as f64);
        if args.moveup && i % 63 == 0 {
            bar.move_cursor_up(1);
            println!("Just an extra demo print for {i}");
        }
        thread::sleep(Duration::from_millis(args.delay_ms));
    }
    bar.end();
}
