use std::{thread, time::Duration};

use clap::Parser;
use progline::{Bar, Config, ScreenWriter};
use rand::Rng;

/// Several bars updating at different speeds.
#[derive(Parser)]
struct Args {
    /// Disable colors in the progress bars
    #[arg(long)]
    no_color: bool,
    /// Extra lines between each progress bar
    #[arg(long, default_value_t = 1)]
    extra: usize,
}

fn update_bar(bar: &Bar, delay: Duration) {
    for i in 0..=300 {
        bar.progress(f64::from(i) / 3.0);
        thread::sleep(delay);
    }
}

fn main() {
    let args = Args::parse();
    println!("Multi progress bar example{}", progline::raster::CLEAR_AFTER);
    // Draws immediately, this is a demo sleeping between updates.
    let cfg = Config::default()
        .with_screen(ScreenWriter::stdout())
        .with_extra_lines(args.extra)
        .with_colors(!args.no_color)
        .with_update_interval(Duration::ZERO);
    let mut mbar = cfg.new_multi_bar_prefixes(&["b1", "longest prefix", "short", "b4"]);

    thread::scope(|s| {
        let mut rng = rand::thread_rng();
        for (i, bar) in mbar.bars().iter().cloned().enumerate() {
            let delay = Duration::from_millis(rng.gen_range(5..45));
            if args.extra > 0 {
                bar.write_above(&format!("\t\t\tBar {} delay is {delay:?}", i + 1));
            }
            s.spawn(move || update_bar(&bar, delay));
        }
        // A bar showing up later.
        thread::sleep(Duration::from_secs(3));
        let late = cfg.clone().with_prefix("A wild bar appears").new_bar();
        mbar.add(late.clone());
        mbar.prefixes_align();
        if args.extra > 0 {
            late.write_above("\t\t\tExtra bar added after 3 seconds");
        }
        update_bar(&late, Duration::from_millis(15));
    });
    mbar.end();
}
