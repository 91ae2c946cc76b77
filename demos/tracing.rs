use std::{thread, time::Duration};

use progline::{Config, ScreenWriter};
use tracing::warn;

fn main() {
    let screen = ScreenWriter::stderr();
    // Log lines go through the same screen, erasing the bar line they land on.
    let subscriber = tracing_subscriber::fmt()
        .with_writer(screen.clone())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("global subscriber");

    let cfg = Config::default()
        .with_screen(screen)
        .with_update_interval(Duration::from_millis(50));
    let bar = cfg.with_prefix("work ").new_bar();
    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..5 {
                warn!(round = i, "Something happened!");
                thread::sleep(Duration::from_millis(1100));
            }
        });
        for i in 0..=600 {
            bar.progress(f64::from(i) / 6.0);
            thread::sleep(Duration::from_millis(10));
        }
    });
    bar.end();
}
