use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
};

use clap::Parser;
use progline::{AutoProgressReader, AutoProgressWriter, Closable, Config};

/// Copies a file (or stdin) to stdout, with a bar for each side of the copy.
#[derive(Parser)]
struct Args {
    /// File to copy, stdin when absent
    path: Option<PathBuf>,
    /// Disable ANSI escape codes (colors and cursor movement)
    #[arg(long)]
    no_ansi: bool,
    /// Size of the read buffer, in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    buf_size: usize,
}

fn main() -> progline::Result<()> {
    let args = Args::parse();
    let cfg = Config::default().with_no_ansi(args.no_ansi);

    let (input, total): (Box<dyn Read>, i64) = match &args.path {
        Some(path) => {
            let file = File::open(path)?;
            let len = file.metadata()?.len();
            (Box::new(file), i64::try_from(len).unwrap_or(-1))
        }
        None => (Box::new(io::stdin()), -1),
    };
    let mut reader = AutoProgressReader::new(cfg.clone().with_prefix("R ").new_bar(), input, total);
    let mut writer = AutoProgressWriter::new(
        cfg.clone().with_prefix("W ").new_bar(),
        BufWriter::with_capacity(16 * 1024, io::stdout()),
        total,
    );
    let mbar = cfg.new_multi_bar(vec![
        reader.progress().bar().clone(),
        writer.progress().bar().clone(),
    ]);

    let mut buf = vec![0; args.buf_size];
    let res = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(err) = writer.write_all(&buf[..n]) {
                    break Err(err);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => break Err(err),
        }
    };
    reader.end();
    let closed = writer.close();
    mbar.end();
    res?;
    closed?;
    Ok(())
}
