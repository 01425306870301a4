use std::io::{self, BufWriter};
use std::path::PathBuf;

use bdffont::{ConvertOptions, Error, PixelSymbols};
use bdffont::header::{create_font_header_file, write_font_header};
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;


/// Converts BDF bitmap fonts into C source files.
#[derive(Parser)]
#[command(version, disable_help_flag = true)]
struct Opts {
    /// Read a BDF font from standard input and write C source to standard output.
    #[arg(short = 'b')]
    pub read_bdf: bool,

    /// Write the font header to standard output.
    #[arg(short = 'c')]
    pub header_to_stdout: bool,

    /// Write the font header to the given file.
    #[arg(short = 'C', value_name = "FILE")]
    pub header_file: Option<PathBuf>,

    /// Name of the C font variable.
    #[arg(short = 'n', value_name = "NAME", default_value = "font")]
    pub name: String,

    /// Print help.
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    pub help: Option<bool>,
}


fn run(opts: &Opts) -> Result<(), Error> {
    let symbols = PixelSymbols::default();
    let mut did_something = false;

    if let Some(header_file) = &opts.header_file {
        create_font_header_file(header_file, symbols)?;
        did_something = true;
    }

    if opts.header_to_stdout {
        let mut writer = BufWriter::new(io::stdout().lock());
        write_font_header(&mut writer, symbols)?;
        did_something = true;
    }

    if opts.read_bdf {
        let options = ConvertOptions {
            name: opts.name.clone(),
            symbols,
            ..ConvertOptions::default()
        };
        let mut writer = BufWriter::new(io::stdout().lock());
        let table = bdffont::convert(io::stdin().lock(), &mut writer, &options)?;
        info!(
            "converted {} of {} characters into {} bitmap bytes",
            table.width_table.len(), table.descriptor.chars, table.bitmap.len(),
        );
        did_something = true;
    }

    if !did_something {
        warn!("nothing to do; pass -b, -c or -C (see --help)");
    }
    Ok(())
}


fn main() {
    // generated source goes to stdout; keep logging out of it
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy()
        )
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();
    if let Err(e) = run(&opts) {
        eprintln!("bdf2c: {}", e);
        std::process::exit(1);
    }
}
