//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use bzdecode::decompression::unzip::decompress;
use bzdecode::tools::cli::{bzopts_init, Mode};

use log::info;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let options = bzopts_init();

    // Available log levels are Error, Warn, Info, Debug, Trace. Log to stderr so that
    // decompressing to stdout stays clean.
    if let Err(e) = TermLogger::init(
        options.verbosity().level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Unable to start logging: {}", e);
    }

    //----- Figure how what we need to do and go do it
    let result = decompress(&options);

    match result {
        Ok(()) => {
            if options.op_mode() == Mode::Test {
                info!("All files tested ok.");
            }
            info!("Done.\n");
        }
        Err(e) => {
            if !options.quiet {
                eprintln!("bunzip: {}", e);
            }
            std::process::exit(1);
        }
    }
}
