//! Entry point for the `interlace` launcher binary.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    interlace_launcher::run(std::env::args_os(), &mut stdout, &mut stderr)
}
