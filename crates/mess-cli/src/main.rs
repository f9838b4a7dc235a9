use clap::Parser;
use mess::{Cli, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Piping into `head` must end quietly instead of panicking on EPIPE
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Top-level message first, then each underlying cause on its own line.
fn report(err: &anyhow::Error) {
    eprintln!("Error: {}", err);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}
