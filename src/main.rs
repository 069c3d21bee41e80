use clap::Parser;
use railblocks::cli::{self, Cli};

fn main() {
    // output piped into `head` should end quietly
    reset_sigpipe();

    let cli = Cli::parse();
    std::process::exit(cli::run(cli));
}

/// restore the default SIGPIPE action so a closed stdout exits the process
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
