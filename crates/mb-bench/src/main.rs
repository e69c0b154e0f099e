//! `mb-bench` command-line entry point.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use log::error;
use mb_bench::{cli, BackendId, BenchError, BenchmarkSession, CliArgs};

fn main() {
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "mb-bench".to_string());

    let parsed = match CliArgs::parse(args) {
        Ok(parsed) => parsed,
        Err(e) => usage_error(&program, &e),
    };

    if parsed.help {
        println!("{}", cli::usage(&program));
        return;
    }
    if parsed.list {
        list_backends();
        return;
    }

    let env_root = env::var_os("MKLROOT").map(PathBuf::from);
    let config = match parsed.resolve(env_root) {
        Ok(config) => config,
        Err(e @ BenchError::InvalidArgument(_)) => usage_error(&program, &e),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let result = BenchmarkSession::new(config).and_then(|session| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        session.run(&mut out)
    });

    match result {
        Ok(summary) => process::exit(summary.exit_code()),
        Err(e) => {
            error!("benchmark failed: {}", e);
            process::exit(1);
        }
    }
}

fn usage_error(program: &str, err: &BenchError) -> ! {
    eprintln!("error: {}", err);
    eprintln!("{}", cli::usage(program));
    process::exit(2);
}

fn list_backends() {
    println!("Available backends:");
    for id in BackendId::ALL {
        println!("  {:<20} - {}", id.name(), id.description());
    }
}
