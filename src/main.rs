use std::env;
use std::process;

use anyhow::Context;
use stackcc::{compile, run_self_test};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries the assembly, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 1 {
        eprintln!("Usage: stackcc <program>");
        process::exit(1);
    }
    let arg = &args[0];

    if arg == "-test" {
        run_self_test().context("self test failed")?;
        println!("OK");
        return Ok(());
    }

    let output = match compile(arg) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    print!("{}", output.ast_dump);
    print!("{}", output.asm);
    Ok(())
}
