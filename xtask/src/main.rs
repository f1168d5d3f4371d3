use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for terrastream")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and docs in order
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all targets with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the terrain streaming bench in release mode
    Bench,
}

/// One cargo invocation: a label for the log line and its arguments.
struct Step {
    label: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    label: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    label: "cargo clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    label: "cargo test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    label: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BENCH: Step = Step {
    label: "terrain stream bench",
    args: &[
        "bench",
        "-p",
        "terrastream-stream",
        "--bench",
        "bench_terrain_stream",
    ],
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps: &[&Step] = match cli.command {
        Commands::Check => &[&FMT, &CLIPPY, &TEST, &DOC],
        Commands::Fmt => &[&FMT],
        Commands::Clippy => &[&CLIPPY],
        Commands::Test => &[&TEST],
        Commands::Doc => &[&DOC],
        Commands::Bench => &[&BENCH],
    };
    for step in steps {
        run(step)?;
    }
    Ok(())
}

fn run(step: &Step) -> Result<()> {
    println!("==> Running {}", step.label);
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", step.label);
    }
    Ok(())
}
