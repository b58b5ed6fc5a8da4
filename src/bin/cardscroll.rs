use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cardscroll", version)]
struct Cli {
    /// Tracing filter level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scroll script against a page and print the event trace.
    Simulate(SimulateArgs),
    /// Print the parsed animation config of every section.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Page JSON.
    #[arg(long)]
    page: PathBuf,

    /// Script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Controller config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the trace here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Page JSON.
    #[arg(long)]
    page: PathBuf,

    /// Controller config JSON, for its animation defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<cardscroll::ControllerConfig> {
    match path {
        Some(p) => cardscroll::ControllerConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(cardscroll::ControllerConfig::default()),
    }
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let page = cardscroll::Page::from_path(&args.page)
        .with_context(|| format!("load page '{}'", args.page.display()))?;
    let script = cardscroll::Script::from_path(&args.script)
        .with_context(|| format!("load script '{}'", args.script.display()))?;
    let config = load_config(args.config.as_ref())?;

    let trace = cardscroll::simulate(&page, &script, config).context("run simulation")?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = std::fs::File::create(out)
                .with_context(|| format!("create trace '{}'", out.display()))?;
            serde_json::to_writer_pretty(f, &trace)
                .with_context(|| format!("write trace '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => print_json(&trace)?,
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let page = cardscroll::Page::from_path(&args.page)
        .with_context(|| format!("load page '{}'", args.page.display()))?;
    let config = load_config(args.config.as_ref())?;
    let report = cardscroll::inspect(&page, &config.animation);
    print_json(&report)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("write JSON to stdout")?;
    writeln!(stdout).context("write JSON to stdout")?;
    Ok(())
}
