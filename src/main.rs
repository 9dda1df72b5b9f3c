use anyhow::Context;
use clap::Parser;
use filesim::cli::{Cli, Command};
use filesim::dispatcher::Dispatcher;
use filesim::error::exit_code;
use filesim::input::RequestReader;
use filesim::stats::StatsRegistry;
use filesim::worker::{StdoutSink, WorkerContext};
use log::info;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(sim_err) = e.downcast_ref::<filesim::Error>() {
                ExitCode::from(sim_err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = &cli.command {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "filesim", &mut std::io::stdout());
        return Ok(());
    }

    cli.validate()
        .map_err(filesim::Error::InvalidArgument)
        .context("Invalid arguments")?;

    filesim::logging::init(cli.verbose)?;

    let model = cli.latency_model();
    info!(
        "Cache hit {:.0}% at {} units, cold reads {}..={} units, 1 unit = {}",
        model.hit_probability * 100.0,
        model.hit_units,
        model.cold_min,
        model.cold_max,
        humantime::format_duration(model.unit)
    );

    let stats = Arc::new(StatsRegistry::new());
    filesim::shutdown::install(Arc::clone(&stats)).context("Initialization failed")?;

    let ctx = WorkerContext {
        stats,
        model: Arc::new(model),
        sink: Arc::new(StdoutSink),
    };

    let stdin = std::io::stdin().lock();
    let mut reader = RequestReader::new(stdin, cli.max_line);
    Dispatcher::new(ctx, cli.oversized, std::io::stdout()).run_loop(&mut reader)?;

    // Only the interrupt ends the process
    info!("Waiting for Ctrl-C to report and exit");
    filesim::shutdown::wait_for_interrupt()
}
