//! Interrupt-driven report and exit.
//!
//! The Ctrl-C handler only signals a channel. A dedicated listener thread
//! receives it, prints the registry snapshot and terminates the process
//! without waiting for workers still in flight.

use crate::error::{Error, Result, exit_code};
use crate::stats::StatsRegistry;
use log::info;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Install the Ctrl-C handler and start the listener thread
pub fn install(stats: Arc<StatsRegistry>) -> Result<()> {
    let (tx, rx) = mpsc::sync_channel::<()>(1);

    ctrlc::set_handler(move || {
        // A second interrupt while reporting is dropped
        let _ = tx.try_send(());
    })?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || listen(rx, &stats))
        .map_err(Error::Spawn)?;

    Ok(())
}

fn listen(rx: Receiver<()>, stats: &StatsRegistry) {
    // stdout is locked only once the interrupt arrives; workers and the
    // prompt write to it until then
    let code = match report_on_interrupt(&rx, stats, || io::stdout().lock()) {
        Ok(true) => exit_code::SUCCESS,
        // Handler gone; nothing will ever signal us
        Ok(false) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::GENERAL_ERROR
        }
    };
    std::process::exit(code);
}

/// Block until an interrupt arrives, then open the writer with `open` and
/// write the report to it.
///
/// Returns `Ok(false)` if the sending side was dropped without signalling.
pub fn report_on_interrupt<W, F>(rx: &Receiver<()>, stats: &StatsRegistry, open: F) -> Result<bool>
where
    W: Write,
    F: FnOnce() -> W,
{
    if rx.recv().is_err() {
        return Ok(false);
    }
    info!("Interrupt received");
    write_report(stats, &mut open())?;
    Ok(true)
}

pub fn write_report<W: Write>(stats: &StatsRegistry, out: &mut W) -> Result<()> {
    let snapshot = stats.snapshot()?;
    write!(out, "\n{snapshot}")?;
    out.flush()?;
    Ok(())
}

/// Park the calling thread until the interrupt listener ends the process
pub fn wait_for_interrupt() -> ! {
    loop {
        thread::park();
    }
}
