//! Per-request worker threads.
//!
//! Each request gets its own detached OS thread. The dispatcher never joins
//! it; if the process exits first, the worker is simply abandoned.

use crate::error::{Error, Result};
use crate::input::Request;
use crate::latency::{Latency, LatencyModel};
use crate::stats::StatsRegistry;
use log::{debug, error, warn};
use std::io::Write;
use std::sync::Arc;
use std::thread;

/// Receives a notice for every delivered request
pub trait DeliverySink: Send + Sync {
    fn delivered(&self, request: &Request, latency: Latency);
}

/// Prints `File "<name>" delivered` on standard output
pub struct StdoutSink;

impl DeliverySink for StdoutSink {
    fn delivered(&self, request: &Request, _latency: Latency) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "File \"{}\" delivered", request).and_then(|_| out.flush()) {
            warn!("Failed to write delivery notice: {}", e);
        }
    }
}

/// Shared state every worker needs
#[derive(Clone)]
pub struct WorkerContext {
    pub stats: Arc<StatsRegistry>,
    pub model: Arc<LatencyModel>,
    pub sink: Arc<dyn DeliverySink>,
}

/// Start a detached worker for `request`
pub fn spawn(id: u64, request: Request, ctx: WorkerContext) -> Result<()> {
    thread::Builder::new()
        .name(format!("worker-{id}"))
        .spawn(move || service(request, &ctx))
        .map_err(Error::Spawn)?;
    Ok(())
}

/// Simulate retrieving `request`, then record the completion
pub fn service(request: Request, ctx: &WorkerContext) {
    let latency = ctx.model.draw(&mut rand::thread_rng());
    debug!(
        "Servicing \"{}\": {:?}, {} units",
        request, latency.outcome, latency.units
    );

    thread::sleep(ctx.model.duration(latency));

    ctx.sink.delivered(&request, latency);

    if let Err(e) = ctx.stats.record_completion(latency.units.into()) {
        error!("Dropped completion of \"{}\": {}", request, e);
    }
}
