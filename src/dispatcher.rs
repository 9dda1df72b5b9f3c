use crate::cli::OversizedPolicy;
use crate::error::Result;
use crate::input::{Line, Request, RequestReader};
use crate::worker::{self, WorkerContext};
use log::{debug, info, warn};
use std::io::{BufRead, Write};

/// Prompt shown before every read
pub const PROMPT: &str = ">";

/// Reads requests one at a time and hands each to a detached worker
pub struct Dispatcher<W> {
    ctx: WorkerContext,
    policy: OversizedPolicy,
    out: W,
    next_id: u64,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(ctx: WorkerContext, policy: OversizedPolicy, out: W) -> Self {
        Dispatcher {
            ctx,
            policy,
            out,
            next_id: 0,
        }
    }

    /// Prompt, read, count and spawn until the input is exhausted.
    ///
    /// Returns `Ok(())` on end of input. Workers still in flight keep running.
    pub fn run_loop<R: BufRead>(&mut self, reader: &mut RequestReader<R>) -> Result<()> {
        loop {
            self.prompt()?;

            let request = match reader.read_line()? {
                Line::Complete(name) | Line::Unterminated(name) => Request::new(name),
                Line::Oversized { kept, discarded } => match self.policy {
                    OversizedPolicy::Reject => {
                        warn!(
                            "Rejected request over {} bytes ({} bytes past the limit)",
                            kept.len(),
                            discarded
                        );
                        continue;
                    }
                    OversizedPolicy::Truncate => {
                        let request = Request::new(kept);
                        warn!(
                            "Truncated request to \"{}\" ({} bytes dropped)",
                            request, discarded
                        );
                        request
                    }
                },
                Line::Eof => {
                    info!("Input closed after {} requests", self.next_id);
                    return Ok(());
                }
            };

            if request.is_blank() {
                debug!("Skipping blank request");
                continue;
            }

            self.dispatch(request)?;
        }
    }

    fn prompt(&mut self) -> Result<()> {
        self.out.write_all(PROMPT.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, request: Request) -> Result<()> {
        let id = self.next_id;
        // Counted before the spawn so a worker can never finish uncounted
        self.ctx.stats.increment_requested();
        debug!("Spawning worker-{} for \"{}\"", id, request);
        worker::spawn(id, request, self.ctx.clone())?;
        self.next_id += 1;
        Ok(())
    }
}
