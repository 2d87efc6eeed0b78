//! Progress channel between search workers and the console printer.
//!
//! Workers never print. They send progress observations over an unbounded
//! channel, so a send never blocks the search loop, and a single printer
//! thread writes them out one line at a time.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::thread::JoinHandle;

/// Message sent from workers to the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMessage {
    /// Periodic observation from a running worker.
    Progress {
        worker_id: usize,
        iterations: u64,
        found: u64,
    },
    /// Worker has finished its budget.
    Finished {
        worker_id: usize,
        iterations: u64,
        found: u64,
    },
}

impl ProgressMessage {
    pub fn worker_id(&self) -> usize {
        match self {
            ProgressMessage::Progress { worker_id, .. }
            | ProgressMessage::Finished { worker_id, .. } => *worker_id,
        }
    }
}

impl std::fmt::Display for ProgressMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressMessage::Progress {
                worker_id,
                iterations,
                found,
            } => write!(
                f,
                "[Worker #{}]:\tProgress: {}\tFound:    {}",
                worker_id, iterations, found
            ),
            ProgressMessage::Finished {
                worker_id,
                iterations,
                found,
            } => write!(
                f,
                "[Worker #{}]:\tFinished: {}\tFound:    {}",
                worker_id, iterations, found
            ),
        }
    }
}

/// Worker end of the progress channel. Reporting is fire-and-forget.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Option<Sender<ProgressMessage>>,
}

impl ProgressReporter {
    /// Reporter that drops every message.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn report(&self, message: ProgressMessage) {
        if let Some(tx) = &self.tx {
            // The printer may already be gone; progress is best-effort.
            let _ = tx.send(message);
        }
    }
}

/// Create the progress channel with one reporter per worker.
pub fn create_channels(num_workers: usize) -> (Receiver<ProgressMessage>, Vec<ProgressReporter>) {
    let (tx, rx) = unbounded();
    let reporters = (0..num_workers)
        .map(|_| ProgressReporter {
            tx: Some(tx.clone()),
        })
        .collect();
    (rx, reporters)
}

/// Spawn the printer thread. It exits once every reporter has been dropped
/// and returns the number of lines printed.
pub fn spawn_printer(rx: Receiver<ProgressMessage>, verbose: bool) -> JoinHandle<u64> {
    std::thread::spawn(move || {
        let mut printed = 0;
        for message in rx {
            if matches!(message, ProgressMessage::Finished { .. }) && !verbose {
                continue;
            }
            println!("{}", message);
            printed += 1;
        }
        printed
    })
}
