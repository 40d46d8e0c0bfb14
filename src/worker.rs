//! Export worker
//!
//! A dedicated thread owns a tokio runtime and turns export requests from the
//! UI into export tasks. Every request becomes its own task, so overlapping
//! exports run independently; the policy decides whether a stale one may
//! still deliver.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::download::DownloadSink;
use crate::export::{deliver, render_export, ExportJob, ExportReport, ExportSettings};
use crate::fonts::FontProvider;

/// What happens when a new export starts while an older one is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportPolicy {
    /// Every export runs to completion and delivers its file
    #[default]
    RunAll,
    /// Only the newest export delivers; older ones are dropped before delivery
    LatestWins,
}

impl ExportPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ExportPolicy::RunAll => "run-all",
            ExportPolicy::LatestWins => "latest-wins",
        }
    }
}

/// Messages sent from main thread to the worker
#[derive(Debug)]
pub enum WorkerMessage {
    Export { id: u64, job: ExportJob },
    /// Stop accepting work; in-flight exports are finished first
    Shutdown,
}

/// Responses sent from the worker to main thread
#[derive(Debug)]
pub enum WorkerResponse {
    Complete { id: u64, report: ExportReport },
    /// No image was loaded, nothing was produced
    Skipped { id: u64 },
    /// A newer export started first; this one was not delivered
    Superseded { id: u64 },
    Error { id: u64, message: String },
}

impl WorkerResponse {
    pub fn id(&self) -> u64 {
        match self {
            WorkerResponse::Complete { id, .. }
            | WorkerResponse::Skipped { id }
            | WorkerResponse::Superseded { id }
            | WorkerResponse::Error { id, .. } => *id,
        }
    }
}

/// Everything an export task needs besides the job itself
#[derive(Clone)]
pub struct ExportContext {
    pub fonts: Arc<dyn FontProvider>,
    pub sink: Arc<dyn DownloadSink>,
    pub settings: ExportSettings,
    pub policy: ExportPolicy,
}

/// Sending side of the worker, and the one place export ids come from
///
/// Clones share the counter, so ids stay unique across every sender.
#[derive(Debug, Clone)]
pub struct ExportRequests {
    tx: Sender<WorkerMessage>,
    last_id: Arc<AtomicU64>,
}

impl ExportRequests {
    pub fn new(tx: Sender<WorkerMessage>) -> Self {
        Self {
            tx,
            last_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue an export; returns the id its response will carry
    pub fn export(&self, job: ExportJob) -> Result<u64> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx
            .send(WorkerMessage::Export { id, job })
            .context("export worker has stopped")?;
        Ok(id)
    }

    fn shutdown(&self) {
        let _ = self.tx.send(WorkerMessage::Shutdown);
    }
}

/// Handle to the worker thread and its channels
pub struct WorkerHandle {
    pub requests: ExportRequests,
    pub response_rx: Receiver<WorkerResponse>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Queue an export; returns the id its response will carry
    pub fn export(&self, job: ExportJob) -> Result<u64> {
        self.requests.export(job)
    }

    /// Stop the worker once running exports are done
    pub fn shutdown(self) {
        self.requests.shutdown();
        let _ = self.thread.join();
    }
}

/// Spawn the export worker thread
pub fn spawn_export_worker(context: ExportContext) -> Result<WorkerHandle> {
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("export-task")
        .build()
        .context("Failed to start export runtime")?;

    let thread = thread::Builder::new()
        .name("export-worker".to_string())
        .spawn(move || worker_loop(runtime, request_rx, response_tx, context))
        .context("Failed to spawn export worker thread")?;

    Ok(WorkerHandle {
        requests: ExportRequests::new(request_tx),
        response_rx,
        thread,
    })
}

/// Receive requests until shutdown, then wait for the tasks still running
fn worker_loop(
    runtime: Runtime,
    rx: Receiver<WorkerMessage>,
    tx: Sender<WorkerResponse>,
    context: ExportContext,
) {
    let generation = Arc::new(AtomicU64::new(0));
    let mut tasks = Vec::new();

    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,
            WorkerMessage::Export { id, job } => {
                let mine = generation.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(id, generation = mine, "export queued");
                tasks.retain(|task: &tokio::task::JoinHandle<()>| !task.is_finished());
                tasks.push(runtime.spawn(run_export(
                    id,
                    mine,
                    job,
                    context.clone(),
                    Arc::clone(&generation),
                    tx.clone(),
                )));
            }
        }
    }

    runtime.block_on(async {
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "export task failed to finish");
            }
        }
    });
}

async fn run_export(
    id: u64,
    mine: u64,
    job: ExportJob,
    context: ExportContext,
    generation: Arc<AtomicU64>,
    tx: Sender<WorkerResponse>,
) {
    let is_stale = || {
        context.policy == ExportPolicy::LatestWins && generation.load(Ordering::SeqCst) != mine
    };

    let response = match render_export(job, Arc::clone(&context.fonts), &context.settings).await {
        Ok(None) => WorkerResponse::Skipped { id },
        Ok(Some(_)) if is_stale() => {
            warn!(id, "newer export started, dropping this one");
            WorkerResponse::Superseded { id }
        }
        Ok(Some(rendered)) => match deliver(rendered, Arc::clone(&context.sink)).await {
            Ok(report) => WorkerResponse::Complete { id, report },
            Err(e) => {
                warn!(id, error = %e, "export delivery failed");
                WorkerResponse::Error {
                    id,
                    message: e.to_string(),
                }
            }
        },
        Err(e) => {
            warn!(id, error = %e, "export aborted");
            WorkerResponse::Error {
                id,
                message: e.to_string(),
            }
        }
    };

    let _ = tx.send(response);
}
