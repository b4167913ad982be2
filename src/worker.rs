use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::debug;

use crate::service::{execute, ModelService};
use crate::session::{PredictionRequest, ServiceOutcome, ServiceRequest};

// ---------------------------------------------------------------------------
// AsyncWorker
// ---------------------------------------------------------------------------

/// Runs service calls off the host's event loop.
///
/// Predictions go to a dedicated thread that skips superseded work; train,
/// clear, settings and status calls go to a second thread in order, so a
/// prediction and a training call can be in flight together. Outcomes come
/// back through `try_recv` and are reconciled by the session.
pub(crate) struct AsyncWorker {
    predict_tx: mpsc::Sender<PredictionRequest>,
    ops_tx: mpsc::Sender<ServiceRequest>,
    result_rx: Mutex<mpsc::Receiver<ServiceOutcome>>,
    predict_seq: Arc<AtomicU64>,
    /// Requests submitted and not yet finished (answered or skipped).
    pending: Arc<AtomicUsize>,
}

impl AsyncWorker {
    pub fn new(service: Arc<dyn ModelService>) -> Self {
        let predict_seq = Arc::new(AtomicU64::new(0));
        let pending = Arc::new(AtomicUsize::new(0));
        let (result_tx, result_rx) = mpsc::channel::<ServiceOutcome>();

        // Prediction worker
        let (predict_tx, predict_rx) = mpsc::channel::<PredictionRequest>();
        {
            let service = Arc::clone(&service);
            let seq = Arc::clone(&predict_seq);
            let tx = result_tx.clone();
            let pending = Arc::clone(&pending);
            thread::Builder::new()
                .name("predictflow-predict".into())
                .spawn(move || predict_worker(predict_rx, tx, seq, pending, service))
                .expect("failed to spawn prediction worker");
        }

        // Model operations worker
        let (ops_tx, ops_rx) = mpsc::channel::<ServiceRequest>();
        {
            let pending = Arc::clone(&pending);
            thread::Builder::new()
                .name("predictflow-ops".into())
                .spawn(move || ops_worker(ops_rx, result_tx, pending, service))
                .expect("failed to spawn model operations worker");
        }

        Self {
            predict_tx,
            ops_tx,
            result_rx: Mutex::new(result_rx),
            predict_seq,
            pending,
        }
    }

    pub fn submit(&self, request: ServiceRequest) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        match request {
            ServiceRequest::Predict(req) => {
                self.predict_seq.store(req.seq, Ordering::SeqCst);
                let _ = self.predict_tx.send(req);
            }
            other => {
                let _ = self.ops_tx.send(other);
            }
        }
    }

    /// Record the session's newest prediction sequence so queued work older
    /// than it is skipped before reaching the network.
    pub fn invalidate_predictions(&self, latest_seq: u64) {
        self.predict_seq.store(latest_seq, Ordering::SeqCst);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn try_recv(&self) -> Option<ServiceOutcome> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Worker threads
// ---------------------------------------------------------------------------

fn predict_worker(
    rx: mpsc::Receiver<PredictionRequest>,
    tx: mpsc::Sender<ServiceOutcome>,
    seq: Arc<AtomicU64>,
    pending: Arc<AtomicUsize>,
    service: Arc<dyn ModelService>,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple requests queued, skip to latest
        let mut latest = work;
        let mut taken = 1;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
            taken += 1;
        }

        if latest.seq != seq.load(Ordering::SeqCst) {
            debug!(seq = latest.seq, "skipping superseded prediction");
            pending.fetch_sub(taken, Ordering::SeqCst);
            continue;
        }

        let outcome = execute(&*service, ServiceRequest::Predict(latest));
        let sent = tx.send(outcome);
        pending.fetch_sub(taken, Ordering::SeqCst);
        if sent.is_err() {
            break;
        }
    }
}

fn ops_worker(
    rx: mpsc::Receiver<ServiceRequest>,
    tx: mpsc::Sender<ServiceOutcome>,
    pending: Arc<AtomicUsize>,
    service: Arc<dyn ModelService>,
) {
    while let Ok(request) = rx.recv() {
        let outcome = execute(&*service, request);
        let sent = tx.send(outcome);
        pending.fetch_sub(1, Ordering::SeqCst);
        if sent.is_err() {
            break;
        }
    }
}
