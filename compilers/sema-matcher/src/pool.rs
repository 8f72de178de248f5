use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::debug;

use sema_anno::Document;
use sema_normalizer::{Normalizer, TextPipeline};

/// Distributes independent document-normalization jobs across a
/// fixed-size worker pool. Jobs flow through a bounded queue; each
/// result carries its submission index so the coordinator can restore
/// submission order after the parallel fan-out. Normalization of
/// distinct documents has no data dependency, and the decomposition
/// cache inside the shared normalizer is append-only behind its lock.
pub fn normalize_batch(
    normalizer: &Normalizer,
    pipeline: &dyn TextPipeline,
    batch: Vec<(String, String)>,
    workers: usize,
) -> Vec<(String, Document)> {
    if batch.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, batch.len());
    debug!(jobs = batch.len(), workers, "normalizing document batch");

    let (job_tx, job_rx) = mpsc::sync_channel::<(usize, String, String)>(workers * 2);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::channel::<(usize, String, Document)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            scope.spawn(move || loop {
                let job = job_rx.lock().recv();
                let Ok((index, label, text)) = job else {
                    break;
                };
                let parsed = pipeline.parse(&text);
                let document = normalizer.normalize(&parsed);
                if result_tx.send((index, label, document)).is_err() {
                    break;
                }
            });
        }
        drop(result_tx);
        for (index, (label, text)) in batch.into_iter().enumerate() {
            if job_tx.send((index, label, text)).is_err() {
                break;
            }
        }
        drop(job_tx);
    });

    let mut results: Vec<(usize, String, Document)> = result_rx.into_iter().collect();
    results.sort_by_key(|(index, _, _)| *index);
    results
        .into_iter()
        .map(|(_, label, document)| (label, document))
        .collect()
}
