use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::compose::notes::NoteRenderer;
use crate::dialog::reply::{Artifact, Keyboard, Reply};
use crate::foundation::core::SessionId;
use crate::foundation::error::{BotError, BotResult};
use crate::media::asset::MediaAsset;
use crate::transport::Outbound;

/// Background vinyl render request. Owns every file it touches.
#[derive(Debug)]
pub struct VinylJob {
    pub session_id: SessionId,
    pub image: MediaAsset,
    pub audio: MediaAsset,
    pub output: MediaAsset,
}

struct JobOutcome {
    session_id: SessionId,
    result: BotResult<Artifact>,
    /// Inputs stay on disk until the outcome has been delivered.
    _inputs: (MediaAsset, MediaAsset),
}

/// Runs vinyl renders on a dedicated CPU pool and reports results through [`Outbound`].
///
/// Submitting never blocks; completion (success or failure) is sent to the originating session
/// by a delivery task, after which all of the job's files are removed.
#[derive(Clone)]
pub struct JobQueue {
    pool: Arc<rayon::ThreadPool>,
    renderer: Arc<dyn NoteRenderer>,
    done_tx: mpsc::UnboundedSender<JobOutcome>,
    in_flight: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Build the pool and spawn the delivery task on the current tokio runtime.
    pub fn start(
        workers: usize,
        renderer: Arc<dyn NoteRenderer>,
        outbound: Arc<dyn Outbound>,
    ) -> BotResult<Self> {
        let pool = build_thread_pool(workers)?;
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let in_flight = Arc::new(AtomicUsize::new(0));
        tokio::spawn(deliver_outcomes(done_rx, outbound, Arc::clone(&in_flight)));
        Ok(Self {
            pool: Arc::new(pool),
            renderer,
            done_tx,
            in_flight,
        })
    }

    /// Queue `job` and return immediately.
    pub fn submit(&self, job: VinylJob) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        info!(session_id = %job.session_id, path = %job.output.path().display(), "vinyl job queued");

        let renderer = Arc::clone(&self.renderer);
        let done_tx = self.done_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        self.pool.spawn(move || {
            let started = Instant::now();
            let VinylJob {
                session_id,
                image,
                audio,
                output,
            } = job;
            let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
                renderer.render_vinyl(image.path(), audio.path(), output.path())
            }))
            .unwrap_or_else(|payload| {
                error!(session_id = %session_id, panic = panic_message(payload.as_ref()), "vinyl render panicked");
                Err(BotError::encode_failed("render panicked"))
            });
            let result = rendered.map(|note| Artifact {
                asset: output,
                duration_secs: note.whole_seconds(),
                side: note.side,
            });
            info!(
                session_id = %session_id,
                ok = result.is_ok(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "vinyl job finished"
            );
            let outcome = JobOutcome {
                session_id,
                result,
                _inputs: (image, audio),
            };
            if done_tx.send(outcome).is_err() {
                warn!(session_id = %session_id, "delivery task is gone; dropping vinyl result");
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        });
    }

    /// Jobs submitted but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every submitted job has been delivered, or `timeout` elapses.
    ///
    /// Returns `true` when the queue drained.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

async fn deliver_outcomes(
    mut done_rx: mpsc::UnboundedReceiver<JobOutcome>,
    outbound: Arc<dyn Outbound>,
    in_flight: Arc<AtomicUsize>,
) {
    while let Some(outcome) = done_rx.recv().await {
        let session_id = outcome.session_id;
        let replies = match &outcome.result {
            Ok(artifact) => match outbound.send_artifact(session_id, artifact).await {
                Ok(()) => vec![
                    Reply::text("🎵 Vinyl record created! Forward it to your channel.")
                        .with_keyboard(Keyboard::Main),
                ],
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "failed to send vinyl");
                    vec![Reply::text(format!("Failed to send vinyl: {e}")).with_keyboard(Keyboard::Main)]
                }
            },
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "vinyl render failed");
                vec![Reply::text(format!("Failed to create vinyl: {e}")).with_keyboard(Keyboard::Main)]
            }
        };
        for reply in &replies {
            if let Err(e) = outbound.send_reply(session_id, reply).await {
                warn!(session_id = %session_id, error = %e, "failed to deliver vinyl notice");
            }
        }
        drop(outcome);
        in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn build_thread_pool(threads: usize) -> BotResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(BotError::validation("worker count must be >= 1"));
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("roundnote-render-{i}"))
        .panic_handler(|payload| {
            error!(panic = panic_message(payload.as_ref()), "render worker panicked");
        })
        .build()
        .map_err(|e| BotError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "../tests/unit/worker.rs"]
mod tests;
