use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::compose::notes::NoteRenderer;
use crate::dialog::event::Event;
use crate::dialog::handlers::{self, what_next};
use crate::dialog::reply::{Keyboard, Outgoing, Reply};
use crate::dialog::session::{Effect, Session, Transition};
use crate::dialog::state::{DialogState, Flow};
use crate::foundation::core::SessionId;
use crate::links::shorten::Shortener;
use crate::media::asset::{AssetKind, Workspace};
use crate::transport::{FileFetcher, Outbound};
use crate::worker::{JobQueue, VinylJob};

/// Everything handlers and effects talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub outbound: Arc<dyn Outbound>,
    pub fetcher: Arc<dyn FileFetcher>,
    pub shortener: Arc<dyn Shortener>,
    pub renderer: Arc<dyn NoteRenderer>,
    pub workspace: Workspace,
    pub jobs: JobQueue,
}

/// Session registry plus the transition function.
///
/// Each session sits behind its own async mutex, so events for one session are applied in
/// arrival order while other sessions proceed independently.
///
/// A stopped session is discarded; only its id is remembered so the next event is answered as
/// stopped until `/start` brings it back.
pub struct SessionStateMachine {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
    stopped: DashSet<SessionId>,
    deps: Collaborators,
}

impl SessionStateMachine {
    pub fn new(deps: Collaborators) -> Self {
        Self {
            sessions: DashMap::new(),
            stopped: DashSet::new(),
            deps,
        }
    }

    fn session(&self, id: SessionId) -> Arc<Mutex<Session>> {
        Arc::clone(
            self.sessions
                .entry(id)
                .or_insert_with(|| {
                    let mut session = Session::new(id);
                    if self.stopped.remove(&id).is_some() {
                        session.state = DialogState::Stopped;
                    }
                    Arc::new(Mutex::new(session))
                })
                .value(),
        )
    }

    /// Lock the registered session for `id`, retrying if it was discarded while we waited.
    async fn lock_session(&self, id: SessionId) -> OwnedMutexGuard<Session> {
        loop {
            let handle = self.session(id);
            let guard = Arc::clone(&handle).lock_owned().await;
            let current = self
                .sessions
                .get(&id)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &handle));
            if current {
                return guard;
            }
        }
    }

    fn discard(&self, id: SessionId) {
        self.stopped.insert(id);
        self.sessions.remove(&id);
        debug!(session_id = %id, "session discarded");
    }

    /// Handle one inbound event and return the state the session ends up in.
    ///
    /// Unseen ids start at [`DialogState::Choosing`]. Every reply produced by the transition is
    /// delivered before the next event for the same session is looked at.
    pub async fn dispatch(&self, id: SessionId, event: Event) -> DialogState {
        let mut session = self.lock_session(id).await;
        let kind = event.kind();
        let state = session.state;

        let transition = handlers::route(&self.deps, &session, event).await;
        let next = transition.next;
        debug!(session_id = %id, state = ?state, next = ?next, kind, "transition");
        self.apply(&mut session, transition).await;
        if session.state == DialogState::Stopped {
            self.discard(id);
        }
        session.state
    }

    async fn apply(&self, session: &mut Session, transition: Transition) {
        let Transition {
            next,
            mut outgoing,
            updates,
            effects,
        } = transition;

        for update in updates {
            session.scratch.apply(update);
        }

        let mut jobs = Vec::new();
        for effect in effects {
            match effect {
                Effect::EnqueueVinyl { audio } => match session.scratch.vinyl_image.take() {
                    Some(image) => jobs.push(VinylJob {
                        session_id: session.id,
                        image,
                        audio,
                        output: self
                            .deps
                            .workspace
                            .reserve(session.id, AssetKind::Output, Some("mp4"), None),
                    }),
                    None => {
                        warn!(session_id = %session.id, "vinyl audio arrived without a cover");
                        outgoing.clear();
                        let fallback = what_next(
                            Transition::to(next)
                                .reply(Reply::text("Failed to create vinyl: no cover image")),
                        );
                        outgoing.extend(fallback.outgoing);
                    }
                },
            }
        }

        self.deliver(session.id, outgoing).await;
        for job in jobs {
            self.deps.jobs.submit(job);
        }

        session.state = next;
        if next.is_resting() {
            session.scratch.clear();
        }
    }

    async fn deliver(&self, id: SessionId, outgoing: Vec<Outgoing>) {
        for item in outgoing {
            match item {
                Outgoing::Reply(reply) => {
                    if let Err(e) = self.deps.outbound.send_reply(id, &reply).await {
                        warn!(session_id = %id, error = %e, "failed to send reply");
                    }
                }
                Outgoing::Artifact(artifact) => {
                    if let Err(e) = self.deps.outbound.send_artifact(id, &artifact).await {
                        warn!(session_id = %id, error = %e, "failed to send artifact");
                        let notice = Reply::text(format!("Failed to send video: {e}"))
                            .with_keyboard(Keyboard::Main);
                        if let Err(e) = self.deps.outbound.send_reply(id, &notice).await {
                            warn!(session_id = %id, error = %e, "failed to send reply");
                        }
                    }
                }
            }
        }
    }

    /// Current state of `id`, if it has been seen.
    pub async fn state_of(&self, id: SessionId) -> Option<DialogState> {
        let Some(session) = self.sessions.get(&id).map(|s| Arc::clone(s.value())) else {
            return self.stopped.contains(&id).then_some(DialogState::Stopped);
        };
        let state = session.lock().await.state;
        Some(state)
    }

    /// Scratch keys currently held by `id`.
    pub async fn scratch_keys(&self, id: SessionId) -> Vec<&'static str> {
        let Some(session) = self.sessions.get(&id).map(|s| Arc::clone(s.value())) else {
            return Vec::new();
        };
        session.lock().await.scratch.keys()
    }

    /// `true` when `id` holds a value collected by `flow`.
    pub async fn holds_flow_data(&self, id: SessionId, flow: Flow) -> bool {
        let keys = self.scratch_keys(id).await;
        let flow_keys: &[&str] = match flow {
            Flow::Utm => &["utm_url", "utm_source", "suggested_campaign"],
            Flow::Vinyl => &["vinyl_image"],
            Flow::Shorten | Flow::VideoNote => &[],
        };
        keys.iter().any(|k| flow_keys.contains(k))
    }

    /// Live sessions; stopped ones are not counted.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
