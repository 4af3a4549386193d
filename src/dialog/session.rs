use crate::dialog::reply::{Artifact, Outgoing, Reply};
use crate::dialog::state::{DialogState, Flow};
use crate::foundation::core::SessionId;
use crate::media::asset::MediaAsset;

/// Values collected mid-flow. Owned by exactly one session.
#[derive(Debug, Default)]
pub struct Scratch {
    pub utm_url: Option<String>,
    pub utm_source: Option<String>,
    pub suggested_campaign: Option<String>,
    /// Downloaded cover image waiting for its audio track.
    pub vinyl_image: Option<MediaAsset>,
}

impl Scratch {
    /// Names of the keys currently holding a value.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.utm_url.is_some() {
            keys.push("utm_url");
        }
        if self.utm_source.is_some() {
            keys.push("utm_source");
        }
        if self.suggested_campaign.is_some() {
            keys.push("suggested_campaign");
        }
        if self.vinyl_image.is_some() {
            keys.push("vinyl_image");
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Drop everything collected by `flow`.
    pub fn clear_flow(&mut self, flow: Flow) {
        match flow {
            Flow::Utm => {
                self.utm_url = None;
                self.utm_source = None;
                self.suggested_campaign = None;
            }
            Flow::Vinyl => self.vinyl_image = None,
            Flow::Shorten | Flow::VideoNote => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn apply(&mut self, update: ScratchUpdate) {
        match update {
            ScratchUpdate::UtmUrl(url) => self.utm_url = Some(url),
            ScratchUpdate::UtmSource(source) => self.utm_source = Some(source),
            ScratchUpdate::SuggestedCampaign(name) => self.suggested_campaign = name,
            ScratchUpdate::VinylImage(asset) => self.vinyl_image = Some(asset),
            ScratchUpdate::ClearFlow(flow) => self.clear_flow(flow),
        }
    }
}

/// One conversation.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub state: DialogState,
    pub scratch: Scratch,
}

impl Session {
    /// A fresh session at the main menu.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: DialogState::Choosing,
            scratch: Scratch::default(),
        }
    }
}

/// A change to scratch requested by a handler.
#[derive(Debug)]
pub enum ScratchUpdate {
    UtmUrl(String),
    UtmSource(String),
    SuggestedCampaign(Option<String>),
    VinylImage(MediaAsset),
    ClearFlow(Flow),
}

/// Work the state machine performs after replies are sent.
#[derive(Debug)]
pub enum Effect {
    /// Render a vinyl from the stored cover and this audio track in the background.
    EnqueueVinyl { audio: MediaAsset },
}

/// Everything one handled event changes. Handlers build these; only the state machine applies
/// them.
#[derive(Debug)]
#[must_use]
pub struct Transition {
    pub(crate) next: DialogState,
    pub(crate) outgoing: Vec<Outgoing>,
    pub(crate) updates: Vec<ScratchUpdate>,
    pub(crate) effects: Vec<Effect>,
}

impl Transition {
    /// Move to `next`.
    pub fn to(next: DialogState) -> Self {
        Self {
            next,
            outgoing: Vec::new(),
            updates: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.outgoing.push(Outgoing::Reply(reply));
        self
    }

    pub fn artifact(mut self, artifact: Artifact) -> Self {
        self.outgoing.push(Outgoing::Artifact(artifact));
        self
    }

    pub fn update(mut self, update: ScratchUpdate) -> Self {
        self.updates.push(update);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn next(&self) -> DialogState {
        self.next
    }

    /// Text of every reply, in order.
    pub fn reply_texts(&self) -> Vec<&str> {
        self.outgoing
            .iter()
            .filter_map(|o| match o {
                Outgoing::Reply(r) => Some(r.text.as_str()),
                Outgoing::Artifact(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialog/session.rs"]
mod tests;
