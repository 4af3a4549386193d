use std::fmt;

/// Where a session is inside its current flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogState {
    /// Main menu.
    Choosing,
    AwaitingUrl,
    AwaitingVideo,
    AwaitingVinylImage,
    AwaitingVinylAudio,
    AwaitingUtmUrl,
    AwaitingUtmSourceChoice,
    AwaitingUtmSource,
    AwaitingUtmCampaignChoice,
    AwaitingUtmCampaign,
    /// Ended by the user; only a start command leaves it.
    Stopped,
}

/// A guided multi-step task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flow {
    Shorten,
    Utm,
    VideoNote,
    Vinyl,
}

impl DialogState {
    /// Human-readable name shown in the status snapshot.
    pub fn label(self) -> &'static str {
        match self {
            Self::Choosing => "Main Menu",
            Self::AwaitingUrl => "Waiting for URL",
            Self::AwaitingVideo => "Waiting for Video",
            Self::AwaitingVinylImage => "Waiting for Vinyl Image",
            Self::AwaitingVinylAudio => "Waiting for Vinyl Audio",
            Self::AwaitingUtmUrl => "Waiting for UTM URL",
            Self::AwaitingUtmSourceChoice => "Waiting for UTM Source Choice",
            Self::AwaitingUtmSource => "Waiting for UTM Source",
            Self::AwaitingUtmCampaignChoice => "Waiting for UTM Campaign Choice",
            Self::AwaitingUtmCampaign => "Waiting for UTM Campaign",
            Self::Stopped => "Stopped",
        }
    }

    /// Flow this state belongs to, if any.
    pub fn flow(self) -> Option<Flow> {
        match self {
            Self::Choosing | Self::Stopped => None,
            Self::AwaitingUrl => Some(Flow::Shorten),
            Self::AwaitingVideo => Some(Flow::VideoNote),
            Self::AwaitingVinylImage | Self::AwaitingVinylAudio => Some(Flow::Vinyl),
            Self::AwaitingUtmUrl
            | Self::AwaitingUtmSourceChoice
            | Self::AwaitingUtmSource
            | Self::AwaitingUtmCampaignChoice
            | Self::AwaitingUtmCampaign => Some(Flow::Utm),
        }
    }

    /// `true` for every mid-flow state.
    pub fn is_awaiting(self) -> bool {
        self.flow().is_some()
    }

    /// States where scratch must be empty once the transition is applied.
    pub fn is_resting(self) -> bool {
        matches!(self, Self::Choosing | Self::Stopped)
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
