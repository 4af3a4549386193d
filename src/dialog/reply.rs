use crate::dialog::event::{CUSTOM_VALUE, CampaignChoice, MenuChoice, SourceChoice};
use crate::media::asset::MediaAsset;

/// Reply keyboard attached to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyboard {
    /// The five main-menu buttons.
    Main,
    /// UTM source presets plus the custom button.
    Sources,
    /// Use the suggested campaign, or type one.
    Campaign(String),
    /// Hide any keyboard.
    Remove,
}

impl Keyboard {
    /// Button captions row by row; `None` for [`Keyboard::Remove`].
    pub fn rows(&self) -> Option<Vec<Vec<String>>> {
        match self {
            Self::Main => Some(vec![
                MenuChoice::ALL
                    .iter()
                    .map(|c| c.label().to_string())
                    .collect(),
            ]),
            Self::Sources => Some(vec![
                SourceChoice::PRESETS
                    .iter()
                    .map(|c| c.label().to_string())
                    .collect(),
                vec![CUSTOM_VALUE.to_string()],
            ]),
            Self::Campaign(suggested) => Some(vec![
                vec![CampaignChoice::use_label(suggested)],
                vec![CUSTOM_VALUE.to_string()],
            ]),
            Self::Remove => None,
        }
    }
}

/// One outbound text message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// `None` leaves whatever keyboard the client shows.
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// A finished video note ready for delivery. Dropping it removes the file.
#[derive(Debug)]
pub struct Artifact {
    pub asset: MediaAsset,
    /// Duration in whole seconds.
    pub duration_secs: u32,
    /// Width and height of the square video.
    pub side: u32,
}

/// Something a transition sends, in order.
#[derive(Debug)]
pub enum Outgoing {
    Reply(Reply),
    Artifact(Artifact),
}
