/// A file the transport can fetch on request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Transport-specific handle passed back to the file fetcher.
    pub file_ref: String,
    /// MIME type declared by the sender.
    pub mime: Option<String>,
    /// Original file name, when the transport provides one.
    pub file_name: Option<String>,
    /// Declared size in bytes.
    pub size_bytes: Option<u64>,
}

impl Attachment {
    pub fn new(file_ref: impl Into<String>) -> Self {
        Self {
            file_ref: file_ref.into(),
            mime: None,
            file_name: None,
            size_bytes: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// `true` when the declared MIME type is `<major>/...`.
    pub fn mime_is(&self, major: &str) -> bool {
        self.mime
            .as_deref()
            .and_then(|m| m.split_once('/'))
            .is_some_and(|(m, _)| m.eq_ignore_ascii_case(major))
    }
}

/// Slash commands understood in every state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Menu,
    Cancel,
    /// Any other `/word`; treated as unrecognized input.
    Unknown(String),
}

impl Command {
    /// Decode `/name` or `/name@bot`, ignoring trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word).to_ascii_lowercase();
        Some(match name.as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "menu" => Self::Menu,
            "cancel" => Self::Cancel,
            _ => Self::Unknown(name),
        })
    }
}

/// One inbound message, decoded at the transport boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    Text(String),
    Photo(Attachment),
    Document(Attachment),
    Audio(Attachment),
    Voice(Attachment),
    Video(Attachment),
    /// Anything else the transport delivered (stickers, locations, ...).
    Unsupported,
}

impl Event {
    /// Text message, or a command when it is shaped like one.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match Command::parse(&text) {
            Some(cmd) => Self::Command(cmd),
            None => Self::Text(text),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Text(_) => "text",
            Self::Photo(_) => "photo",
            Self::Document(_) => "document",
            Self::Audio(_) => "audio",
            Self::Voice(_) => "voice",
            Self::Video(_) => "video",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Main-menu buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Shorten,
    Utm,
    VideoNote,
    Vinyl,
    Stop,
}

impl MenuChoice {
    pub const ALL: [Self; 5] = [
        Self::Shorten,
        Self::Utm,
        Self::VideoNote,
        Self::Vinyl,
        Self::Stop,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shorten => "🔗",
            Self::Utm => "🔗 UTM",
            Self::VideoNote => "📷",
            Self::Vinyl => "💿",
            Self::Stop => "🛑",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|c| c.label() == text)
    }
}

/// Caption of the "type it yourself" button in both UTM menus.
pub const CUSTOM_VALUE: &str = "Enter custom value";

/// Answer to the UTM source menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceChoice {
    Yandex,
    Vk,
    Google,
    Custom,
}

impl SourceChoice {
    pub const PRESETS: [Self; 3] = [Self::Yandex, Self::Vk, Self::Google];

    pub fn label(self) -> &'static str {
        match self {
            Self::Yandex => "Yandex",
            Self::Vk => "VK",
            Self::Google => "Google",
            Self::Custom => CUSTOM_VALUE,
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::PRESETS
            .into_iter()
            .chain([Self::Custom])
            .find(|c| c.label() == text)
    }

    /// Stored `utm_source` value for a preset.
    pub fn value(self) -> Option<String> {
        match self {
            Self::Custom => None,
            preset => Some(preset.label().to_lowercase()),
        }
    }
}

/// Answer to the UTM campaign menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CampaignChoice {
    UseSuggested,
    Custom,
}

impl CampaignChoice {
    /// Caption of the button that accepts `suggested`.
    pub fn use_label(suggested: &str) -> String {
        format!("Use: {suggested}")
    }

    pub fn from_text(text: &str, suggested: &str) -> Option<Self> {
        let text = text.trim();
        if text == CUSTOM_VALUE {
            Some(Self::Custom)
        } else if !suggested.is_empty() && text == Self::use_label(suggested) {
            Some(Self::UseSuggested)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialog/event.rs"]
mod tests;
