use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::foundation::core::SessionId;
use crate::foundation::error::BotResult;

/// Role of a temporary file inside one flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Downloaded input video.
    Video,
    /// Downloaded still image.
    Image,
    /// Downloaded audio track.
    Audio,
    /// Finished artifact handed to the transport.
    Output,
}

impl AssetKind {
    /// Short tag used in generated file names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Output => "note",
        }
    }

    /// Extension used when the upload does not carry a usable one.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Video | Self::Output => "mp4",
            Self::Image => "jpg",
            Self::Audio => "mp3",
        }
    }
}

/// A session-scoped temporary file.
///
/// The file is removed when the value is dropped, so every exit path of a flow (success, handled
/// failure, cancellation, background job completion) cleans up by letting the asset go out of
/// scope.
#[derive(Debug)]
pub struct MediaAsset {
    path: PathBuf,
    kind: AssetKind,
    declared_mime: Option<String>,
}

impl MediaAsset {
    /// Path of the backing file (it may not exist yet).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Role of this file in its flow.
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// MIME type declared by the sender, when known.
    pub fn declared_mime(&self) -> Option<&str> {
        self.declared_mime.as_deref()
    }

    /// Current byte size on disk (0 when the file has not been written).
    pub fn size_bytes(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// `true` once something has been written to the path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Drop for MediaAsset {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), kind = self.kind.tag(), "removed media asset"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove media asset"),
        }
    }
}

/// Directory that hands out unique, session-tagged temporary file paths.
///
/// Every reserved path carries a fresh UUID, so two jobs for the same session never share a
/// file name.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create (if needed) and wrap the workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> BotResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create work directory '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Workspace directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a new unique path. Nothing is written until a producer fills it.
    pub fn reserve(
        &self,
        session: SessionId,
        kind: AssetKind,
        extension: Option<&str>,
        declared_mime: Option<String>,
    ) -> MediaAsset {
        let ext = extension
            .map(|e| e.trim_start_matches('.'))
            .filter(|e| is_safe_extension(e))
            .unwrap_or_else(|| kind.default_extension());
        let name = format!(
            "{}-{}-{}.{}",
            session.0,
            kind.tag(),
            uuid::Uuid::new_v4().simple(),
            ext.to_ascii_lowercase()
        );
        MediaAsset {
            path: self.root.join(name),
            kind,
            declared_mime,
        }
    }
}

/// Pick a file extension from an upload's file name, falling back to its MIME subtype.
pub fn extension_hint<'a>(file_name: Option<&'a str>, mime: Option<&'a str>) -> Option<&'a str> {
    let from_name = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str());
    from_name.or_else(|| match mime? {
        "image/jpeg" => Some("jpg"),
        "audio/mpeg" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        "video/quicktime" => Some("mov"),
        m => m.split_once('/').map(|(_, sub)| sub),
    })
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
#[path = "../../tests/unit/media/asset.rs"]
mod tests;
