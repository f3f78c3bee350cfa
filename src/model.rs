use serde::{Deserialize, Serialize};

/// A single playable track. Identity is the opaque `id`; the `source` field
/// is a playable reference the model never interprets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover: String,
    pub source: String,
    /// Seconds; stays 0 until the playback device reports metadata.
    pub duration_seconds: u32,
    pub format: String,
    pub genre: String,
    pub folder_name: String,
    pub favorite: bool,
}

/// A named set of track ids. Membership is a reference, not ownership:
/// the tracks themselves live in the track store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub cover: String,
    pub track_ids: Vec<String>,
    pub favorite: bool,
}

impl Playlist {
    pub fn track_count(&self) -> usize {
        self.track_ids.len()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.track_ids.iter().any(|id| id == track_id)
    }
}

/// Point-in-time bundle of a deleted folder: the folder name plus every
/// track that carried it when the folder was trashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrashedFolder {
    pub name: String,
    pub tracks: Vec<Track>,
}

/// Derived grouping over the track store. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderView {
    pub name: String,
    pub track_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RepeatMode {
    #[default]
    None,
    One,
    All,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "sem repetição",
            Self::One => "repetir uma",
            Self::All => "repetir todas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    PitchBlack,
    Ocean,
    Sunset,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::PitchBlack,
            Self::PitchBlack => Self::Ocean,
            Self::Ocean => Self::Sunset,
            Self::Sunset => Self::Dark,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "black" | "pitchblack" => Some(Self::PitchBlack),
            "ocean" => Some(Self::Ocean),
            "sunset" => Some(Self::Sunset),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::PitchBlack => "Pitch Black",
            Self::Ocean => "Ocean",
            Self::Sunset => "Sunset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mode_cycles_through_all_variants() {
        let mut mode = RepeatMode::None;
        mode = mode.next();
        assert_eq!(mode, RepeatMode::All);
        mode = mode.next();
        assert_eq!(mode, RepeatMode::One);
        mode = mode.next();
        assert_eq!(mode, RepeatMode::None);
    }

    #[test]
    fn theme_parse_accepts_known_names_case_insensitive() {
        assert_eq!(Theme::parse("Ocean"), Some(Theme::Ocean));
        assert_eq!(Theme::parse("PITCHBLACK"), Some(Theme::PitchBlack));
        assert_eq!(Theme::parse("galaxy"), None);
    }
}
