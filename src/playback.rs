use crate::core::LibraryCore;
use crate::model::RepeatMode;
use std::time::Duration;

/// User-facing playback failure, mirroring the mobile build this player
/// came from.
pub const UNSUPPORTED_FORMAT_ERROR: &str = "Erro: Formato não suportado pelo sistema.";

/// Player session state. The playback device is a collaborator that pushes
/// four signals at us (time progress, metadata, end of media, error); the
/// session reacts and never touches the device itself.
#[derive(Debug, Default)]
pub struct Player {
    pub current: Option<String>,
    pub playing: bool,
    pub position: Duration,
    pub reported_duration: Option<Duration>,
    pub repeat: RepeatMode,
    pub error: Option<String>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a track for playback. Clears any previous error.
    pub fn play_track(&mut self, core: &LibraryCore, id: &str) -> bool {
        if core.track(id).is_none() {
            return false;
        }
        self.current = Some(id.to_string());
        self.playing = true;
        self.position = Duration::ZERO;
        self.reported_duration = None;
        self.error = None;
        true
    }

    pub fn on_time_progress(&mut self, position: Duration) {
        self.position = position;
    }

    /// Metadata arrived for `track_id`. The duration is written into the
    /// track store regardless; the session only adopts it when the signal
    /// is for the track still being played.
    pub fn on_metadata_ready(&mut self, core: &mut LibraryCore, track_id: &str, duration: Duration) {
        core.set_track_duration(track_id, duration.as_secs() as u32);
        if self.current.as_deref() == Some(track_id) {
            self.reported_duration = Some(duration);
        }
    }

    /// End of media: advance. Repeat-one restarts the same track; the
    /// other modes wrap around the track store like the original player.
    /// Returns the id the device should play next, if any.
    pub fn on_ended(&mut self, core: &LibraryCore) -> Option<String> {
        if self.repeat == RepeatMode::One {
            let id = self.current.clone()?;
            self.play_track(core, &id);
            return Some(id);
        }
        self.next(core)
    }

    /// Playback failure: surface the error and halt. The library stores
    /// are not involved at all.
    pub fn on_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.playing = false;
    }

    pub fn next(&mut self, core: &LibraryCore) -> Option<String> {
        self.advance(core, 1)
    }

    pub fn prev(&mut self, core: &LibraryCore) -> Option<String> {
        self.advance(core, -1)
    }

    /// Drop the session when its track left the track store (deleted or
    /// trashed from under us).
    pub fn ensure_current(&mut self, core: &LibraryCore) {
        if let Some(id) = &self.current
            && core.track(id).is_none()
        {
            self.current = None;
            self.playing = false;
            self.position = Duration::ZERO;
            self.reported_duration = None;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.current.is_some() {
            self.playing = !self.playing;
        }
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.next();
    }

    fn advance(&mut self, core: &LibraryCore, step: isize) -> Option<String> {
        if core.tracks.is_empty() {
            return None;
        }
        let len = core.tracks.len() as isize;
        let index = self
            .current
            .as_deref()
            .and_then(|id| core.tracks.iter().position(|t| t.id == id))
            .map(|idx| (idx as isize + step).rem_euclid(len))
            .unwrap_or(0);

        let id = core.tracks[index as usize].id.clone();
        self.play_track(core, &id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdSource;
    use crate::library::{FOLDER_IMPORTED, ImportedFile};

    fn core_with_tracks(names: &[&str]) -> LibraryCore {
        let mut core = LibraryCore::new(Box::new(SequentialIdSource::new()));
        let files: Vec<ImportedFile> = names
            .iter()
            .map(|name| ImportedFile::new(name, "", &format!("blob:{name}")))
            .collect();
        core.import_files(&files, FOLDER_IMPORTED);
        core
    }

    #[test]
    fn next_and_prev_wrap_around() {
        let core = core_with_tracks(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut player = Player::new();
        player.play_track(&core, &core.tracks[2].id);

        assert_eq!(player.next(&core), Some(core.tracks[0].id.clone()));
        assert_eq!(player.prev(&core), Some(core.tracks[2].id.clone()));
    }

    #[test]
    fn ended_with_repeat_one_restarts_same_track() {
        let core = core_with_tracks(&["a.mp3", "b.mp3"]);
        let mut player = Player::new();
        player.play_track(&core, &core.tracks[0].id);
        player.repeat = RepeatMode::One;

        assert_eq!(player.on_ended(&core), Some(core.tracks[0].id.clone()));
        assert!(player.playing);
    }

    #[test]
    fn ended_advances_and_keeps_playing() {
        let core = core_with_tracks(&["a.mp3", "b.mp3"]);
        let mut player = Player::new();
        player.play_track(&core, &core.tracks[0].id);

        assert_eq!(player.on_ended(&core), Some(core.tracks[1].id.clone()));
        assert!(player.playing);
    }

    #[test]
    fn metadata_updates_store_and_session_duration() {
        let mut core = core_with_tracks(&["a.mp3"]);
        let id = core.tracks[0].id.clone();
        let mut player = Player::new();
        player.play_track(&core, &id);

        player.on_metadata_ready(&mut core, &id, Duration::from_secs(215));

        assert_eq!(core.tracks[0].duration_seconds, 215);
        assert_eq!(player.reported_duration, Some(Duration::from_secs(215)));
    }

    #[test]
    fn stale_metadata_updates_store_but_not_session() {
        let mut core = core_with_tracks(&["a.mp3", "b.mp3"]);
        let previous = core.tracks[0].id.clone();
        let current = core.tracks[1].id.clone();
        let mut player = Player::new();
        player.play_track(&core, &current);

        player.on_metadata_ready(&mut core, &previous, Duration::from_secs(90));

        assert_eq!(core.tracks[0].duration_seconds, 90);
        assert_eq!(player.reported_duration, None);
    }

    #[test]
    fn error_halts_playback_without_touching_stores() {
        let core = core_with_tracks(&["a.amr"]);
        let mut player = Player::new();
        player.play_track(&core, &core.tracks[0].id);

        player.on_error(UNSUPPORTED_FORMAT_ERROR);

        assert!(!player.playing);
        assert_eq!(player.error.as_deref(), Some(UNSUPPORTED_FORMAT_ERROR));
        assert_eq!(core.tracks.len(), 1);
    }

    #[test]
    fn deleting_the_playing_track_clears_the_session() {
        let mut core = core_with_tracks(&["a.mp3", "b.mp3"]);
        let id = core.tracks[0].id.clone();
        let mut player = Player::new();
        player.play_track(&core, &id);

        core.move_track_to_trash(&id);
        player.ensure_current(&core);

        assert_eq!(player.current, None);
        assert!(!player.playing);
    }

    #[test]
    fn next_after_session_loss_starts_from_the_top() {
        let core = core_with_tracks(&["a.mp3", "b.mp3"]);
        let mut player = Player::new();

        assert_eq!(player.next(&core), Some(core.tracks[0].id.clone()));
    }
}
