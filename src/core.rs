use crate::ids::IdSource;
use crate::library::{self, ImportedFile};
use crate::model::{FolderView, Playlist, Track, TrashedFolder};
use std::fmt;

/// Validation failures surfaced to the user. Everything else in the model
/// either succeeds or is a silent no-op on a stale id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    EmptyPlaylistName,
    DuplicatePlaylistName(String),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPlaylistName => write!(f, "O nome da playlist não pode estar vazio."),
            Self::DuplicatePlaylistName(name) => {
                write!(f, "Já existe uma playlist chamada \"{name}\".")
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// The library state model: the track store, the playlist store, the trash
/// store and the last duplicate report, kept mutually consistent. Every
/// imported track lives in exactly one of the track store or the trash at
/// any time.
#[derive(Debug)]
pub struct LibraryCore {
    pub tracks: Vec<Track>,
    pub playlists: Vec<Playlist>,
    pub trashed_tracks: Vec<Track>,
    pub trashed_folders: Vec<TrashedFolder>,
    /// Snapshot of the last duplicate scan, as track ids in store order.
    /// Stale as soon as the track store changes, except that deleting a
    /// reported track also drops it from the snapshot.
    pub duplicate_report: Vec<String>,
    pub status: String,
    pub dirty: bool,
    ids: Box<dyn IdSource>,
}

impl LibraryCore {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self {
            tracks: Vec::new(),
            playlists: Vec::new(),
            trashed_tracks: Vec::new(),
            trashed_folders: Vec::new(),
            duplicate_report: Vec::new(),
            status: String::from("Pronto"),
            dirty: true,
            ids,
        }
    }

    pub fn with_system_ids() -> Self {
        Self::new(Box::new(crate::ids::SystemIdSource::new()))
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|playlist| playlist.id == id)
    }

    /// Import contract: synthesize one track per file and append them all,
    /// preserving existing order. No duplicate detection happens here.
    pub fn import_files(&mut self, files: &[ImportedFile], default_folder: &str) -> usize {
        for file in files {
            let id = self.ids.track_id();
            self.tracks
                .push(library::synthesize_track(file, default_folder, id));
        }
        self.set_status(&format!("Importadas {} músicas", files.len()));
        files.len()
    }

    /// Soft-delete: move the track to the trash, scrub it from every
    /// playlist membership and from the held duplicate report. Silent
    /// no-op when the id is already gone (stale UI snapshot).
    pub fn move_track_to_trash(&mut self, id: &str) {
        let Some(index) = self.tracks.iter().position(|track| track.id == id) else {
            return;
        };
        let track = self.tracks.remove(index);
        for playlist in &mut self.playlists {
            playlist.track_ids.retain(|track_id| track_id != id);
        }
        self.duplicate_report.retain(|track_id| track_id != id);
        self.set_status(&format!("Movida para a lixeira: {}", track.title));
        self.trashed_tracks.push(track);
    }

    /// Soft-delete a whole folder as one bundle. Playlist membership is
    /// deliberately left untouched here; see `move_track_to_trash` for the
    /// single-track contract.
    pub fn move_folder_to_trash(&mut self, name: &str) {
        let (moved, kept): (Vec<Track>, Vec<Track>) = std::mem::take(&mut self.tracks)
            .into_iter()
            .partition(|track| track.folder_name == name);
        self.tracks = kept;
        if moved.is_empty() {
            return;
        }
        self.set_status(&format!("Pasta movida para a lixeira: {name}"));
        self.trashed_folders.push(TrashedFolder {
            name: name.to_string(),
            tracks: moved,
        });
    }

    /// Move a trashed track back to the track store. It is appended at the
    /// end; the original position is not recorded.
    pub fn restore_track(&mut self, id: &str) {
        let Some(index) = self.trashed_tracks.iter().position(|track| track.id == id) else {
            return;
        };
        let track = self.trashed_tracks.remove(index);
        self.set_status(&format!("Música restaurada: {}", track.title));
        self.tracks.push(track);
    }

    pub fn restore_folder(&mut self, name: &str) {
        let Some(index) = self
            .trashed_folders
            .iter()
            .position(|folder| folder.name == name)
        else {
            return;
        };
        let folder = self.trashed_folders.remove(index);
        self.tracks.extend(folder.tracks);
        self.set_status(&format!("Pasta restaurada: {name}"));
    }

    /// Permanent delete. Terminal: the id can never come back.
    pub fn purge_track(&mut self, id: &str) {
        let before = self.trashed_tracks.len();
        self.trashed_tracks.retain(|track| track.id != id);
        if self.trashed_tracks.len() != before {
            self.set_status("Música eliminada definitivamente");
        }
    }

    pub fn purge_folder(&mut self, name: &str) {
        let before = self.trashed_folders.len();
        self.trashed_folders.retain(|folder| folder.name != name);
        if self.trashed_folders.len() != before {
            self.set_status(&format!("Pasta eliminada definitivamente: {name}"));
        }
    }

    pub fn empty_trash(&mut self) {
        self.trashed_tracks.clear();
        self.trashed_folders.clear();
        self.set_status("Lixeira esvaziada");
    }

    /// Create a playlist. The trimmed name must be non-empty and unique
    /// among playlists (exact, case-sensitive match). Returns the new id.
    pub fn create_playlist(
        &mut self,
        name: &str,
        initial_track_ids: &[String],
    ) -> Result<String, LibraryError> {
        let name = name.trim();
        self.validate_playlist_name(name, None)?;

        let cover = initial_track_ids
            .first()
            .and_then(|id| self.track(id))
            .map(|track| track.cover.clone())
            .unwrap_or_else(|| library::cover_placeholder(name));

        let mut track_ids = Vec::new();
        for id in initial_track_ids {
            if !track_ids.contains(id) {
                track_ids.push(id.clone());
            }
        }

        let id = self.ids.playlist_id();
        self.playlists.push(Playlist {
            id: id.clone(),
            name: name.to_string(),
            cover,
            track_ids,
            favorite: false,
        });
        self.set_status(&format!("Playlist criada: {name}"));
        Ok(id)
    }

    /// Rename with the same validation as create, ignoring the playlist
    /// being renamed in the duplicate check. Silent no-op on a stale id.
    pub fn rename_playlist(&mut self, id: &str, new_name: &str) -> Result<(), LibraryError> {
        if self.playlist(id).is_none() {
            return Ok(());
        }
        let new_name = new_name.trim();
        self.validate_playlist_name(new_name, Some(id))?;

        if let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == id) {
            playlist.name = new_name.to_string();
        }
        self.set_status(&format!("Playlist renomeada: {new_name}"));
        Ok(())
    }

    /// Merge track ids into a playlist with set semantics: adding a track
    /// twice leaves a single membership entry.
    pub fn add_tracks_to_playlist(&mut self, id: &str, track_ids: &[String]) {
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == id) else {
            return;
        };
        let mut added = 0;
        for track_id in track_ids {
            if !playlist.contains(track_id) {
                playlist.track_ids.push(track_id.clone());
                added += 1;
            }
        }
        let name = playlist.name.clone();
        self.set_status(&format!("{added} músicas adicionadas a {name}"));
    }

    pub fn remove_track_from_playlist(&mut self, id: &str, track_id: &str) {
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == id) else {
            return;
        };
        playlist.track_ids.retain(|existing| existing != track_id);
        self.set_status("Música removida da playlist");
    }

    /// Remove a playlist outright. A caller viewing it learns of the
    /// deletion by the id no longer resolving.
    pub fn delete_playlist(&mut self, id: &str) {
        let before = self.playlists.len();
        self.playlists.retain(|playlist| playlist.id != id);
        if self.playlists.len() != before {
            self.set_status("Playlist apagada");
        }
    }

    pub fn toggle_track_favorite(&mut self, id: &str) {
        if let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) {
            track.favorite = !track.favorite;
            self.dirty = true;
        }
    }

    pub fn toggle_playlist_favorite(&mut self, id: &str) {
        if let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == id) {
            playlist.favorite = !playlist.favorite;
            self.dirty = true;
        }
    }

    /// Recompute the duplicate report from the current track store. Pure
    /// with respect to the track store; only the held snapshot changes.
    pub fn scan_duplicates(&mut self) -> &[String] {
        self.duplicate_report = library::find_duplicates(&self.tracks);
        self.set_status(&format!(
            "Encontradas {} músicas duplicadas",
            self.duplicate_report.len()
        ));
        &self.duplicate_report
    }

    pub fn folders(&self) -> Vec<FolderView> {
        library::folder_projection(&self.tracks)
    }

    /// Folders are derived, so a rename is a bulk rewrite of the folder
    /// attribute over matching tracks.
    pub fn rename_folder(&mut self, old_name: &str, new_name: &str) {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return;
        }
        let mut renamed = 0;
        for track in &mut self.tracks {
            if track.folder_name == old_name {
                track.folder_name = new_name.to_string();
                renamed += 1;
            }
        }
        if renamed > 0 {
            self.set_status(&format!("Pasta renomeada para {new_name}"));
        }
    }

    /// Write the duration reported by the playback device into the track
    /// store entry. Misses are stale notifications and are dropped.
    pub fn set_track_duration(&mut self, id: &str, duration_seconds: u32) {
        if let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) {
            track.duration_seconds = duration_seconds;
            self.dirty = true;
        }
    }

    fn validate_playlist_name(
        &self,
        trimmed: &str,
        exclude_id: Option<&str>,
    ) -> Result<(), LibraryError> {
        if trimmed.is_empty() {
            return Err(LibraryError::EmptyPlaylistName);
        }
        let clash = self
            .playlists
            .iter()
            .filter(|playlist| exclude_id != Some(playlist.id.as_str()))
            .any(|playlist| playlist.name == trimmed);
        if clash {
            return Err(LibraryError::DuplicatePlaylistName(trimmed.to_string()));
        }
        Ok(())
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}
