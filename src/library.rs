use crate::model::{FolderView, Track};
use std::collections::HashSet;

/// Default folder for tracks discovered by the simulated memory scan.
pub const FOLDER_INTERNAL_MEMORY: &str = "Memória Interna";
/// Default folder for tracks brought in through the file picker.
pub const FOLDER_IMPORTED: &str = "Importado";

pub const UNKNOWN_ARTIST: &str = "Desconhecido";
pub const LOCAL_ALBUM: &str = "Local";
pub const LOCAL_GENRE: &str = "Local";

const FALLBACK_FORMAT: &str = "AUDIO";

/// What the import source (file picker or scan) hands over per file. The
/// byte content never reaches the model; `source` is an opaque playable
/// reference passed straight through to the track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub name: String,
    /// Relative path when the picker selected a directory, empty otherwise.
    pub relative_path: String,
    pub source: String,
}

impl ImportedFile {
    pub fn new(name: &str, relative_path: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            source: source.to_string(),
        }
    }
}

/// Build a track from an imported file. Title is the filename without its
/// extension, format is the uppercased extension, folder is the first
/// segment of the relative path when one exists.
pub fn synthesize_track(file: &ImportedFile, default_folder: &str, id: String) -> Track {
    let folder_name = first_path_segment(&file.relative_path)
        .unwrap_or(default_folder)
        .to_string();

    Track {
        id,
        title: strip_extension(&file.name).to_string(),
        artist: UNKNOWN_ARTIST.to_string(),
        album: LOCAL_ALBUM.to_string(),
        cover: cover_placeholder(&file.name),
        source: file.source.clone(),
        duration_seconds: 0,
        format: format_from_name(&file.name),
        genre: LOCAL_GENRE.to_string(),
        folder_name,
        favorite: false,
    }
}

pub fn cover_placeholder(seed: &str) -> String {
    format!("https://picsum.photos/seed/{seed}/400/400")
}

/// Report every track whose case-insensitive (title, artist) pair was
/// already seen earlier in the store, in store order. The first occurrence
/// of each pair is considered the original and is not reported.
pub fn find_duplicates(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for track in tracks {
        let key = (track.title.to_lowercase(), track.artist.to_lowercase());
        if !seen.insert(key) {
            duplicates.push(track.id.clone());
        }
    }
    duplicates
}

/// Group the track store by folder name, in first-seen order.
pub fn folder_projection(tracks: &[Track]) -> Vec<FolderView> {
    let mut folders: Vec<FolderView> = Vec::new();
    for track in tracks {
        match folders.iter_mut().find(|f| f.name == track.folder_name) {
            Some(folder) => folder.track_count += 1,
            None => folders.push(FolderView {
                name: track.folder_name.clone(),
                track_count: 1,
            }),
        }
    }
    folders
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn format_from_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => name[idx + 1..].to_ascii_uppercase(),
        _ => FALLBACK_FORMAT.to_string(),
    }
}

fn first_path_segment(relative_path: &str) -> Option<&str> {
    if relative_path.is_empty() {
        return None;
    }
    let segment = relative_path.split('/').next().unwrap_or(relative_path);
    (!segment.is_empty()).then_some(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: LOCAL_ALBUM.to_string(),
            cover: String::new(),
            source: String::new(),
            duration_seconds: 0,
            format: String::from("MP3"),
            genre: LOCAL_GENRE.to_string(),
            folder_name: FOLDER_IMPORTED.to_string(),
            favorite: false,
        }
    }

    #[test]
    fn synthesize_strips_extension_and_uppercases_format() {
        let file = ImportedFile::new("Track.mp3", "", "blob:1");
        let track = synthesize_track(&file, FOLDER_IMPORTED, String::from("t1"));
        assert_eq!(track.title, "Track");
        assert_eq!(track.format, "MP3");
        assert_eq!(track.folder_name, FOLDER_IMPORTED);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.duration_seconds, 0);
        assert!(!track.favorite);
    }

    #[test]
    fn synthesize_takes_folder_from_first_relative_path_segment() {
        let file = ImportedFile::new("faixa.flac", "Álbuns/2024/faixa.flac", "blob:2");
        let track = synthesize_track(&file, FOLDER_IMPORTED, String::from("t1"));
        assert_eq!(track.folder_name, "Álbuns");
        assert_eq!(track.format, "FLAC");
    }

    #[test]
    fn synthesize_without_extension_uses_fallback_format() {
        let file = ImportedFile::new("gravacao", "", "blob:3");
        let track = synthesize_track(&file, FOLDER_INTERNAL_MEMORY, String::from("t1"));
        assert_eq!(track.title, "gravacao");
        assert_eq!(track.format, "AUDIO");
        assert_eq!(track.folder_name, FOLDER_INTERNAL_MEMORY);
    }

    #[test]
    fn dotfile_name_is_kept_as_title() {
        let file = ImportedFile::new(".escondida", "", "blob:4");
        let track = synthesize_track(&file, FOLDER_IMPORTED, String::from("t1"));
        assert_eq!(track.title, ".escondida");
        assert_eq!(track.format, "AUDIO");
    }

    #[test]
    fn duplicates_match_case_insensitively_and_keep_first() {
        let tracks = vec![
            track("t1", "Song A", "X"),
            track("t2", "song a", "x"),
            track("t3", "Song B", "Y"),
        ];
        assert_eq!(find_duplicates(&tracks), vec![String::from("t2")]);
    }

    #[test]
    fn duplicates_are_reported_in_store_order() {
        let tracks = vec![
            track("t1", "a", "x"),
            track("t2", "b", "y"),
            track("t3", "A", "X"),
            track("t4", "B", "Y"),
            track("t5", "a", "x"),
        ];
        assert_eq!(find_duplicates(&tracks), vec!["t3", "t4", "t5"]);
    }

    #[test]
    fn duplicate_detection_is_idempotent() {
        let tracks = vec![track("t1", "a", "x"), track("t2", "A", "x")];
        assert_eq!(find_duplicates(&tracks), find_duplicates(&tracks));
    }

    #[test]
    fn folder_projection_counts_in_first_seen_order() {
        let mut tracks = vec![track("t1", "a", "x"), track("t2", "b", "y")];
        tracks[1].folder_name = String::from("Memória Interna");
        tracks.push(track("t3", "c", "z"));

        let folders = folder_projection(&tracks);
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].name, FOLDER_IMPORTED);
        assert_eq!(folders[0].track_count, 2);
        assert_eq!(folders[1].name, "Memória Interna");
        assert_eq!(folders[1].track_count, 1);
    }
}
