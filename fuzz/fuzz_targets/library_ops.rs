#![no_main]

use bossa::core::LibraryCore;
use bossa::ids::SequentialIdSource;
use bossa::library::{FOLDER_IMPORTED, ImportedFile};
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

fuzz_target!(|data: &[u8]| {
    let mut core = LibraryCore::new(Box::new(SequentialIdSource::new()));
    let seed = (data.len() % 8).max(1);
    let files: Vec<ImportedFile> = (0..seed)
        .map(|idx| ImportedFile::new(&format!("track_{idx}.mp3"), "", &format!("blob:{idx}")))
        .collect();
    core.import_files(&files, FOLDER_IMPORTED);

    for byte in data {
        let pick = |pool: &[String]| -> Option<String> {
            if pool.is_empty() {
                None
            } else {
                Some(pool[usize::from(*byte) % pool.len()].clone())
            }
        };
        let track_ids: Vec<String> = core.tracks.iter().map(|t| t.id.clone()).collect();
        let trashed_ids: Vec<String> = core.trashed_tracks.iter().map(|t| t.id.clone()).collect();

        match byte % 9 {
            0 => {
                let file = ImportedFile::new(
                    &format!("extra_{byte}.mp3"),
                    "",
                    &format!("blob:extra_{byte}"),
                );
                core.import_files(&[file], FOLDER_IMPORTED);
            }
            1 => {
                if let Some(id) = pick(&track_ids) {
                    core.move_track_to_trash(&id);
                }
            }
            2 => core.move_folder_to_trash(FOLDER_IMPORTED),
            3 => {
                if let Some(id) = pick(&trashed_ids) {
                    core.restore_track(&id);
                }
            }
            4 => core.restore_folder(FOLDER_IMPORTED),
            5 => {
                if let Some(id) = pick(&trashed_ids) {
                    core.purge_track(&id);
                }
            }
            6 => {
                let _ = core.create_playlist(&format!("lista_{byte}"), &track_ids);
            }
            7 => {
                let _ = core.scan_duplicates();
            }
            _ => core.empty_trash(),
        }

        // A track id may appear in the track store, the trashed-track
        // list or one trashed folder bundle, never in more than one.
        let mut seen = HashSet::new();
        for id in core
            .tracks
            .iter()
            .map(|t| t.id.as_str())
            .chain(core.trashed_tracks.iter().map(|t| t.id.as_str()))
            .chain(
                core.trashed_folders
                    .iter()
                    .flat_map(|f| f.tracks.iter().map(|t| t.id.as_str())),
            )
        {
            assert!(seen.insert(id), "track {id} appears in two stores");
        }
    }
});
