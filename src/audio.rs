use crate::model::Track;
use crate::playback::UNSUPPORTED_FORMAT_ERROR;
use anyhow::Result;
use std::time::{Duration, Instant};

const MAX_VOLUME: f32 = 2.0;

/// Formats the playback device accepts, matching the mobile picker list.
const SUPPORTED_FORMATS: &[&str] = &[
    "MP3", "AAC", "WAV", "FLAC", "OGG", "M4A", "OPUS", "AMR", "PCM",
];

/// The playback device collaborator. The model never decodes audio; it
/// hands a track over and polls the device for position, duration and
/// completion, translating those into player-session signals.
pub trait AudioEngine {
    fn play(&mut self, track: &Track) -> Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_paused(&self) -> bool;
    fn current_source(&self) -> Option<&str>;
    fn position(&self) -> Option<Duration>;
    fn duration(&self) -> Option<Duration>;
    fn is_finished(&self) -> bool;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
}

/// Wall-clock playback device: no decoding, just a logical position that
/// advances while playing and freezes on pause. Duration comes from the
/// track's own metadata once known; a synthetic default stands in before
/// that, standing in for the device's metadata probe.
pub struct SimulatedAudioEngine {
    paused: bool,
    current: Option<String>,
    volume: f32,
    started_at: Option<Instant>,
    position_offset: Duration,
    track_duration: Option<Duration>,
}

const SYNTHETIC_DURATION: Duration = Duration::from_secs(180);

impl SimulatedAudioEngine {
    pub fn new() -> Self {
        Self {
            paused: false,
            current: None,
            volume: 1.0,
            started_at: None,
            position_offset: Duration::ZERO,
            track_duration: None,
        }
    }

    fn current_position(&self) -> Duration {
        let mut position = self.position_offset;
        if !self.paused
            && self.current.is_some()
            && let Some(started_at) = self.started_at
        {
            position = position.saturating_add(started_at.elapsed());
        }
        if let Some(duration) = self.track_duration {
            return position.min(duration);
        }
        position
    }
}

impl Default for SimulatedAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for SimulatedAudioEngine {
    fn play(&mut self, track: &Track) -> Result<()> {
        let supported = SUPPORTED_FORMATS
            .iter()
            .any(|format| track.format.eq_ignore_ascii_case(format));
        if !supported {
            anyhow::bail!("{UNSUPPORTED_FORMAT_ERROR}");
        }

        self.paused = false;
        self.current = Some(track.source.clone());
        self.started_at = Some(Instant::now());
        self.position_offset = Duration::ZERO;
        self.track_duration = if track.duration_seconds > 0 {
            Some(Duration::from_secs(u64::from(track.duration_seconds)))
        } else {
            Some(SYNTHETIC_DURATION)
        };
        Ok(())
    }

    fn pause(&mut self) {
        self.position_offset = self.current_position();
        self.started_at = None;
        self.paused = true;
    }

    fn resume(&mut self) {
        if self.current.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.paused = false;
    }

    fn stop(&mut self) {
        self.current = None;
        self.paused = false;
        self.started_at = None;
        self.position_offset = Duration::ZERO;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_source(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.current_position())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn is_finished(&self) -> bool {
        let Some(duration) = self.track_duration else {
            return false;
        };
        self.current.is_some() && !self.paused && self.current_position() >= duration
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{FOLDER_IMPORTED, ImportedFile, synthesize_track};
    use std::thread;

    fn track(name: &str) -> Track {
        let file = ImportedFile::new(name, "", &format!("blob:{name}"));
        synthesize_track(&file, FOLDER_IMPORTED, String::from("t1"))
    }

    #[test]
    fn position_advances_while_playing() {
        let mut engine = SimulatedAudioEngine::new();
        engine.play(&track("a.mp3")).expect("play");
        let before = engine.position().expect("position");
        thread::sleep(Duration::from_millis(20));
        let after = engine.position().expect("position");
        assert!(after > before);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut engine = SimulatedAudioEngine::new();
        engine.play(&track("a.mp3")).expect("play");
        thread::sleep(Duration::from_millis(20));

        engine.pause();
        let paused = engine.position().expect("position");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(engine.position().expect("position"), paused);

        engine.resume();
        thread::sleep(Duration::from_millis(20));
        assert!(engine.position().expect("position") > paused);
    }

    #[test]
    fn known_duration_bounds_position_and_finishes() {
        let mut engine = SimulatedAudioEngine::new();
        let mut short = track("a.mp3");
        short.duration_seconds = 1;
        engine.play(&short).expect("play");
        assert_eq!(engine.duration(), Some(Duration::from_secs(1)));
        assert!(!engine.is_finished());
    }

    #[test]
    fn unsupported_format_is_rejected_with_user_message() {
        let mut engine = SimulatedAudioEngine::new();
        let err = engine.play(&track("nota.txt")).expect_err("must fail");
        assert_eq!(err.to_string(), UNSUPPORTED_FORMAT_ERROR);
        assert!(engine.current_source().is_none());
    }

    #[test]
    fn unknown_duration_uses_synthetic_default() {
        let mut engine = SimulatedAudioEngine::new();
        engine.play(&track("a.flac")).expect("play");
        assert_eq!(engine.duration(), Some(SYNTHETIC_DURATION));
    }

    #[test]
    fn volume_is_clamped() {
        let mut engine = SimulatedAudioEngine::new();
        engine.set_volume(5.0);
        assert_eq!(engine.volume(), MAX_VOLUME);
        engine.set_volume(-1.0);
        assert_eq!(engine.volume(), 0.0);
    }
}
