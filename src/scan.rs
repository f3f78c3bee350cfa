use crate::library::ImportedFile;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    Internal,
    External,
}

impl ScanSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "Memória Interna",
            Self::External => "Cartão SD",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "internal" | "interna" => Some(Self::Internal),
            "external" | "externa" | "sd" => Some(Self::External),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUpdate {
    /// 0..=100, never decreases across updates of one scan.
    pub progress: u8,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Running,
    Completed,
    Abandoned,
}

/// Simulated device-memory scan: a cooperative progress sequence the event
/// loop ticks between frames. Nothing is read from disk; completion yields
/// a fixed set of discovered files for the import contract.
#[derive(Debug)]
pub struct MemoryScan {
    source: ScanSource,
    progress: u8,
    phase: ScanPhase,
    rng: SmallRng,
}

impl MemoryScan {
    pub fn start(source: ScanSource) -> Self {
        Self {
            source,
            progress: 0,
            phase: ScanPhase::Running,
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn source(&self) -> ScanSource {
        self.source
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.phase == ScanPhase::Running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == ScanPhase::Completed
    }

    /// Advance the simulation one step. Returns the update to display, or
    /// `None` once the scan is no longer running.
    pub fn tick(&mut self) -> Option<ScanUpdate> {
        if self.phase != ScanPhase::Running {
            return None;
        }

        let step: u8 = self.rng.random_range(3..13);
        self.progress = self.progress.saturating_add(step).min(100);
        if self.progress == 100 {
            self.phase = ScanPhase::Completed;
        }

        Some(ScanUpdate {
            progress: self.progress,
            status: status_for(self.source, self.progress),
        })
    }

    /// Abandon the scan; no discovered files are handed over.
    pub fn cancel(&mut self) {
        if self.phase == ScanPhase::Running {
            self.phase = ScanPhase::Abandoned;
        }
    }

    /// Files found by a completed scan. Abandoned or still-running scans
    /// yield nothing.
    pub fn into_discovered(self) -> Vec<ImportedFile> {
        if self.phase != ScanPhase::Completed {
            return Vec::new();
        }
        discovered_files(self.source)
    }
}

fn status_for(source: ScanSource, progress: u8) -> String {
    let label = source.label();
    match progress {
        0..=24 => format!("A iniciar análise de {label}..."),
        25..=54 => String::from("A procurar ficheiros de áudio..."),
        55..=84 => String::from("A ler metadados..."),
        85..=99 => String::from("A concluir..."),
        _ => String::from("Análise concluída."),
    }
}

fn discovered_files(source: ScanSource) -> Vec<ImportedFile> {
    match source {
        ScanSource::Internal => vec![
            ImportedFile::new("Horizonte Azul.mp3", "", "mem://interna/horizonte-azul"),
            ImportedFile::new("Noite em Lisboa.flac", "", "mem://interna/noite-em-lisboa"),
            ImportedFile::new("Caminho do Mar.m4a", "", "mem://interna/caminho-do-mar"),
        ],
        ScanSource::External => vec![
            ImportedFile::new("Festa no Quintal.mp3", "", "mem://sd/festa-no-quintal"),
            ImportedFile::new("Saudade.ogg", "", "mem://sd/saudade"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotone_and_terminates_at_100() {
        let mut scan = MemoryScan::start(ScanSource::Internal);
        let mut last = 0;
        let mut ticks = 0;
        while let Some(update) = scan.tick() {
            assert!(update.progress >= last);
            assert!(update.progress <= 100);
            last = update.progress;
            ticks += 1;
            assert!(ticks <= 100, "scan never finished");
        }
        assert_eq!(last, 100);
        assert!(scan.is_completed());
    }

    #[test]
    fn completed_internal_scan_yields_discovered_files() {
        let mut scan = MemoryScan::start(ScanSource::Internal);
        while scan.tick().is_some() {}
        let files = scan.into_discovered();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.relative_path.is_empty()));
    }

    #[test]
    fn external_scan_discovers_a_different_set() {
        let mut scan = MemoryScan::start(ScanSource::External);
        while scan.tick().is_some() {}
        let files = scan.into_discovered();
        assert_eq!(files.len(), 2);
        assert!(files[0].source.starts_with("mem://sd/"));
    }

    #[test]
    fn cancelled_scan_yields_nothing_and_stops_ticking() {
        let mut scan = MemoryScan::start(ScanSource::External);
        scan.tick();
        scan.cancel();
        assert!(scan.tick().is_none());
        assert!(!scan.is_completed());
        assert!(scan.into_discovered().is_empty());
    }

    #[test]
    fn status_strings_follow_progress_brackets() {
        assert!(status_for(ScanSource::Internal, 10).contains("Memória Interna"));
        assert_eq!(status_for(ScanSource::Internal, 40), "A procurar ficheiros de áudio...");
        assert_eq!(status_for(ScanSource::Internal, 70), "A ler metadados...");
        assert_eq!(status_for(ScanSource::Internal, 90), "A concluir...");
        assert_eq!(status_for(ScanSource::Internal, 100), "Análise concluída.");
    }
}
