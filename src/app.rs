use crate::audio::{AudioEngine, SimulatedAudioEngine};
use crate::config::{self, Settings};
use crate::core::LibraryCore;
use crate::insight::{InsightService, TcpInsightService, TrackInsight};
use crate::library::{FOLDER_IMPORTED, ImportedFile};
use crate::model::Theme;
use crate::playback::Player;
use crate::scan::{MemoryScan, ScanSource};
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SCAN_TICK_INTERVAL: Duration = Duration::from_millis(150);

const HELP_STATUS: &str = "Comandos: import, scan, duplicates, playlist, folder, trash, analyze, theme, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Library,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTab {
    Tracks,
    Folders,
    Playlists,
    Trash,
}

/// One selectable line in the main panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Track(String),
    Folder(String),
    Playlist(String),
    /// Membership entry inside an opened playlist. May not resolve when a
    /// trashed folder took the track with it.
    PlaylistEntry(String),
    TrashedTrack(String),
    TrashedFolder(String),
    ThemeSetting,
    InsightSetting,
}

/// Presentation state. Everything here is about what the user is looking
/// at; the library model itself lives in `LibraryCore` and knows nothing
/// about tabs or selections.
pub struct Shell {
    pub tab: Tab,
    pub sub_tab: SubTab,
    pub selected: usize,
    pub viewing_folder: Option<String>,
    pub viewing_playlist: Option<String>,
    pub player: Player,
    pub scan: Option<MemoryScan>,
    pub scan_status: String,
    pub insight: Option<(String, TrackInsight)>,
    pub theme: Theme,
    pub command_mode: bool,
    pub command_buffer: String,
    pub dirty: bool,
    insight_addr: Option<String>,
    insight_tx: mpsc::Sender<(String, TrackInsight)>,
    insight_rx: mpsc::Receiver<(String, TrackInsight)>,
    last_scan_tick: Instant,
    should_quit: bool,
}

impl Shell {
    pub fn new(settings: &Settings) -> Self {
        let (insight_tx, insight_rx) = mpsc::channel();
        Self {
            tab: Tab::Library,
            sub_tab: SubTab::Tracks,
            selected: 0,
            viewing_folder: None,
            viewing_playlist: None,
            player: Player::new(),
            scan: None,
            scan_status: String::new(),
            insight: None,
            theme: settings.theme,
            command_mode: false,
            command_buffer: String::new(),
            dirty: true,
            insight_addr: settings.insight_addr.clone(),
            insight_tx,
            insight_rx,
            last_scan_tick: Instant::now(),
            should_quit: false,
        }
    }
}

pub fn run(settings: Settings) -> Result<()> {
    let mut core = LibraryCore::with_system_ids();
    let mut shell = Shell::new(&settings);
    let mut engine = SimulatedAudioEngine::new();

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to build terminal")?;

    let result = event_loop(&mut terminal, &mut core, &mut shell, &mut engine);

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        cursor::Show
    )
    .context("failed to leave alternate screen")?;

    let settings = Settings {
        theme: shell.theme,
        insight_addr: shell.insight_addr.clone(),
    };
    config::save_settings(&settings)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    core: &mut LibraryCore,
    shell: &mut Shell,
    engine: &mut SimulatedAudioEngine,
) -> Result<()> {
    loop {
        pump_scan(shell, core);
        pump_insights(shell);
        sync_playback(shell, core, engine);

        if shell.dirty || core.dirty {
            terminal
                .draw(|frame| ui::draw(frame, core, shell, &*engine))
                .context("failed to draw frame")?;
            shell.dirty = false;
            core.dirty = false;
        }

        if event::poll(POLL_INTERVAL).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            handle_key(shell, core, engine, key.code, key.modifiers);
            shell.dirty = true;
        }

        // Keep redrawing while the position gauge or a scan is moving.
        if shell.player.playing || shell.scan.is_some() {
            shell.dirty = true;
        }

        if shell.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(
    shell: &mut Shell,
    core: &mut LibraryCore,
    engine: &mut dyn AudioEngine,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        shell.should_quit = true;
        return;
    }

    if shell.command_mode {
        match code {
            KeyCode::Esc => {
                shell.command_mode = false;
                shell.command_buffer.clear();
            }
            KeyCode::Enter => {
                let raw = std::mem::take(&mut shell.command_buffer);
                shell.command_mode = false;
                run_command(shell, core, engine, &raw);
            }
            KeyCode::Backspace => {
                shell.command_buffer.pop();
            }
            KeyCode::Char(c) => shell.command_buffer.push(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('q') => shell.should_quit = true,
        KeyCode::Char(':') => {
            shell.command_mode = true;
            shell.command_buffer.clear();
        }
        KeyCode::Tab => {
            shell.tab = match shell.tab {
                Tab::Library => Tab::Settings,
                Tab::Settings => Tab::Library,
            };
            shell.selected = 0;
        }
        KeyCode::Char('1') => select_sub_tab(shell, SubTab::Tracks),
        KeyCode::Char('2') => select_sub_tab(shell, SubTab::Folders),
        KeyCode::Char('3') => select_sub_tab(shell, SubTab::Playlists),
        KeyCode::Char('4') => select_sub_tab(shell, SubTab::Trash),
        KeyCode::Up | KeyCode::Char('k') => {
            shell.selected = shell.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let rows = visible_rows(core, shell).len();
            if rows > 0 {
                shell.selected = (shell.selected + 1).min(rows - 1);
            }
        }
        KeyCode::Enter => activate_selected(shell, core, engine),
        KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
            if shell.viewing_folder.take().is_some() || shell.viewing_playlist.take().is_some() {
                shell.selected = 0;
            }
        }
        KeyCode::Char(' ') => {
            shell.player.toggle_pause();
            if shell.player.playing {
                engine.resume();
            } else {
                engine.pause();
            }
        }
        KeyCode::Char('n') => {
            if let Some(id) = shell.player.next(core) {
                start_engine_playback(shell, core, engine, &id);
            }
        }
        KeyCode::Char('p') => {
            if let Some(id) = shell.player.prev(core) {
                start_engine_playback(shell, core, engine, &id);
            }
        }
        KeyCode::Char('f') => {
            match selected_row(core, shell) {
                Some(Row::Track(id)) | Some(Row::PlaylistEntry(id)) => {
                    core.toggle_track_favorite(&id);
                }
                Some(Row::Playlist(id)) => core.toggle_playlist_favorite(&id),
                _ => {}
            }
        }
        KeyCode::Char('d') => delete_selected(shell, core, engine),
        KeyCode::Char('x') => {
            if let (Some(playlist_id), Some(Row::PlaylistEntry(track_id))) =
                (shell.viewing_playlist.clone(), selected_row(core, shell))
            {
                core.remove_track_from_playlist(&playlist_id, &track_id);
                clamp_selection(shell, core);
            }
        }
        KeyCode::Char('r') => shell.player.cycle_repeat(),
        KeyCode::Char('t') => shell.theme = shell.theme.next(),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            engine.set_volume(engine.volume() + 0.1);
        }
        KeyCode::Char('-') => {
            engine.set_volume(engine.volume() - 0.1);
        }
        _ => {}
    }
}

fn select_sub_tab(shell: &mut Shell, sub_tab: SubTab) {
    shell.tab = Tab::Library;
    shell.sub_tab = sub_tab;
    shell.selected = 0;
    shell.viewing_folder = None;
    shell.viewing_playlist = None;
}

fn selected_row(core: &LibraryCore, shell: &Shell) -> Option<Row> {
    visible_rows(core, shell).into_iter().nth(shell.selected)
}

fn clamp_selection(shell: &mut Shell, core: &LibraryCore) {
    let rows = visible_rows(core, shell).len();
    if rows == 0 {
        shell.selected = 0;
    } else {
        shell.selected = shell.selected.min(rows - 1);
    }
}

fn activate_selected(shell: &mut Shell, core: &mut LibraryCore, engine: &mut dyn AudioEngine) {
    match selected_row(core, shell) {
        Some(Row::Track(id)) | Some(Row::PlaylistEntry(id)) => {
            play(shell, core, engine, &id);
        }
        Some(Row::Folder(name)) => {
            shell.viewing_folder = Some(name);
            shell.selected = 0;
        }
        Some(Row::Playlist(id)) => {
            shell.viewing_playlist = Some(id);
            shell.selected = 0;
        }
        Some(Row::TrashedTrack(id)) => {
            core.restore_track(&id);
            clamp_selection(shell, core);
        }
        Some(Row::TrashedFolder(name)) => {
            core.restore_folder(&name);
            clamp_selection(shell, core);
        }
        Some(Row::ThemeSetting) => shell.theme = shell.theme.next(),
        Some(Row::InsightSetting) => {
            core.status = String::from("Defina o serviço com :insight <host:porta>");
            core.dirty = true;
        }
        None => {}
    }
}

fn delete_selected(shell: &mut Shell, core: &mut LibraryCore, engine: &mut dyn AudioEngine) {
    match selected_row(core, shell) {
        Some(Row::Track(id)) | Some(Row::PlaylistEntry(id)) => {
            core.move_track_to_trash(&id);
        }
        Some(Row::Folder(name)) => {
            core.move_folder_to_trash(&name);
            if shell.viewing_folder.as_deref() == Some(name.as_str()) {
                shell.viewing_folder = None;
            }
        }
        Some(Row::Playlist(id)) => {
            core.delete_playlist(&id);
            if shell.viewing_playlist.as_deref() == Some(id.as_str()) {
                shell.viewing_playlist = None;
            }
        }
        Some(Row::TrashedTrack(id)) => core.purge_track(&id),
        Some(Row::TrashedFolder(name)) => core.purge_folder(&name),
        _ => return,
    }
    reconcile_session(shell, core, engine);
    clamp_selection(shell, core);
}

/// The playing track may have just left the track store; stop the device
/// alongside the session so they never disagree.
fn reconcile_session(shell: &mut Shell, core: &LibraryCore, engine: &mut dyn AudioEngine) {
    let had_session = shell.player.current.is_some();
    shell.player.ensure_current(core);
    if had_session && shell.player.current.is_none() {
        engine.stop();
        shell.insight = None;
    }
}

fn play(shell: &mut Shell, core: &mut LibraryCore, engine: &mut dyn AudioEngine, id: &str) {
    if !shell.player.play_track(core, id) {
        return;
    }
    start_engine_playback(shell, core, engine, id);
}

fn start_engine_playback(
    shell: &mut Shell,
    core: &mut LibraryCore,
    engine: &mut dyn AudioEngine,
    id: &str,
) {
    let Some(track) = core.track(id).cloned() else {
        return;
    };
    match engine.play(&track) {
        Ok(()) => {
            core.status = format!("A reproduzir: {}", track.title);
            core.dirty = true;
            request_insight(shell, &track.id, core);
        }
        Err(err) => {
            shell.player.on_error(&err.to_string());
            engine.stop();
        }
    }
}

/// Fire an insight request on a worker thread. The result comes back
/// through the channel tagged with the track id; by the time it lands the
/// user may be listening to something else, so acceptance is gated on the
/// tag still matching.
fn request_insight(shell: &mut Shell, track_id: &str, core: &LibraryCore) {
    let Some(track) = core.track(track_id).cloned() else {
        return;
    };
    let addr = shell.insight_addr.clone();
    let tx = shell.insight_tx.clone();
    thread::spawn(move || {
        let insight = match addr {
            Some(addr) => {
                let mut service = TcpInsightService::new(&addr);
                crate::insight::analyze_or_fallback(Some(&mut service), &track)
            }
            None => TrackInsight::fallback(),
        };
        let _ = tx.send((track.id, insight));
    });
}

fn pump_insights(shell: &mut Shell) {
    while let Ok((id, insight)) = shell.insight_rx.try_recv() {
        let current = shell.player.current.clone();
        accept_insight(current.as_deref(), id, insight, &mut shell.insight);
        shell.dirty = true;
    }
}

/// Stale-result guard: an insight is only shown when it is still about the
/// track being played.
pub fn accept_insight(
    current: Option<&str>,
    track_id: String,
    insight: TrackInsight,
    slot: &mut Option<(String, TrackInsight)>,
) {
    if current == Some(track_id.as_str()) {
        *slot = Some((track_id, insight));
    }
}

fn pump_scan(shell: &mut Shell, core: &mut LibraryCore) {
    let Some(scan) = shell.scan.as_mut() else {
        return;
    };

    if shell.last_scan_tick.elapsed() < SCAN_TICK_INTERVAL {
        return;
    }
    shell.last_scan_tick = Instant::now();

    if let Some(update) = scan.tick() {
        shell.scan_status = update.status;
        shell.dirty = true;
    }

    if scan.is_completed()
        && let Some(scan) = shell.scan.take()
    {
        let folder = scan.source().label();
        let files = scan.into_discovered();
        core.import_files(&files, folder);
        shell.scan_status.clear();
    }
}

/// Poll the device and translate what it reports into the session signals.
fn sync_playback(shell: &mut Shell, core: &mut LibraryCore, engine: &mut dyn AudioEngine) {
    let Some(current) = shell.player.current.clone() else {
        return;
    };

    if let Some(position) = engine.position() {
        shell.player.on_time_progress(position);
    }

    if let Some(duration) = engine.duration()
        && core.track(&current).is_some_and(|t| t.duration_seconds == 0)
    {
        shell.player.on_metadata_ready(core, &current, duration);
    }

    if engine.is_finished()
        && let Some(next_id) = shell.player.on_ended(core)
    {
        start_engine_playback(shell, core, engine, &next_id);
    }
}

/// Colon commands, for everything a single key does not cover.
pub fn run_command(
    shell: &mut Shell,
    core: &mut LibraryCore,
    engine: &mut dyn AudioEngine,
    raw: &str,
) {
    let raw = raw.trim();
    let (head, rest) = match raw.split_once(' ') {
        Some((head, rest)) => (head, rest.trim()),
        None => (raw, ""),
    };

    match head {
        "" => {}
        "help" => {
            core.status = String::from(HELP_STATUS);
            core.dirty = true;
        }
        "quit" | "q" => shell.should_quit = true,
        "import" => {
            if rest.is_empty() {
                core.status = String::from("Uso: import <ficheiro>");
                core.dirty = true;
                return;
            }
            let file = ImportedFile::new(rest, "", &format!("file://{rest}"));
            core.import_files(&[file], FOLDER_IMPORTED);
        }
        "scan" => {
            if shell.scan.is_some() {
                core.status = String::from("Já existe uma análise em curso");
                core.dirty = true;
                return;
            }
            match ScanSource::parse(rest) {
                Some(source) => {
                    shell.scan = Some(MemoryScan::start(source));
                    shell.scan_status = String::new();
                    shell.last_scan_tick = Instant::now();
                }
                None => {
                    core.status = String::from("Uso: scan <internal|external>");
                    core.dirty = true;
                }
            }
        }
        "duplicates" => {
            core.scan_duplicates();
        }
        "playlist" => playlist_command(shell, core, rest),
        "folder" => folder_command(shell, core, engine, rest),
        "trash" => {
            if rest == "empty" {
                core.empty_trash();
                clamp_selection(shell, core);
            } else {
                core.status = String::from("Uso: trash empty");
                core.dirty = true;
            }
        }
        "analyze" => match shell.player.current.clone() {
            Some(id) => request_insight(shell, &id, core),
            None => {
                core.status = String::from("Nenhuma música em reprodução");
                core.dirty = true;
            }
        },
        "insight" => {
            if rest.is_empty() {
                shell.insight_addr = None;
                core.status = String::from("Serviço de análise desativado");
            } else {
                shell.insight_addr = Some(rest.to_string());
                core.status = format!("Serviço de análise: {rest}");
            }
            core.dirty = true;
        }
        "theme" => match Theme::parse(rest) {
            Some(theme) => shell.theme = theme,
            None => {
                core.status = String::from("Uso: theme <dark|black|ocean|sunset>");
                core.dirty = true;
            }
        },
        _ => {
            core.status = format!("Comando desconhecido: {head}");
            core.dirty = true;
        }
    }
}

fn playlist_command(shell: &mut Shell, core: &mut LibraryCore, rest: &str) {
    let (verb, args) = match rest.split_once(' ') {
        Some((verb, args)) => (verb, args.trim()),
        None => (rest, ""),
    };

    match verb {
        "new" => {
            if let Err(err) = core.create_playlist(args, &[]) {
                core.status = err.to_string();
                core.dirty = true;
            }
        }
        // rename takes "old name / new name" so both sides may contain
        // spaces.
        "rename" => {
            let Some((old, new)) = args.split_once('/') else {
                core.status = String::from("Uso: playlist rename <antigo> / <novo>");
                core.dirty = true;
                return;
            };
            let Some(id) = playlist_id_by_name(core, old.trim()) else {
                core.status = format!("Playlist não encontrada: {}", old.trim());
                core.dirty = true;
                return;
            };
            if let Err(err) = core.rename_playlist(&id, new) {
                core.status = err.to_string();
                core.dirty = true;
            }
        }
        "add" => {
            let Some(Row::Track(track_id)) = selected_row(core, shell) else {
                core.status = String::from("Selecione uma música primeiro");
                core.dirty = true;
                return;
            };
            let Some(id) = playlist_id_by_name(core, args) else {
                core.status = format!("Playlist não encontrada: {args}");
                core.dirty = true;
                return;
            };
            core.add_tracks_to_playlist(&id, &[track_id]);
        }
        "delete" => {
            let Some(id) = playlist_id_by_name(core, args) else {
                core.status = format!("Playlist não encontrada: {args}");
                core.dirty = true;
                return;
            };
            core.delete_playlist(&id);
            if shell.viewing_playlist.as_deref() == Some(id.as_str()) {
                shell.viewing_playlist = None;
                shell.selected = 0;
            }
        }
        _ => {
            core.status = String::from("Uso: playlist <new|rename|add|delete>");
            core.dirty = true;
        }
    }
}

fn folder_command(shell: &mut Shell, core: &mut LibraryCore, engine: &mut dyn AudioEngine, rest: &str) {
    let (verb, args) = match rest.split_once(' ') {
        Some((verb, args)) => (verb, args.trim()),
        None => (rest, ""),
    };

    match verb {
        "rename" => {
            let Some((old, new)) = args.split_once('/') else {
                core.status = String::from("Uso: folder rename <antigo> / <novo>");
                core.dirty = true;
                return;
            };
            core.rename_folder(old.trim(), new.trim());
            if shell.viewing_folder.as_deref() == Some(old.trim()) {
                shell.viewing_folder = Some(new.trim().to_string());
            }
        }
        "delete" => {
            core.move_folder_to_trash(args);
            if shell.viewing_folder.as_deref() == Some(args) {
                shell.viewing_folder = None;
            }
            reconcile_session(shell, core, engine);
            clamp_selection(shell, core);
        }
        _ => {
            core.status = String::from("Uso: folder <rename|delete>");
            core.dirty = true;
        }
    }
}

fn playlist_id_by_name(core: &LibraryCore, name: &str) -> Option<String> {
    core.playlists
        .iter()
        .find(|playlist| playlist.name == name)
        .map(|playlist| playlist.id.clone())
}

pub fn visible_rows(core: &LibraryCore, shell: &Shell) -> Vec<Row> {
    if shell.tab == Tab::Settings {
        return vec![Row::ThemeSetting, Row::InsightSetting];
    }

    match shell.sub_tab {
        SubTab::Tracks => core
            .tracks
            .iter()
            .map(|track| Row::Track(track.id.clone()))
            .collect(),
        SubTab::Folders => match &shell.viewing_folder {
            Some(name) => core
                .tracks
                .iter()
                .filter(|track| &track.folder_name == name)
                .map(|track| Row::Track(track.id.clone()))
                .collect(),
            None => core
                .folders()
                .into_iter()
                .map(|folder| Row::Folder(folder.name))
                .collect(),
        },
        SubTab::Playlists => match &shell.viewing_playlist {
            Some(id) => core
                .playlist(id)
                .map(|playlist| {
                    playlist
                        .track_ids
                        .iter()
                        .map(|track_id| Row::PlaylistEntry(track_id.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            None => core
                .playlists
                .iter()
                .map(|playlist| Row::Playlist(playlist.id.clone()))
                .collect(),
        },
        SubTab::Trash => {
            let mut rows: Vec<Row> = core
                .trashed_tracks
                .iter()
                .map(|track| Row::TrashedTrack(track.id.clone()))
                .collect();
            rows.extend(
                core.trashed_folders
                    .iter()
                    .map(|folder| Row::TrashedFolder(folder.name.clone())),
            );
            rows
        }
    }
}

pub fn row_label(core: &LibraryCore, shell: &Shell, row: &Row) -> String {
    match row {
        Row::Track(id) => match core.track(id) {
            Some(track) => {
                let playing = if shell.player.current.as_deref() == Some(id.as_str()) {
                    "▶ "
                } else {
                    "  "
                };
                let favorite = if track.favorite { " ♥" } else { "" };
                let duplicate = if core.duplicate_report.iter().any(|d| d == id) {
                    "  (duplicado)"
                } else {
                    ""
                };
                format!(
                    "{playing}{} — {}  [{}]{favorite}{duplicate}",
                    track.title, track.artist, track.format
                )
            }
            None => String::from("(música indisponível)"),
        },
        Row::Folder(name) => {
            let count = core
                .folders()
                .into_iter()
                .find(|folder| &folder.name == name)
                .map(|folder| folder.track_count)
                .unwrap_or(0);
            format!("{name} ({count})")
        }
        Row::Playlist(id) => match core.playlist(id) {
            Some(playlist) => {
                let favorite = if playlist.favorite { " ♥" } else { "" };
                format!("{} ({} músicas){favorite}", playlist.name, playlist.track_count())
            }
            None => String::from("(playlist indisponível)"),
        },
        Row::PlaylistEntry(track_id) => match core.track(track_id) {
            Some(track) => format!("{} — {}", track.title, track.artist),
            None => String::from("(música indisponível)"),
        },
        Row::TrashedTrack(id) => core
            .trashed_tracks
            .iter()
            .find(|track| &track.id == id)
            .map(|track| format!("{} — {}", track.title, track.artist))
            .unwrap_or_else(|| String::from("(música indisponível)")),
        Row::TrashedFolder(name) => {
            let count = core
                .trashed_folders
                .iter()
                .find(|folder| &folder.name == name)
                .map(|folder| folder.tracks.len())
                .unwrap_or(0);
            format!("Pasta: {name} ({count} músicas)")
        }
        Row::ThemeSetting => format!("Tema: {} (Enter para mudar)", shell.theme.label()),
        Row::InsightSetting => match &shell.insight_addr {
            Some(addr) => format!("Serviço de análise: {addr}"),
            None => String::from("Serviço de análise: não configurado"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdSource;
    use crate::model::Track;
    use anyhow::Result;

    /// Scripted playback device for shell tests.
    struct TestAudioEngine {
        played: Vec<String>,
        fail_next: bool,
        finished: bool,
        volume: f32,
        current: Option<String>,
    }

    impl TestAudioEngine {
        fn new() -> Self {
            Self {
                played: Vec::new(),
                fail_next: false,
                finished: false,
                volume: 1.0,
                current: None,
            }
        }
    }

    impl AudioEngine for TestAudioEngine {
        fn play(&mut self, track: &Track) -> Result<()> {
            if self.fail_next {
                anyhow::bail!("{}", crate::playback::UNSUPPORTED_FORMAT_ERROR);
            }
            self.played.push(track.id.clone());
            self.current = Some(track.source.clone());
            self.finished = false;
            Ok(())
        }
        fn pause(&mut self) {}
        fn resume(&mut self) {}
        fn stop(&mut self) {
            self.current = None;
        }
        fn is_paused(&self) -> bool {
            false
        }
        fn current_source(&self) -> Option<&str> {
            self.current.as_deref()
        }
        fn position(&self) -> Option<Duration> {
            self.current.as_ref().map(|_| Duration::from_secs(1))
        }
        fn duration(&self) -> Option<Duration> {
            self.current.as_ref().map(|_| Duration::from_secs(200))
        }
        fn is_finished(&self) -> bool {
            self.finished
        }
        fn volume(&self) -> f32 {
            self.volume
        }
        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 2.0);
        }
    }

    fn fixture() -> (Shell, LibraryCore, TestAudioEngine) {
        let mut core = LibraryCore::new(Box::new(SequentialIdSource::new()));
        let files = vec![
            ImportedFile::new("a.mp3", "", "blob:a"),
            ImportedFile::new("b.mp3", "", "blob:b"),
            ImportedFile::new("c.mp3", "", "blob:c"),
        ];
        core.import_files(&files, FOLDER_IMPORTED);
        let shell = Shell::new(&Settings::default());
        (shell, core, TestAudioEngine::new())
    }

    #[test]
    fn enter_on_a_track_starts_playback_on_the_engine() {
        let (mut shell, mut core, mut engine) = fixture();
        shell.selected = 1;
        activate_selected(&mut shell, &mut core, &mut engine);

        assert_eq!(shell.player.current.as_deref(), Some("t2"));
        assert_eq!(engine.played, vec!["t2"]);
        assert!(core.status.starts_with("A reproduzir"));
    }

    #[test]
    fn engine_failure_surfaces_as_player_error() {
        let (mut shell, mut core, mut engine) = fixture();
        engine.fail_next = true;
        activate_selected(&mut shell, &mut core, &mut engine);

        assert_eq!(
            shell.player.error.as_deref(),
            Some(crate::playback::UNSUPPORTED_FORMAT_ERROR)
        );
        assert!(!shell.player.playing);
    }

    #[test]
    fn finished_track_auto_advances_to_the_next() {
        let (mut shell, mut core, mut engine) = fixture();
        activate_selected(&mut shell, &mut core, &mut engine);
        engine.finished = true;

        sync_playback(&mut shell, &mut core, &mut engine);

        assert_eq!(shell.player.current.as_deref(), Some("t2"));
        assert_eq!(engine.played, vec!["t1", "t2"]);
    }

    #[test]
    fn metadata_from_engine_lands_in_the_track_store() {
        let (mut shell, mut core, mut engine) = fixture();
        activate_selected(&mut shell, &mut core, &mut engine);

        sync_playback(&mut shell, &mut core, &mut engine);

        assert_eq!(core.tracks[0].duration_seconds, 200);
        assert_eq!(
            shell.player.reported_duration,
            Some(Duration::from_secs(200))
        );
    }

    #[test]
    fn deleting_the_playing_track_stops_the_engine() {
        let (mut shell, mut core, mut engine) = fixture();
        activate_selected(&mut shell, &mut core, &mut engine);
        shell.selected = 0;

        delete_selected(&mut shell, &mut core, &mut engine);

        assert_eq!(shell.player.current, None);
        assert!(engine.current.is_none());
        assert_eq!(core.trashed_tracks.len(), 1);
    }

    #[test]
    fn stale_insight_is_discarded() {
        let mut slot = None;
        accept_insight(
            Some("t2"),
            String::from("t1"),
            TrackInsight::fallback(),
            &mut slot,
        );
        assert!(slot.is_none());

        accept_insight(
            Some("t2"),
            String::from("t2"),
            TrackInsight::fallback(),
            &mut slot,
        );
        assert!(slot.is_some());
    }

    #[test]
    fn opening_a_playlist_shows_its_entries() {
        let (mut shell, mut core, _engine) = fixture();
        let ids: Vec<String> = core.tracks.iter().map(|t| t.id.clone()).collect();
        let playlist_id = core.create_playlist("mix", &ids[..2]).expect("create");

        shell.sub_tab = SubTab::Playlists;
        shell.viewing_playlist = Some(playlist_id);

        let rows = visible_rows(&core, &shell);
        assert_eq!(
            rows,
            vec![
                Row::PlaylistEntry(String::from("t1")),
                Row::PlaylistEntry(String::from("t2")),
            ]
        );
    }

    #[test]
    fn deleting_a_viewed_playlist_leaves_no_rows() {
        let (mut shell, mut core, _engine) = fixture();
        let playlist_id = core.create_playlist("mix", &[]).expect("create");
        shell.sub_tab = SubTab::Playlists;
        shell.viewing_playlist = Some(playlist_id.clone());

        core.delete_playlist(&playlist_id);

        assert!(visible_rows(&core, &shell).is_empty());
    }

    #[test]
    fn trash_rows_list_tracks_then_folders() {
        let (mut shell, mut core, _engine) = fixture();
        core.move_track_to_trash("t1");
        core.move_folder_to_trash(FOLDER_IMPORTED);
        shell.sub_tab = SubTab::Trash;

        let rows = visible_rows(&core, &shell);
        assert_eq!(rows[0], Row::TrashedTrack(String::from("t1")));
        assert_eq!(
            rows[1],
            Row::TrashedFolder(String::from(FOLDER_IMPORTED))
        );
    }

    #[test]
    fn scan_command_starts_a_scan_and_completion_imports() {
        let (mut shell, mut core, mut engine) = fixture();
        run_command(&mut shell, &mut core, &mut engine, "scan internal");
        assert!(shell.scan.is_some());

        // Drive the scan to completion without waiting on wall-clock
        // throttling.
        let before = core.tracks.len();
        let mut scan = shell.scan.take().expect("scan");
        while scan.tick().is_some() {}
        assert!(scan.is_completed());
        let folder = scan.source().label();
        core.import_files(&scan.into_discovered(), folder);
        assert_eq!(core.tracks.len(), before + 3);
        assert!(
            core.tracks[before..]
                .iter()
                .all(|t| t.folder_name == "Memória Interna")
        );
    }

    #[test]
    fn playlist_commands_create_rename_and_delete() {
        let (mut shell, mut core, mut engine) = fixture();
        run_command(&mut shell, &mut core, &mut engine, "playlist new mix");
        assert_eq!(core.playlists.len(), 1);

        run_command(&mut shell, &mut core, &mut engine, "playlist new mix");
        assert!(core.status.contains("Já existe"));

        run_command(&mut shell, &mut core, &mut engine, "playlist rename mix / festa");
        assert_eq!(core.playlists[0].name, "festa");

        run_command(&mut shell, &mut core, &mut engine, "playlist delete festa");
        assert!(core.playlists.is_empty());
    }

    #[test]
    fn folder_rename_follows_the_open_view() {
        let (mut shell, mut core, mut engine) = fixture();
        shell.sub_tab = SubTab::Folders;
        shell.viewing_folder = Some(String::from(FOLDER_IMPORTED));

        run_command(
            &mut shell,
            &mut core,
            &mut engine,
            &format!("folder rename {FOLDER_IMPORTED} / Favoritas"),
        );

        assert_eq!(shell.viewing_folder.as_deref(), Some("Favoritas"));
        assert!(core.tracks.iter().all(|t| t.folder_name == "Favoritas"));
    }

    #[test]
    fn unknown_command_reports_without_mutating() {
        let (mut shell, mut core, mut engine) = fixture();
        let tracks = core.tracks.len();
        run_command(&mut shell, &mut core, &mut engine, "frobnicate");
        assert_eq!(core.tracks.len(), tracks);
        assert!(core.status.contains("Comando desconhecido"));
    }
}
