use crate::app::{Row, Shell, SubTab, Tab, row_label, visible_rows};
use crate::audio::AudioEngine;
use crate::core::LibraryCore;
use crate::model::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph};

const APP_TITLE: &str = "bossa v0.1.0  ";

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    selected_bg: Color,
}

fn palette(theme: Theme) -> ThemePalette {
    match theme {
        Theme::Dark => ThemePalette {
            bg: Color::Rgb(12, 12, 14),
            panel_bg: Color::Rgb(22, 22, 28),
            border: Color::Rgb(70, 70, 90),
            text: Color::Rgb(230, 230, 238),
            muted: Color::Rgb(140, 140, 158),
            accent: Color::Rgb(255, 45, 85),
            alert: Color::Rgb(249, 174, 88),
            selected_bg: Color::Rgb(44, 44, 58),
        },
        Theme::PitchBlack => ThemePalette {
            bg: Color::Rgb(0, 0, 0),
            panel_bg: Color::Rgb(8, 8, 8),
            border: Color::Rgb(74, 74, 74),
            text: Color::Rgb(242, 242, 242),
            muted: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(255, 45, 85),
            alert: Color::Rgb(255, 196, 0),
            selected_bg: Color::Rgb(28, 28, 28),
        },
        Theme::Ocean => ThemePalette {
            bg: Color::Rgb(8, 20, 33),
            panel_bg: Color::Rgb(14, 32, 51),
            border: Color::Rgb(52, 108, 154),
            text: Color::Rgb(214, 234, 248),
            muted: Color::Rgb(130, 165, 192),
            accent: Color::Rgb(64, 199, 219),
            alert: Color::Rgb(245, 176, 96),
            selected_bg: Color::Rgb(24, 52, 79),
        },
        Theme::Sunset => ThemePalette {
            bg: Color::Rgb(28, 14, 22),
            panel_bg: Color::Rgb(43, 22, 32),
            border: Color::Rgb(145, 79, 92),
            text: Color::Rgb(250, 230, 222),
            muted: Color::Rgb(190, 140, 132),
            accent: Color::Rgb(255, 126, 84),
            alert: Color::Rgb(255, 205, 112),
            selected_bg: Color::Rgb(66, 34, 46),
        },
    }
}

pub fn draw(frame: &mut Frame, core: &LibraryCore, shell: &Shell, audio: &dyn AudioEngine) {
    let colors = palette(shell.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    let [tabs_area, subtabs_area, list_area, player_area, insight_area, status_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);

    draw_tabs(frame, shell, colors, tabs_area);
    draw_subtabs(frame, shell, colors, subtabs_area);
    draw_list(frame, core, shell, colors, list_area);
    draw_player(frame, core, shell, audio, colors, player_area);
    draw_insight(frame, shell, colors, insight_area);
    draw_status(frame, core, shell, colors, status_area);

    if shell.scan.is_some() {
        draw_scan_popup(frame, shell, colors, area);
    }
}

fn draw_tabs(frame: &mut Frame, shell: &Shell, colors: ThemePalette, area: Rect) {
    let tab_span = |tab: Tab, label: &'static str| {
        if shell.tab == tab {
            Span::styled(label, Style::default().fg(colors.accent).bold())
        } else {
            Span::styled(label, Style::default().fg(colors.muted))
        }
    };

    let line = Line::from(vec![
        Span::styled(APP_TITLE, Style::default().fg(colors.muted)),
        tab_span(Tab::Library, "Biblioteca"),
        Span::raw("   "),
        tab_span(Tab::Settings, "Definições"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_subtabs(frame: &mut Frame, shell: &Shell, colors: ThemePalette, area: Rect) {
    if shell.tab != Tab::Library {
        frame.render_widget(Paragraph::new(""), area);
        return;
    }

    let mut spans = Vec::new();
    for (sub, label) in [
        (SubTab::Tracks, "[1] Músicas"),
        (SubTab::Folders, "[2] Pastas"),
        (SubTab::Playlists, "[3] Playlists"),
        (SubTab::Trash, "[4] Lixeira"),
    ] {
        let style = if shell.sub_tab == sub {
            Style::default().fg(colors.text).bold()
        } else {
            Style::default().fg(colors.muted)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_list(frame: &mut Frame, core: &LibraryCore, shell: &Shell, colors: ThemePalette, area: Rect) {
    let rows = visible_rows(core, shell);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let style = match row {
                Row::TrashedTrack(_) | Row::TrashedFolder(_) => Style::default().fg(colors.muted),
                _ => Style::default().fg(colors.text),
            };
            ListItem::new(Line::styled(row_label(core, shell, row), style))
        })
        .collect();

    let title = list_title(core, shell);
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.panel_bg))
                .title(title),
        )
        .highlight_style(Style::default().bg(colors.selected_bg).fg(colors.accent));

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(shell.selected.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn list_title(core: &LibraryCore, shell: &Shell) -> String {
    if shell.tab == Tab::Settings {
        return String::from(" Definições ");
    }
    match shell.sub_tab {
        SubTab::Tracks => format!(" Músicas ({}) ", core.tracks.len()),
        SubTab::Folders => match &shell.viewing_folder {
            Some(name) => format!(" Pasta: {name} "),
            None => format!(" Pastas ({}) ", core.folders().len()),
        },
        SubTab::Playlists => match &shell.viewing_playlist {
            Some(id) => match core.playlist(id) {
                Some(playlist) => format!(" Playlist: {} ", playlist.name),
                None => String::from(" Playlists "),
            },
            None => format!(" Playlists ({}) ", core.playlists.len()),
        },
        SubTab::Trash => format!(
            " Lixeira ({} músicas, {} pastas) ",
            core.trashed_tracks.len(),
            core.trashed_folders.len()
        ),
    }
}

fn draw_player(
    frame: &mut Frame,
    core: &LibraryCore,
    shell: &Shell,
    audio: &dyn AudioEngine,
    colors: ThemePalette,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.panel_bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let player = &shell.player;
    if let Some(error) = &player.error {
        frame.render_widget(
            Paragraph::new(Line::styled(
                error.clone(),
                Style::default().fg(colors.alert).bold(),
            )),
            inner,
        );
        return;
    }

    let Some(track) = player.current.as_deref().and_then(|id| core.track(id)) else {
        frame.render_widget(
            Paragraph::new(Line::styled(
                "Sem música em reprodução",
                Style::default().fg(colors.muted),
            )),
            inner,
        );
        return;
    };

    let marker = if player.playing { "▶" } else { "⏸" };
    let header = Line::from(vec![
        Span::styled(
            format!("{marker} {} ", track.title),
            Style::default().fg(colors.text).bold(),
        ),
        Span::styled(
            format!(
                "— {}  [{}]  {}  vol {}%",
                track.artist,
                track.format,
                player.repeat.label(),
                (audio.volume() * 100.0).round() as u16
            ),
            Style::default().fg(colors.muted),
        ),
    ]);

    let position = player.position.as_secs();
    let duration = player
        .reported_duration
        .map(|d| d.as_secs())
        .unwrap_or(u64::from(track.duration_seconds));
    let ratio = if duration > 0 {
        (position as f64 / duration as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let [header_area, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(Paragraph::new(header), header_area);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(colors.accent).bg(colors.selected_bg))
            .ratio(ratio)
            .label(format!(
                "{}:{:02} / {}:{:02}",
                position / 60,
                position % 60,
                duration / 60,
                duration % 60
            )),
        gauge_area,
    );
}

fn draw_insight(frame: &mut Frame, shell: &Shell, colors: ThemePalette, area: Rect) {
    let Some((_, insight)) = &shell.insight else {
        frame.render_widget(
            Paragraph::new(Line::styled(
                "Sem análise — :analyze para pedir uma",
                Style::default().fg(colors.muted),
            )),
            area,
        );
        return;
    };

    let mut spans = vec![
        Span::styled(
            format!("{} ", insight.mood),
            Style::default().fg(colors.accent).bold(),
        ),
        Span::styled(insight.description.clone(), Style::default().fg(colors.text)),
    ];
    for hex in &insight.color_palette {
        spans.push(Span::styled(
            format!("  {hex}"),
            Style::default().fg(colors.muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(frame: &mut Frame, core: &LibraryCore, shell: &Shell, colors: ThemePalette, area: Rect) {
    let line = if shell.command_mode {
        Line::styled(
            format!(":{}", shell.command_buffer),
            Style::default().fg(colors.accent),
        )
    } else {
        Line::styled(core.status.clone(), Style::default().fg(colors.muted))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_scan_popup(frame: &mut Frame, shell: &Shell, colors: ThemePalette, area: Rect) {
    let Some(scan) = &shell.scan else {
        return;
    };

    let popup = centered_rect(area, 50, 5);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.panel_bg))
        .title(format!(" Análise: {} ", scan.source().label()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [status_area, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(Line::styled(
            shell.scan_status.clone(),
            Style::default().fg(colors.text),
        )),
        status_area,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(colors.accent).bg(colors.selected_bg))
            .percent(u16::from(scan.progress())),
        gauge_area,
    );
}

fn centered_rect(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = area.width.saturating_mul(width_pct) / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}
