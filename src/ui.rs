//! UI rendering helpers for the terminal user interface.
//!
//! Draws the display slots of the page with `ratatui` and reports where each
//! action hook ended up, so mouse clicks can be mapped back to actions.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::Page;
use crate::markup::{PlayerMarkup, TrackMarkup, WaveformBar};
use crate::player::{Placement, Size};

/// Something clickable on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    TrackToggle(usize),
    /// The waveform of a track; the click column picks the position.
    TrackSeek(usize),
    TrackDetach(usize),
    FloatingToggle,
    /// The progress bar of the floating player.
    FloatingSeek,
    FloatingClose,
    /// The title row of the floating player.
    DragHandle,
}

impl Hook {
    fn on_floating(self) -> bool {
        matches!(
            self,
            Hook::FloatingToggle | Hook::FloatingSeek | Hook::FloatingClose | Hook::DragHandle
        )
    }
}

/// Screen areas of the hooks drawn in the last frame.
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Hook)>,
    floating: Option<Rect>,
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

impl HitMap {
    fn push(&mut self, area: Rect, hook: Hook) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, hook));
        }
    }

    /// The hook under a cell, and its area. The floating player covers
    /// whatever is drawn below it.
    pub fn hit(&self, column: u16, row: u16) -> Option<(Hook, Rect)> {
        let over_floating = self.floating.is_some_and(|r| contains(r, column, row));
        self.regions
            .iter()
            .rev()
            .filter(|(_, hook)| !over_floating || hook.on_floating())
            .find(|(area, _)| contains(*area, column, row))
            .map(|(area, hook)| (*hook, *area))
    }

    /// Where the floating player was drawn, if it is visible.
    pub fn floating_area(&self) -> Option<Rect> {
        self.floating
    }
}

/// Position of `column` within `area` as a fraction in `0.0..=1.0`.
pub fn seek_fraction(area: Rect, column: u16) -> f64 {
    if area.width <= 1 {
        return 0.0;
    }
    let offset = column.saturating_sub(area.x).min(area.width - 1);
    f64::from(offset) / f64::from(area.width - 1)
}

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("space/enter", "play/pause");
    map.insert("0-9", "jump to 0-90%");
    map.insert("d", "detach");
    map.insert("p", "floating play/pause");
    map.insert("x", "close floating");
    map.insert("m", "show/hide floating");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_percent: u32) -> String {
    let order = ["j/k", "space/enter", "h/l", "0-9", "d", "p", "x", "m", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{seek_step_percent}%"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn bar_glyph(bar: &WaveformBar) -> char {
    let level = ((bar.height * BAR_GLYPHS.len() as f32).ceil() as usize).clamp(1, BAR_GLYPHS.len());
    BAR_GLYPHS[level - 1]
}

/// Waveform spans for `width` columns, sampling bars when they do not fit.
fn waveform_line(bars: &[WaveformBar], width: u16) -> Line<'static> {
    let width = usize::from(width).min(bars.len());
    let spans: Vec<Span> = (0..width)
        .map(|col| {
            let bar = &bars[col * bars.len() / width.max(1)];
            let color = if bar.active { Color::Cyan } else { Color::DarkGray };
            Span::styled(bar_glyph(bar).to_string(), Style::default().fg(color))
        })
        .collect();
    Line::from(spans)
}

fn toggle_label(playing: bool) -> &'static str {
    if playing { "[‖]" } else { "[▶]" }
}

fn track_label(markup: &TrackMarkup) -> String {
    let title = markup.title.as_deref().unwrap_or(crate::markup::UNKNOWN_TRACK);
    let mut label = match markup.artist.as_deref() {
        Some(artist) => format!("{title} · {artist}"),
        None => title.to_string(),
    };
    if markup.image.is_some() {
        label.insert_str(0, "▣ ");
    }
    label
}

/// Time label, preceded by the play count once the track was started.
fn stats_label(markup: &TrackMarkup) -> String {
    match markup.plays {
        Some(plays) => format!("{plays}× {}", markup.time_label),
        None => markup.time_label.clone(),
    }
}

fn draw_track(
    frame: &mut Frame,
    hits: &mut HitMap,
    index: usize,
    markup: &TrackMarkup,
    selected: bool,
    row: Rect,
) {
    let cols = Layout::horizontal([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Percentage(35),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(11),
        Constraint::Length(1),
        Constraint::Length(if markup.detachable { 3 } else { 0 }),
    ])
    .split(row);

    let marker = if selected { "> " } else { "  " };
    frame.render_widget(Paragraph::new(marker), cols[0]);

    let toggle_style = if markup.playing {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(toggle_label(markup.playing)).style(toggle_style), cols[1]);
    hits.push(cols[1], Hook::TrackToggle(index));

    let mut title_style = Style::default();
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    if markup.detached {
        title_style = title_style.fg(Color::Magenta).add_modifier(Modifier::ITALIC);
    }
    frame.render_widget(Paragraph::new(track_label(markup)).style(title_style), cols[3]);

    let wave_area = Rect {
        width: cols[5].width.min(markup.bars.len() as u16),
        ..cols[5]
    };
    frame.render_widget(Paragraph::new(waveform_line(&markup.bars, wave_area.width)), wave_area);
    hits.push(wave_area, Hook::TrackSeek(index));

    frame.render_widget(
        Paragraph::new(stats_label(markup)).alignment(Alignment::Right),
        cols[7],
    );

    if markup.detachable {
        let style = if markup.detached {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        frame.render_widget(Paragraph::new("[⇱]").style(style), cols[9]);
        hits.push(cols[9], Hook::TrackDetach(index));
    }
}

/// Where the floating player goes inside `area`.
pub fn floating_rect(placement: Placement, size: Size, area: Rect) -> Rect {
    let width = u16::try_from(size.width.max(1)).unwrap_or(u16::MAX).min(area.width);
    let height = u16::try_from(size.height.max(1)).unwrap_or(u16::MAX).min(area.height);
    let (x, y) = match placement {
        Placement::Docked => (
            area.x + (area.width - width) / 2,
            area.y + area.height - height,
        ),
        Placement::Absolute(p) => {
            let x = u16::try_from(p.x.max(0)).unwrap_or(u16::MAX).min(area.width - width);
            let y = u16::try_from(p.y.max(0)).unwrap_or(u16::MAX).min(area.height - height);
            (area.x + x, area.y + y)
        }
    };
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn progress_line(fill: f64, width: u16) -> Line<'static> {
    let filled = ((fill.clamp(0.0, 100.0) / 100.0) * f64::from(width)).round() as usize;
    let rest = usize::from(width).saturating_sub(filled);
    Line::from(vec![
        Span::styled("━".repeat(filled), Style::default().fg(Color::Magenta)),
        Span::styled("─".repeat(rest), Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_floating(frame: &mut Frame, hits: &mut HitMap, markup: &PlayerMarkup, size: Size) {
    let area = floating_rect(markup.placement, size, frame.area());
    hits.floating = Some(area);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" {} · {} ", markup.title, markup.artist));
    if markup.image.is_some() {
        block = block.title_bottom(Line::from(" ▣ ").right_aligned());
    }
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    if markup.draggable {
        hits.push(Rect { height: 1, ..area }, Hook::DragHandle);
    }

    let cols = Layout::horizontal([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .split(Rect { height: inner.height.min(1), ..inner });

    frame.render_widget(Paragraph::new(toggle_label(markup.playing)), cols[0]);
    hits.push(cols[0], Hook::FloatingToggle);
    frame.render_widget(Paragraph::new(markup.current_label.as_str()), cols[2]);
    frame.render_widget(
        Paragraph::new(progress_line(markup.progress_fill, cols[4].width)),
        cols[4],
    );
    hits.push(cols[4], Hook::FloatingSeek);
    frame.render_widget(
        Paragraph::new(markup.duration_label.as_str()).alignment(Alignment::Right),
        cols[6],
    );
    frame.render_widget(Paragraph::new("[x]"), cols[8]);
    hits.push(cols[8], Hook::FloatingClose);
}

/// Render the whole page into `frame` and return the hook areas.
pub fn draw(frame: &mut Frame, page: &Page, seek_step_percent: u32) -> HitMap {
    let mut hits = HitMap::default();

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    let header_text = match &page.current_dir {
        Some(dir) => format!("{} tracks • Dir: {dir}", page.widgets().len()),
        None => format!("{} tracks", page.widgets().len()),
    };
    let header = Paragraph::new(header_text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" tether ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Track list, windowed around the selection.
    let list_block = Block::default().borders(Borders::ALL).title(" tracks ");
    let list_area = list_block.inner(chunks[1]);
    frame.render_widget(list_block, chunks[1]);

    if !page.has_tracks() {
        frame.render_widget(
            Paragraph::new("No audio files found").alignment(Alignment::Center),
            list_area,
        );
    }

    let total = page.widgets().len();
    let height = usize::from(list_area.height);
    let start = if total <= height || height == 0 {
        0
    } else {
        page.selected
            .saturating_sub(height / 2)
            .min(total - height)
    };
    let end = (start + height).min(total);
    for (row, index) in (start..end).enumerate() {
        let row_area = Rect {
            y: list_area.y + row as u16,
            height: 1,
            ..list_area
        };
        let markup = page.widgets()[index].markup();
        draw_track(frame, &mut hits, index, markup, index == page.selected, row_area);
    }

    let footer = Paragraph::new(controls_text(seek_step_percent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);

    if let Some(floating) = page.floating() {
        let floating = floating.borrow();
        if floating.markup().visible {
            draw_floating(frame, &mut hits, floating.markup(), page.floating_size());
        }
    }

    hits
}
