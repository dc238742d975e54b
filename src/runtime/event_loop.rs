use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, Page};
use crate::config;
use crate::player::{Point, Size};
use crate::ui::{self, HitMap, Hook};

/// Event loop tick; media events are pumped once per tick.
const TICK: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Hook areas of the last drawn frame.
    pub hits: HitMap,
    /// Size of the last drawn frame, used to clamp drags.
    pub viewport: Size,
}

/// Main terminal event loop: pumps media events, draws and handles input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    page: &mut Page,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();
    let seek_step_percent = u32::from(settings.controls.seek_step_percent);

    loop {
        page.pump();

        terminal.draw(|f| {
            let area = f.area();
            state.viewport = Size::new(i32::from(area.width), i32::from(area.height));
            state.hits = ui::draw(f, page, seek_step_percent);
        })?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, page) {
                    break;
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(mouse, page, &state),
            _ => {}
        }
    }

    Ok(())
}

/// Apply a key press to the page. Returns `true` when the user asked to quit.
pub(super) fn handle_key_event(key: KeyEvent, page: &mut Page) -> bool {
    let selected = page.selected;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => page.next(),
        KeyCode::Char('k') | KeyCode::Up => page.prev(),
        KeyCode::Char(' ') | KeyCode::Enter => page.dispatch(Action::Toggle(selected)),
        KeyCode::Char('h') | KeyCode::Left => {
            let step = page.seek_step();
            page.dispatch(Action::SeekBy(selected, -step));
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let step = page.seek_step();
            page.dispatch(Action::SeekBy(selected, step));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c.to_digit(10).unwrap_or(0)) / 10.0;
            page.dispatch(Action::Seek(selected, tenth));
        }
        KeyCode::Char('d') => page.dispatch(Action::Detach(selected)),
        KeyCode::Char('p') => page.dispatch(Action::FloatingToggle),
        KeyCode::Char('x') => page.dispatch(Action::Close),
        KeyCode::Char('m') => {
            if page.floating().is_some() {
                page.unmount_floating();
            } else {
                page.mount_floating();
            }
        }
        _ => {}
    }
    false
}

/// Map a mouse event to the hook under the pointer, or continue a drag.
pub(super) fn handle_mouse_event(mouse: MouseEvent, page: &mut Page, state: &EventLoopState) {
    let pointer = Point::new(i32::from(mouse.column), i32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some((hook, area)) = state.hits.hit(mouse.column, mouse.row) else {
                return;
            };
            match hook {
                Hook::TrackToggle(i) => {
                    page.set_selected(i);
                    page.dispatch(Action::Toggle(i));
                }
                Hook::TrackSeek(i) => {
                    page.set_selected(i);
                    page.dispatch(Action::Seek(i, ui::seek_fraction(area, mouse.column)));
                }
                Hook::TrackDetach(i) => {
                    page.set_selected(i);
                    page.dispatch(Action::Detach(i));
                }
                Hook::FloatingToggle => page.dispatch(Action::FloatingToggle),
                Hook::FloatingSeek => {
                    page.dispatch(Action::FloatingSeek(ui::seek_fraction(area, mouse.column)));
                }
                Hook::FloatingClose => page.dispatch(Action::Close),
                Hook::DragHandle => {
                    let origin = state
                        .hits
                        .floating_area()
                        .map(|r| Point::new(i32::from(r.x), i32::from(r.y)))
                        .unwrap_or(pointer);
                    page.drag_start(pointer, origin, false);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if page.is_dragging() {
                page.drag_move(pointer, state.viewport);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => page.drag_end(),
        _ => {}
    }
}
