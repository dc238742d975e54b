use std::env;
use std::path::Path;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::Page;
use crate::library::scan;
use crate::media::RodioFactory;

mod event_loop;
mod logging;
mod settings;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(dir = %dir, tracks = tracks.len(), "starting");

    let mut stream = rodio::OutputStreamBuilder::open_default_stream()
        .map_err(crate::error::MediaError::from)?;
    stream.log_on_drop(false);
    let factory = RodioFactory::new(stream.mixer().clone());

    let mut page = Page::new(tracks, Box::new(factory), &settings, &mut rand::rng());
    page.set_current_dir(dir);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut page);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    // Stop every handle before the output stream goes away.
    drop(page);
    drop(stream);
    info!("stopped");

    run_result
}
