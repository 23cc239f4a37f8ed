use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use charsearch_core::{update, AppState, Generation, Msg, SearchFilter};
use charsearch_engine::FetchError;
use charsearch_logging::{search_info, search_warn};
use chrono::Local;
use clap::Parser;
use thiserror::Error;

use super::config::{Cli, ConfigError, ViewerConfig};
use super::effects::EffectRunner;
use super::logging;
use super::persistence;
use super::ui::constants::{HELP_TEXT, PROMPT};
use super::ui::input::{parse_command, Command};
use super::ui::render::{card_details, character_list, render};
use super::ui::viewport::Viewport;

/// Everything the UI loop reacts to, from the input thread or the engine.
pub(crate) enum AppEvent {
    Command(Command),
    InvalidInput(String),
    Msg(Msg),
    InputClosed,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot start engine: {0}")]
    Engine(#[from] FetchError),
}

pub fn run_app() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = ViewerConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    logging::initialize(config.log, cli.verbose);

    let settings = config.search_settings()?;
    search_info!("charsearch starting against {}", settings.api_base);

    let (app_tx, app_rx) = mpsc::channel();
    let runner = EffectRunner::new(config.engine_config(), app_tx.clone())?;
    spawn_input_reader(app_tx);

    let mut app = App::new(
        AppState::with_settings(settings),
        runner,
        Viewport::new(config.viewport_rows),
        config.download_dir.clone(),
        Box::new(io::stdout()),
    );

    app.emit("charsearch: type `help` for commands.");
    app.dispatch(Msg::Started);

    let initial = match cli.character.as_deref() {
        Some(character) => Some(SearchFilter::from_inputs(character, None, "")),
        None if config.restore_last_search => persistence::load_last_search(&config.download_dir),
        None => None,
    };
    if let Some(filter) = initial {
        app.start_search(filter);
    }
    app.prompt();

    while let Ok(event) = app_rx.recv() {
        if !app.handle(event) {
            break;
        }
    }

    search_info!("charsearch exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    viewport: Viewport,
    state_dir: PathBuf,
    drawn_generation: Generation,
    out: Box<dyn Write>,
}

impl App {
    fn new(
        state: AppState,
        runner: EffectRunner,
        viewport: Viewport,
        state_dir: PathBuf,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            state,
            runner,
            viewport,
            state_dir,
            drawn_generation: 0,
            out,
        }
    }

    /// Returns false when the loop should stop.
    fn handle(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Msg(msg) => {
                if self.dispatch(msg) {
                    self.prompt();
                }
            }
            AppEvent::Command(command) => return self.run_command(command),
            AppEvent::InvalidInput(message) => {
                self.emit(&message);
                self.prompt();
            }
            AppEvent::InputClosed => return false,
        }
        true
    }

    fn run_command(&mut self, command: Command) -> bool {
        match command {
            Command::Search(filter) => self.start_search(filter),
            Command::Scroll(movement) => {
                let (viewport_bottom, document_height) =
                    self.viewport.scroll(&movement, self.state.card_count());
                let drawn = self.dispatch(Msg::Scrolled {
                    viewport_bottom,
                    document_height,
                });
                if !drawn {
                    self.draw();
                }
            }
            Command::Retry => {
                self.dispatch(Msg::RetryRequested);
            }
            Command::Save(number) => {
                self.dispatch(Msg::SaveCardRequested { index: number - 1 });
            }
            Command::Show(number) => {
                let text = match self.state.result_item(number - 1) {
                    Some(item) => card_details(number, item),
                    None => format!("There is no card {number}."),
                };
                self.emit(&text);
            }
            Command::Characters => {
                let view = self.state.view();
                self.emit(&character_list(&view.characters));
                if view.characters.is_empty() {
                    self.dispatch(Msg::CharactersRequested);
                }
            }
            Command::Status => self.draw(),
            Command::Dismiss => {
                self.dispatch(Msg::NoticeDismissed);
            }
            Command::Help => self.emit(HELP_TEXT),
            Command::Quit => return false,
        }
        self.prompt();
        true
    }

    fn start_search(&mut self, filter: SearchFilter) {
        if filter.has_character() {
            persistence::save_last_search(&self.state_dir, &filter);
        }
        self.dispatch(Msg::SearchSubmitted(filter));
    }

    /// Runs one update cycle; returns whether the screen was redrawn.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        charsearch_logging::set_search_generation(state.generation());
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.run(effects);
        if was_dirty {
            self.draw();
        }
        was_dirty
    }

    fn draw(&mut self) {
        let view = self.state.view();
        if view.generation != self.drawn_generation {
            self.viewport.reset();
            self.drawn_generation = view.generation;
        }
        let screen = render(&view, &self.viewport);

        self.emit("");
        self.emit(&screen.header);
        for line in &screen.cards {
            self.emit(line);
        }
        if let Some(notice) = screen.notice {
            self.emit(&format!("[{}] {}", Local::now().format("%H:%M:%S"), notice));
        }
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    fn prompt(&mut self) {
        let _ = write!(self.out, "{PROMPT}");
        let _ = self.out.flush();
    }
}

fn spawn_input_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let event = match line {
                Ok(line) => match parse_command(&line) {
                    Ok(command) => AppEvent::Command(command),
                    Err(message) => AppEvent::InvalidInput(message),
                },
                Err(err) => {
                    search_warn!("stdin closed with error: {}", err);
                    break;
                }
            };
            if app_tx.send(event).is_err() {
                return;
            }
        }
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}
