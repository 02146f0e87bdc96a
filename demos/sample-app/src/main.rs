//! # webconfig sample host
//!
//! A host application that exposes a handful of its own values through the
//! browser. Open `http://localhost:8080/` and pick a form from the menu.
//!
//! - **player**: a text field, a select, and a float slider
//! - **debug**: a boolean, an integer slider, a button, a link, and Quit
//!
//! Values on `debug` are auto-saved and come back on the next run.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package webconfig-sample-app -- --port 8080 --root www
//! ```

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use webconfig_core::logging::setup_logging;
use webconfig_core::{settings_loader, Settings, WebConfigResult};
use webconfig_forms::Input;
use webconfig_views::WebConfigApp;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Parser)]
#[command(name = "sample-app", about = "Configure a running host from a browser")]
struct Cli {
    /// TOML settings file. Environment overrides apply either way.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Folder holding static content and the snapshot file.
    #[arg(short, long)]
    root: Option<PathBuf>,
}

/// State owned by the host and edited from the browser.
struct HostState {
    player_name: Rc<RefCell<String>>,
    difficulty: Rc<Cell<usize>>,
    volume: Rc<Cell<f64>>,
    show_stats: Rc<Cell<bool>>,
    fun: Rc<Cell<i64>>,
    quit: Rc<Cell<bool>>,
}

impl HostState {
    fn new() -> Self {
        Self {
            player_name: Rc::new(RefCell::new("david".to_string())),
            difficulty: Rc::new(Cell::new(1)),
            volume: Rc::new(Cell::new(0.5)),
            show_stats: Rc::new(Cell::new(false)),
            fun: Rc::new(Cell::new(50)),
            quit: Rc::new(Cell::new(false)),
        }
    }
}

fn load_settings(cli: &Cli) -> WebConfigResult<Settings> {
    let mut settings = match &cli.config {
        Some(path) => settings_loader::from_toml_file_with_env(path)?,
        None => settings_loader::from_env(),
    };
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(root) = &cli.root {
        settings.root_folder.clone_from(root);
    }
    Ok(settings)
}

fn register_inputs(app: &mut WebConfigApp, state: &HostState) -> WebConfigResult<()> {
    let (get, set) = (state.player_name.clone(), state.player_name.clone());
    app.register(
        Input::text("player/Name", move || get.borrow().clone(), move |v| {
            *set.borrow_mut() = v.to_string();
        })?
        .title("Shown above the player"),
    );

    let (get, set) = (state.difficulty.clone(), state.difficulty.clone());
    app.register(
        Input::select("player/Difficulty", move || get.get(), move |v| set.set(v))?
            .options(["Easy", "Normal", "Hard"]),
    );

    let (get, set) = (state.volume.clone(), state.volume.clone());
    app.register(
        Input::slider_float("player/Volume", move || get.get(), move |v| set.set(v))?
            .range(0.0, 1.0, 2)
            .value_count(21),
    );

    let (get, set) = (state.show_stats.clone(), state.show_stats.clone());
    app.register(
        Input::boolean("debug/Show Stats", move || get.get(), move |v| set.set(v))?
            .labels("On", "Off"),
    );

    let (get, set) = (state.fun.clone(), state.fun.clone());
    app.register(Input::slider_int("debug/Fun", move || get.get(), move |v| set.set(v))?);

    let fun = state.fun.clone();
    app.register(
        Input::button("debug/Log Values", move || {
            tracing::info!(fun = fun.get(), "log values pressed");
        })?
        .title("Write the current values to the log"),
    );

    app.register(Input::link("debug/Home", "/")?);

    let quit = state.quit.clone();
    app.register(Input::button("debug/Quit", move || quit.set(true))?);

    app.form_mut("debug").auto_save = true;
    Ok(())
}

fn run(cli: &Cli) -> WebConfigResult<()> {
    let settings = load_settings(cli)?;
    setup_logging(&settings)?;

    let state = HostState::new();
    let mut app = WebConfigApp::new(settings);
    app.startup()?;
    register_inputs(&mut app, &state)?;
    if let Some(addr) = app.local_addr() {
        tracing::info!(%addr, "open the address in a browser");
    }

    while !state.quit.get() {
        app.update()?;
        thread::sleep(POLL_INTERVAL);
    }

    tracing::info!(
        name = %state.player_name.borrow(),
        difficulty = state.difficulty.get(),
        volume = state.volume.get(),
        show_stats = state.show_stats.get(),
        fun = state.fun.get(),
        "quitting"
    );
    app.shutdown()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sample-app: {e}");
            ExitCode::FAILURE
        }
    }
}
