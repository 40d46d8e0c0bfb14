//! Main entry point for fitframe

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

use fitframe::{
    config::Config,
    download::DirectorySink,
    export::{export_activity, ExportJob},
    image_loader::load_image,
    input::handle_event,
    logging::{init_logging, interactive_target, LogTarget},
    params::{Anchor, FontFamily, MetricSet, OverlayStyle, RenderParameters},
    state::AppState,
    terminal_capabilities::detect_capabilities,
    ui,
    worker::{spawn_export_worker, ExportContext, WorkerHandle},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

const USAGE: &str = "\
Usage: fitframe [OPTIONS]

Options:
  --image <path>        Photo to load
  --distance <km>       Distance value
  --time <text>         Moving time value
  --elevation <m>       Elevation gain value
  --font <name>         arial, helvetica, times-new-roman, courier, verdana
  --font-size <px>      Font size in pixels (1-512)
  --anchor <position>   bottom, top, left or right
  --icons <dir|none>    Load icons from a directory, or draw none
  --out-dir <dir>       Where exports are written
  --config <file>       Read configuration from this file
  --export-once         Export a single JPEG and exit, without the UI
  -h, --help            Print this help";

/// Command line options; anything unset falls back to the config file
#[derive(Debug, Default)]
struct Args {
    image: Option<PathBuf>,
    export_once: bool,
    distance: Option<String>,
    time: Option<String>,
    elevation: Option<String>,
    font: Option<FontFamily>,
    font_size: Option<u32>,
    anchor: Option<Anchor>,
    icons: Option<String>,
    out_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    help: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(a) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("Missing value for {}", a))
        };
        match a.as_str() {
            "--image" => args.image = Some(PathBuf::from(value()?)),
            "--export-once" => args.export_once = true,
            "--distance" => args.distance = Some(value()?),
            "--time" => args.time = Some(value()?),
            "--elevation" => args.elevation = Some(value()?),
            "--font" => args.font = Some(value()?.parse()?),
            "--font-size" => {
                let raw = value()?;
                let size = raw
                    .parse::<u32>()
                    .with_context(|| format!("Invalid font size: {}", raw))?;
                args.font_size = Some(size);
            }
            "--anchor" => args.anchor = Some(Anchor::from_name(&value()?)),
            "--icons" => args.icons = Some(value()?),
            "--out-dir" => args.out_dir = Some(PathBuf::from(value()?)),
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "-h" | "--help" => args.help = true,
            other => anyhow::bail!("Unknown argument: {}\n\n{}", other, USAGE),
        }
    }
    Ok(args)
}

/// Fold command line overrides into the loaded configuration
fn apply_args(config: &mut Config, args: &Args) -> Result<()> {
    let mut style = config.style();
    if let Some(font) = args.font {
        style.font = font;
    }
    if let Some(anchor) = args.anchor {
        style.anchor = anchor;
    }
    if let Some(size) = args.font_size {
        style = OverlayStyle::new(style.font, size, style.anchor)?;
    }
    config.set_style(style);

    match args.icons.as_deref() {
        Some("none") => config.icons.enabled = false,
        Some(dir) => {
            config.icons.enabled = true;
            config.icons.directory = Some(PathBuf::from(dir));
        }
        None => {}
    }
    if let Some(ref dir) = args.out_dir {
        config.export.output_dir = Some(dir.clone());
    }
    Ok(())
}

fn metrics_from(args: &Args) -> MetricSet {
    MetricSet::new(
        args.distance.clone().unwrap_or_default(),
        args.time.clone().unwrap_or_default(),
        args.elevation.clone().unwrap_or_default(),
    )
}

fn main() -> Result<()> {
    let args = parse_args()?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    apply_args(&mut config, &args)?;

    if args.export_once {
        init_logging(&config.logging, &LogTarget::Stderr)?;
        return run_export_once(&config, &args);
    }

    init_logging(&config.logging, &interactive_target(&config.logging))?;
    run_interactive(config, &args)
}

/// Export a single JPEG and exit
fn run_export_once(config: &Config, args: &Args) -> Result<()> {
    let source = args.image.as_deref().map(load_image).transpose()?;
    let job = ExportJob {
        source: source.map(Arc::new),
        params: RenderParameters::new(metrics_from(args), config.style()),
    };

    let settings = config.export_settings()?;
    let fonts = Arc::new(config.font_library());
    let sink = Arc::new(DirectorySink::new(config.output_dir()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    match runtime.block_on(export_activity(job, fonts, sink, &settings))? {
        Some(report) => println!(
            "Saved {} ({}x{}, {} icons) in {}ms",
            report.location,
            report.width,
            report.height,
            report.icons_drawn,
            report.elapsed.as_millis()
        ),
        None => println!("No image given, nothing exported (use --image <path>)"),
    }
    Ok(())
}

/// Run the terminal UI until the user quits
fn run_interactive(config: Config, args: &Args) -> Result<()> {
    let capabilities = detect_capabilities();
    let colors = config.colors()?;
    let fonts = Arc::new(config.font_library());

    let worker = spawn_export_worker(ExportContext {
        fonts: fonts.clone(),
        sink: Arc::new(DirectorySink::new(config.output_dir())),
        settings: config.export_settings()?,
        policy: config.export.policy,
    })?;

    let mut app_state = AppState::new(config, capabilities, fonts, colors, worker.requests.clone());
    app_state.metrics = metrics_from(args);

    if let Some(ref path) = args.image {
        match load_image(path) {
            Ok(img) => app_state.set_source(path.clone(), img),
            Err(e) => {
                warn!(error = %e, "startup image failed to load");
                app_state.set_status(&format!("Failed to load image: {}", e), true);
            }
        }
    }

    // Restore the terminal before the default hook prints the panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app_state, &worker);
    cleanup_terminal(terminal)?;

    let style = app_state.style;
    app_state.config.set_style(style);
    if let Err(e) = app_state.config.save() {
        error!(error = %e, "failed to save config");
        eprintln!("Warning: Failed to save config: {}", e);
    }

    worker.shutdown();
    info!("fitframe exited");
    result
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, drains export responses, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    worker: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);

    loop {
        let frame_start = Instant::now();

        app_state.refresh_preview();
        terminal.draw(|frame| ui::render(frame, app_state))?;

        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;

            if let Event::Resize(width, height) = event {
                app_state.set_terminal_size(width, height);
            }

            handle_event(event, app_state)?;
        }

        while let Ok(response) = worker.response_rx.try_recv() {
            app_state.handle_worker_response(response);
        }

        if app_state.should_quit {
            break;
        }
    }

    Ok(())
}
