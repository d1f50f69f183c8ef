use clap::Parser;
use color_eyre::Result;
use log::LevelFilter;
use polars::prelude::DataFrame;
use ratatui::DefaultTerminal;
use salesdash::error::user_message_from_report;
use salesdash::{
    build_dashboard, chart_export, report, source, App, AppConfig, AppEvent, Args, CacheManager,
    ChartKind, ConfigManager, OpenOptions, OutputFormat, PipelineOptions, APP_NAME,
};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run_tui(mut terminal: DefaultTerminal, mut app: App, poll_interval: Duration) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(AppEvent::Exit) => break,
            Ok(event) => {
                if let Some(event) = app.event(&event) {
                    tx.send(event)?;
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Print and/or export the dashboard without starting the terminal UI.
fn run_batch(
    args: &Args,
    raw: &DataFrame,
    kind: ChartKind,
    options: &PipelineOptions,
    config: &AppConfig,
    source_name: &str,
) -> Result<()> {
    let dashboard = build_dashboard(raw, kind, options)?;

    match args.output {
        Some(OutputFormat::Text) => print!(
            "{}",
            report::render_text(&dashboard, source_name, &config.display.currency_symbol)?
        ),
        Some(OutputFormat::Json) => println!("{}", report::render_json(&dashboard, source_name)?),
        None => {}
    }

    if let Some(path) = &args.export_chart {
        chart_export::write_chart(path, &dashboard.chart)?;
        if args.output.is_none() {
            println!("Chart written to {}", path.display());
        }
    }
    Ok(())
}

fn init_logging(args: &Args, config: &AppConfig, to_file: bool) {
    let level = if args.debug || config.debug.enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    // RUST_LOG overrides the default level
    builder.parse_default_env();

    if to_file {
        match CacheManager::new(APP_NAME).and_then(|cache| cache.open_log_file()) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Nowhere to write without disturbing the terminal UI
            Err(_) => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config = ConfigManager::new(APP_NAME)?;
        match config.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration file written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing config: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&args, &config, !args.is_batch());

    let Some(path) = args.path.clone() else {
        eprintln!("Error: a PATH to a sales CSV is required");
        std::process::exit(1);
    };
    let source_name = path.display().to_string();
    let open_options = OpenOptions::from_args_and_config(&args, &config);
    let pipeline = PipelineOptions::from_args_and_config(&args, &config);
    let kind = args
        .chart
        .or_else(|| config.default_chart())
        .unwrap_or_default();

    let raw = match source::read_csv_path(&path, &open_options) {
        Ok(raw) => raw,
        Err(e) => fail(&e, &path),
    };

    let result = if args.is_batch() {
        run_batch(&args, &raw, kind, &pipeline, &config, &source_name)
    } else {
        let app = App::new(
            raw,
            source_name,
            pipeline,
            config.display.currency_symbol.clone(),
            kind,
        );
        let poll = Duration::from_millis(config.performance.event_poll_interval_ms);
        let terminal = ratatui::init();
        let result = run_tui(terminal, app, poll);
        ratatui::restore();
        result
    };

    if let Err(e) = result {
        fail(&e, &path);
    }
    Ok(())
}

fn fail(e: &color_eyre::eyre::Report, path: &Path) -> ! {
    log::error!("{:?}", e);
    eprintln!("Error: {}", user_message_from_report(e, Some(path)));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_flags() {
        let args = Args::parse_from(["salesdash", "--output", "json", "sales.csv"]);
        assert!(args.is_batch());
        let args = Args::parse_from(["salesdash", "sales.csv"]);
        assert!(!args.is_batch());
    }

    #[test]
    fn test_args_to_open_options() {
        let args = Args::parse_from([
            "salesdash",
            "--skip-rows",
            "2",
            "--delimiter",
            ";",
            "--compression",
            "gzip",
            "sales.csv",
        ]);
        let opts: OpenOptions = (&args).into();
        assert_eq!(opts.skip_rows, Some(2));
        assert_eq!(opts.delimiter, Some(b';'));
        assert_eq!(
            opts.compression,
            Some(salesdash::CompressionFormat::Gzip)
        );
    }
}
