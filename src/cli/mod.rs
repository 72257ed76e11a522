//! The `iimport` command-line interface.
//!
//! Parses arguments, sets up logging and settings, and dispatches to one
//! handler per subcommand. Every failure is printed as a miette report.

use std::{path::Path, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::{
    cli::args::{Command, Format, IimportArgs},
    config::Settings,
    document::{Document, DocumentSource, TextSource},
    engine::{Engine, Mode},
    errors::{print_error, IimportError},
    import::{Importer, Module},
    session::{Dispatch, Host, Session},
};

pub mod args;
pub mod output;

pub fn run() {
    let args = IimportArgs::parse();
    init_logging(args.verbose);

    let result = load_settings(args.config.as_deref())
        .and_then(|settings| dispatch(args.command, settings));

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, IimportError> {
    match path {
        Some(path) => Settings::load(path),
        None => Settings::discover(),
    }
}

/// Returns `Ok(false)` when the command ran but found problems.
fn dispatch(command: Command, mut settings: Settings) -> Result<bool, IimportError> {
    match command {
        Command::Transform {
            file,
            format,
            order,
        } => {
            if let Some(order) = order {
                settings.emit.order = order.into();
            }
            handle_transform(&settings, &file, format)
        }
        Command::Passthrough { file } => {
            let (engine, document) = prepare(&settings, &file)?;
            output::print_text(&engine.run(Mode::Passthrough, &document)?);
            Ok(true)
        }
        Command::Procedures { file } => {
            let (engine, document) = prepare(&settings, &file)?;
            output::print_procedures(&engine.transform(&document)?);
            Ok(true)
        }
        Command::Diff { file } => {
            let (engine, document) = prepare(&settings, &file)?;
            let before = engine.run(Mode::Passthrough, &document)?;
            let after = engine.run(Mode::Transform, &document)?;
            output::print_diff(&before, &after);
            Ok(true)
        }
        Command::Check { path } => handle_check(&settings, &path),
        Command::Import {
            name,
            alias,
            include,
        } => {
            let mut importer = Importer::from_settings(&settings)?;
            for dir in include {
                importer.resolver_mut().add_search_path(dir);
            }
            let module = importer.import(&name, alias.as_deref())?;
            output::print_heading(&format!("{} ({})", module.alias, module.path.display()));
            output::print_text(&module.text);
            Ok(true)
        }
        Command::Session { file, enabled } => handle_session(&settings, &file, enabled),
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

fn prepare(settings: &Settings, file: &Path) -> Result<(Engine, Document), IimportError> {
    let engine = Engine::new(settings)?;
    let document = source(settings).load(file)?;
    Ok((engine, document))
}

fn source(settings: &Settings) -> TextSource {
    TextSource::new(settings.document.cell_separator.clone())
}

fn handle_transform(settings: &Settings, file: &Path, format: Format) -> Result<bool, IimportError> {
    let (engine, document) = prepare(settings, file)?;
    let result = engine.transform(&document)?;
    match format {
        Format::Text => output::print_text(&engine.render(&result)),
        Format::Json => output::print_json(&result)?,
    }
    Ok(true)
}

fn handle_check(settings: &Settings, root: &Path) -> Result<bool, IimportError> {
    let engine = Engine::new(settings)?;
    let source = source(settings);
    let extension = settings.document.extension.as_str();
    let mut failures = 0;

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == extension))
    {
        let path = entry.path();
        match source.load(path).and_then(|doc| engine.transform(&doc)) {
            Ok(_) => output::print_status(&path.display().to_string(), true),
            Err(e) => {
                failures += 1;
                output::print_status(&path.display().to_string(), false);
                print_error(e);
            }
        }
    }
    tracing::info!(failures, "check finished");
    Ok(failures == 0)
}

/// Prints each binding instead of evaluating it.
struct PrintHost;

impl Host for PrintHost {
    fn bind(&mut self, alias: &str, module: Module) {
        output::print_heading(&format!("bound {alias}"));
        for name in module.procedure_names() {
            println!("{alias}.{name}");
        }
    }
}

fn handle_session(settings: &Settings, file: &Path, enabled: bool) -> Result<bool, IimportError> {
    let document = source(settings).load(file)?;
    let mut session = Session::new(settings)?;
    session.set_enabled(enabled);
    let mut host = PrintHost;
    let mut ok = true;

    for (index, cell) in document.cells().into_iter().enumerate() {
        let text = cell
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        output::print_heading(&format!("cell {}", index + 1));
        let run = session.execute_cell(&text, &mut host);
        for outcome in run.dispatched {
            match outcome {
                Ok(Dispatch::Inspect { text, .. }) => output::print_text(&text),
                Ok(other) => tracing::info!(?other, "command dispatched"),
                Err(e) => {
                    ok = false;
                    print_error(e);
                }
            }
        }
        output::print_text(&run.text);
    }
    Ok(ok)
}
