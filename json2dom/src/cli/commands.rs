//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::demo::{self, DEMO_CONTAINER_ID};
use crate::application::ApplicationError;
use crate::application::services::{ConvertService, InputFormat};
use crate::cli::args::{Cli, Commands, ConfigCommands, FormatArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{self, Settings};
use crate::domain::render::{self, RenderOptions};
use crate::domain::{Callback, Document, DomainError, NodeId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Render {
            file,
            mount,
            format,
            output,
            compact,
        }) => cmd_render(file, mount.as_deref(), *format, output.as_deref(), *compact),
        Some(Commands::Tree { file, format }) => cmd_tree(file, *format),
        Some(Commands::Check { files, format }) => cmd_check(files, *format),
        Some(Commands::Demo { click }) => cmd_demo(*click),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

/// Services for a description file, with local config taken from its directory.
fn services_for(file: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(file.parent())?;
    debug!(?settings, "effective settings");
    Ok(ServiceContainer::new(settings))
}

fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(|e| InfraError::io("write to stdout", e))?;
    Ok(())
}

#[instrument]
fn cmd_render(
    file: &Path,
    mount: Option<&str>,
    format: Option<FormatArg>,
    output_path: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let container = services_for(file)?;
    let service = container.convert_service();
    let description = service.load(file, format.map(InputFormat::from))?;

    let result = match mount {
        Some(id) => {
            let id = if id.is_empty() {
                container.settings.container_id.as_str()
            } else {
                id
            };
            service.convert_and_mount(&description, id)?
        }
        None => service.convert(&description)?,
    };

    let html = if compact {
        service.render_with(&result, &RenderOptions::compact())
    } else {
        service.render(&result)
    };

    match output_path {
        Some(path) => {
            service.write_output(path, &html)?;
            output::action("Wrote", &path.display());
            Ok(())
        }
        None => write_stdout(&html),
    }
}

#[instrument]
fn cmd_tree(file: &Path, format: Option<FormatArg>) -> CliResult<()> {
    let container = services_for(file)?;
    let service = container.convert_service();
    let description = service.load(file, format.map(InputFormat::from))?;
    let result = service.convert(&description)?;
    write_stdout(&render::to_tree(&result.document, result.root).to_string())
}

#[instrument]
fn cmd_check(files: &[PathBuf], format: Option<FormatArg>) -> CliResult<()> {
    let mut failed = 0;
    for file in files {
        match check_one(file, format) {
            Ok(summary) => output::success(&format!("{}: {summary}", file.display())),
            Err(e) => {
                failed += 1;
                output::error(&format!("{}: {e}", file.display()));
            }
        }
    }
    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}

fn check_one(file: &Path, format: Option<FormatArg>) -> CliResult<String> {
    let container = services_for(file)?;
    let service: ConvertService = container.convert_service();
    let description = service.load(file, format.map(InputFormat::from))?;
    service.convert(&description)?;
    Ok(format!(
        "<{}> with {} elements, depth {}",
        description.tag(),
        description.node_count(),
        description.depth()
    ))
}

#[instrument]
fn cmd_demo(click: bool) -> CliResult<()> {
    let service = ServiceContainer::new(Settings::load(None)?).convert_service();
    let summon = Callback::new("myfunc", || output::action("alert", "I have been summoned"));
    let description = demo::issue_form(summon);

    let result = service.convert_and_mount(&description, DEMO_CONTAINER_ID)?;
    write_stdout(&service.render(&result))?;

    if click {
        let button = last_button(&result.document, result.root)
            .ok_or_else(|| CliError::InvalidArgs("demo has no button".to_string()))?;
        let handled = result
            .document
            .dispatch(button, "click")
            .map_err(DomainError::from)
            .map_err(ApplicationError::from)?;
        if !handled {
            output::detail("button has no click handler");
        }
    }
    Ok(())
}

fn last_button(document: &Document, root: NodeId) -> Option<NodeId> {
    document
        .descendants(root)
        .filter(|&node| document.tag(node) == Some("button"))
        .last()
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(std::env::current_dir().ok().as_deref())?;
            output::header("Effective configuration");
            write_stdout(&settings.to_toml()?)
        }
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not created" };
                    output::action("Global", &format!("{} ({state})", path.display()));
                }
                None => output::detail("no config directory available on this platform"),
            }
            Ok(())
        }
        ConfigCommands::Template => write_stdout(&Settings::template()),
    }
}
