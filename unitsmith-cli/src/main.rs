use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use log::debug;

use unitsmith::{
    DEFAULT_UNIT_DIR, Editor, Manager, PromptMode, TerminalPrompter, UnitSchema, default_schema,
};

const DEFAULT_BUILD_SCHEMA: &str = "schemas/default-schema";
const DEFAULT_EDITOR: &str = "vim";
const MAINTAINER_NICK: &str = "fanatique";
const MAINTAINER_EMAIL: &str = "forcigner@gmail.com";

#[derive(Debug, Parser)]
#[command(
    name = "unitsmith",
    version,
    about = "Semi-automated configuration of systemd service unit files"
)]
struct Cli {
    /// Name of the service to configure, edit or delete
    #[arg(value_name = "SERVICE")]
    service_name: Option<String>,

    /// Load defaults from a custom schema file instead of the bundled one
    #[arg(short = 'c', long = "schema", value_name = "PATH", conflicts_with_all = ["edit", "delete", "build", "info"])]
    schema: Option<PathBuf>,

    /// Open an existing unit file in the editor instead of creating one
    #[arg(long, conflicts_with_all = ["delete", "short", "extended", "info"])]
    edit: bool,

    /// Show information about this tool
    #[arg(long, conflicts_with_all = ["build", "delete", "short", "extended", "service_name"])]
    info: bool,

    /// Write the bundled default schema to schemas/default-schema
    #[arg(short = 'b', long, conflicts_with_all = ["delete", "short", "extended", "service_name"])]
    build: bool,

    /// Present only the short set of keys for override
    #[arg(short = 's', long, conflicts_with = "extended")]
    short: bool,

    /// Present every schema key for override
    #[arg(short = 'x', long)]
    extended: bool,

    /// Output directory for the service unit file
    #[arg(short = 'd', long, value_name = "DIR", default_value = DEFAULT_UNIT_DIR)]
    directory: PathBuf,

    /// Delete the named service's unit file
    #[arg(long)]
    delete: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let cli = Cli::parse();
    debug!("parsed arguments: {cli:?}");

    if cli.info {
        print_info();
        return Ok(());
    }

    if cli.build {
        Manager::build_default_schema(Path::new(DEFAULT_BUILD_SCHEMA))?;
        println!("Default schema built at {DEFAULT_BUILD_SCHEMA}.");
        return Ok(());
    }

    let service = cli
        .service_name
        .as_deref()
        .ok_or_else(|| eyre!("a service name is required; see --help"))?;
    let manager = Manager::new(&cli.directory);

    if cli.delete {
        let path = manager.delete(service)?;
        println!("Deleted {}.", path.display());
        return Ok(());
    }

    if cli.edit {
        let path = manager.edit(service, &ShellEditor::from_env())?;
        println!("Edited {}.", path.display());
        return Ok(());
    }

    let schema = load_schema(cli.schema.as_deref())?;
    let mode = if cli.short {
        PromptMode::Short
    } else if cli.extended {
        PromptMode::Extended
    } else {
        PromptMode::Standard
    };

    let mut prompter = TerminalPrompter::new(!cli.no_color);
    let path = manager.create(service, &schema, mode, &mut prompter)?;
    println!("\nService created at {}.", path.display());

    if confirm("Do you want to manually edit the new configuration? [y/N]: ")? {
        println!("Opening editor...");
        manager.edit(service, &ShellEditor::from_env())?;
    } else {
        println!("The configuration file won't be edited.");
    }

    Ok(())
}

fn load_schema(custom: Option<&Path>) -> Result<UnitSchema> {
    match custom {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read schema {}", path.display()))?;
            Ok(UnitSchema::parse(&text)?)
        }
        None => Ok(default_schema()?),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question}");
    io::stdout().flush().wrap_err("failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("failed to read reply")?;
    let reply = line.trim().to_ascii_lowercase();
    Ok(reply == "y" || reply == "yes")
}

fn print_info() {
    println!(
        "unitsmith {}, a helper for configuring systemd services.",
        env!("CARGO_PKG_VERSION")
    );
    println!("Maintainer: {MAINTAINER_NICK}");
    println!("Email: {MAINTAINER_EMAIL}");
}

/// Runs `$EDITOR` (falling back to vim) on the unit file.
struct ShellEditor {
    program: String,
}

impl ShellEditor {
    fn from_env() -> Self {
        Self {
            program: env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string()),
        }
    }
}

impl Editor for ShellEditor {
    fn open(&self, path: &Path) -> anyhow::Result<()> {
        let status = Command::new(&self.program)
            .arg(path)
            .status()
            .with_context(|| format!("failed to launch editor {}", self.program))?;
        if !status.success() {
            bail!("editor {} exited with {status}", self.program);
        }
        Ok(())
    }
}
