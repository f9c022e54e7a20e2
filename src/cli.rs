//! CLI interface for Checklist.
//!
//! Two commands:
//!
//! - `checklist catalog` prints the checklist the form is built from.
//! - `checklist shell` starts a session with a fresh form. Commands are read
//!   line by line from stdin, so a session can be typed or piped in.
//!
//! `--catalog` and `--recipient` override the config file.

mod external;
mod format;
mod shell;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::export::{MailComposer, SnapshotRenderer};
use crate::model::Catalog;
use crate::store::FormStore;

use external::{CommandComposer, CommandRenderer, PrintOnly};
use format::format_catalog;
use shell::Session;

/// Checklist: fill in an area assessment and export it.
#[derive(Debug, Parser)]
#[command(name = "checklist", after_long_help = SESSION_HELP)]
pub struct Cli {
    /// JSON catalog to assess against instead of the built-in one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Email recipient for this session.
    #[arg(long, global = true)]
    recipient: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const SESSION_HELP: &str = r#"Session: filling in a form
  checklist shell <<'EOF'
  header area "Kiln 2"
  header assessor Rina
  status 1.1 ok
  status 2.1 not-ok
  describe 2.1 "No helmets at the loading bay"
  add 2.1
  status 2.1 ok -i 1
  validate
  email
  EOF

Inside the shell, `help` lists every command."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the catalog: sections and items.
    Catalog {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session on a fresh form.
    Shell,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let catalog = load_catalog(cli.catalog.as_deref().or(config.catalog.as_deref()))?;

    match cli.command {
        Command::Catalog { json } => cmd_catalog(&catalog, json),
        Command::Shell => {
            let recipient = cli
                .recipient
                .unwrap_or_else(|| config.default_recipient.clone());
            cmd_shell(config, catalog, recipient)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, String> {
    match path {
        Some(path) => {
            let catalog = Catalog::load(path)
                .map_err(|e| format!("failed to load catalog {}: {e}", path.display()))?;
            debug!(path = %path.display(), items = catalog.item_count(), "catalog loaded");
            Ok(catalog)
        }
        None => Ok(Catalog::builtin()),
    }
}

fn cmd_catalog(catalog: &Catalog, json: bool) -> Result<(), String> {
    if json {
        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| format!("failed to serialize catalog: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format_catalog(catalog));
    }
    Ok(())
}

fn cmd_shell(config: &Config, catalog: Catalog, recipient: String) -> Result<(), String> {
    let renderer: Box<dyn SnapshotRenderer> =
        Box::new(CommandRenderer::new(config.snapshot.command.clone()));
    let composer: Box<dyn MailComposer> = match &config.mail.opener {
        Some(opener) => Box::new(CommandComposer::new(opener.clone())),
        None => Box::new(PrintOnly),
    };

    let mut session = Session::new(
        FormStore::new(catalog),
        recipient,
        config.snapshot.scale,
        renderer,
        composer,
    );

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    shell::run(
        &mut session,
        stdin.lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
        prompt,
    )
}
