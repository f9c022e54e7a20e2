//! The interactive shell: one form in memory for the life of the process.
//!
//! Lines are split into words (single and double quotes group words,
//! backslash escapes) and parsed with clap, so `help` and `<command> --help`
//! work as they do on the command line. Errors are reported and the session
//! carries on; only `quit` or end of input ends it.

use std::io::{BufRead, Write};
use std::mem;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::civil::Date;
use tracing::debug;

use crate::export::{self, ExportError, MailComposer, SnapshotRenderer};
use crate::model::{InstancePath, ItemPath, Outcome, Photo};
use crate::store::FormStore;
use crate::store::edit::{FollowUpEdit, HeaderEdit};
use crate::view::summary_counts;

use super::format::{format_form, format_summary};

#[derive(Debug, Parser)]
#[command(name = "checklist", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Show the form: header, sections, and the open section's items.
    Show,

    /// Outcome counts per section and overall.
    Summary,

    /// Open a section by index. Opening the open section closes it.
    Open { section: usize },

    /// Show only "Not OK" instances, or everything.
    Filter {
        #[arg(value_enum)]
        mode: FilterMode,
    },

    /// Set a header field.
    Header {
        #[arg(value_enum)]
        field: HeaderField,
        /// New value. Dates are `YYYY-MM-DD`.
        value: String,
    },

    /// Set a follow-up field. An empty target date clears it.
    FollowUp {
        #[arg(value_enum)]
        field: FollowUpField,
        #[arg(default_value = "")]
        value: String,
    },

    /// Press an outcome on an instance. Pressing the recorded outcome clears it.
    Status {
        /// Item id, e.g. `1.1`.
        item: String,
        #[arg(value_enum)]
        outcome: OutcomeArg,
        /// Instance position within the item, from 0.
        #[arg(long, short, default_value_t = 0)]
        instance: usize,
    },

    /// Set the description of an instance.
    Describe {
        item: String,
        text: String,
        #[arg(long, short, default_value_t = 0)]
        instance: usize,
    },

    /// Attach a photo to an instance, or remove it with `--clear`.
    Photo {
        item: String,
        #[arg(required_unless_present = "clear")]
        path: Option<PathBuf>,
        #[arg(long, conflicts_with = "path")]
        clear: bool,
        #[arg(long, short, default_value_t = 0)]
        instance: usize,
    },

    /// Add another instance of a repeatable item.
    Add { item: String },

    /// Remove an instance. An item's only instance stays.
    Remove {
        item: String,
        #[arg(long, short, default_value_t = 0)]
        instance: usize,
    },

    /// Check the whole form and flag every incomplete instance.
    Validate,

    /// Validate, then open a pre-filled email with the "Not OK" findings.
    Email {
        /// Recipient. Defaults to the configured recipient.
        #[arg(long)]
        to: Option<String>,
    },

    /// Validate, then render the full form to a document.
    Pdf,

    /// Discard the form and start over.
    Reset {
        /// Confirm discarding every answer.
        #[arg(long)]
        yes: bool,
    },

    /// Print the form as JSON.
    Dump,

    /// End the session.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterMode {
    /// Only "Not OK" instances.
    On,
    /// Everything.
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeaderField {
    Date,
    Area,
    Assessor,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FollowUpField {
    Summary,
    Recommendations,
    Person,
    TargetDate,
}

/// Shell-facing outcome, mapped to the domain `Outcome`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Ok,
    NotOk,
    Na,
}

impl OutcomeArg {
    fn to_domain(self) -> Outcome {
        match self {
            Self::Ok => Outcome::Ok,
            Self::NotOk => Outcome::NotOk,
            Self::Na => Outcome::NotApplicable,
        }
    }
}

/// Whether the session goes on after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Quit,
}

enum Reply {
    Text(String),
    Quit,
}

/// One shell session and its collaborators.
pub(super) struct Session {
    store: FormStore,
    recipient: String,
    scale: f32,
    renderer: Box<dyn SnapshotRenderer>,
    composer: Box<dyn MailComposer>,
}

impl Session {
    pub(super) fn new(
        store: FormStore,
        recipient: String,
        scale: f32,
        renderer: Box<dyn SnapshotRenderer>,
        composer: Box<dyn MailComposer>,
    ) -> Self {
        Self {
            store,
            recipient,
            scale,
            renderer,
            composer,
        }
    }

    /// Run one line. Output goes to `out`; a failed command returns its
    /// message as `Err`.
    pub(super) fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, String> {
        let words = split_words(line).map_err(|e| format!("error: {e}"))?;
        if words.first().is_none_or(|w| w.starts_with('#')) {
            return Ok(Flow::Continue);
        }

        let command = match Line::try_parse_from(words) {
            Ok(line) => line.command,
            Err(e) if !e.use_stderr() => {
                write!(out, "{e}").map_err(write_failed)?;
                return Ok(Flow::Continue);
            }
            Err(e) => return Err(e.to_string().trim_end().to_string()),
        };
        debug!(?command, "shell command");

        match self.dispatch(command).map_err(|e| format!("error: {e}"))? {
            Reply::Text(text) => {
                out.write_all(text.as_bytes()).map_err(write_failed)?;
                if !text.is_empty() && !text.ends_with('\n') {
                    writeln!(out).map_err(write_failed)?;
                }
                Ok(Flow::Continue)
            }
            Reply::Quit => Ok(Flow::Quit),
        }
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Reply, String> {
        let text = match command {
            ShellCommand::Show => format_form(&self.store),
            ShellCommand::Summary => format_summary(&summary_counts(self.store.report())),
            ShellCommand::Open { section } => self.cmd_open(section)?,
            ShellCommand::Filter { mode } => {
                self.store.view_mut().only_not_ok = matches!(mode, FilterMode::On);
                format_form(&self.store)
            }
            ShellCommand::Header { field, value } => self.cmd_header(field, value)?,
            ShellCommand::FollowUp { field, value } => self.cmd_follow_up(field, value)?,
            ShellCommand::Status {
                item,
                outcome,
                instance,
            } => self.cmd_status(&item, instance, outcome.to_domain())?,
            ShellCommand::Describe {
                item,
                text,
                instance,
            } => self.cmd_describe(&item, instance, text)?,
            ShellCommand::Photo {
                item,
                path,
                clear: _,
                instance,
            } => self.cmd_photo(&item, instance, path)?,
            ShellCommand::Add { item } => self.cmd_add(&item)?,
            ShellCommand::Remove { item, instance } => self.cmd_remove(&item, instance)?,
            ShellCommand::Validate => self.cmd_validate(),
            ShellCommand::Email { to } => self.cmd_email(to)?,
            ShellCommand::Pdf => self.cmd_pdf()?,
            ShellCommand::Reset { yes } => self.cmd_reset(yes)?,
            ShellCommand::Dump => serde_json::to_string_pretty(self.store.report())
                .map_err(|e| format!("failed to serialize report: {e}"))?,
            ShellCommand::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn item_path(&self, item_id: &str) -> Result<ItemPath, String> {
        self.store
            .report()
            .locate(item_id)
            .ok_or_else(|| format!("no item '{item_id}'"))
    }

    fn instance_path(&self, item_id: &str, instance: usize) -> Result<InstancePath, String> {
        Ok(self.item_path(item_id)?.instance(instance))
    }

    /// Trailing marker for an instance currently flagged incomplete.
    fn flag(&self, at: InstancePath) -> &'static str {
        let report = self.store.report();
        let flagged = report
            .item(at.item_path())
            .zip(report.instance(at))
            .is_some_and(|(item, instance)| self.store.is_flagged(&item.key(instance)));
        if flagged { "  ! incomplete" } else { "" }
    }

    fn cmd_open(&mut self, section: usize) -> Result<String, String> {
        let count = self.store.report().sections.len();
        if section >= count {
            return Err(format!("no section {section} (form has {count})"));
        }
        self.store.view_mut().toggle_section(section);
        Ok(format_form(&self.store))
    }

    fn cmd_header(&mut self, field: HeaderField, value: String) -> Result<String, String> {
        let edit = match field {
            HeaderField::Date => HeaderEdit::AssessmentDate(parse_date(&value)?),
            HeaderField::Area => HeaderEdit::AreaLocation(value),
            HeaderField::Assessor => HeaderEdit::AssessorName(value),
        };
        self.store.set_header_field(edit);
        let header = &self.store.report().header;
        Ok(match field {
            HeaderField::Date => format!("Date: {}", header.assessment_date),
            HeaderField::Area => format!("Area/Location: {}", header.area_location),
            HeaderField::Assessor => format!("Assessor: {}", header.assessor_name),
        })
    }

    fn cmd_follow_up(&mut self, field: FollowUpField, value: String) -> Result<String, String> {
        let edit = match field {
            FollowUpField::Summary => FollowUpEdit::Summary(value),
            FollowUpField::Recommendations => FollowUpEdit::Recommendations(value),
            FollowUpField::Person => FollowUpEdit::PersonInCharge(value),
            FollowUpField::TargetDate if value.trim().is_empty() => FollowUpEdit::TargetDate(None),
            FollowUpField::TargetDate => FollowUpEdit::TargetDate(Some(parse_date(&value)?)),
        };
        self.store.set_follow_up_field(edit);
        let follow_up = &self.store.report().follow_up;
        Ok(match field {
            FollowUpField::Summary => format!("Summary: {}", follow_up.summary),
            FollowUpField::Recommendations => {
                format!("Recommendations: {}", follow_up.recommendations)
            }
            FollowUpField::Person => format!("Person In Charge: {}", follow_up.person_in_charge),
            FollowUpField::TargetDate => format!(
                "Target Completion Date: {}",
                follow_up
                    .target_date
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            ),
        })
    }

    fn cmd_status(
        &mut self,
        item_id: &str,
        instance: usize,
        pressed: Outcome,
    ) -> Result<String, String> {
        let at = self.instance_path(item_id, instance)?;
        let outcome = self
            .store
            .toggle_outcome(at, pressed)
            .map_err(|e| e.to_string())?;
        Ok(format!("{item_id} #{instance}: {outcome}{}", self.flag(at)))
    }

    fn cmd_describe(
        &mut self,
        item_id: &str,
        instance: usize,
        text: String,
    ) -> Result<String, String> {
        let at = self.instance_path(item_id, instance)?;
        self.store
            .set_description(at, text)
            .map_err(|e| e.to_string())?;
        Ok(format!("{item_id} #{instance}: described{}", self.flag(at)))
    }

    fn cmd_photo(
        &mut self,
        item_id: &str,
        instance: usize,
        path: Option<PathBuf>,
    ) -> Result<String, String> {
        let at = self.instance_path(item_id, instance)?;
        let Some(path) = path else {
            let previous = self.store.set_photo(at, None).map_err(|e| e.to_string())?;
            return Ok(match previous {
                Some(photo) => format!("{item_id} #{instance}: removed {}", photo.file_name()),
                None => format!("{item_id} #{instance}: no photo attached"),
            });
        };

        let photo = Photo::from_path(&path).map_err(|e| e.to_string())?;
        let reply = format!(
            "{item_id} #{instance}: attached {} ({} bytes, sha256 {})",
            photo.file_name(),
            photo.size_bytes,
            &photo.sha256[..12]
        );
        self.store
            .set_photo(at, Some(photo))
            .map_err(|e| e.to_string())?;
        Ok(reply)
    }

    fn cmd_add(&mut self, item_id: &str) -> Result<String, String> {
        let at = self.item_path(item_id)?;
        if !self.store.report().item(at).is_some_and(|i| i.repeatable) {
            return Err(format!("item {item_id} is not repeatable"));
        }
        let added = self.store.add_instance(at).map_err(|e| e.to_string())?;
        Ok(format!("{item_id} #{}: added", added.instance))
    }

    fn cmd_remove(&mut self, item_id: &str, instance: usize) -> Result<String, String> {
        let at = self.instance_path(item_id, instance)?;
        let removed = self
            .store
            .remove_instance(at)
            .map_err(|e| e.to_string())?;
        if removed {
            Ok(format!("{item_id} #{instance}: removed"))
        } else {
            Err(format!("{item_id} has a single instance, which cannot be removed"))
        }
    }

    fn cmd_validate(&mut self) -> String {
        let validation = self.store.validate();
        let mut text = validation.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let report = self.store.report();
        for key in &validation.errors {
            if let Some(label) = report.occurrence_label(key) {
                text.push_str(&format!("  {label}\n"));
            }
        }
        text
    }

    fn cmd_email(&mut self, to: Option<String>) -> Result<String, String> {
        let recipient = to.unwrap_or_else(|| self.recipient.clone());
        let draft = export::export_email(&mut self.store, &recipient, self.composer.as_ref())
            .map_err(describe_export_error)?;
        Ok(format!(
            "Email draft for {}: {}\n{}",
            draft.recipient,
            draft.subject,
            draft.mailto_url()
        ))
    }

    fn cmd_pdf(&mut self) -> Result<String, String> {
        let path = export::export_snapshot(&mut self.store, self.renderer.as_ref(), self.scale)
            .map_err(describe_export_error)?;
        Ok(format!("Saved {}", path.display()))
    }

    fn cmd_reset(&mut self, confirmed: bool) -> Result<String, String> {
        if !confirmed {
            return Err(
                "reset discards every answer; run `reset --yes` to confirm".to_string(),
            );
        }
        self.store.reset();
        Ok("Form reset.".to_string())
    }
}

/// Read lines from `input` until `quit` or end of input.
pub(super) fn run(
    session: &mut Session,
    input: impl BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
    prompt: bool,
) -> Result<(), String> {
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(err, "checklist> ").map_err(write_failed)?;
            err.flush().map_err(write_failed)?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| format!("failed to read input: {e}"))?;

        match session.execute(&line, out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(message) => writeln!(err, "{message}").map_err(write_failed)?,
        }
        out.flush().map_err(write_failed)?;
    }
    Ok(())
}

fn describe_export_error(e: ExportError) -> String {
    match e {
        ExportError::Incomplete(validation) => validation.to_string().trim_end().to_string(),
        ExportError::Busy | ExportError::Render(_) | ExportError::Compose(_) => e.to_string(),
    }
}

fn parse_date(value: &str) -> Result<Date, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("invalid date '{value}': {e}"))
}

fn write_failed(e: std::io::Error) -> String {
    format!("failed to write output: {e}")
}

/// Split a line into words. Quotes group words, a backslash escapes the
/// next character outside single quotes.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"') | None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
