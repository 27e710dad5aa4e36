//! Export the document for printing.
//!
//! A print request writes a standalone HTML rendering of the document and,
//! if a print command is configured, hands the file to it. The caller only
//! learns the result through the `after_print` callback, which runs on the
//! worker thread.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use comrak::{Options, markdown_to_html};

use crate::document::Document;
use crate::preview::enable_extensions;

/// Completion callback for [`Printer::print`].
pub type AfterPrint = Box<dyn FnOnce(PrintOutcome) + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub document: Document,
}

impl PrintJob {
    pub const fn new(document: Document) -> Self {
        Self { document }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    /// The file was written and the print command accepted it.
    Printed { path: PathBuf },
    /// The file was written; no print command is configured.
    Exported { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Status { command: String, status: ExitStatus },
}

/// Fire-and-forget printing.
pub trait Printer {
    /// Start printing `job`. `after_print` is called exactly once when the
    /// job finishes or fails.
    fn print(&self, job: PrintJob, after_print: AfterPrint);
}

/// Writes HTML into an export directory and optionally runs a print command.
#[derive(Debug, Clone)]
pub struct SystemPrinter {
    export_dir: PathBuf,
    command: Option<String>,
}

impl SystemPrinter {
    /// `command` is split on whitespace; the HTML path is appended as the last argument.
    pub fn new(export_dir: impl Into<PathBuf>, command: Option<String>) -> Self {
        Self {
            export_dir: export_dir.into(),
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Export and print synchronously.
    ///
    /// # Errors
    /// Returns [`PrintError`] if the file cannot be written or the print
    /// command fails to start or exits unsuccessfully.
    pub fn run(&self, job: &PrintJob) -> Result<PrintOutcome, PrintError> {
        let path = self.export_dir.join(export_file_name(&job.document));
        fs::create_dir_all(&self.export_dir)
            .and_then(|()| fs::write(&path, render_html(&job.document)))
            .map_err(|source| PrintError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "exported document");

        let Some(command) = &self.command else {
            return Ok(PrintOutcome::Exported { path });
        };
        run_print_command(command, &path)?;
        Ok(PrintOutcome::Printed { path })
    }
}

impl Printer for SystemPrinter {
    fn print(&self, job: PrintJob, after_print: AfterPrint) {
        let printer = self.clone();
        std::thread::spawn(move || {
            let outcome = printer.run(&job).unwrap_or_else(|err| {
                tracing::warn!("print failed: {err}");
                PrintOutcome::Failed {
                    reason: err.to_string(),
                }
            });
            after_print(outcome);
        });
    }
}

fn run_print_command(command: &str, path: &Path) -> Result<(), PrintError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or_default();
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| PrintError::Spawn {
            command: command.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(PrintError::Status {
            command: command.to_string(),
            status,
        })
    }
}

/// Default print command for the platform, if any.
pub fn default_print_command() -> Option<String> {
    cfg!(unix).then(|| "lp".to_string())
}

/// `name.md` becomes `name.html`; unsafe characters become `_`.
pub fn export_file_name(document: &Document) -> String {
    let name = document.display_name();
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('.');
    if safe.is_empty() {
        "untitled.html".to_string()
    } else {
        format!("{safe}.html")
    }
}

/// Standalone HTML page: the filename as a header, then the rendered body.
pub fn render_html(document: &Document) -> String {
    let mut options = Options::default();
    enable_extensions(&mut options);
    let body = markdown_to_html(&document.content, &options);
    let title = escape_html(document.display_name());
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{PRINT_CSS}</style>\n</head>\n<body>\n\
         <header class=\"file-header\">{title}</header>\n<main>\n{body}</main>\n</body>\n</html>\n"
    )
}

const PRINT_CSS: &str = "body{font-family:sans-serif;max-width:48em;margin:2em auto;line-height:1.5}\
.file-header{font-family:monospace;border-bottom:1px solid #ccc;padding-bottom:.5em;margin-bottom:1em}\
pre{background:#f6f8fa;padding:.75em;overflow-x:auto}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25em .5em}";

fn escape_html(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    // Writes into a Vec never fail.
    let _ = comrak::html::escape(&mut out, text.as_bytes());
    String::from_utf8_lossy(&out).into_owned()
}
