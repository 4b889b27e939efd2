pub mod types;

pub use types::{Annotation, AnnotationLevel, Outcome};

use colored::Colorize;
use std::sync::Mutex;
use tracing::{error, info};

/// Emits notices and errors for one run.
///
/// Everything goes to the tracing log. Under GitHub Actions each line is also
/// printed as a workflow command so it shows on the run summary. Every emitted
/// annotation is kept, so the run can count them at the end.
#[derive(Debug, Default)]
pub struct Reporter {
    workflow_commands: bool,
    emitted: Mutex<Vec<Annotation>>,
}

impl Reporter {
    pub fn new(workflow_commands: bool) -> Self {
        Self {
            workflow_commands,
            emitted: Mutex::new(Vec::new()),
        }
    }

    /// Something a maintainer should see on the run summary, but not a failure.
    pub fn notice(&self, message: &str) {
        info!(notice = true, "{message}");
        self.annotate(AnnotationLevel::Notice, message.to_string());
    }

    /// A failure. `detail` carries the full error chain for the log.
    pub fn error(&self, message: &str, detail: Option<&dyn std::error::Error>) {
        let text = match detail {
            Some(err) => {
                error!(error = ?err, "{message}: {err}");
                format!("{message}: {err}")
            }
            None => {
                error!("{message}");
                message.to_string()
            }
        };
        self.annotate(AnnotationLevel::Error, text);
    }

    /// Annotations emitted so far, oldest first.
    pub fn emitted(&self) -> Vec<Annotation> {
        self.emitted
            .lock()
            .map(|emitted| emitted.clone())
            .unwrap_or_default()
    }

    fn annotate(&self, level: AnnotationLevel, message: String) {
        if self.workflow_commands {
            println!("{}", workflow_command(level.command(), &message));
        }
        if let Ok(mut emitted) = self.emitted.lock() {
            emitted.push(Annotation { level, message });
        }
    }
}

fn workflow_command(command: &str, message: &str) -> String {
    format!("::{command}::{}", escape_data(message))
}

/// Escaping the Actions runner applies to workflow command data.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Print the one-line outcome to the terminal.
pub fn print_summary(outcome: &Outcome) {
    println!("{} {}", label(outcome), outcome);
}

fn label(outcome: &Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Failed(_) => "FAILED".red().bold(),
        Outcome::SkippedFork | Outcome::Ignored { .. } | Outcome::NothingToDestroy => {
            "SKIPPED".yellow().bold()
        }
        _ => "OK".green().bold(),
    }
}

/// Process exit status for an outcome. Failures only turn the step red when
/// the workflow asked for it.
pub fn exit_status(outcome: &Outcome, fail_on_error: bool) -> u8 {
    if fail_on_error && outcome.is_failure() {
        1
    } else {
        0
    }
}
