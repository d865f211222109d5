//! Shared output formatting for pms CLI commands.

use serde::Serialize;

use crate::api::DataSource;
use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "pms.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    sections: Vec<(String, Vec<String>)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            sections: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    /// A titled group of lines, rendered in insertion order after the summary.
    pub fn push_section(&mut self, title: impl Into<String>, items: Vec<String>) {
        self.sections.push((title.into(), items));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    /// Warn when the data shown is sample data rather than the backend's.
    pub fn note_source(&mut self, source: DataSource) {
        if source.is_mock() {
            self.push_warning("backend unavailable: showing sample data");
        }
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    for (title, items) in &output.sections {
        push_block(&mut lines, title, items);
    }
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Global flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--config", "--home", "--role", "--api-url"];

fn infer_command_name(args: impl Iterator<Item = String>) -> String {
    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with('-') {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        positional.push(arg);
        if positional.len() == 2 {
            break;
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next() {
        Some(cmd) => cmd,
        None => return "pms".to_string(),
    };

    if matches!(
        command.as_str(),
        "board" | "backlog" | "phases" | "permissions"
    ) {
        if let Some(sub) = positional.next() {
            return format!("{command} {sub}");
        }
    }
    command
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "access_denied",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::AccessDenied { .. } => vec!["pms menu (lists what your role can open)".to_string()],
        Error::UnknownRole(_) => vec!["pms roles".to_string()],
        Error::TaskNotFound(_) | Error::ColumnNotFound(_) => vec!["pms board show".to_string()],
        Error::StoryNotFound(_) => vec!["pms backlog list".to_string()],
        Error::PhaseNotFound(_) | Error::DeliverableNotFound(_) | Error::KpiNotFound(_) => {
            vec!["pms phases list".to_string()]
        }
        Error::PermissionNotFound(_) => vec!["pms permissions show".to_string()],
        Error::InvalidConfig(_) => vec!["fix config.toml or .pms.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_block(lines: &mut Vec<String>, title: &str, items: &[String]) {
    lines.push(String::new());
    lines.push(format!("{title}:"));
    if items.is_empty() {
        lines.push("  (none)".to_string());
    }
    for item in items {
        lines.push(format!("  {item}"));
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn infers_grouped_subcommands() {
        assert_eq!(infer_command_name(args(&["board", "move", "3", "done"])), "board move");
        assert_eq!(
            infer_command_name(args(&["--role", "qa", "--json", "backlog", "up", "2"])),
            "backlog up"
        );
        assert_eq!(infer_command_name(args(&["chat", "hello"])), "chat");
        assert_eq!(infer_command_name(args(&["--offline"])), "pms");
    }

    #[test]
    fn sections_render_in_order() {
        let mut human = HumanOutput::new("board");
        human.push_summary("tasks", "10");
        human.push_section("Backlog (2)", vec!["#1 a".to_string(), "#2 b".to_string()]);
        human.push_section("Done (0)", Vec::new());
        human.note_source(DataSource::Mock);
        let text = format_human(&human);
        let backlog = text.find("Backlog (2):").expect("backlog section");
        let done = text.find("Done (0):").expect("done section");
        assert!(backlog < done);
        assert!(text.contains("  (none)"));
        assert!(text.contains("Warnings:\n- backend unavailable: showing sample data"));
    }

    #[test]
    fn access_denied_has_hint() {
        let err = Error::AccessDenied {
            role: "auditor".to_string(),
            action: "edit the board".to_string(),
        };
        assert_eq!(error_kind(&err), "access_denied");
        assert!(!error_next_steps(&err).is_empty());
    }
}
