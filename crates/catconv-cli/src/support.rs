use crate::cli::OptionArgs;
use catconv_kernel::{ConversionOptions, Message, MessageStats, Severity};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Exit status when conversion produced no result.
pub const EXIT_NO_RESULT: i32 = 1;
/// Exit status for I/O, parse and config failures.
pub const EXIT_OPERATIONAL: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {label} at {path}: {source}")]
    Read {
        label: &'static str,
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {label} JSON at {path}: {source}")]
    Json {
        label: &'static str,
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Config { path: String, source: toml::de::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: String, source: std::io::Error },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Unwrap or report the error and exit with [`EXIT_OPERATIONAL`].
pub fn or_exit<T>(result: Result<T, CliError>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_OPERATIONAL);
    })
}

fn read_text(path: &str, label: &'static str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        label,
        path: path.to_string(),
        source,
    })
}

pub fn read_json_file(path: &str, label: &'static str) -> Result<Value, CliError> {
    let text = read_text(path, label)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        label,
        path: path.to_string(),
        source,
    })
}

/// Options from `--config` (if any) with explicit flags applied on top.
pub fn load_options(args: &OptionArgs) -> Result<ConversionOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => read_config(path)?,
        None => ConversionOptions::default(),
    };
    if args.copy_unknown_properties {
        options.copy_unknown_properties = true;
    }
    if args.no_generate_ids {
        options.generate_ids = false;
    }
    if let Some(length) = args.id_length {
        options.id_length = length;
    }
    if args.no_share_keys {
        options.add_v7_auto_id_share_keys = false;
    }
    if args.partial {
        options.partial = true;
    }
    Ok(options)
}

fn read_config(path: &str) -> Result<ConversionOptions, CliError> {
    let text = read_text(path, "config")?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text).map_err(|source| CliError::Json {
            label: "config",
            path: path.to_string(),
            source,
        })
    } else {
        toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_string(),
            source,
        })
    }
}

/// Pretty JSON to `destination`, or stdout when there is none.
pub fn write_json(destination: Option<&str>, value: &Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    match destination {
        Some(path) => fs::write(path, text + "\n").map_err(|source| CliError::Write {
            path: path.to_string(),
            source,
        }),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

/// What a command hands to [`finish`].
pub struct Outcome<'a> {
    pub result: Option<Value>,
    pub messages: &'a [Message],
    /// Share migrations only: whether the document was rewritten.
    pub converted: Option<bool>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    result: &'a Option<Value>,
    messages: &'a [Message],
    stats: MessageStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    converted: Option<bool>,
}

/// Write the result and report, then exit with [`EXIT_NO_RESULT`] when
/// there is no result.
pub fn finish(outcome: Outcome<'_>, destination: Option<&str>, json_output: bool) {
    if json_output {
        if let (Some(path), Some(result)) = (destination, &outcome.result) {
            or_exit(write_json(Some(path), result));
        }
        let envelope = Envelope {
            result: &outcome.result,
            messages: outcome.messages,
            stats: MessageStats::from_messages(outcome.messages),
            converted: outcome.converted,
        };
        let envelope = or_exit(serde_json::to_value(&envelope).map_err(CliError::from));
        or_exit(write_json(None, &envelope));
    } else {
        eprint!("{}", render_report(outcome.result.is_some(), outcome.messages));
        if let Some(result) = &outcome.result {
            or_exit(write_json(destination, result));
        }
    }

    if outcome.result.is_none() {
        std::process::exit(EXIT_NO_RESULT);
    }
}

/// Human-readable summary: totals, each diagnostic leaf first, then stats.
pub fn render_report(success: bool, messages: &[Message]) -> String {
    let errors: Vec<&Message> = messages.iter().filter(|m| m.is_error()).collect();
    let warnings: Vec<&Message> = messages
        .iter()
        .filter(|m| m.severity == Severity::Warning)
        .collect();
    let stats = MessageStats::from_messages(messages);

    let status = if success { "Succeeded" } else { "Failed" };
    let mut out = format!(
        "{status} with {} errors and {} warnings\n",
        errors.len(),
        warnings.len()
    );
    for (kind, group) in [("Error", &errors), ("Warning", &warnings)] {
        for message in group.iter() {
            out.push_str(&format!(
                "{kind}: {}\n  in {}\n\n",
                message.message,
                message.breadcrumb()
            ));
        }
    }

    let unknown_types: Vec<String> = stats
        .unknown_types
        .iter()
        .map(|type_name| format!("\"{type_name}\""))
        .collect();
    out.push_str(&format!("Error stats:\n{}\n", pretty(&stats.errors)));
    out.push_str(&format!("Warning stats:\n{}\n", pretty(&stats.warnings)));
    out.push_str(&format!("Unknown types: {}\n", unknown_types.join(", ")));
    out.push_str(&format!(
        "Unknown properties: {}\n",
        pretty(&stats.unknown_props_by_model)
    ));
    out
}

/// Pretty JSON for a report section. Stats always serialize.
fn pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
