// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics for `faqchat.toml`.
//!
//! Figment failures are turned into miette reports that point at the
//! offending line. Unknown keys are checked against faqchat's own section
//! tables: a key that exists in another section is reported as misplaced,
//! anything else gets a Jaro-Winkler "did you mean" suggestion.

#![allow(unused_assignments)] // triggered by the Diagnostic derive

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Keys accepted in each section of `faqchat.toml`, in field order.
pub const SECTIONS: &[(&str, &[&str])] = &[
    (
        "agent",
        &[
            "name",
            "log_level",
            "system_prompt",
            "system_prompt_file",
            "max_tool_iterations",
        ],
    ),
    (
        "ollama",
        &[
            "endpoint",
            "chat_model",
            "embedding_model",
            "vision_model",
            "timeout_secs",
            "pull_on_start",
        ],
    ),
    (
        "faq",
        &[
            "seed_path",
            "collection",
            "embedding_dim",
            "question_threshold",
            "response_threshold",
            "question_top",
            "response_top",
            "seed_concurrency",
            "reseed_on_start",
        ],
    ),
    (
        "image",
        &["fetch_timeout_secs", "max_image_bytes", "allow_local_files"],
    ),
];

/// Jaro-Winkler score a candidate must beat to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown section `[{section}]`")]
    #[diagnostic(
        code(faqchat::config::unknown_section),
        help("{}", section_help(suggestion.as_deref()))
    )]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        #[label("not a faqchat section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("unknown key `{key}` in `[{section}]`")]
    #[diagnostic(
        code(faqchat::config::unknown_key),
        help("{}", key_help(key, section, belongs_in.as_deref(), suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        /// The section that does accept this key, when there is one.
        belongs_in: Option<String>,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not recognized here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(faqchat::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value parsed but is out of range or otherwise unusable.
    #[error("invalid setting: {message}")]
    #[diagnostic(code(faqchat::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(faqchat::config::other))]
    Other(String),
}

fn section_help(suggestion: Option<&str>) -> String {
    let all = section_names().join("], [");
    match suggestion {
        Some(s) => format!("did you mean `[{s}]`? faqchat reads [{all}]"),
        None => format!("faqchat reads [{all}]"),
    }
}

fn key_help(
    key: &str,
    section: &str,
    belongs_in: Option<&str>,
    suggestion: Option<&str>,
    valid_keys: &str,
) -> String {
    match (belongs_in, suggestion) {
        (Some(other), _) => format!("`{key}` belongs in `[{other}]`, not `[{section}]`"),
        (None, Some(s)) => format!("did you mean `{s}`? [{section}] accepts: {valid_keys}"),
        (None, None) => format!("[{section}] accepts: {valid_keys}"),
    }
}

fn section_names() -> Vec<&'static str> {
    SECTIONS.iter().map(|(name, _)| *name).collect()
}

/// Keys accepted by `section`, or `None` for a section faqchat does not know.
pub fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
}

/// Returns the section other than `section` that accepts `key`.
pub fn owning_section(key: &str, section: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(name, keys)| *name != section && keys.contains(&key))
        .map(|(name, _)| *name)
}

/// Closest candidate to `unknown`, if any scores above the threshold.
pub fn suggest(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c), *c))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Converts a figment error into one diagnostic per underlying failure.
///
/// `sources` pairs each TOML file path with its content and is only used to
/// place labels.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, _) if path.is_empty() => {
                    let (span, src) = locate(&error, sources, None, field);
                    ConfigError::UnknownSection {
                        section: field.clone(),
                        suggestion: suggest(field, &section_names()),
                        span,
                        src,
                    }
                }
                Kind::UnknownField(field, expected) => {
                    let section = path[0].clone();
                    let valid: Vec<&str> = section_keys(&section)
                        .map(<[&str]>::to_vec)
                        .unwrap_or_else(|| expected.to_vec());
                    let (span, src) = locate(&error, sources, Some(section.as_str()), field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        belongs_in: owning_section(field, &section).map(str::to_string),
                        suggestion: suggest(field, &valid),
                        valid_keys: valid.join(", "),
                        section,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (span, src) = match path.as_slice() {
                        [section, .., key] => locate(&error, sources, Some(section.as_str()), key),
                        _ => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Picks the TOML source an error came from and finds `key` in it.
///
/// Errors carry the file path in their metadata. String sources carry
/// none, so a lone source is searched directly.
fn locate(
    error: &figment::Error,
    sources: &[(String, String)],
    section: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let source = match file {
        Some(file) => sources.iter().find(|(p, _)| *p == file),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    source
        .and_then(|(path, content)| {
            let offset = key_offset(content, section, key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key` inside `[section]`, or of the `[key]` header itself
/// when `section` is `None`.
///
/// Lines are scanned once while tracking the current table, so a key of the
/// same name in a later section is never picked up.
pub fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default().trim();
            if section.is_none() && name == key {
                return Some(offset + indent + 1 + (header.len() - header.trim_start().len()));
            }
            current = Some(name);
        } else if section.is_some() && current == section {
            if let Some(rest) = trimmed.strip_prefix(key) {
                if rest.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }

        offset += line.len();
    }

    None
}

/// Prints every error as a miette report on stderr.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
