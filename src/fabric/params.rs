//! Generation parameters and the fabric argument string.

use crate::error::FabricError;

/// Sampling and routing options forwarded to every fabric invocation.
///
/// Only `pattern` is ever overridden internally (chunk vs. combine mode).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub model: String,
    pub pattern: String,
}

impl GenerationParameters {
    /// Copy of these parameters with a different pattern.
    pub fn with_pattern(&self, pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            ..self.clone()
        }
    }

    /// Reject values fabric would choke on before any process is launched.
    ///
    /// Model and pattern travel as bare tokens on the command line, so they
    /// must be non-empty and free of whitespace.
    pub fn validate(&self) -> Result<(), FabricError> {
        check_token("model", &self.model)?;
        check_token("pattern", &self.pattern)?;
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("presence penalty", self.presence_penalty, -2.0, 2.0)?;
        check_range("frequency penalty", self.frequency_penalty, -2.0, 2.0)?;
        Ok(())
    }
}

fn check_token(name: &str, value: &str) -> Result<(), FabricError> {
    if value.is_empty() {
        return Err(FabricError::InvalidInput(format!("{name} must not be empty")));
    }
    if let Some(bad) = value.chars().find(|c| !is_token_char(*c)) {
        return Err(FabricError::InvalidInput(format!(
            "{name} '{value}' contains unsupported character {bad:?}"
        )));
    }
    Ok(())
}

/// Characters a shell word splitter passes through untouched outside quotes.
///
/// `#` is never allowed: at the start of a word it opens a comment that
/// swallows the quoted content.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '/' | '@' | '+' | '-')
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), FabricError> {
    if !value.is_finite() || value < min || value > max {
        return Err(FabricError::InvalidInput(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Escape text so it survives as one double-quoted shell word.
///
/// Inside double quotes a POSIX word splitter only treats `\`, `"`, `$` and
/// `` ` `` specially, so those are the characters that get a backslash.
pub fn escape_argument(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + input.len() / 8);
    for ch in input.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the fabric argument string.
///
/// Flag order is fixed: `-t -T -P -F -m -p` followed by the quoted content.
pub fn build_arguments(params: &GenerationParameters, content: &str) -> String {
    format!(
        "-t {} -T {} -P {} -F {} -m {} -p {} \"{}\"",
        params.temperature,
        params.top_p,
        params.presence_penalty,
        params.frequency_penalty,
        params.model,
        params.pattern,
        escape_argument(content)
    )
}
