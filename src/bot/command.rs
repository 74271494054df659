//! Chat command parsing

use crate::backend::traits::{GenerationRequest, Model};
use crate::config::GenerationConfig;
use crate::error::{AppError, Result};

/// A recognised bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Admin,
    /// Image generation with the raw text after the command
    Image(String),
}

impl Command {
    /// Parse a message text, accepting an optional `@botname` suffix on the command
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "admin" => Some(Command::Admin),
            "img" | "image" | "generate" => Some(Command::Image(args.to_string())),
            _ => None,
        }
    }
}

/// Resolve `[width] [height] [model] prompt...` into a request.
///
/// Fields are positional: height is only read after a width, the model only
/// after a height. Anything not consumed becomes the prompt.
pub fn parse_image_args(args: &str, defaults: &GenerationConfig) -> Result<GenerationRequest> {
    let tokens: Vec<&str> = args.split_whitespace().collect();

    let mut width = defaults.default_width;
    let mut height = defaults.default_height;
    let mut model = defaults.default_model;
    let mut consumed = 0;

    if let Some(w) = tokens.first().and_then(|t| parse_dimension(t)) {
        width = w?;
        consumed = 1;

        if let Some(h) = tokens.get(1).and_then(|t| parse_dimension(t)) {
            height = h?;
            consumed = 2;

            if let Some(m) = tokens.get(2).and_then(|t| t.parse::<Model>().ok()) {
                model = m;
                consumed = 3;
            }
        }
    }

    let prompt = tokens[consumed..].join(" ");
    if prompt.is_empty() {
        return Err(AppError::Validation(
            "Please provide a text prompt to generate an image".to_string(),
        ));
    }

    Ok(GenerationRequest::new(prompt, width, height, model))
}

/// `None` when the token is not a number, an error when it is a bad one
fn parse_dimension(token: &str) -> Option<Result<u32>> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value = match token.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(AppError::Validation(format!(
            "Invalid image size '{}'. Width and height must be positive numbers",
            token
        ))),
    };
    Some(value)
}
