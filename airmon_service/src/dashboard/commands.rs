//! Operator commands for the interactive dashboard.

use crate::config::Protocol;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Free text typed by the operator.
    Text(String),
    /// 1-based index into the suggested questions.
    Suggested(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Stations,
    Select(String),
    Fetch(Option<String>),
    Tls(bool),
    Protocol(Protocol),
    Show,
    Json,
    Ask(Question),
    Suggest,
    /// API key entered for this session only.
    Key(String),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("{0}")]
    InvalidArgument(String),
}

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "stations" | "list" => Ok(Command::Stations),
        "select" => arg
            .map(|code| Command::Select(code.to_string()))
            .ok_or(CommandError::MissingArgument("select")),
        "fetch" => Ok(Command::Fetch(arg.map(str::to_string))),
        "tls" => match arg.map(str::to_ascii_lowercase).as_deref() {
            Some("on") => Ok(Command::Tls(true)),
            Some("off") => Ok(Command::Tls(false)),
            Some(other) => Err(CommandError::InvalidArgument(format!(
                "tls expects on or off, got '{}'",
                other
            ))),
            None => Err(CommandError::MissingArgument("tls")),
        },
        "protocol" => {
            let value = arg.ok_or(CommandError::MissingArgument("protocol"))?;
            value
                .parse::<Protocol>()
                .map(Command::Protocol)
                .map_err(CommandError::InvalidArgument)
        }
        "show" => Ok(Command::Show),
        "json" => Ok(Command::Json),
        "ask" => {
            let text = arg.ok_or(CommandError::MissingArgument("ask"))?;
            parse_question(text).map(Command::Ask)
        }
        "suggest" => Ok(Command::Suggest),
        "key" => arg
            .map(|key| Command::Key(key.to_string()))
            .ok_or(CommandError::MissingArgument("key")),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_question(text: &str) -> Result<Question, CommandError> {
    match text.strip_prefix('#') {
        Some(number) => number
            .trim()
            .parse()
            .map(Question::Suggested)
            .map_err(|_| CommandError::InvalidArgument(format!("'#{}' is not a question number", number))),
        None => Ok(Question::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("  STATIONS "), Ok(Command::Stations));
        assert_eq!(parse_command("show"), Ok(Command::Show));
        assert_eq!(parse_command("json"), Ok(Command::Json));
        assert_eq!(parse_command("suggest"), Ok(Command::Suggest));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_fetch_with_and_without_code() {
        assert_eq!(parse_command("fetch"), Ok(Command::Fetch(None)));
        assert_eq!(parse_command("fetch 204"), Ok(Command::Fetch(Some("204".to_string()))));
    }

    #[test]
    fn test_select_requires_code() {
        assert_eq!(parse_command("select 204"), Ok(Command::Select("204".to_string())));
        assert_eq!(parse_command("select"), Err(CommandError::MissingArgument("select")));
    }

    #[test]
    fn test_tls_toggle() {
        assert_eq!(parse_command("tls on"), Ok(Command::Tls(true)));
        assert_eq!(parse_command("tls OFF"), Ok(Command::Tls(false)));
        assert!(matches!(parse_command("tls maybe"), Err(CommandError::InvalidArgument(_))));
        assert_eq!(parse_command("tls"), Err(CommandError::MissingArgument("tls")));
    }

    #[test]
    fn test_protocol_selection() {
        assert_eq!(parse_command("protocol http"), Ok(Command::Protocol(Protocol::Http)));
        assert!(matches!(parse_command("protocol ftp"), Err(CommandError::InvalidArgument(_))));
    }

    #[test]
    fn test_ask_free_text_keeps_spacing_inside() {
        assert_eq!(
            parse_command("ask ¿Cómo está el   PM2.5?"),
            Ok(Command::Ask(Question::Text("¿Cómo está el   PM2.5?".to_string())))
        );
    }

    #[test]
    fn test_ask_suggested_by_number() {
        assert_eq!(parse_command("ask #3"), Ok(Command::Ask(Question::Suggested(3))));
        assert!(matches!(parse_command("ask #x"), Err(CommandError::InvalidArgument(_))));
        assert_eq!(parse_command("ask"), Err(CommandError::MissingArgument("ask")));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("dance"), Err(CommandError::Unknown("dance".to_string())));
    }
}
