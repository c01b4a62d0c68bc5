// Command enum to represent client commands
#[derive(Debug, PartialEq)]
pub enum Command {
    List,
    Get(String),
    Put(String),
    Delete(String),
    Info(String),
    Exit,
    Unknown(String),
}

impl Command {
    /// Wire name of a recognized action, used as the statistics key.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Command::List => Some("LIST"),
            Command::Get(_) => Some("GET"),
            Command::Put(_) => Some("PUT"),
            Command::Delete(_) => Some("DELETE"),
            Command::Info(_) => Some("INFO"),
            Command::Exit => Some("EXIT"),
            Command::Unknown(_) => None,
        }
    }

    /// Filename argument for actions that carry one.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Command::Get(name)
            | Command::Put(name)
            | Command::Delete(name)
            | Command::Info(name) => Some(name),
            _ => None,
        }
    }
}

/// Parse a raw command frame into a Command.
///
/// One action token, optionally followed by a single whitespace-separated
/// argument. Actions are matched case-sensitively.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let action = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();

    match action {
        "LIST" => Command::List,
        "GET" => Command::Get(arg.to_string()),
        "PUT" => Command::Put(arg.to_string()),
        "DELETE" => Command::Delete(arg.to_string()),
        "INFO" => Command::Info(arg.to_string()),
        "EXIT" => Command::Exit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("LIST"), Command::List);
        assert_eq!(parse_command("EXIT"), Command::Exit);
    }

    #[test]
    fn test_parse_commands_with_args() {
        assert_eq!(
            parse_command("GET file.txt"),
            Command::Get("file.txt".to_string())
        );
        assert_eq!(
            parse_command("PUT upload.txt"),
            Command::Put("upload.txt".to_string())
        );
        assert_eq!(
            parse_command("DELETE old.txt"),
            Command::Delete("old.txt".to_string())
        );
        assert_eq!(
            parse_command("INFO report.pdf"),
            Command::Info("report.pdf".to_string())
        );
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(parse_command("  LIST  "), Command::List);
        assert_eq!(
            parse_command("GET  notes.txt  "),
            Command::Get("notes.txt".to_string())
        );
    }

    #[test]
    fn test_missing_argument_parses_as_empty() {
        assert_eq!(parse_command("GET"), Command::Get(String::new()));
        assert_eq!(parse_command("DELETE "), Command::Delete(String::new()));
    }

    #[test]
    fn test_actions_are_case_sensitive() {
        assert_eq!(
            parse_command("list"),
            Command::Unknown("list".to_string())
        );
        assert_eq!(
            parse_command("get file.txt"),
            Command::Unknown("get file.txt".to_string())
        );
    }

    #[test]
    fn test_unknown_commands() {
        assert_eq!(
            parse_command("INVALID"),
            Command::Unknown("INVALID".to_string())
        );
        assert_eq!(
            parse_command("FOO bar"),
            Command::Unknown("FOO bar".to_string())
        );
        assert_eq!(parse_command(""), Command::Unknown("".to_string()));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(parse_command("GET x").action(), Some("GET"));
        assert_eq!(parse_command("EXIT").action(), Some("EXIT"));
        assert_eq!(parse_command("NOPE").action(), None);
    }
}
