//! Parsing of the slash commands typed at the prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tools,
    Tool(String),
    /// Tool name plus the raw JSON text of its arguments (possibly empty).
    Call { name: String, arguments: String },
    Quit,
    /// `/tool` or `/call` without a tool name.
    MissingToolName,
    Unknown(String),
    /// Input that is not a command.
    Text,
    Empty,
}

impl Command {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        let Some(body) = trimmed.strip_prefix('/') else {
            return Self::Text;
        };

        let (command, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(command, rest)| (command, rest.trim()));
        match command {
            "help" => Self::Help,
            "tools" => Self::Tools,
            "quit" | "exit" => Self::Quit,
            "tool" | "call" if rest.is_empty() => Self::MissingToolName,
            "tool" => Self::Tool(first_word(rest).to_string()),
            "call" => {
                let (name, arguments) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(name, arguments)| (name, arguments.trim()));
                Self::Call {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                }
            }
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_keeps_the_json_verbatim() {
        assert_eq!(
            Command::parse(r#"/call search_deputati {"cognome": "Meloni", "nome": "Giorgia"}"#),
            Command::Call {
                name: "search_deputati".to_string(),
                arguments: r#"{"cognome": "Meloni", "nome": "Giorgia"}"#.to_string(),
            }
        );
        assert_eq!(
            Command::parse("  /call get_gruppi_parlamentari  "),
            Command::Call {
                name: "get_gruppi_parlamentari".to_string(),
                arguments: String::new(),
            }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/tools"), Command::Tools);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(
            Command::parse("/tool senato_get_ddl_iter extra"),
            Command::Tool("senato_get_ddl_iter".to_string())
        );
    }

    #[test]
    fn malformed_input() {
        assert_eq!(Command::parse("/tool"), Command::MissingToolName);
        assert_eq!(Command::parse("/call   "), Command::MissingToolName);
        assert_eq!(Command::parse("/vota"), Command::Unknown("vota".to_string()));
        assert_eq!(Command::parse("chi è il presidente?"), Command::Text);
        assert_eq!(Command::parse("   "), Command::Empty);
    }
}
