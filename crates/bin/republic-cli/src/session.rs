//! Executes parsed commands against the registry and prints the outcome.

use std::io::{self, Write};
use std::sync::Arc;

use republic_core::{Arguments, ToolRegistry};
use serde_json::Value;

use crate::command::Command;

const RULE: &str = "------------------------------------------------------------";

/// Whether the prompt loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Suggestion printed under an error message, if one applies.
#[must_use]
pub fn hint_for(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    if lower.contains("json") {
        Some("Suggerimento: Controlla che il JSON sia valido\n   Esempio: {\"cognome\": \"Meloni\"}")
    } else if lower.contains("connection refused") || lower.contains("error sending request") {
        Some("Suggerimento: l'endpoint SPARQL non risponde, controlla la connessione o --camera-endpoint/--senato-endpoint")
    } else {
        None
    }
}

fn parse_arguments(text: &str) -> Result<Arguments, String> {
    if text.trim().is_empty() {
        return Ok(Arguments::new());
    }
    match serde_json::from_str(text) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err("gli argomenti devono essere un oggetto JSON".to_string()),
        Err(err) => Err(format!("JSON non valido: {err}")),
    }
}

/// Pretty-prints JSON text; anything else is returned unchanged.
fn pretty(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

pub struct Session {
    registry: Arc<ToolRegistry>,
}

impl Session {
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn welcome(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(RULE.len()))?;
        writeln!(out, "  republic-cli {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "  Interroga i dati aperti del Parlamento Italiano")?;
        writeln!(out, "{}", "=".repeat(RULE.len()))?;
        writeln!(out, "{} tools disponibili. Scrivi /help per aiuto.", self.registry.count())
    }

    /// Runs one command line.
    ///
    /// # Errors
    /// Only fails when writing to `out` fails.
    pub async fn handle(&self, input: &str, out: &mut impl Write) -> io::Result<Flow> {
        match Command::parse(input) {
            Command::Empty => {}
            Command::Help => help(out)?,
            Command::Tools => self.tools(out)?,
            Command::Tool(name) => self.tool(&name, out)?,
            Command::Call { name, arguments } => self.call(&name, &arguments, out).await?,
            Command::Quit => {
                writeln!(out, "Arrivederci!")?;
                return Ok(Flow::Quit);
            }
            Command::MissingToolName => writeln!(out, "Errore: Specifica il nome del tool")?,
            Command::Unknown(command) => {
                writeln!(out, "Errore: Comando sconosciuto: /{command}")?;
                writeln!(out, "   Usa /help per vedere i comandi disponibili")?;
            }
            Command::Text => {
                writeln!(out, "Per ora usa i comandi come /call. Scrivi /help per aiuto")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn tools(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Tools disponibili:")?;
        for (index, tool) in self.registry.all().iter().enumerate() {
            writeln!(out, "{}. {} [{}]", index + 1, tool.name, tool.affiliation)?;
            writeln!(out, "   {}", tool.description)?;
        }
        Ok(())
    }

    fn tool(&self, name: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(tool) = self.registry.get(name) else {
            return writeln!(out, "Errore: Tool '{name}' non trovato");
        };
        writeln!(out, "{} [{}]", tool.name, tool.affiliation)?;
        writeln!(out, "{}", tool.description)?;
        if tool.input_schema.properties.is_empty() {
            return Ok(());
        }
        writeln!(out, "Parametri:")?;
        for (key, property) in &tool.input_schema.properties {
            let required = if tool.input_schema.required.contains(key) {
                " [required]"
            } else {
                ""
            };
            writeln!(
                out,
                "  - {key}{required} ({}): {}",
                property.kind.as_str(),
                property.description
            )?;
        }
        Ok(())
    }

    async fn call(&self, name: &str, arguments: &str, out: &mut impl Write) -> io::Result<()> {
        let arguments = match parse_arguments(arguments) {
            Ok(arguments) => arguments,
            Err(message) => return error(&message, out),
        };

        let result = self.registry.dispatch(name, arguments).await;
        let text = result.text_content();
        if result.is_error {
            return error(text.strip_prefix("Error: ").unwrap_or(&text), out);
        }
        writeln!(out, "{RULE}")?;
        writeln!(out, "{}", pretty(&text))?;
        writeln!(out, "{RULE}")
    }
}

fn help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Comandi disponibili:")?;
    writeln!(out, "  /tools              - Lista tutti i tools disponibili")?;
    writeln!(out, "  /tool <name>        - Info su un tool specifico")?;
    writeln!(out, "  /call <name> <json> - Chiama un tool con parametri JSON")?;
    writeln!(out, "  /help               - Mostra questo aiuto")?;
    writeln!(out, "  /quit               - Esci")?;
    writeln!(out)?;
    writeln!(out, "Esempi:")?;
    writeln!(out, "  /tool search_deputati")?;
    writeln!(out, "  /call search_deputati {{\"cognome\": \"Meloni\"}}")?;
    writeln!(out, "  /call senato_get_gruppi_attivi {{}}")
}

fn error(message: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Errore: {message}")?;
    if let Some(hint) = hint_for(message) {
        writeln!(out, "{hint}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use republic_core::{Affiliation, InputSchema, ToolDefinition, ToolResult};

    use super::*;

    fn session() -> Session {
        let mut registry = ToolRegistry::new();
        registry
            .register_many([
                ToolDefinition::new(
                    "search_deputati",
                    "Cerca deputati",
                    Affiliation::Camera,
                    InputSchema::object()
                        .string("cognome", "Cognome del deputato")
                        .number("limit", "Numero massimo di risultati")
                        .require(&["cognome"]),
                    |args| async move { ToolResult::json(&Value::Object(args)) },
                ),
                ToolDefinition::new(
                    "senato_get_gruppi_attivi",
                    "Gruppi attivi",
                    Affiliation::Senato,
                    InputSchema::object(),
                    |_args| async {
                        Ok(ToolResult::error(
                            "Error: SPARQL query failed for https://dati.senato.it/sparql: error sending request",
                        ))
                    },
                ),
            ])
            .expect("test tools register");
        Session::new(Arc::new(registry))
    }

    async fn run(input: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = session().handle(input, &mut out).await.expect("writes to memory");
        (flow, String::from_utf8(out).expect("utf-8 output"))
    }

    #[tokio::test]
    async fn call_prints_pretty_json() {
        let (flow, out) = run(r#"/call search_deputati {"cognome": "Meloni"}"#).await;
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("\"cognome\": \"Meloni\""), "{out}");
        assert!(out.starts_with(RULE));
    }

    #[tokio::test]
    async fn broken_json_gets_a_hint() {
        let (_, out) = run(r#"/call search_deputati {"cognome": }"#).await;
        assert!(out.starts_with("Errore: JSON non valido"), "{out}");
        assert!(out.contains("Controlla che il JSON sia valido"));
    }

    #[tokio::test]
    async fn tool_errors_are_reported() {
        let (_, out) = run("/call search_deputati {}").await;
        assert!(out.contains("missing required argument \"cognome\""), "{out}");

        let (_, out) = run("/call senato_get_gruppi_attivi").await;
        assert!(out.contains("l'endpoint SPARQL non risponde"), "{out}");

        let (_, out) = run("/call nessuno {}").await;
        assert_eq!(out.trim_end(), "Errore: Unknown tool: nessuno");
    }

    #[tokio::test]
    async fn tool_info_lists_parameters() {
        let (_, out) = run("/tool search_deputati").await;
        assert!(out.contains("  - cognome [required] (string): Cognome del deputato"), "{out}");
        assert!(out.contains("  - limit (number)"));

        let (_, out) = run("/tool boh").await;
        assert_eq!(out.trim_end(), "Errore: Tool 'boh' non trovato");
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        assert_eq!(run("/exit").await.0, Flow::Quit);
        assert_eq!(run("/tools").await.0, Flow::Continue);
    }

    #[test]
    fn hints_match_known_failures() {
        assert!(hint_for("expected value at line 1 column 14 (JSON)").is_some());
        assert!(hint_for("tcp connect error: Connection refused (os error 111)").is_some());
        assert!(hint_for("HTTP 500").is_none());
    }
}
