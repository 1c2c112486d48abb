//! Line dispatch.
//!
//! Resolution walks the tree one token at a time. Each token is matched
//! against the current parent's children by unique prefix; a resolved child
//! with children of its own is descended into before its handler runs.

use std::io::{self, Write};

use tracing::{debug, warn};

use crate::command::CommandHandle;
use crate::context::{LineMode, Output, ParseContext};
use crate::error::{CommandError, Result};
use crate::path::normalize;
use crate::position::is_token_char;
use crate::table::CommandTable;

const HELP_NOT_AT_END: &str = " help must appear in line end";
const AMBIGUOUS: &str = " ambiguous commands";
const NOT_FOUND: &str = " command not found";
const NO_SUB_COMMAND: &str = "no sub command";

/// Result of dispatching one line: the text to send back and the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    output: Output,
    outcome: Result<()>,
}

impl Response {
    /// Text written during dispatch, possibly empty.
    pub fn text(&self) -> &str {
        self.output.as_str()
    }

    /// How dispatch ended.
    pub fn outcome(&self) -> &Result<()> {
        &self.outcome
    }

    /// Returns `true` if dispatch succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The response blob: the text, or `#` when nothing was written.
    pub fn bytes(&self) -> &[u8] {
        self.output.response_bytes()
    }

    /// Consumes the response, returning the blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.output.into_bytes()
    }

    /// Writes the blob to a transport.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.bytes())
    }
}

impl CommandTable {
    /// Resolves the next token of `ctx` among `parent`'s children and runs
    /// what it names.
    ///
    /// A leading `help` or `?` prints the parent's help, or its children's
    /// names, or `no sub command`. Errors are also written to the context's
    /// output before being returned.
    pub fn dispatch(&self, ctx: &mut ParseContext, parent: CommandHandle) -> Result<()> {
        if ctx.unformat("help", &mut []) || ctx.unformat("?", &mut []) {
            return self.print_help(ctx, parent);
        }

        ctx.skip_whitespace();
        let token_start = ctx.position();
        let candidates = self.get(parent).positions().match_token(ctx);

        let ordinal = match (candidates.count_ones(), candidates.first_set()) {
            (1, Some(ordinal)) => ordinal,
            (0, _) | (_, None) => {
                let token = token_at(ctx, token_start);
                debug!(token = %token, parent = parent.index(), "No command matched");
                ctx.print(LineMode::New, NOT_FOUND);
                return Err(CommandError::CommandNotFound { token });
            }
            (count, Some(_)) => {
                let token = token_at(ctx, token_start);
                debug!(token = %token, candidates = count, "Ambiguous command");
                ctx.print(LineMode::New, AMBIGUOUS);
                return Err(CommandError::AmbiguousCommand {
                    token,
                    candidates: count,
                });
            }
        };

        let handle = self.get(parent).children()[ordinal].child;
        let command = self.get(handle);
        debug!(path = %command.path(), handle = handle.index(), "Resolved command");

        if command.has_children() {
            self.dispatch(ctx, handle)?;
        }

        let Some(handler) = command.handler() else {
            return Ok(());
        };

        ctx.skip_whitespace();
        if ctx.unformat("?", &mut []) || ctx.unformat("help", &mut []) {
            if let Some(help) = command.help() {
                ctx.print(LineMode::Current, help);
            }
            return Ok(());
        }
        handler(ctx)
    }

    fn print_help(&self, ctx: &mut ParseContext, parent: CommandHandle) -> Result<()> {
        ctx.skip_whitespace();
        if !ctx.at_end() {
            let position = ctx.position();
            ctx.print(LineMode::New, HELP_NOT_AT_END);
            return Err(CommandError::TrailingHelpMisplaced { position });
        }

        let command = self.get(parent);
        if let Some(help) = command.help() {
            ctx.print(LineMode::New, help);
        } else if command.has_children() {
            for sub in command.children() {
                ctx.print(LineMode::New, &sub.name);
            }
        } else {
            ctx.print(LineMode::New, NO_SUB_COMMAND);
        }
        Ok(())
    }

    /// Normalizes one raw input line and dispatches it from the root.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{CommandTable, LineMode, handler};
    ///
    /// let mut table = CommandTable::new();
    /// table
    ///     .register(
    ///         "reload config",
    ///         Some("Usage: reload config"),
    ///         Some(handler(|ctx| {
    ///             ctx.print(LineMode::New, "reloaded");
    ///             Ok(())
    ///         })),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(table.submit(b"rel conf\r\n").text(), "reloaded");
    /// assert_eq!(table.submit(b"reload config ?").text(), "Usage: reload config");
    /// assert_eq!(table.submit(b"frobnicate").text(), " command not found");
    /// ```
    pub fn submit(&self, raw_line: &[u8]) -> Response {
        let line = normalize(&String::from_utf8_lossy(raw_line));
        self.execute(&line)
    }

    /// Dispatches an already normalized line from the root.
    pub fn execute(&self, line: &str) -> Response {
        let mut ctx = ParseContext::new(line);
        let outcome = self.dispatch(&mut ctx, CommandHandle::ROOT);
        match &outcome {
            Err(err) if err.is_input_error() => {
                debug!(line = %line, error = %err, "Input rejected");
            }
            Err(err) => warn!(line = %line, error = %err, "Dispatch failed"),
            Ok(()) => {}
        }
        Response {
            output: ctx.into_output(),
            outcome,
        }
    }
}

fn token_at(ctx: &ParseContext, start: usize) -> String {
    ctx.input()
        .get(start..)
        .unwrap_or_default()
        .bytes()
        .take_while(|&b| is_token_char(b))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler;

    fn printing(text: &'static str) -> Option<crate::Handler> {
        Some(handler(move |ctx| {
            ctx.print(LineMode::New, text);
            Ok(())
        }))
    }

    fn table() -> CommandTable {
        let mut table = CommandTable::new();
        table.register("show", Some("show things"), None).unwrap();
        table.register("shutdown", None, printing("down")).unwrap();
        table.register("int", None, printing("int")).unwrap();
        table.register("interface", None, printing("interface")).unwrap();
        table
    }

    #[test]
    fn test_unique_prefix_runs_handler() {
        let table = table();
        let response = table.execute("shu");
        assert!(response.is_ok());
        assert_eq!(response.text(), "down");
    }

    #[test]
    fn test_ambiguous_prefix() {
        let table = table();
        let response = table.execute("sh");
        assert_eq!(response.text(), AMBIGUOUS);
        assert_eq!(
            response.outcome(),
            &Err(CommandError::AmbiguousCommand {
                token: "sh".into(),
                candidates: 2
            })
        );
    }

    #[test]
    fn test_exact_name_beats_longer_sibling() {
        let table = table();
        assert_eq!(table.execute("int").text(), "int");
        assert_eq!(table.execute("inte").text(), "interface");
    }

    #[test]
    fn test_not_found_reports_token() {
        let table = table();
        let response = table.execute("frobnicate now");
        assert_eq!(response.text(), NOT_FOUND);
        assert_eq!(
            response.outcome(),
            &Err(CommandError::CommandNotFound {
                token: "frobnicate".into()
            })
        );
    }

    #[test]
    fn test_root_help_lists_children() {
        let table = table();
        assert_eq!(table.execute("?").text(), "show\nshutdown\nint\ninterface");
        assert_eq!(table.execute("help").text(), "show\nshutdown\nint\ninterface");
    }

    #[test]
    fn test_help_must_be_last() {
        let table = table();
        let response = table.execute("help show");
        assert_eq!(response.text(), HELP_NOT_AT_END);
        assert_eq!(
            response.outcome(),
            &Err(CommandError::TrailingHelpMisplaced { position: 5 })
        );
    }

    #[test]
    fn test_empty_response_is_placeholder() {
        let table = table();
        let response = table.execute("show");
        assert!(response.is_ok());
        assert_eq!(response.bytes(), b"#");
    }

    #[test]
    fn test_write_to() {
        let table = table();
        let mut sink = Vec::new();
        table.execute("shutdown").write_to(&mut sink).unwrap();
        assert_eq!(sink, b"down");
    }
}
