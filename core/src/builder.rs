//! Declarative table construction.

use std::sync::Arc;

use crate::command::Handler;
use crate::context::ParseContext;
use crate::error::Result;
use crate::table::CommandTable;

/// Wraps a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut ParseContext) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Descriptor for one command, registered by [`TableBuilder`] or
/// [`CommandTable::from_specs`].
#[derive(Clone)]
pub struct CommandSpec {
    path: String,
    help: Option<String>,
    handler: Option<Handler>,
}

impl CommandSpec {
    /// Creates a descriptor with neither help nor handler.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            help: None,
            handler: None,
        }
    }

    /// Sets the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the handler.
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ParseContext) -> Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(f));
        self
    }

    /// Path as given.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("path", &self.path)
            .field("help", &self.help)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Collects descriptors and registers them in order.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandSpec, CommandTable, LineMode};
///
/// let table = CommandTable::builder()
///     .command(CommandSpec::new("show link").help("Usage: show link <link-id>"))
///     .command(CommandSpec::new("reload config").handler(|ctx| {
///         ctx.print(LineMode::New, "reloaded");
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(table.execute("?").text(), "show\nreload");
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    specs: Vec<CommandSpec>,
}

impl TableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    pub fn command(mut self, spec: CommandSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Adds several descriptors.
    pub fn commands(mut self, specs: impl IntoIterator<Item = CommandSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Registers every descriptor in the order added.
    ///
    /// # Errors
    ///
    /// Stops at the first registration error.
    pub fn build(self) -> Result<CommandTable> {
        CommandTable::from_specs(self.specs)
    }
}

impl CommandTable {
    /// Starts a [`TableBuilder`].
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Builds a table from descriptors, registering them in order.
    pub fn from_specs(specs: impl IntoIterator<Item = CommandSpec>) -> Result<Self> {
        let mut table = Self::new();
        for spec in specs {
            table.register(&spec.path, spec.help.as_deref(), spec.handler)?;
        }
        Ok(table)
    }
}
