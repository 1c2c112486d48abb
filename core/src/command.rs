//! Command records and their handles.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ParseContext;
use crate::error::Result;
use crate::position::PositionColumns;
use crate::strhash::StringTable;

/// Callback invoked with the remaining input of a resolved command.
///
/// Handlers read their arguments with [`unformat!`](crate::unformat) and
/// write output through the context.
pub type Handler = Arc<dyn Fn(&mut ParseContext) -> Result<()> + Send + Sync>;

/// Stable index of a command in its [`CommandTable`](crate::CommandTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandHandle(pub(crate) usize);

impl CommandHandle {
    /// The root command, parent of every top-level command.
    pub const ROOT: CommandHandle = CommandHandle(0);

    /// Position in the command table.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Link from a parent to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommandRef {
    /// Leaf segment of the child's path.
    pub name: String,
    /// The child command.
    pub child: CommandHandle,
}

/// A registered command, or a stub created for a longer path.
pub struct Command {
    pub(crate) path: String,
    pub(crate) help: Option<String>,
    pub(crate) handler: Option<Handler>,
    pub(crate) children: Vec<SubCommandRef>,
    pub(crate) child_index: StringTable,
    pub(crate) positions: PositionColumns,
}

impl Command {
    pub(crate) fn new(path: String, help: Option<String>, handler: Option<Handler>) -> Self {
        Self {
            path,
            help,
            handler,
            children: Vec::new(),
            child_index: StringTable::new(),
            positions: PositionColumns::new(),
        }
    }

    pub(crate) fn stub(path: String) -> Self {
        Self::new(path, None, None)
    }

    /// Normalized path (empty for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Handler, if any.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns `true` for a stub: neither help nor handler is set.
    pub fn is_empty(&self) -> bool {
        self.help.is_none() && self.handler.is_none()
    }

    /// Children in first-registration order.
    pub fn children(&self) -> &[SubCommandRef] {
        &self.children
    }

    /// Returns `true` if at least one child is attached.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child handle for a leaf name.
    pub fn child(&self, name: &str) -> Option<CommandHandle> {
        self.child_index
            .get(name)
            .map(|ordinal| self.children[ordinal].child)
    }

    /// Position columns over the children's names.
    pub fn positions(&self) -> &PositionColumns {
        &self.positions
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("path", &self.path)
            .field("help", &self.help)
            .field("has_handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

/// Serializable snapshot of a command subtree.
///
/// # Examples
///
/// ```
/// use cmdtree_core::CommandTable;
///
/// let mut table = CommandTable::new();
/// table.register("show link", Some("Usage: show link <link-id>"), None).unwrap();
///
/// let root = table.describe();
/// let show = &root.children[0];
/// assert_eq!(show.name, "show");
/// assert!(show.help.is_none());
/// assert_eq!(show.children[0].path, "show link");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    /// Leaf name (empty for the root).
    pub name: String,
    /// Full normalized path.
    pub path: String,
    /// Help text, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
    /// Whether a handler is bound.
    pub has_handler: bool,
    /// Children in first-registration order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<CommandNode>,
}
