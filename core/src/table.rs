//! Append-only command table and tree construction.
//!
//! Every command lives in one flat vector and is addressed by its
//! [`CommandHandle`]. Registering a path also creates stub records for any
//! missing ancestors, so deep paths may be registered before shallow ones;
//! a later registration of a stub's path fills it in place and keeps its
//! children.

use tracing::{debug, warn};

use crate::command::{Command, CommandHandle, CommandNode, Handler, SubCommandRef};
use crate::error::{CommandError, Result};
use crate::path::{leaf_name, normalize, parent_len};
use crate::position::is_token_char;
use crate::strhash::StringTable;

/// The command tree.
///
/// Build it once at startup with [`register`](CommandTable::register) (or
/// [`CommandTable::builder`]), then share it read-only; dispatch only needs
/// `&self`.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandError, CommandTable};
///
/// let mut table = CommandTable::new();
/// table.register("a b c", Some("deep"), None).unwrap();
///
/// let a = table.lookup("a").unwrap();
/// assert!(table.get(a).is_empty());
/// assert_eq!(table.get(a).children()[0].name, "b");
///
/// // Filling in a stub is allowed once.
/// table.register("a", Some("top"), None).unwrap();
/// assert_eq!(
///     table.register("a", Some("again"), None),
///     Err(CommandError::DuplicateCommand("a".into()))
/// );
/// ```
pub struct CommandTable {
    commands: Vec<Command>,
    by_path: StringTable,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.commands)
            .finish()
    }
}

impl CommandTable {
    /// Creates a table holding only the root command.
    pub fn new() -> Self {
        Self {
            commands: vec![Command::stub(String::new())],
            by_path: StringTable::new(),
        }
    }

    /// Number of records, including the root and stubs.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.commands.len() == 1
    }

    /// The record behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` did not come from this table.
    pub fn get(&self, handle: CommandHandle) -> &Command {
        &self.commands[handle.0]
    }

    /// The root command.
    pub fn root(&self) -> &Command {
        self.get(CommandHandle::ROOT)
    }

    /// Finds a command by path; the path is normalized first.
    pub fn lookup(&self, path: &str) -> Option<CommandHandle> {
        let path = normalize(path);
        if path.is_empty() {
            return Some(CommandHandle::ROOT);
        }
        self.by_path.get(&path).map(CommandHandle)
    }

    /// Children of `handle` in first-registration order.
    pub fn children(&self, handle: CommandHandle) -> &[SubCommandRef] {
        self.get(handle).children()
    }

    /// Iterates every record with its handle, root first.
    pub fn iter(&self) -> impl Iterator<Item = (CommandHandle, &Command)> {
        self.commands
            .iter()
            .enumerate()
            .map(|(i, command)| (CommandHandle(i), command))
    }

    /// Registers a command.
    ///
    /// The path is normalized. Missing ancestors are created as stubs. If
    /// the path already names a stub, its help and handler are filled in and
    /// its children are kept.
    ///
    /// # Errors
    ///
    /// - [`CommandError::EmptyPath`] if the path is blank.
    /// - [`CommandError::DuplicateCommand`] if a non-stub command already
    ///   has this path.
    /// - [`CommandError::Allocation`] if storage cannot grow; the table is
    ///   unchanged in that case.
    pub fn register(
        &mut self,
        path: &str,
        help: Option<&str>,
        handler: Option<Handler>,
    ) -> Result<CommandHandle> {
        let path = normalize(path);
        if path.is_empty() {
            return Err(CommandError::EmptyPath);
        }

        if let Some(index) = self.by_path.get(&path) {
            let existing = &mut self.commands[index];
            if !existing.is_empty() {
                return Err(CommandError::DuplicateCommand(path));
            }
            existing.help = help.map(String::from);
            existing.handler = handler;
            debug!(path = %path, handle = index, "Filled in stub command");
            return Ok(CommandHandle(index));
        }

        if path.split(' ').any(|segment| !segment.bytes().all(is_token_char)) {
            warn!(path = %path, "Command path has characters input can never match");
        }

        self.reserve_for(&path)?;

        let mark = self.commands.len();
        let inserted = self
            .push(Command::new(path, help.map(String::from), handler))
            .and_then(|handle| self.make_parents(handle).map(|()| handle));
        match inserted {
            Ok(handle) => {
                debug!(path = %self.commands[handle.0].path, handle = handle.0, "Registered command");
                Ok(handle)
            }
            Err(err) => {
                self.truncate(mark);
                Err(err)
            }
        }
    }

    // Reserves room for `path` and every missing ancestor up front. Index
    // buckets can still fail to grow; `truncate` undoes that case.
    fn reserve_for(&mut self, path: &str) -> Result<()> {
        let mut missing = 1;
        let mut current = path;
        let attach_to = loop {
            let Some(len) = parent_len(current) else {
                break CommandHandle::ROOT;
            };
            current = &current[..len];
            match self.by_path.get(current) {
                Some(index) => break CommandHandle(index),
                None => missing += 1,
            }
        };

        self.commands.try_reserve(missing)?;
        self.by_path.reserve(missing)?;
        let parent = &mut self.commands[attach_to.0];
        parent.children.try_reserve(1)?;
        parent.child_index.reserve(1)?;
        Ok(())
    }

    // Drops every record from `mark` on. Records created by one `register`
    // call are only linked to each other until the final attach to an
    // existing parent, which is the last fallible step.
    fn truncate(&mut self, mark: usize) {
        for command in self.commands.drain(mark..) {
            self.by_path.remove(&command.path);
        }
    }

    fn push(&mut self, command: Command) -> Result<CommandHandle> {
        let handle = CommandHandle(self.commands.len());
        self.by_path.set(&command.path, handle.0)?;
        self.commands.push(command);
        Ok(handle)
    }

    // Attaches `child` to its parent, creating stub ancestors on the way up.
    fn make_parents(&mut self, mut child: CommandHandle) -> Result<()> {
        loop {
            let path = &self.commands[child.0].path;
            let Some(len) = parent_len(path) else {
                return self.attach(CommandHandle::ROOT, child);
            };
            let parent_path = path[..len].to_string();

            let (parent, created) = match self.by_path.get(&parent_path) {
                Some(index) => (CommandHandle(index), false),
                None => {
                    let handle = self.push(Command::stub(parent_path))?;
                    debug!(
                        path = %self.commands[handle.0].path,
                        handle = handle.0,
                        "Created stub command"
                    );
                    (handle, true)
                }
            };

            self.attach(parent, child)?;
            if !created {
                return Ok(());
            }
            child = parent;
        }
    }

    /// Links `child` under `parent` and folds its leaf name into the
    /// parent's position columns. Attaching an existing name is a no-op.
    fn attach(&mut self, parent: CommandHandle, child: CommandHandle) -> Result<()> {
        let name = leaf_name(&self.commands[child.0].path).to_string();
        let parent_cmd = &mut self.commands[parent.0];
        if parent_cmd.child_index.contains_key(&name) {
            return Ok(());
        }

        let ordinal = parent_cmd.children.len();
        parent_cmd.children.try_reserve(1)?;
        parent_cmd.child_index.set(&name, ordinal)?;
        parent_cmd.positions.insert(&name, ordinal);
        parent_cmd.children.push(SubCommandRef { name, child });
        Ok(())
    }

    /// Snapshot of the whole tree starting at the root.
    pub fn describe(&self) -> CommandNode {
        self.describe_from(CommandHandle::ROOT)
    }

    /// Snapshot of the subtree rooted at `handle`.
    pub fn describe_from(&self, handle: CommandHandle) -> CommandNode {
        let command = self.get(handle);
        CommandNode {
            name: leaf_name(command.path()).to_string(),
            path: command.path().to_string(),
            help: command.help().map(String::from),
            has_handler: command.handler().is_some(),
            children: command
                .children()
                .iter()
                .map(|sub| self.describe_from(sub.child))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler;

    fn noop() -> Handler {
        handler(|_| Ok(()))
    }

    #[test]
    fn test_register_creates_stub_ancestors() {
        let mut table = CommandTable::new();
        let c = table.register("a b c", None, Some(noop())).unwrap();
        assert_eq!(table.len(), 4);

        let a = table.lookup("a").unwrap();
        let ab = table.lookup("a b").unwrap();
        assert!(table.get(a).is_empty());
        assert!(table.get(ab).is_empty());
        assert!(!table.get(c).is_empty());

        assert_eq!(table.children(CommandHandle::ROOT)[0].child, a);
        assert_eq!(table.get(a).child("b"), Some(ab));
        assert_eq!(table.get(ab).child("c"), Some(c));
    }

    #[test]
    fn test_handles_follow_creation_order() {
        let mut table = CommandTable::new();
        let c = table.register("a b c", None, None).unwrap();
        assert_eq!(c.index(), 1);
        assert_eq!(table.lookup("a b").unwrap().index(), 2);
        assert_eq!(table.lookup("a").unwrap().index(), 3);
    }

    #[test]
    fn test_stub_is_filled_in_place() {
        let mut table = CommandTable::new();
        table.register("show interface", Some("iface"), None).unwrap();
        let show = table.lookup("show").unwrap();

        let filled = table.register("show", Some("show things"), Some(noop())).unwrap();
        assert_eq!(filled, show);
        assert_eq!(table.get(show).help(), Some("show things"));
        assert!(table.get(show).handler().is_some());
        assert_eq!(table.get(show).children().len(), 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_command() {
        let mut table = CommandTable::new();
        table.register("reload config", Some("x"), None).unwrap();
        let err = table.register("reload   config", Some("y"), None).unwrap_err();
        assert_eq!(err, CommandError::DuplicateCommand("reload config".into()));
        assert_eq!(table.get(table.lookup("reload config").unwrap()).help(), Some("x"));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut table = CommandTable::new();
        assert_eq!(table.register("  \t ", None, None), Err(CommandError::EmptyPath));
        assert!(table.is_empty());
    }

    #[test]
    fn test_sibling_order_is_first_registration_order() {
        let mut table = CommandTable::new();
        table.register("show link", None, None).unwrap();
        table.register("reload config", None, None).unwrap();
        table.register("show instance", None, None).unwrap();
        table.register("show", Some("h"), None).unwrap();

        let names: Vec<_> = table
            .children(CommandHandle::ROOT)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["show", "reload"]);

        let show = table.lookup("show").unwrap();
        let names: Vec<_> = table.children(show).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["link", "instance"]);
    }

    #[test]
    fn test_lookup_normalizes_and_root() {
        let mut table = CommandTable::new();
        table.register("show link", None, None).unwrap();
        assert_eq!(table.lookup("  show   link "), table.lookup("show link"));
        assert_eq!(table.lookup(""), Some(CommandHandle::ROOT));
        assert_eq!(table.lookup("show lin"), None);

        let root = table.root();
        assert!(root.path().is_empty());
        assert_eq!(root.child("show"), table.lookup("show"));
    }

    #[test]
    fn test_truncate_discards_partial_registration() {
        let mut table = CommandTable::new();
        table.register("show link", None, Some(noop())).unwrap();
        let mark = table.len();

        // State left by a failure before the final attach to "show".
        let leaf = table.push(Command::stub("show instance id".to_string())).unwrap();
        let stub = table.push(Command::stub("show instance".to_string())).unwrap();
        table.attach(stub, leaf).unwrap();
        table.truncate(mark);

        assert_eq!(table.len(), mark);
        assert_eq!(table.lookup("show instance"), None);
        assert_eq!(table.lookup("show instance id"), None);
        assert_eq!(table.children(table.lookup("show").unwrap()).len(), 1);

        table.register("show instance id", None, Some(noop())).unwrap();
        assert_eq!(table.len(), mark + 2);
        let show = table.get(table.lookup("show").unwrap());
        assert_eq!(show.child("instance"), table.lookup("show instance"));
    }

    #[test]
    fn test_describe() {
        let mut table = CommandTable::new();
        table.register("show instance", Some("Usage: show instance"), Some(noop())).unwrap();
        let root = table.describe();
        assert_eq!(root.path, "");
        assert_eq!(root.children.len(), 1);
        let instance = &root.children[0].children[0];
        assert_eq!(instance.name, "instance");
        assert!(instance.has_handler);
        assert_eq!(instance.help.as_deref(), Some("Usage: show instance"));
    }
}
