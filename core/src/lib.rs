//! Embeddable command interpreter for line-oriented control interfaces.
//!
//! A service registers hierarchical commands such as `show interface` or
//! `reload config`, each with optional help text and an optional handler.
//! Input lines are resolved token by token against the tree:
//!
//! - [`CommandTable`] stores the tree. Registering `a b c` also creates stub
//!   commands `a` and `a b`; registering a stub's path later fills it in.
//! - Tokens match children by unique prefix. When several siblings match,
//!   a sibling whose name has exactly the token's length wins
//!   (`int` selects `int` over `interface`).
//! - `help` or `?` at the end of a line prints help for the command level
//!   it follows, or lists that level's children.
//! - Handlers read their arguments with [`unformat!`], a scanf-like matcher
//!   over the remaining input, and write through the [`ParseContext`].
//!
//! # Argument directives
//!
//! Literal text matches byte for byte and whitespace skips any input
//! whitespace. `%d`, `%u`, `%x`, `%o` and `%b` extract integers in base 10,
//! 10, 16, 8 and 2; `%%` matches `%`. The `l`, `ll` and `L` modifiers select
//! 8-byte destinations and `w` (or nothing) 4-byte ones. `%D` and `%X` take
//! the destination width from a [`ScanArg::Width`] placed before the
//! destination. A failed scan leaves both the cursor and the destinations
//! untouched.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let table = CommandTable::builder()
//!     .command(
//!         CommandSpec::new("show instance")
//!             .help("Usage: show instance [id INDEX]")
//!             .handler(|ctx| {
//!                 let mut id = 0i32;
//!                 while unformat!(ctx, "id %d", &mut id) {
//!                     ctx.print_fmt(LineMode::New, format_args!("id {id} is shown"));
//!                 }
//!                 Ok(())
//!             }),
//!     )
//!     .command(CommandSpec::new("show link").help("Usage: show link <link-id>"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.submit(b"sh inst id 3 id 4").text(), "id 3 is shown\nid 4 is shown");
//! assert_eq!(table.submit(b"show ?").text(), "instance\nlink");
//! assert_eq!(table.submit(b"show inst ?").text(), "Usage: show instance [id INDEX]");
//!
//! let response = table.submit(b"show x");
//! assert_eq!(response.text(), " command not found");
//! assert!(!response.is_ok());
//! ```

mod bitmap;
mod builder;
mod command;
mod context;
mod dispatch;
mod error;
mod path;
mod position;
mod scan;
mod strhash;
mod table;

pub use bitmap::{BitOp, Bitmap};
pub use builder::{CommandSpec, TableBuilder, handler};
pub use command::{Command, CommandHandle, CommandNode, Handler, SubCommandRef};
pub use context::{EMPTY_RESPONSE, LineMode, Output, ParseContext, is_white_space};
pub use dispatch::Response;
pub use error::{CommandError, Result};
pub use path::{leaf_name, normalize, parent_len};
pub use position::{PositionColumn, PositionColumns, is_token_char};
pub use scan::{ScanArg, digit_value};
pub use strhash::{StringTable, djb2};
pub use table::CommandTable;
