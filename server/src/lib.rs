//! Unix socket transport and configuration for cmdtree command tables.
//!
//! A [`Server`] binds a control socket and dispatches every received line
//! against a shared [`CommandTable`](cmdtree_core::CommandTable); a
//! [`Client`] sends lines and reads the responses back. Responses on the
//! wire are the response blob followed by a NUL byte.
//!
//! # Quick start
//!
//! ```no_run
//! use cmdtree_core::{CommandSpec, CommandTable, LineMode};
//! use cmdtree_server::{Client, Server, ServerConfig};
//!
//! let table = CommandTable::builder()
//!     .command(CommandSpec::new("reload config").handler(|ctx| {
//!         ctx.print(LineMode::New, "reloaded");
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let config = ServerConfig::default().with_socket_path("/tmp/app.sock");
//! let server = Server::bind(&config, table).unwrap();
//! std::thread::spawn(move || server.run());
//!
//! let mut client = Client::connect("/tmp/app.sock").unwrap();
//! assert_eq!(client.send_line("reload config").unwrap(), "reloaded");
//! ```

mod client;
mod config;
mod error;
mod server;

pub use client::Client;
pub use config::{DEFAULT_SOCKET_PATH, ServerConfig};
pub use error::{Result, ServerError};
pub use server::{FRAME_TERMINATOR, Server, serve_connection};
