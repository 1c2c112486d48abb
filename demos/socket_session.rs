//! Control socket example.
//!
//! Starts a server on a temporary Unix socket, connects a client and sends
//! a few lines over the wire.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example socket_session
//! ```

use std::thread;

use cmdtree_core::{CommandSpec, CommandTable, LineMode};
use cmdtree_server::{Client, Server, ServerConfig};

fn main() {
    let table = CommandTable::builder()
        .command(
            CommandSpec::new("reload config")
                .help("Usage: reload config")
                .handler(|ctx| {
                    ctx.print(LineMode::New, "configuration reloaded");
                    Ok(())
                }),
        )
        .build()
        .expect("command table");

    let dir = tempfile::tempdir().expect("temp dir");
    let config = ServerConfig::default().with_socket_path(dir.path().join("demo.sock"));
    let server = Server::bind(&config, table).expect("bind");
    println!("Listening on {}", server.socket_path().display());
    thread::spawn(move || server.run());

    let mut client = Client::connect(&config.socket_path).expect("connect");
    for line in ["reload config", "reload ?", "rel conf help", "restart"] {
        let reply = client.send_line(line).expect("request");
        println!("{}{line}", config.prompt);
        if !reply.is_empty() {
            println!("{reply}");
        }
    }
}
