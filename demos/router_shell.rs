//! In-process command tree example.
//!
//! Registers a small router-style command set, dispatches a scripted
//! session against it and prints each response, then dumps the tree.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example router_shell
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cmdtree_core::{CommandError, CommandSpec, CommandTable, LineMode, ScanArg, unformat};

fn main() {
    let mtu = Arc::new(AtomicU32::new(1500));

    let table = {
        let get_mtu = Arc::clone(&mtu);
        let set_mtu = Arc::clone(&mtu);
        CommandTable::builder()
            .command(
                CommandSpec::new("show interface")
                    .help("Usage: show interface [mtu]")
                    .handler(move |ctx| {
                        if unformat!(ctx, "mtu") {
                            ctx.print_fmt(
                                LineMode::New,
                                format_args!("mtu {}", get_mtu.load(Ordering::Relaxed)),
                            );
                        } else {
                            ctx.print(LineMode::New, "eth0 up");
                        }
                        Ok(())
                    }),
            )
            .command(
                CommandSpec::new("set mtu")
                    .help("Usage: set mtu <bytes>")
                    .handler(move |ctx| {
                        let mut value = 0u32;
                        if !unformat!(ctx, "%u", &mut value) {
                            ctx.print(LineMode::New, "expected a byte count");
                            return Err(CommandError::handler("missing mtu"));
                        }
                        set_mtu.store(value, Ordering::Relaxed);
                        Ok(())
                    }),
            )
            .command(
                CommandSpec::new("set mask")
                    .help("Usage: set mask <hex>")
                    .handler(|ctx| {
                        let mut mask = 0u64;
                        let mut args = [ScanArg::Width(8), ScanArg::from(&mut mask)];
                        if ctx.unformat("%X", &mut args) {
                            ctx.print_fmt(LineMode::New, format_args!("mask {mask:#x}"));
                        }
                        Ok(())
                    }),
            )
            .command(CommandSpec::new("shutdown").help("Usage: shutdown"))
            .build()
            .expect("command table")
    };

    let session = [
        "?",
        "show ?",
        "sho int",
        "show interface mtu",
        "set mtu 9000",
        "show int mtu",
        "set mask ff00ff",
        "set mtu ?",
        "set mtu lots",
        "s",
        "reboot",
    ];

    for line in session {
        let response = table.submit(line.as_bytes());
        println!("> {line}");
        if !response.text().is_empty() {
            println!("{}", response.text());
        }
        if let Err(err) = response.outcome() {
            println!("  [{err}]");
        }
    }

    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&table.describe()).expect("tree serializes")
    );
}
