//! Demo command set served by `cmdtree serve`.

use cmdtree_core::{CommandSpec, CommandTable, LineMode, Result, unformat};

/// Builds the demo table: `show instance`, `show link` and `reload config`.
pub fn demo_table() -> Result<CommandTable> {
    CommandTable::builder()
        .command(
            CommandSpec::new("show instance")
                .help("Usage: show instance [id INDEX]")
                .handler(|ctx| {
                    let mut id = -1i32;
                    while !ctx.at_end() {
                        if !unformat!(ctx, "id %d", &mut id) {
                            break;
                        }
                    }
                    if id > 0 {
                        ctx.print_fmt(LineMode::New, format_args!("id {id} is shown"));
                    }
                    Ok(())
                }),
        )
        .command(
            CommandSpec::new("show link")
                .help("Usage: show link <link-id>")
                .handler(|_| Ok(())),
        )
        .command(
            CommandSpec::new("reload config")
                .help("Usage: reload config")
                .handler(|_| Ok(())),
        )
        .build()
}
