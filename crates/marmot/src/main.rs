use std::process::exit;

use marmot_core::{
    config::Config,
    logging::{instrument, EntryKind, Invocation, LogContext},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Sinks come up before config validation so a missing credential lands
    // in the durable log, not just on stderr. An unwritable log directory is
    // itself fatal.
    let (environment, log_dir) = Config::logging_env();
    let ctx = LogContext::new(log_dir);
    let root = ctx.initialize(&environment)?;

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            root.critical(format!("startup aborted: {e}"));
            exit(1);
        }
    };

    root.info(format!(
        "configured for {} allowed user(s), log tail budget {} bytes",
        cfg.telegram_allowed_users.len(),
        cfg.log_tail_bytes
    ));

    let startup = Invocation::new("system", "startup");
    instrument(&ctx, EntryKind::Event, "ready", &startup, async {
        root.info("bot is ready");
        Ok::<_, marmot_core::Error>(())
    })
    .await?;

    // Park until shutdown; dispatch is driven by the transport adapters.
    tokio::signal::ctrl_c().await?;
    root.info("shutting down");
    Ok(())
}
