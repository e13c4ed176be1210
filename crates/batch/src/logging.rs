//! Logger setup for the batch binary.

use log::LevelFilter;
use std::time::Instant;

/// Initializes the process-wide logger, timestamped relative to startup.
pub fn init_logger(level_filter: LevelFilter) -> anyhow::Result<()> {
    let epoch = Instant::now();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let elapsed = epoch.elapsed();
            let prefix = format!(
                "[{}] [{:>7.2}s]",
                record.level(),
                elapsed.as_secs_f64(),
            );
            out.finish(format_args!("{prefix:<18}{message}"))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
