//! Structured logging setup shared by the demo binary and integration tests.
//! Ambient concern (§2a): the core library never calls this itself, it only
//! emits `log` records; whoever embeds the core decides how those records
//! are dispatched.

use log::LevelFilter;

/// Installs a `fern` dispatcher that writes leveled, timestamped records to
/// stdout. Safe to call more than once per process; later calls are no-ops.
pub fn init(level: LevelFilter) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let result = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stdout())
            .apply();

        if let Err(e) = result {
            eprintln!("logger already initialized: {e}");
        }
    });
}
