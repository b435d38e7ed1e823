// =============================================================================
// PSFW - Log Sink
// =============================================================================
// Routes `log` records to a deployment-supplied sink function. The core
// crate only emits records; where they end up (UART, trace buffer, host
// stderr in tests) is decided here at startup.
// =============================================================================

use core::fmt;
use spin::Mutex;

/// A function that consumes one formatted log line.
pub type SinkFn = fn(fmt::Arguments);

struct SinkLogger {
    sink: Mutex<Option<SinkFn>>,
}

/// Global logger instance, protected by a spinlock so interrupt context
/// and the main loop can both report without interleaving records.
static LOGGER: SinkLogger = SinkLogger {
    sink: Mutex::new(None),
};

impl log::Log for SinkLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Some(sink) = *self.sink.lock() {
            sink(format_args!("[{}] {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

/// Install the global log sink.
///
/// Call once at startup, before the firmware core is brought up. Returns
/// an error if a logger was already installed.
pub fn init(sink: SinkFn, level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    *LOGGER.sink.lock() = Some(sink);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
