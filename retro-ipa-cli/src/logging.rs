use std::io::Write;

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

/// Install the global logger.
///
/// Normal output is plain `info` lines on stdout. `quiet` keeps warnings and
/// errors only; `verbose` adds debug messages and timestamps. Dependencies
/// only ever log warnings and errors.
pub(crate) fn init(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("retro_ipa", level)
        .format(move |buf, record| {
            if verbose {
                write!(buf, "[{}] ", buf.timestamp_millis())?;
            }
            match record.level() {
                Level::Error => writeln!(
                    buf,
                    "{} {}",
                    "error:".if_supports_color(Stdout, |t| t.red()),
                    record.args()
                ),
                Level::Debug | Level::Trace => writeln!(
                    buf,
                    "{}",
                    record.args().if_supports_color(Stdout, |t| t.dimmed())
                ),
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}
