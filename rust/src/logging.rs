//! Stderr logging for the search strategies, gated by each config's
//! `verbosity` field. Arguments are not formatted below the threshold.

pub const VERBOSITY_SILENT: u8 = 0;
/// Incumbent improvements and a one-line summary when a search ends.
pub const VERBOSITY_PROGRESS: u8 = 1;
/// Prune and expansion decisions.
pub const VERBOSITY_CHECKS: u8 = 2;
/// Every rollout and queue pop.
pub const VERBOSITY_DEBUG: u8 = 3;

#[inline]
pub fn enabled(verbosity: u8, level: u8) -> bool {
    level != VERBOSITY_SILENT && verbosity >= level
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:expr, $verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $level) {
            eprintln!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_progress {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_PROGRESS, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_CHECKS, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_DEBUG, $verbosity, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert!(!enabled(VERBOSITY_SILENT, VERBOSITY_PROGRESS));
        assert!(enabled(VERBOSITY_PROGRESS, VERBOSITY_PROGRESS));
        assert!(!enabled(VERBOSITY_PROGRESS, VERBOSITY_CHECKS));
        assert!(enabled(VERBOSITY_DEBUG, VERBOSITY_CHECKS));
        // Silent is a verbosity, never a message level
        assert!(!enabled(VERBOSITY_DEBUG, VERBOSITY_SILENT));
    }

    #[test]
    fn test_arguments_skipped_when_silent() {
        let mut formatted = false;
        let mut mark = || {
            formatted = true;
            0
        };
        log_checks!(VERBOSITY_PROGRESS, "{}", mark());
        assert!(!formatted);
    }
}
