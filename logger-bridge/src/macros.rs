// Severity macros for the levels `tracing` has no name for

/// Log at SUCCESS severity (weight 25, between INFO and WARNING).
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(severity = "SUCCESS", $($arg)+)
    };
}

/// Log at CRITICAL severity (weight 50, above ERROR).
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::tracing::error!(severity = "CRITICAL", $($arg)+)
    };
}
