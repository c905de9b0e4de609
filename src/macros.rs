/// Append a line to a host's diagnostics buffer, tagged with the call site,
/// and mirror it to the `debug` log.
#[macro_export]
macro_rules! diag {
    ($diagnostics:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        tracing::debug!("{message}");
        $diagnostics.record(file!(), line!(), message);
    }};
}
