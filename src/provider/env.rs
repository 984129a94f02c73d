//! Environment variables exposed through the `env` binding type

/// Variables the edge platform sets for every service instance
pub const WELL_KNOWN: [&str; 9] = [
    "FASTLY_CACHE_GENERATION",
    "FASTLY_CUSTOMER_ID",
    "FASTLY_HOSTNAME",
    "FASTLY_IS_STAGING",
    "FASTLY_POP",
    "FASTLY_REGION",
    "FASTLY_SERVICE_ID",
    "FASTLY_SERVICE_VERSION",
    "FASTLY_TRACE_ID",
];

/// Read a process environment variable
///
/// Unset and non-UTF-8 values are both absent.
pub fn process_var(name: &str) -> Option<String> {
    // std::env::var may panic on these
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return None;
    }
    std::env::var(name).ok()
}
