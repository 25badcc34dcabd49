// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient logging with format arguments

/// Log a message with info severity
///
/// # Examples
/// ```ignore
/// log_info!(ctx, "loaded {} items", items.len());
/// log_info!(ctx, tag = Tag::Network, "GET {} -> {}", url, status);
/// ```
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $ctx.info_tagged($tag, &format!($($arg)+))
    };
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.info(&format!($($arg)+))
    };
}

/// Log a message with warn severity
///
/// # Examples
/// ```ignore
/// log_warn!(ctx, tag = Tag::Memory, "{} MB free", free_mb);
/// ```
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $ctx.warn_tagged($tag, &format!($($arg)+))
    };
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.warn(&format!($($arg)+))
    };
}

/// Log a message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(ctx, tag = Tag::Database, "migration {} failed: {}", version, err);
/// ```
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $ctx.error_tagged($tag, &format!($($arg)+))
    };
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.error(&format!($($arg)+))
    };
}

/// Log a debug message (dropped unless debug logging is enabled)
///
/// The message is only formatted when debug logging is on.
///
/// # Examples
/// ```ignore
/// log_debug!(ctx, "cache state: {:?}", cache);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        if ctx.debug_logging_enabled() {
            ctx.debug_tagged($tag, &format!($($arg)+));
        }
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        if ctx.debug_logging_enabled() {
            ctx.debug(&format!($($arg)+));
        }
    }};
}

/// Log a crash report (error severity, crash tag)
///
/// # Examples
/// ```ignore
/// log_crash!(ctx, "uncaught exception: {}", reason);
/// ```
#[macro_export]
macro_rules! log_crash {
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.crash(&format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::{LogEngine, LoggingContext, MemoryEngine, Severity, Tag};
    use std::sync::Arc;

    struct Silent;

    impl LogEngine for Silent {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, _message: &str) {}
    }

    fn setup() -> (LoggingContext, Arc<MemoryEngine>) {
        let ctx = LoggingContext::with_default_engine(|| Arc::new(Silent));
        let memory = Arc::new(MemoryEngine::new(32));
        ctx.add_engine(memory.clone());
        (ctx, memory)
    }

    #[test]
    fn test_log_macros() {
        let (ctx, memory) = setup();
        let items = 3;

        log_info!(ctx, "loaded {} items", items);
        log_warn!(ctx, tag = Tag::Memory, "{} MB free", 12);
        log_error!(ctx, "plain error");
        log_crash!(ctx, "uncaught {}", "exception");

        let records = memory.entries();
        let texts: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "loaded 3 items",
                "[Memory] 12 MB free",
                "plain error",
                "[Crash] uncaught exception"
            ]
        );
        assert_eq!(records[3].severity, Severity::Error);
    }

    #[test]
    fn test_log_debug_macro() {
        let (ctx, memory) = setup();

        log_debug!(ctx, "hidden {}", 1);
        ctx.set_debug_logging(true);
        log_debug!(ctx, "shown {}", 2);
        log_debug!(ctx, tag = Tag::Cache, "hit ratio {:.1}", 0.5);

        let texts: Vec<_> = memory.entries().into_iter().map(|r| r.message).collect();
        assert_eq!(texts, vec!["[Debug] shown 2", "[Cache] hit ratio 0.5"]);
    }
}
