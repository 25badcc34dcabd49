// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Component-scoped logging helpers.
//!
//! A component declares its tag once and gets `log_info`/`log_warn`/
//! `log_error`/`log_debug` that apply it automatically.

use super::{LoggingContext, Tag};

/// Mixin for types that always log under the same tag
///
/// ```ignore
/// struct SyncService { logging: LoggingContext }
///
/// impl TaggedLogging for SyncService {
///     fn logging(&self) -> &LoggingContext { &self.logging }
///     fn log_tag(&self) -> Tag { Tag::Sync }
/// }
///
/// service.log_warn("conflict on record 42"); // "[Sync] conflict on record 42"
/// ```
pub trait TaggedLogging {
    fn logging(&self) -> &LoggingContext;

    fn log_tag(&self) -> Tag;

    fn log_info(&self, message: &str) {
        self.logging().info_tagged(self.log_tag(), message);
    }

    fn log_warn(&self, message: &str) {
        self.logging().warn_tagged(self.log_tag(), message);
    }

    fn log_error(&self, message: &str) {
        self.logging().error_tagged(self.log_tag(), message);
    }

    fn log_debug(&self, message: &str) {
        self.logging().debug_tagged(self.log_tag(), message);
    }
}

/// Logging handle bound to a fixed tag
///
/// Returned by [`LoggingContext::tagged`]. Cheap to clone.
#[derive(Clone, Debug)]
pub struct TaggedLogger {
    context: LoggingContext,
    tag: Tag,
}

impl TaggedLogger {
    pub fn new(context: LoggingContext, tag: Tag) -> Self {
        Self { context, tag }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }
}

impl TaggedLogging for TaggedLogger {
    fn logging(&self) -> &LoggingContext {
        &self.context
    }

    fn log_tag(&self) -> Tag {
        self.tag
    }
}
