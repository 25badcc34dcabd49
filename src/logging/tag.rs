// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log tags (category labels prefixed to messages)

use serde::{Deserialize, Serialize};

/// Namespace a tag belongs to. Purely for discoverability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagGroup {
    System,
    Network,
    Data,
    Ui,
    Security,
    ThirdParty,
    Business,
    Development,
    Media,
}

impl TagGroup {
    pub const ALL: [TagGroup; 9] = [
        TagGroup::System,
        TagGroup::Network,
        TagGroup::Data,
        TagGroup::Ui,
        TagGroup::Security,
        TagGroup::ThirdParty,
        TagGroup::Business,
        TagGroup::Development,
        TagGroup::Media,
    ];

    /// Tags belonging to this group, in catalog order
    pub fn tags(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |tag| tag.group() == self)
    }
}

/// Log tag - identifies which area of the application a message concerns
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    // === System ===
    /// Application-wide events
    App = 0,
    /// Launch, background, foreground, termination
    Lifecycle = 1,
    /// Memory pressure, allocations
    Memory = 2,
    /// Timings, slow paths
    Performance = 3,
    /// Crash and fatal diagnostics
    Crash = 4,

    // === Network ===
    Network = 10,
    Api = 11,
    WebSocket = 12,

    // === Data ===
    Database = 20,
    Cache = 21,
    Storage = 22,
    Sync = 23,

    // === UI ===
    Ui = 30,
    Navigation = 31,
    Animation = 32,

    // === Security ===
    Security = 40,
    Auth = 41,
    Keychain = 42,

    // === Third party ===
    Analytics = 50,
    Sdk = 51,
    Push = 52,

    // === Business ===
    Business = 60,
    Payment = 61,
    User = 62,

    // === Development ===
    /// Used by the debug convenience methods
    Debug = 70,
    Test = 71,
    Mock = 72,

    // === Media ===
    Media = 80,
    Image = 81,
    Video = 82,
    Audio = 83,
}

impl Tag {
    pub const ALL: [Tag; 31] = [
        Tag::App,
        Tag::Lifecycle,
        Tag::Memory,
        Tag::Performance,
        Tag::Crash,
        Tag::Network,
        Tag::Api,
        Tag::WebSocket,
        Tag::Database,
        Tag::Cache,
        Tag::Storage,
        Tag::Sync,
        Tag::Ui,
        Tag::Navigation,
        Tag::Animation,
        Tag::Security,
        Tag::Auth,
        Tag::Keychain,
        Tag::Analytics,
        Tag::Sdk,
        Tag::Push,
        Tag::Business,
        Tag::Payment,
        Tag::User,
        Tag::Debug,
        Tag::Test,
        Tag::Mock,
        Tag::Media,
        Tag::Image,
        Tag::Video,
        Tag::Audio,
    ];

    /// Get the fixed display label, e.g. `"[Network]"`
    pub const fn label(self) -> &'static str {
        match self {
            Tag::App => "[App]",
            Tag::Lifecycle => "[Lifecycle]",
            Tag::Memory => "[Memory]",
            Tag::Performance => "[Performance]",
            Tag::Crash => "[Crash]",
            Tag::Network => "[Network]",
            Tag::Api => "[API]",
            Tag::WebSocket => "[WebSocket]",
            Tag::Database => "[Database]",
            Tag::Cache => "[Cache]",
            Tag::Storage => "[Storage]",
            Tag::Sync => "[Sync]",
            Tag::Ui => "[UI]",
            Tag::Navigation => "[Navigation]",
            Tag::Animation => "[Animation]",
            Tag::Security => "[Security]",
            Tag::Auth => "[Auth]",
            Tag::Keychain => "[Keychain]",
            Tag::Analytics => "[Analytics]",
            Tag::Sdk => "[SDK]",
            Tag::Push => "[Push]",
            Tag::Business => "[Business]",
            Tag::Payment => "[Payment]",
            Tag::User => "[User]",
            Tag::Debug => "[Debug]",
            Tag::Test => "[Test]",
            Tag::Mock => "[Mock]",
            Tag::Media => "[Media]",
            Tag::Image => "[Image]",
            Tag::Video => "[Video]",
            Tag::Audio => "[Audio]",
        }
    }

    /// Get the namespace this tag is listed under
    pub const fn group(self) -> TagGroup {
        match self {
            Tag::App | Tag::Lifecycle | Tag::Memory | Tag::Performance | Tag::Crash => {
                TagGroup::System
            }
            Tag::Network | Tag::Api | Tag::WebSocket => TagGroup::Network,
            Tag::Database | Tag::Cache | Tag::Storage | Tag::Sync => TagGroup::Data,
            Tag::Ui | Tag::Navigation | Tag::Animation => TagGroup::Ui,
            Tag::Security | Tag::Auth | Tag::Keychain => TagGroup::Security,
            Tag::Analytics | Tag::Sdk | Tag::Push => TagGroup::ThirdParty,
            Tag::Business | Tag::Payment | Tag::User => TagGroup::Business,
            Tag::Debug | Tag::Test | Tag::Mock => TagGroup::Development,
            Tag::Media | Tag::Image | Tag::Video | Tag::Audio => TagGroup::Media,
        }
    }

    /// Prefix a message with this tag's label
    pub fn apply(self, message: &str) -> String {
        format!("{} {}", self.label(), message)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_unique_and_non_empty() {
        let mut seen = HashSet::new();
        for tag in Tag::ALL {
            let label = tag.label();
            assert!(label.len() > 2, "{:?} has an empty label", tag);
            assert!(label.starts_with('[') && label.ends_with(']'));
            assert!(seen.insert(label), "duplicate label {}", label);
        }
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(Tag::Network.label(), "[Network]");
        assert_eq!(Tag::Memory.label(), "[Memory]");
        assert_eq!(Tag::Crash.label(), "[Crash]");
        assert_eq!(Tag::Api.label(), "[API]");
        assert_eq!(format!("{}", Tag::Database), "[Database]");
    }

    #[test]
    fn test_apply() {
        assert_eq!(Tag::Security.apply("token expired"), "[Security] token expired");
    }

    #[test]
    fn test_every_group_has_tags() {
        let mut total = 0;
        for group in TagGroup::ALL {
            let count = group.tags().count();
            assert!(count > 0, "{:?} has no tags", group);
            total += count;
        }
        assert_eq!(total, Tag::ALL.len());
    }

    #[test]
    fn test_group_membership() {
        assert_eq!(Tag::Crash.group(), TagGroup::System);
        assert_eq!(Tag::WebSocket.group(), TagGroup::Network);
        assert_eq!(Tag::Debug.group(), TagGroup::Development);
        assert_eq!(Tag::Navigation.group(), TagGroup::Ui);
        assert!(TagGroup::Media.tags().any(|t| t == Tag::Audio));
    }
}
