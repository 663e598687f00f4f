//! Platform capability descriptors.
//!
//! Every platform-dependent rewrite or composition decision reads one of
//! these descriptors instead of comparing platform names. Onboarding a new
//! platform means registering a profile in [`PlatformCatalog`].

use std::collections::HashMap;

/// Where a platform's binary media can be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFetch {
    /// Elements carry URLs the target can fetch directly.
    Native,
    /// Elements may carry only platform-local references; bytes must be
    /// pulled through the configured auxiliary file endpoint.
    Auxiliary,
}

/// How mention ids are turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionLookup {
    /// Use whatever name/id/role attribute the element carries.
    None,
    /// Resolve user ids through a guild-member lookup.
    MemberOnly,
    /// Resolve user ids and role ids, and broadcast markers.
    MemberAndRoles,
}

/// Capability descriptor of one chat platform.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    /// Platform name as reported by its client.
    pub name: String,

    /// Icon prepended to forwarded author names.
    pub icon: String,

    /// CDN base hosting the platform's custom emoji and stickers.
    pub cdn_base: Option<String>,

    /// Media retrieval mode.
    pub media: MediaFetch,

    /// Mention resolution mode.
    pub mentions: MentionLookup,

    /// Whether the platform can render an impersonation wrapper.
    pub impersonation: bool,

    /// Whether avatar URLs from this platform are publicly reachable.
    pub public_avatars: bool,

    /// Avatar used in impersonation wrappers when the origin's avatar is not public.
    pub default_avatar: Option<String>,

    /// Event sub-types the client emits twice; the duplicate is ignored.
    pub ignored_subtypes: Vec<String>,
}

/// Sticker CDN used when the origin profile has none of its own.
pub const DEFAULT_STICKER_CDN: &str = "https://cdn.discordapp.com";

impl PlatformProfile {
    /// Generic profile: no CDN, native media, no lookups, no impersonation.
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: "💬".to_string(),
            cdn_base: None,
            media: MediaFetch::Native,
            mentions: MentionLookup::None,
            impersonation: false,
            public_avatars: true,
            default_avatar: None,
            ignored_subtypes: Vec::new(),
        }
    }

    /// Discord: CDN emoji, member and role lookups, webhook impersonation.
    pub fn discord() -> Self {
        Self {
            icon: "🎮".to_string(),
            cdn_base: Some("https://cdn.discordapp.com".to_string()),
            mentions: MentionLookup::MemberAndRoles,
            impersonation: true,
            default_avatar: Some(
                "https://discord.com/assets/5d6a5e9d7d77ac29116e.png".to_string(),
            ),
            ..Self::generic("discord")
        }
    }

    /// OneBot (QQ): files and voice need the auxiliary endpoint; the client
    /// emits `guild-file-added` alongside the real message event.
    pub fn onebot() -> Self {
        Self {
            icon: "🐧".to_string(),
            media: MediaFetch::Auxiliary,
            mentions: MentionLookup::MemberOnly,
            ignored_subtypes: vec!["guild-file-added".to_string()],
            ..Self::generic("onebot")
        }
    }

    /// Telegram: avatar URLs require the bot token and are not public.
    pub fn telegram() -> Self {
        Self {
            icon: "✈️".to_string(),
            public_avatars: false,
            ..Self::generic("telegram")
        }
    }

    /// Direct image URL of a custom emoji, if this platform hosts emoji on a CDN.
    pub fn emoji_url(&self, id: &str, animated: bool) -> Option<String> {
        self.cdn_base.as_deref().map(|base| {
            if animated {
                format!("{}/emojis/{}?quality=lossless&size=64", base, id)
            } else {
                format!("{}/emojis/{}?size=64", base, id)
            }
        })
    }

    /// Size-capped thumbnail URL of a sticker.
    pub fn sticker_url(&self, id: &str) -> String {
        let base = self.cdn_base.as_deref().unwrap_or(DEFAULT_STICKER_CDN);
        format!("{}/stickers/{}?size=160", base, id)
    }

    /// Whether events with this sub-type are known duplicates.
    pub fn ignores_subtype(&self, subtype: Option<&str>) -> bool {
        subtype.is_some_and(|s| self.ignored_subtypes.iter().any(|i| i == s))
    }
}

/// Lookup of platform profiles by name.
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    profiles: HashMap<String, PlatformProfile>,
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformCatalog {
    /// Catalog with the built-in discord, onebot, and telegram profiles.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            profiles: HashMap::new(),
        };
        catalog.register(PlatformProfile::discord());
        catalog.register(PlatformProfile::onebot());
        catalog.register(PlatformProfile::telegram());
        catalog
    }

    /// Add or replace a profile.
    pub fn register(&mut self, profile: PlatformProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Profile for a platform, or a generic profile for unknown platforms.
    pub fn get(&self, platform: &str) -> PlatformProfile {
        self.profiles
            .get(platform)
            .cloned()
            .unwrap_or_else(|| PlatformProfile::generic(platform))
    }

    /// Names of all registered profiles.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
