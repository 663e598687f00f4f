//! Element transformation.
//!
//! Rewrites the content elements of one inbound message into elements every
//! target platform can render. Each element kind has its own rewrite, and
//! every rewrite reads the origin's [`PlatformProfile`] rather than matching
//! on platform names.

use crate::file_api::{FileApiClient, FileApiResponse};
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::try_join_all;
use mirrorbot_channels::BotConnection;
use mirrorbot_core::types::{
    Element, MediaFetch, Mention, MentionKind, MentionLookup, PlatformProfile,
};
use tracing::{debug, error, info, warn};

/// Placeholder for an emoji without a name in text mode.
pub const FACE_PLACEHOLDER: &str = "[emoji]";

/// Placeholder for a file that needs the auxiliary endpoint when none is configured.
pub const UNSUPPORTED_FILE: &str = "[unsupported file]";

/// Placeholder for a voice message without a playable source.
pub const UNSUPPORTED_VOICE: &str = "[unsupported voice message]";

/// Role name used when a mentioned role no longer exists.
pub const UNKNOWN_ROLE: &str = "unknown";

/// MIME type for files whose type cannot be inferred.
const OCTET_STREAM: &str = "application/octet-stream";

/// Per-call transformation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Render emoji as bracketed text instead of images.
    pub face_as_text: bool,
}

impl TransformOptions {
    /// Options for rendering quoted content as text.
    pub fn face_as_text() -> Self {
        Self { face_as_text: true }
    }
}

/// Rewrites content elements received on one origin.
#[derive(Clone, Copy)]
pub struct ElementTransformer<'a> {
    origin: &'a PlatformProfile,
    guild_id: Option<&'a str>,
    directory: Option<&'a dyn BotConnection>,
    file_api: Option<&'a FileApiClient>,
}

impl<'a> ElementTransformer<'a> {
    /// Transformer for content received on a platform.
    pub fn new(origin: &'a PlatformProfile) -> Self {
        Self {
            origin,
            guild_id: None,
            directory: None,
            file_api: None,
        }
    }

    /// Guild the message was posted in, for member and role lookups.
    pub fn with_guild(mut self, guild_id: Option<&'a str>) -> Self {
        self.guild_id = guild_id;
        self
    }

    /// Connection that answers member and role lookups.
    pub fn with_directory(mut self, bot: Option<&'a dyn BotConnection>) -> Self {
        self.directory = bot;
        self
    }

    /// Auxiliary file endpoint of the source.
    pub fn with_file_api(mut self, client: Option<&'a FileApiClient>) -> Self {
        self.file_api = client;
        self
    }

    /// Origin profile.
    pub fn origin(&self) -> &PlatformProfile {
        self.origin
    }

    /// Rewrite every element, preserving order.
    ///
    /// Rewrites run concurrently; the result is returned once all complete.
    /// The first failing rewrite fails the whole message.
    pub async fn transform(
        &self,
        elements: &[Element],
        options: TransformOptions,
    ) -> Result<Vec<Element>> {
        try_join_all(elements.iter().map(|el| self.rewrite(el, options))).await
    }

    async fn rewrite(&self, element: &Element, options: TransformOptions) -> Result<Element> {
        let rewritten = match element {
            Element::Face { id, name, animated } => {
                self.face(element, id, name.as_deref(), *animated, options)
            }
            Element::MarketFace { url, summary } => Element::image(url, summary.clone()),
            Element::Sticker { id, name } => {
                Element::image(self.origin.sticker_url(id), name.clone())
            }
            Element::File {
                src, file, file_id, ..
            } => {
                self.file(element, src.as_deref(), file.as_deref(), file_id.as_deref())
                    .await
            }
            Element::Audio { src, .. } => self.audio(element, src.as_deref()),
            Element::Record { src } => Element::audio(src),
            Element::Mention(mention) => Element::text(self.mention(mention).await?),
            other => other.clone(),
        };
        Ok(rewritten)
    }

    fn face(
        &self,
        element: &Element,
        id: &str,
        name: Option<&str>,
        animated: bool,
        options: TransformOptions,
    ) -> Element {
        if options.face_as_text {
            return match name.filter(|n| !n.is_empty()) {
                Some(name) => Element::text(format!("[{}]", name)),
                None => Element::text(FACE_PLACEHOLDER),
            };
        }

        match self.origin.emoji_url(id, animated) {
            Some(url) => Element::image(url, None),
            None => element.clone(),
        }
    }

    async fn file(
        &self,
        element: &Element,
        src: Option<&str>,
        file: Option<&str>,
        file_id: Option<&str>,
    ) -> Element {
        if self.origin.media == MediaFetch::Native {
            return element.clone();
        }

        if let Some(src) = src.filter(|s| is_http(s)) {
            return Element::audio(src);
        }

        let Some(api) = self.file_api else {
            warn!(
                "No file API configured for {}; cannot download attachment",
                self.origin.name
            );
            return Element::text(UNSUPPORTED_FILE);
        };

        let name = file.or(file_id).unwrap_or("attachment");
        fetch_file(api, file_id, name).await
    }

    fn audio(&self, element: &Element, src: Option<&str>) -> Element {
        if self.origin.media == MediaFetch::Native {
            return element.clone();
        }

        // Voice messages are never pulled through the file API.
        match src.filter(|s| is_http(s)) {
            Some(src) => Element::audio(src),
            None => Element::text(UNSUPPORTED_VOICE),
        }
    }

    async fn mention(&self, mention: &Mention) -> Result<String> {
        if let Some(name) = mention.name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(format!("@{} ", name));
        }

        let lookup = self.directory.zip(self.guild_id);
        let mode = self.origin.mentions;

        if mode != MentionLookup::None {
            if let (Some(user_id), Some((bot, guild_id))) = (mention.id.as_deref(), lookup) {
                let member = bot.guild_member(guild_id, user_id).await?;
                return Ok(format!("@{} ", member.display_name()));
            }
        }

        if mode == MentionLookup::MemberAndRoles {
            if let (Some(role_id), Some((bot, guild_id))) = (mention.role.as_deref(), lookup) {
                let roles = bot.guild_roles(guild_id).await?;
                let name = roles
                    .iter()
                    .find(|r| r.id == role_id)
                    .map_or(UNKNOWN_ROLE, |r| r.name.as_str());
                return Ok(format!("@[role]{} ", name));
            }

            match mention.kind {
                Some(MentionKind::Here) => return Ok("@here ".to_string()),
                Some(MentionKind::All) => return Ok("@everyone".to_string()),
                None => {}
            }
        }

        if mode != MentionLookup::None && lookup.is_none() {
            debug!("No member directory for {}; mention left unresolved", self.origin.name);
        }

        Ok(plain_mention(mention))
    }
}

/// `@name`, `@id`, or `@role`, whichever the element carries.
fn plain_mention(mention: &Mention) -> String {
    let target = [
        mention.name.as_deref(),
        mention.id.as_deref(),
        mention.role.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .or(match mention.kind {
        Some(MentionKind::Here) => Some("here"),
        Some(MentionKind::All) => Some("everyone"),
        None => None,
    })
    .unwrap_or_default();

    format!("@{} ", target)
}

async fn fetch_file(api: &FileApiClient, file_id: Option<&str>, name: &str) -> Element {
    let failed = || Element::text(format!("[file: {} forward failed]", name));

    let Some(file_id) = file_id else {
        error!("File {} carries no file id", name);
        return failed();
    };

    info!("Fetching file {} through {}", name, api.endpoint());
    let base64 = match api
        .get_file(file_id)
        .await
        .and_then(FileApiResponse::into_base64)
    {
        Ok(base64) => base64,
        Err(e) => {
            error!("File {} download failed: {}", name, e);
            return failed();
        }
    };

    match STANDARD.decode(&base64) {
        Ok(bytes) => info!("Fetched file {} ({} bytes)", name, bytes.len()),
        Err(e) => {
            error!("File {} payload is not valid base64: {}", name, e);
            return failed();
        }
    }

    let mime = mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(OCTET_STREAM);
    let data_uri = format!("data:{};base64,{}", mime, base64);

    if mime.starts_with("video/") {
        Element::Video {
            src: data_uri,
            title: Some(name.to_string()),
        }
    } else {
        Element::File {
            src: Some(data_uri),
            file: Some(name.to_string()),
            file_id: None,
            title: Some(name.to_string()),
        }
    }
}

fn is_http(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}
