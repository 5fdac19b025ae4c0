use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account roles. The original data used overlapping free-form strings;
/// here capability checks go through [`Role::is_privileged`] instead of
/// string comparison scattered across views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fan,
    Dj,
    Label,
    Admin,
    Raver,
    Resident,
    Verified,
    User,
}

impl Role {
    /// Privileged accounts may use the studio wizard, issue invites and
    /// have their broadcasts ranked ahead of unverified ones.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Verified)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A node on the network: an account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub role: Role,
    pub followers: u32,
    pub following: u32,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub post_count: Option<u32>,
    #[serde(default)]
    pub total_likes: Option<u32>,
    #[serde(default)]
    pub is_verified: bool,
}

impl User {
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// A comment embedded in its parent broadcast. Carries an author snapshot
/// rather than a reference; there is no join back to the user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub user_avatar: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub likes: u32,
}

/// Where a broadcast's media came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Upload,
    Library,
    Live,
    Youtube,
    Marketplace,
    External,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Vinyl,
    Mix,
    Single,
    Live,
    Gear,
    Event,
}

/// Approval state for sponsored event broadcasts. Only Approved events are
/// visible in the general feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketCategory {
    Vinyl,
    Decks,
    #[serde(rename = "Tape Packs")]
    TapePacks,
    #[serde(rename = "Studio Gear")]
    StudioGear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sold,
}

/// Free-form metadata bag attached to every broadcast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub kind: Option<PostKind>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub guest_tags: Vec<String>,
    #[serde(default)]
    pub market_category: Option<MarketCategory>,
    #[serde(default)]
    pub event_status: Option<EventStatus>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub is_sponsored: bool,
}

/// External links attached to a broadcast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostLinks {
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub spotify: Option<String>,
    #[serde(default)]
    pub discogs: Option<String>,
}

/// Vinyl sale block for broadcasts that double as listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VinylSale {
    pub condition: String,
    pub price: String,
    pub is_for_sale: bool,
}

/// A broadcast: one post in the feed. Media is exactly one of a local file
/// URL, a remote video URL, a YouTube id or an audio URL; nothing here is
/// transcoded or stored beyond the reference itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    /// Author snapshot, denormalized at creation time.
    pub user: User,
    pub track_title: String,
    pub artist: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    pub likes: u32,
    pub reposts: u32,
    pub shares: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub source: MediaSource,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub metadata: PostMetadata,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_mix: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub watch_count: Option<u32>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub links: Option<PostLinks>,
    #[serde(default)]
    pub vinyl: Option<VinylSale>,
}

impl Post {
    /// True for sponsored event broadcasts, approved or not.
    pub fn is_event(&self) -> bool {
        self.metadata.kind == Some(PostKind::Event)
    }

    /// Marketplace visibility: listed source or any asking price attached.
    pub fn is_listing(&self) -> bool {
        self.source == MediaSource::Marketplace || self.price.is_some()
    }

    /// Asking price as a number; unpriced or unparseable listings count as 0.
    pub fn asking_price(&self) -> f64 {
        self.price
            .as_deref()
            .or(self.metadata.price.as_deref())
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Preferred playable reference: audio first, then video.
    pub fn preview_url(&self) -> Option<&str> {
        self.audio_url.as_deref().or(self.video_url.as_deref())
    }
}

/// An offer on a marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub post_id: String,
    pub from_user_id: String,
    pub from_username: String,
    pub to_user_id: String,
    /// Free-text amount, exactly as the buyer typed it.
    pub amount: String,
    pub notes: String,
    pub status: OfferStatus,
    pub timestamp: DateTime<Utc>,
}

/// Offer lifecycle. `Countered` is part of the stored schema but no
/// operation produces it; transitions into it are rejected along with every
/// other move out of a settled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
}

/// A single-use verification code. Once `used_by` is set it never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    pub code: String,
    pub created_by: String,
    #[serde(default)]
    pub used_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    pub fn is_claimed(&self) -> bool {
        self.used_by.is_some()
    }
}

/// A crate entry: a broadcast projected down to a playable track. Its id is
/// the originating post id; crate membership is tested by id equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub label: String,
    pub year: String,
    pub genre: String,
    pub artwork: String,
    pub preview_url: String,
    pub verified: bool,
    #[serde(default)]
    pub is_mix: bool,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Offer,
    Event,
    System,
}

/// An in-app notification record. Session-scoped; notices are not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NoticeKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privileged_roles() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Verified.is_privileged());
        assert!(!Role::Dj.is_privileged());
        assert!(!Role::Fan.is_privileged());
        assert!(!Role::User.is_privileged());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Verified.is_admin());
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Dj).unwrap(), "\"dj\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"verified\"").unwrap(),
            Role::Verified
        );
    }

    #[test]
    fn market_categories_keep_display_names() {
        assert_eq!(
            serde_json::to_string(&MarketCategory::TapePacks).unwrap(),
            "\"Tape Packs\""
        );
        assert_eq!(
            serde_json::to_string(&MarketCategory::StudioGear).unwrap(),
            "\"Studio Gear\""
        );
    }

    #[test]
    fn asking_price_falls_back_to_metadata_then_zero() {
        let mut post = test_post();
        post.price = None;
        post.metadata.price = Some("45".into());
        assert_eq!(post.asking_price(), 45.0);

        post.metadata.price = None;
        assert_eq!(post.asking_price(), 0.0);

        post.price = Some("not a number".into());
        assert_eq!(post.asking_price(), 0.0);
    }

    #[test]
    fn countered_status_round_trips() {
        // Stored data may name the dead state; it must still deserialize.
        let status: OfferStatus = serde_json::from_str("\"countered\"").unwrap();
        assert_eq!(status, OfferStatus::Countered);
    }

    fn test_post() -> Post {
        Post {
            id: "post-x".into(),
            user_id: "u1".into(),
            user: User {
                id: "u1".into(),
                username: "TEST".into(),
                display_name: "Test".into(),
                avatar: String::new(),
                role: Role::User,
                followers: 0,
                following: 0,
                bio: None,
                banner: None,
                theme_color: None,
                post_count: None,
                total_likes: None,
                is_verified: false,
            },
            track_title: "t".into(),
            artist: "a".into(),
            video_url: None,
            audio_url: None,
            youtube_id: None,
            thumbnail: None,
            images: vec![],
            description: String::new(),
            likes: 0,
            reposts: 0,
            shares: 0,
            comments: vec![],
            source: MediaSource::Upload,
            categories: vec![],
            metadata: PostMetadata::default(),
            created_at: Utc::now(),
            year: None,
            label: None,
            genre: None,
            tags: vec![],
            is_mix: false,
            is_live: false,
            watch_count: None,
            duration: None,
            external_url: None,
            price: None,
            status: None,
            links: None,
            vinyl: None,
        }
    }
}
