use serde::{Deserialize, Serialize};

use crate::models::{Notice, Offer, OfferStatus, Post, Theme};

/// One-directional update events broadcast by the application context.
/// Views subscribe and re-render from these instead of reading ambient
/// globals; every confirmed mutation emits exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AppEvent {
    /// A session was established (join or login).
    SessionStarted { user_id: String, username: String },

    /// The session ended.
    SessionEnded { user_id: String },

    /// The session user was upgraded to a verified node.
    NodeVerified { user_id: String, code: String },

    /// A new broadcast entered the feed.
    PostCreated { post: Box<Post> },

    /// A broadcast was replaced wholesale (admin edit, event approval).
    PostUpdated { post: Box<Post> },

    /// A broadcast was removed. Comments, offers and crate entries that
    /// reference it are left dangling by design.
    PostDeleted { post_id: String },

    LikeToggled {
        post_id: String,
        liked: bool,
        likes: u32,
    },

    CommentAdded {
        post_id: String,
        comment_id: String,
    },

    FollowToggled {
        user_id: String,
        following: bool,
    },

    /// The crate gained or lost a track.
    CrateChanged {
        track_id: String,
        added: bool,
    },

    OfferMade { offer: Box<Offer> },

    OfferUpdated {
        offer_id: String,
        status: OfferStatus,
    },

    InviteIssued { code: String },

    EventApproved { post_id: String },

    EventRejected { post_id: String },

    /// A notice was published and is showing as the active toast.
    NoticePosted { notice: Box<Notice> },

    /// The active toast was cleared (manually or by timeout).
    ToastCleared { notice_id: String },

    ThemeChanged { theme: Theme },
}

impl AppEvent {
    /// Returns the broadcast id if this event is scoped to a single post.
    /// Unscoped events concern the session or global state.
    pub fn post_id(&self) -> Option<&str> {
        match self {
            Self::PostCreated { post } | Self::PostUpdated { post } => Some(&post.id),
            Self::PostDeleted { post_id }
            | Self::LikeToggled { post_id, .. }
            | Self::CommentAdded { post_id, .. }
            | Self::EventApproved { post_id }
            | Self::EventRejected { post_id } => Some(post_id),
            Self::OfferMade { offer } => Some(&offer.post_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_tagged_envelope() {
        let event = AppEvent::InviteIssued {
            code: "DJ-ABC123".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "InviteIssued");
        assert_eq!(json["data"]["code"], "DJ-ABC123");
    }

    #[test]
    fn post_scoped_events_expose_their_post() {
        let event = AppEvent::LikeToggled {
            post_id: "post-1".into(),
            liked: true,
            likes: 5,
        };
        assert_eq!(event.post_id(), Some("post-1"));

        let event = AppEvent::ThemeChanged { theme: Theme::Dark };
        assert_eq!(event.post_id(), None);
    }
}
