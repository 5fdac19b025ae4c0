//! Sponsored events: paid-placement broadcasts that sit in a pending queue
//! until an admin approves them for the public feed. The sponsorship fee is
//! cosmetic — recorded on the post, never charged.

use chrono::Utc;
use tracing::info;

use backspin_types::{
    AppEvent, EventStatus, MediaSource, NoticeKind, Post, PostKind, PostMetadata,
};

use crate::app::App;
use crate::error::AppError;

/// Flat sponsorship fee recorded as the event post's price.
pub const SPONSORSHIP_FEE: u32 = 49;

/// What an event sponsor fills in.
#[derive(Debug, Clone, Default)]
pub struct EventSubmission {
    pub title: String,
    pub description: String,
    pub ticket_url: String,
    pub video_url: Option<String>,
    pub artwork_url: Option<String>,
}

impl App {
    /// Submit a sponsored event. It enters the queue as Pending and stays
    /// out of the general feed until approved.
    pub fn sponsor_event(&self, submission: EventSubmission) -> Result<Post, AppError> {
        let user = self.require_user()?;
        if submission.title.trim().is_empty() {
            return Err(AppError::MissingField("title"));
        }

        let mut post =
            backspin_store::seed::blank_post(&App::fresh_id("post"), &user, Utc::now());
        post.track_title = submission.title;
        post.description = submission.description;
        post.video_url = submission.video_url;
        post.thumbnail = submission.artwork_url;
        post.source = MediaSource::Event;
        post.categories = vec!["events".into()];
        post.metadata = PostMetadata {
            kind: Some(PostKind::Event),
            event_status: Some(EventStatus::Pending),
            ticket_url: Some(submission.ticket_url),
            is_sponsored: true,
            ..Default::default()
        };
        post.price = Some(SPONSORSHIP_FEE.to_string());

        let mut posts = self.state().posts.clone();
        posts.insert(0, post.clone());
        self.commit_posts(posts)?;

        info!(post_id = %post.id, "Sponsored event submitted, pending approval");
        self.emit(AppEvent::PostCreated {
            post: Box::new(post.clone()),
        });
        Ok(post)
    }

    /// Approve a pending event for public visibility. Admin only; publishes
    /// an event notice on success.
    pub fn approve_event(&self, post_id: &str) -> Result<Post, AppError> {
        let post = self.set_event_status(post_id, EventStatus::Approved)?;
        self.emit(AppEvent::EventApproved {
            post_id: post_id.to_string(),
        });
        self.publish_notice(
            "EVENT APPROVED",
            &format!("{} has been authorized for broadcast.", post.track_title),
            NoticeKind::Event,
        );
        Ok(post)
    }

    /// Reject a pending event. Admin only.
    pub fn reject_event(&self, post_id: &str) -> Result<Post, AppError> {
        let post = self.set_event_status(post_id, EventStatus::Rejected)?;
        self.emit(AppEvent::EventRejected {
            post_id: post_id.to_string(),
        });
        Ok(post)
    }

    fn set_event_status(&self, post_id: &str, status: EventStatus) -> Result<Post, AppError> {
        let user = self.require_user()?;
        if !user.role.is_admin() {
            return Err(AppError::NotPrivileged);
        }

        let mut posts = self.state().posts.clone();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id && p.is_event())
            .ok_or_else(|| AppError::UnknownPost(post_id.to_string()))?;
        post.metadata.event_status = Some(status);
        let updated = post.clone();

        self.commit_posts(posts)?;
        self.emit(AppEvent::PostUpdated {
            post: Box::new(updated.clone()),
        });
        Ok(updated)
    }

    /// Events visible on the events tab: approved only.
    pub fn approved_events(&self) -> Vec<Post> {
        self.events_with_status(EventStatus::Approved)
    }

    /// The admin approval queue.
    pub fn pending_events(&self) -> Vec<Post> {
        self.events_with_status(EventStatus::Pending)
    }

    fn events_with_status(&self, status: EventStatus) -> Vec<Post> {
        self.state()
            .posts
            .iter()
            .filter(|p| p.is_event() && p.metadata.event_status == Some(status))
            .cloned()
            .collect()
    }

    /// Display stat: every submitted event times the flat fee.
    pub fn sponsorship_revenue(&self) -> u32 {
        let events = self
            .state()
            .posts
            .iter()
            .filter(|p| p.is_event())
            .count() as u32;
        events * SPONSORSHIP_FEE
    }
}
