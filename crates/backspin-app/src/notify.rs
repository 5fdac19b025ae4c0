//! Notices: the in-app notification feed, the auto-dismissing toast, the
//! best-effort OS push, and share-card building.

use chrono::Utc;
use tracing::{debug, warn};

use backspin_types::{AppEvent, Notice, NoticeKind};

use crate::app::App;
use crate::device::ShareCard;
use crate::error::AppError;

impl App {
    /// Publish a notice: prepend it to the feed, show it as the active
    /// toast, push it to the OS if a sink is wired, and arm the
    /// auto-dismiss. Push failures are logged and swallowed.
    pub fn publish_notice(&self, title: &str, message: &str, kind: NoticeKind) -> Notice {
        let notice = Notice {
            id: App::fresh_id("notif"),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            timestamp: Utc::now(),
            read: false,
        };

        {
            let mut state = self.state();
            state.notices.insert(0, notice.clone());
            state.active_toast = Some(notice.id.clone());
        }

        self.emit(AppEvent::NoticePosted {
            notice: Box::new(notice.clone()),
        });

        if let Err(e) = self
            .inner
            .push
            .push(&format!("BACKSPIN: {}", title), message)
        {
            warn!("OS push failed: {}", e);
        }

        // Auto-dismiss clears the toast only if it is still this notice;
        // a newer toast is left alone.
        let app = self.clone();
        let notice_id = notice.id.clone();
        let ttl = self.config().toast_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let cleared = {
                let mut state = app.state();
                if state.active_toast.as_deref() == Some(notice_id.as_str()) {
                    state.active_toast = None;
                    true
                } else {
                    false
                }
            };
            if cleared {
                app.emit(AppEvent::ToastCleared { notice_id });
            }
        });

        notice
    }

    /// Manually clear the active toast.
    pub fn dismiss_toast(&self) {
        let cleared = {
            let mut state = self.state();
            state.active_toast.take()
        };
        if let Some(notice_id) = cleared {
            self.emit(AppEvent::ToastCleared { notice_id });
        }
    }

    pub fn mark_notice_read(&self, notice_id: &str) {
        let mut state = self.state();
        for notice in state.notices.iter_mut().filter(|n| n.id == notice_id) {
            notice.read = true;
        }
    }

    /// The notice feed, newest first. Session-scoped.
    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.clone()
    }

    /// The notice currently showing as a toast, if any.
    pub fn active_toast(&self) -> Option<Notice> {
        let state = self.state();
        let id = state.active_toast.as_deref()?;
        state.notices.iter().find(|n| n.id == id).cloned()
    }

    /// Hand a broadcast to the native share sheet, falling back to copying
    /// the link. Both failing is not an error — the original logs share
    /// cancellations silently — so the result only says whether anything
    /// was delivered.
    pub fn share_post(&self, post_id: &str) -> Result<bool, AppError> {
        let post = self
            .post(post_id)
            .ok_or_else(|| AppError::UnknownPost(post_id.to_string()))?;

        let slug = if post.is_event() { "event" } else { "post" };
        let url = format!("https://backspin.net/{}/{}", slug, post.id);
        let title = if post.track_title.is_empty() {
            "Backspin Transmission".to_string()
        } else {
            post.track_title.clone()
        };
        let text = if post.is_event() {
            format!("{} tickets", title)
        } else {
            format!("Check out this track on BACKSPIN: {}", title)
        };
        let card = ShareCard { title, text, url };

        match self.inner.share.share(&card) {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!("Share sheet unavailable: {}", e);
                match self.inner.share.copy_link(&card.url) {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        warn!("Failed to copy link: {}", e);
                        Ok(false)
                    }
                }
            }
        }
    }
}
