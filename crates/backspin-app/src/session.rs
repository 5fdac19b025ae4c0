//! Session lifecycle: the auth stub. Any non-empty credential pair signs
//! in; the configured admin pair (and nothing else) elevates. Verification
//! upgrades consume single-use invite codes.

use tracing::{debug, info};

use backspin_store::seed;
use backspin_types::{AppEvent, NoticeKind, Role, User};

use crate::app::App;
use crate::capture::CaptureSession;
use crate::error::AppError;

impl App {
    /// Register a new node and start a session. Accepts any email/password;
    /// the handle becomes the display name and the uppercased username.
    pub fn join(&self, email: &str, password: &str, handle: &str) -> Result<User, AppError> {
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("password"));
        }
        if handle.is_empty() {
            return Err(AppError::MissingField("handle"));
        }

        let is_admin = self.config().is_admin_pair(email, password);
        self.start_session(handle, is_admin)
    }

    /// Sign in an existing node. The handle is derived from the email local
    /// part; the admin pair signs in as ADMIN.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("password"));
        }

        let is_admin = self.config().is_admin_pair(email, password);
        let handle = if is_admin {
            "ADMIN".to_string()
        } else {
            email.split('@').next().unwrap_or(email).to_string()
        };
        self.start_session(&handle, is_admin)
    }

    fn start_session(&self, handle: &str, is_admin: bool) -> Result<User, AppError> {
        let mut user = seed::stock_profile();
        user.id = App::fresh_id("user");
        user.username = handle.to_uppercase();
        user.display_name = handle.to_string();
        user.followers = if is_admin { 999 } else { 0 };
        user.following = 0;
        user.role = if is_admin { Role::Admin } else { Role::User };
        user.is_verified = is_admin;
        user.bio = Some(if is_admin {
            "NETWORK OPERATOR | 1992-\u{221e}".into()
        } else {
            "BACKSPIN ORIGINAL".into()
        });

        self.store().save_session(&user)?;
        {
            let mut state = self.state();
            state.current_user = Some(user.clone());
        }

        info!(user = %user.username, admin = is_admin, "Session started");
        self.emit(AppEvent::SessionStarted {
            user_id: user.id.clone(),
            username: user.username.clone(),
        });

        self.arm_event_reminder();
        Ok(user)
    }

    /// Schedule the in-world "event starting soon" notice. Replaces any
    /// reminder left over from a previous session.
    fn arm_event_reminder(&self) {
        let app = self.clone();
        let delay = self.config().reminder_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            app.publish_notice(
                "EVENT STARTING SOON",
                "Warehouse 95 replay starts in 10 minutes!",
                NoticeKind::Event,
            );
        });

        let mut state = self.state();
        if let Some(old) = state.reminder.replace(handle) {
            old.abort();
        }
    }

    /// Consume an invite code, upgrading the session user to a verified
    /// node. A claimed code can never be consumed again.
    pub fn upgrade(&self, code: &str) -> Result<User, AppError> {
        let user = self.require_user()?;

        let mut invites = self.state().invites.clone();
        let invite = invites
            .iter_mut()
            .find(|i| i.code == code)
            .ok_or(AppError::InviteInvalid)?;
        if invite.is_claimed() {
            return Err(AppError::InviteSpent);
        }
        invite.used_by = Some(user.username.clone());

        let mut upgraded = user;
        upgraded.role = Role::Verified;
        upgraded.is_verified = true;

        // The claim and the upgraded user land in one transaction.
        self.store().save_session_and_invites(&upgraded, &invites)?;
        {
            let mut state = self.state();
            state.invites = invites;
            state.current_user = Some(upgraded.clone());
        }

        info!(user = %upgraded.username, code, "Node verified");
        self.emit(AppEvent::NodeVerified {
            user_id: upgraded.id.clone(),
            code: code.to_string(),
        });
        Ok(upgraded)
    }

    /// End the session: clear the persisted user, cancel outstanding
    /// timers, release any acquired capture stream and drop the
    /// session-scoped notices so nothing leaks into the next sign-in.
    pub fn logout(&self) -> Result<(), AppError> {
        let user = self.require_user()?;

        self.store().clear_session()?;
        {
            let mut state = self.state();
            state.current_user = None;
            if let Some(reminder) = state.reminder.take() {
                reminder.abort();
            }
            if let Some(stop) = state.capture_stop.take() {
                stop.abort();
            }
            state.capture = CaptureSession::Idle;
            state.notices.clear();
            state.active_toast = None;
        }

        debug!(user = %user.username, "Session ended");
        self.emit(AppEvent::SessionEnded { user_id: user.id });
        Ok(())
    }
}
