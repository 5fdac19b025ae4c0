use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use backspin_store::Store;
use backspin_types::{
    AppEvent, InviteCode, LibraryTrack, Notice, Offer, Post, Theme, User,
};

use crate::capture::CaptureSession;
use crate::config::Config;
use crate::device::{NoopPush, NoopShare, PushSink, ShareSink};
use crate::dispatcher::Dispatcher;
use crate::error::AppError;

/// The full in-memory state tree. One slice per concern, mirroring the
/// durable slice layout; mutations go through [`App`] methods which persist
/// before committing here.
pub(crate) struct AppState {
    pub(crate) current_user: Option<User>,
    pub(crate) posts: Vec<Post>,
    pub(crate) offers: Vec<Offer>,
    pub(crate) invites: Vec<InviteCode>,
    pub(crate) library: Vec<LibraryTrack>,
    pub(crate) liked: BTreeSet<String>,
    pub(crate) follows: BTreeSet<String>,
    pub(crate) theme: Theme,
    /// Session-scoped notice feed, newest first. Not persisted.
    pub(crate) notices: Vec<Notice>,
    /// Id of the notice currently showing as a toast.
    pub(crate) active_toast: Option<String>,
    pub(crate) capture: CaptureSession,
    /// Post-login event reminder task; aborted on logout.
    pub(crate) reminder: Option<JoinHandle<()>>,
    /// Armed recording auto-stop task; aborted on manual stop.
    pub(crate) capture_stop: Option<JoinHandle<()>>,
}

pub(crate) struct AppInner {
    pub(crate) store: Store,
    pub(crate) config: Config,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) push: Box<dyn PushSink>,
    pub(crate) share: Box<dyn ShareSink>,
    pub(crate) state: Mutex<AppState>,
}

/// The application context. Cheap to clone; all clones share one state
/// tree. Requires a tokio runtime (timers are spawned tasks).
#[derive(Clone)]
pub struct App {
    pub(crate) inner: Arc<AppInner>,
}

impl App {
    /// Open the store, load every slice (seeding defaults where absent) and
    /// build the context with no-op device sinks.
    pub fn open(config: Config) -> Result<Self, AppError> {
        Self::open_with_sinks(config, Box::new(NoopPush), Box::new(NoopShare))
    }

    /// As [`App::open`], with platform push/share implementations.
    pub fn open_with_sinks(
        config: Config,
        push: Box<dyn PushSink>,
        share: Box<dyn ShareSink>,
    ) -> Result<Self, AppError> {
        let store = match &config.store_path {
            Some(path) => Store::open(path)?,
            None => Store::open_in_memory()?,
        };

        // Each slice is read independently; a missing one falls back to its
        // seed or empty default without touching the others.
        let state = AppState {
            current_user: store.load_session()?,
            posts: store.load_posts()?,
            offers: store.load_offers()?,
            invites: store.load_invites()?,
            library: store.load_crate()?,
            liked: store.load_likes()?,
            follows: store.load_follows()?,
            theme: store.load_theme()?,
            notices: Vec::new(),
            active_toast: None,
            capture: CaptureSession::Idle,
            reminder: None,
            capture_stop: None,
        };

        info!(
            posts = state.posts.len(),
            crate_tracks = state.library.len(),
            signed_in = state.current_user.is_some(),
            "Application state loaded"
        );

        Ok(Self {
            inner: Arc::new(AppInner {
                store,
                config,
                dispatcher: Dispatcher::new(),
                push,
                share,
                state: Mutex::new(state),
            }),
        })
    }

    /// Subscribe to the one-directional update stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.inner.dispatcher.subscribe()
    }

    pub(crate) fn emit(&self, event: AppEvent) {
        self.inner.dispatcher.broadcast(event);
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, AppState> {
        // A panicked holder can only have been between save-points; the
        // slices on disk are still consistent, so recover the guard.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn store(&self) -> &Store {
        &self.inner.store
    }

    pub(crate) fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The session user, or [`AppError::NoSession`].
    pub(crate) fn require_user(&self) -> Result<User, AppError> {
        self.state().current_user.clone().ok_or(AppError::NoSession)
    }

    pub(crate) fn fresh_id(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }

    // -- Save-points: persist first, commit to memory second, so a failed
    // write leaves the in-memory tree untouched. --

    pub(crate) fn commit_posts(&self, posts: Vec<Post>) -> Result<(), AppError> {
        self.store().save_posts(&posts)?;
        self.state().posts = posts;
        Ok(())
    }

    pub(crate) fn commit_offers(&self, offers: Vec<Offer>) -> Result<(), AppError> {
        self.store().save_offers(&offers)?;
        self.state().offers = offers;
        Ok(())
    }

    pub(crate) fn commit_invites(&self, invites: Vec<InviteCode>) -> Result<(), AppError> {
        self.store().save_invites(&invites)?;
        self.state().invites = invites;
        Ok(())
    }

    pub(crate) fn commit_crate(&self, tracks: Vec<LibraryTrack>) -> Result<(), AppError> {
        self.store().save_crate(&tracks)?;
        self.state().library = tracks;
        Ok(())
    }

    pub(crate) fn commit_likes_and_posts(
        &self,
        likes: BTreeSet<String>,
        posts: Vec<Post>,
    ) -> Result<(), AppError> {
        self.store().save_likes_and_posts(&likes, &posts)?;
        let mut state = self.state();
        state.liked = likes;
        state.posts = posts;
        Ok(())
    }

    pub(crate) fn commit_follows(&self, follows: BTreeSet<String>) -> Result<(), AppError> {
        self.store().save_follows(&follows)?;
        self.state().follows = follows;
        Ok(())
    }

    // -- Read accessors --

    pub fn current_user(&self) -> Option<User> {
        self.state().current_user.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    pub fn post(&self, post_id: &str) -> Option<Post> {
        self.state().posts.iter().find(|p| p.id == post_id).cloned()
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.state().offers.clone()
    }

    pub fn invites(&self) -> Vec<InviteCode> {
        self.state().invites.clone()
    }

    /// The session user's crate, newest addition first.
    pub fn crate_tracks(&self) -> Vec<LibraryTrack> {
        self.state().library.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state().theme
    }

    /// Persist and announce a theme change.
    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.store().save_theme(theme)?;
        self.state().theme = theme;
        self.emit(AppEvent::ThemeChanged { theme });
        Ok(())
    }

    pub fn is_liked(&self, post_id: &str) -> bool {
        self.state().liked.contains(post_id)
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.state().follows.contains(user_id)
    }

    pub fn in_crate(&self, post_id: &str) -> bool {
        self.state().library.iter().any(|t| t.id == post_id)
    }
}
