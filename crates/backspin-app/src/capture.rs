//! Live capture: camera/microphone preview and a hard-capped recording
//! that lands in the feed as a live-source broadcast.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use backspin_types::{AppEvent, MediaSource, Post, PostKind};

use crate::app::App;
use crate::device::{CaptureDevice, CaptureStream};
use crate::error::AppError;

/// Capture session state machine: Idle -> Previewing -> Recording, back to
/// Previewing on stop. There is exactly one session per app.
pub enum CaptureSession {
    Idle,
    Previewing {
        stream: CaptureStream,
    },
    Recording {
        stream: CaptureStream,
        title: String,
        started_at: DateTime<Utc>,
    },
}

/// Externally visible phase of the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Previewing,
    Recording,
}

impl App {
    /// Acquire the camera and start the local preview. Permission denial
    /// surfaces as [`AppError::CaptureDenied`]; there is no retry.
    pub fn start_preview(&self, device: &dyn CaptureDevice) -> Result<(), AppError> {
        let user = self.require_user()?;
        if !user.is_privileged() {
            return Err(AppError::NotPrivileged);
        }

        {
            let state = self.state();
            if !matches!(state.capture, CaptureSession::Idle) {
                return Err(AppError::CaptureState("preview already running"));
            }
        }

        let stream = device.acquire()?;
        info!(label = %stream.label, "Capture preview started");
        self.state().capture = CaptureSession::Previewing { stream };
        Ok(())
    }

    /// Release the camera. Refused while a recording is in flight.
    pub fn stop_preview(&self) -> Result<(), AppError> {
        let mut state = self.state();
        match state.capture {
            CaptureSession::Previewing { .. } => {
                state.capture = CaptureSession::Idle;
                Ok(())
            }
            CaptureSession::Recording { .. } => {
                Err(AppError::CaptureState("recording in progress"))
            }
            CaptureSession::Idle => Ok(()),
        }
    }

    /// Start recording off the running preview and arm the auto-stop timer.
    /// The recording ends at the cap even if nobody presses stop.
    pub fn start_recording(&self, title: &str) -> Result<(), AppError> {
        {
            let mut state = self.state();
            match std::mem::replace(&mut state.capture, CaptureSession::Idle) {
                CaptureSession::Previewing { stream } => {
                    state.capture = CaptureSession::Recording {
                        stream,
                        title: title.to_string(),
                        started_at: Utc::now(),
                    };
                }
                other => {
                    state.capture = other;
                    return Err(AppError::CaptureState("no preview to record from"));
                }
            }
        }

        let app = self.clone();
        let cap = self.config().capture_cap;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(cap).await;
            match app.stop_recording() {
                Ok(post) => info!(post_id = %post.id, "Recording auto-stopped at cap"),
                // The user beat the timer; nothing to do.
                Err(AppError::CaptureState(_)) => {}
                Err(e) => warn!("Auto-stop failed: {}", e),
            }
        });

        let mut state = self.state();
        if let Some(old) = state.capture_stop.replace(handle) {
            old.abort();
        }
        Ok(())
    }

    /// Stop the recording (manually or via the auto-stop timer) and wrap
    /// the clip as a new broadcast. The preview keeps running. The session
    /// is checked before the state machine is touched, so a failure here
    /// leaves the recording intact.
    pub fn stop_recording(&self) -> Result<Post, AppError> {
        let user = self.require_user()?;
        let (stream, title, started_at) = {
            let mut state = self.state();
            match std::mem::replace(&mut state.capture, CaptureSession::Idle) {
                CaptureSession::Recording {
                    stream,
                    title,
                    started_at,
                } => {
                    if let Some(timer) = state.capture_stop.take() {
                        timer.abort();
                    }
                    (stream, title, started_at)
                }
                other => {
                    state.capture = other;
                    return Err(AppError::CaptureState("not recording"));
                }
            }
        };

        let elapsed = (Utc::now() - started_at)
            .to_std()
            .unwrap_or_default()
            .min(self.config().capture_cap);

        // It was live; the published broadcast is the replay.
        let mut post = backspin_store::seed::blank_post(&App::fresh_id("post"), &user, Utc::now());
        post.track_title = if title.is_empty() {
            "LIVE TRANSMISSION".into()
        } else {
            title
        };
        post.artist = user.display_name.clone();
        post.video_url = Some(stream.media_url.clone());
        post.description = "Broadcast direct from the studio floor. #live".into();
        post.source = MediaSource::Live;
        post.is_live = false;
        post.categories = vec!["live".into()];
        post.metadata.kind = Some(PostKind::Live);
        let secs = elapsed.as_secs();
        post.duration = Some(format!("{}:{:02}", secs / 60, secs % 60));

        let mut posts = self.state().posts.clone();
        posts.insert(0, post.clone());
        self.commit_posts(posts)?;

        self.state().capture = CaptureSession::Previewing { stream };

        info!(post_id = %post.id, "Recording published");
        self.emit(AppEvent::PostCreated {
            post: Box::new(post.clone()),
        });
        Ok(post)
    }

    pub fn capture_phase(&self) -> CapturePhase {
        match self.state().capture {
            CaptureSession::Idle => CapturePhase::Idle,
            CaptureSession::Previewing { .. } => CapturePhase::Previewing,
            CaptureSession::Recording { .. } => CapturePhase::Recording,
        }
    }
}
