//! Seams for the device APIs the application consumes: OS push
//! notifications, the native share sheet with clipboard fallback, and
//! camera/microphone capture. Real platforms plug their own
//! implementations in; the defaults do nothing, and tests use mocks.

use crate::error::AppError;

/// OS-level push delivery. Failures here are never fatal — the caller logs
/// and moves on, exactly like an app ignoring a denied notification
/// permission.
pub trait PushSink: Send + Sync {
    fn push(&self, title: &str, body: &str) -> Result<(), String>;
}

/// No push delivery at all (permission never granted).
pub struct NoopPush;

impl PushSink for NoopPush {
    fn push(&self, _title: &str, _body: &str) -> Result<(), String> {
        Ok(())
    }
}

/// A share card handed to the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCard {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Native share sheet with a clipboard fallback. `share` returning an error
/// (user cancelled, no sheet available) makes the caller fall back to
/// `copy_link`.
pub trait ShareSink: Send + Sync {
    fn share(&self, card: &ShareCard) -> Result<(), String>;
    fn copy_link(&self, url: &str) -> Result<(), String>;
}

/// No native sheet and no clipboard.
pub struct NoopShare;

impl ShareSink for NoopShare {
    fn share(&self, _card: &ShareCard) -> Result<(), String> {
        Err("no share sheet on this platform".into())
    }

    fn copy_link(&self, _url: &str) -> Result<(), String> {
        Err("no clipboard on this platform".into())
    }
}

/// An acquired camera+microphone stream. `media_url` is where the finished
/// clip will be reachable (the object-URL analog).
#[derive(Debug, Clone)]
pub struct CaptureStream {
    pub label: String,
    pub media_url: String,
}

/// Camera/microphone acquisition. Denied permission maps to
/// [`AppError::CaptureDenied`]; there is no retry.
pub trait CaptureDevice: Send + Sync {
    fn acquire(&self) -> Result<CaptureStream, AppError>;
}
