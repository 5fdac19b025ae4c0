use thiserror::Error;

/// Application-boundary errors. The expected failure points surface as
/// their own variants — these are what the UI renders as blocking alerts.
/// Every failing operation leaves state exactly as it was.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no active session")]
    NoSession,

    #[error("this action needs a verified or admin node")]
    NotPrivileged,

    #[error("unknown broadcast: {0}")]
    UnknownPost(String),

    #[error("unknown offer: {0}")]
    UnknownOffer(String),

    #[error("unknown crate track: {0}")]
    UnknownTrack(String),

    #[error("invalid invite code")]
    InviteInvalid,

    #[error("invite code already used")]
    InviteSpent,

    #[error("offer is no longer pending")]
    OfferClosed,

    #[error("cannot make an offer on your own listing")]
    SelfOffer,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("camera access denied")]
    CaptureDenied,

    #[error("capture session is in the wrong state: {0}")]
    CaptureState(&'static str),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
