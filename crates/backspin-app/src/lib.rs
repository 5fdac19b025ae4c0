//! backspin-app: the application context for the backspin network.
//!
//! All state lives in one [`App`] handle: mutations are explicit methods
//! that validate, persist the affected slice and then emit an
//! [`AppEvent`](backspin_types::AppEvent) on the broadcast stream. There is
//! no server; device-facing surfaces (push, share sheet, camera) are trait
//! seams in [`device`].

pub mod app;
pub mod capture;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod feed;
pub mod market;
pub mod notify;
pub mod session;
pub mod social;
pub mod studio;

pub use app::App;
pub use config::Config;
pub use error::AppError;
