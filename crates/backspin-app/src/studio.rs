//! The studio: the multi-step creation wizard, invite generation and the
//! admin management operations.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::info;

use backspin_types::{
    AppEvent, InviteCode, ListingStatus, MarketCategory, MediaSource, Post, PostKind,
    PostMetadata,
};

use crate::app::App;
use crate::error::AppError;

/// Wizard phases. Each phase gates the next; [`UploadForm::validate`] runs
/// all of them at submit time regardless of how the caller stepped through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Media,
    Details,
    Listing,
}

/// Draft state collected by the creation wizard.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// Local object URL of an uploaded file.
    pub media_url: Option<String>,
    /// True when the upload is audio-only (an MP3 rip).
    pub media_is_audio: bool,
    pub artwork_url: Option<String>,
    pub youtube_url: Option<String>,
    pub track_title: String,
    pub artist: String,
    pub description: String,
    pub kind: Option<PostKind>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub categories: Vec<String>,
    /// Sell-gear mode: the result is a marketplace listing.
    pub for_market: bool,
    pub market_category: Option<MarketCategory>,
    pub price: Option<String>,
    pub condition: Option<String>,
    pub is_live: bool,
}

impl UploadForm {
    /// Validate one wizard phase.
    pub fn validate_step(&self, step: WizardStep) -> Result<(), AppError> {
        match step {
            WizardStep::Media => {
                if self.media_url.is_none() && self.youtube_url.is_none() {
                    return Err(AppError::MissingField("media"));
                }
                // Audio rips drive the vinyl spinner, which needs artwork.
                if self.media_is_audio && self.artwork_url.is_none() {
                    return Err(AppError::MissingField("artwork"));
                }
                Ok(())
            }
            WizardStep::Details => {
                if self.track_title.trim().is_empty() {
                    return Err(AppError::MissingField("track title"));
                }
                if self.artist.trim().is_empty() {
                    return Err(AppError::MissingField("artist"));
                }
                Ok(())
            }
            WizardStep::Listing => {
                if self.for_market {
                    if self.price.as_deref().is_none_or(|p| p.trim().is_empty()) {
                        return Err(AppError::MissingField("price"));
                    }
                    if self.market_category.is_none() {
                        return Err(AppError::MissingField("market category"));
                    }
                }
                Ok(())
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.validate_step(WizardStep::Media)?;
        self.validate_step(WizardStep::Details)?;
        self.validate_step(WizardStep::Listing)
    }
}

/// Pull the video id out of a YouTube URL. Accepts watch URLs, short
/// youtu.be links and bare ids.
pub fn youtube_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(rest) = url.split("v=").nth(1) {
        let id = rest.split('&').next().unwrap_or(rest);
        return Some(id.to_string());
    }
    let tail = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url);
    let id = tail.split('?').next().unwrap_or(tail);
    if id.is_empty() { None } else { Some(id.to_string()) }
}

impl App {
    /// Submit a completed wizard draft as a new broadcast. Privileged
    /// nodes only.
    pub fn submit_upload(&self, form: UploadForm) -> Result<Post, AppError> {
        let user = self.require_user()?;
        if !user.is_privileged() {
            return Err(AppError::NotPrivileged);
        }
        form.validate()?;

        let youtube_id = form.youtube_url.as_deref().and_then(youtube_id_from_url);
        let source = if form.for_market {
            MediaSource::Marketplace
        } else if form.is_live {
            MediaSource::Live
        } else if youtube_id.is_some() {
            MediaSource::Youtube
        } else {
            MediaSource::Upload
        };

        let mut post =
            backspin_store::seed::blank_post(&App::fresh_id("post"), &user, Utc::now());
        post.track_title = form.track_title.clone();
        post.artist = form.artist.clone();
        post.description = form.description.clone();
        if form.media_is_audio {
            post.audio_url = form.media_url.clone();
        } else {
            post.video_url = form.media_url.clone();
        }
        post.youtube_id = youtube_id;
        post.thumbnail = form.artwork_url.clone();
        post.source = source;
        post.categories = form.categories.iter().map(|c| c.to_lowercase()).collect();
        post.is_live = form.is_live;
        post.year = form.year.clone();
        post.genre = form.genre.clone();
        post.metadata = PostMetadata {
            year: form.year,
            genre: form.genre,
            kind: form.kind,
            condition: form.condition,
            price: form.price.clone(),
            market_category: form.for_market.then_some(form.market_category).flatten(),
            ..Default::default()
        };
        if form.for_market {
            post.price = form.price;
            post.status = Some(ListingStatus::Active);
        }

        let mut posts = self.state().posts.clone();
        posts.insert(0, post.clone());
        self.commit_posts(posts)?;

        info!(post_id = %post.id, ?source, "Broadcast published from studio");
        self.emit(AppEvent::PostCreated {
            post: Box::new(post.clone()),
        });
        Ok(post)
    }

    /// Mint a fresh invite code (`DJ-` plus six alphanumerics), re-rolling
    /// on the unlikely collision with an existing code.
    pub fn generate_invite(&self) -> Result<InviteCode, AppError> {
        let user = self.require_user()?;
        if !user.is_privileged() {
            return Err(AppError::NotPrivileged);
        }

        let mut invites = self.state().invites.clone();
        let code = loop {
            let candidate = random_invite_code();
            if !invites.iter().any(|i| i.code == candidate) {
                break candidate;
            }
        };

        let invite = InviteCode {
            code: code.clone(),
            created_by: user.id,
            used_by: None,
            created_at: Utc::now(),
        };
        invites.insert(0, invite.clone());
        self.commit_invites(invites)?;

        info!(code, "Invite issued");
        self.emit(AppEvent::InviteIssued { code });
        Ok(invite)
    }

    /// Remove a broadcast outright. Comments, offers and crate entries that
    /// point at it are left in place; nothing cascades.
    pub fn delete_post(&self, post_id: &str) -> Result<(), AppError> {
        let user = self.require_user()?;
        if !user.role.is_admin() {
            return Err(AppError::NotPrivileged);
        }

        let mut posts = self.state().posts.clone();
        let before = posts.len();
        posts.retain(|p| p.id != post_id);
        if posts.len() == before {
            return Err(AppError::UnknownPost(post_id.to_string()));
        }

        self.commit_posts(posts)?;
        self.emit(AppEvent::PostDeleted {
            post_id: post_id.to_string(),
        });
        Ok(())
    }

    /// Replace a broadcast wholesale, matched by id.
    pub fn update_post(&self, updated: Post) -> Result<(), AppError> {
        let user = self.require_user()?;
        if !user.role.is_admin() {
            return Err(AppError::NotPrivileged);
        }

        let mut posts = self.state().posts.clone();
        let slot = posts
            .iter_mut()
            .find(|p| p.id == updated.id)
            .ok_or_else(|| AppError::UnknownPost(updated.id.clone()))?;
        *slot = updated.clone();

        self.commit_posts(posts)?;
        self.emit(AppEvent::PostUpdated {
            post: Box::new(updated),
        });
        Ok(())
    }
}

fn random_invite_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| (rng.sample(Alphanumeric) as char).to_ascii_uppercase())
        .collect();
    format!("DJ-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_step_needs_a_source() {
        let form = UploadForm::default();
        assert!(matches!(
            form.validate_step(WizardStep::Media),
            Err(AppError::MissingField("media"))
        ));

        let form = UploadForm {
            youtube_url: Some("https://youtu.be/abc123def45".into()),
            ..Default::default()
        };
        assert!(form.validate_step(WizardStep::Media).is_ok());
    }

    #[test]
    fn audio_rips_need_artwork() {
        let mut form = UploadForm {
            media_url: Some("blob:rip.mp3".into()),
            media_is_audio: true,
            ..Default::default()
        };
        assert!(matches!(
            form.validate_step(WizardStep::Media),
            Err(AppError::MissingField("artwork"))
        ));

        form.artwork_url = Some("blob:sleeve.png".into());
        assert!(form.validate_step(WizardStep::Media).is_ok());
    }

    #[test]
    fn market_drafts_need_price_and_category() {
        let mut form = UploadForm {
            for_market: true,
            ..Default::default()
        };
        assert!(matches!(
            form.validate_step(WizardStep::Listing),
            Err(AppError::MissingField("price"))
        ));

        form.price = Some("120".into());
        assert!(matches!(
            form.validate_step(WizardStep::Listing),
            Err(AppError::MissingField("market category"))
        ));

        form.market_category = Some(MarketCategory::Decks);
        assert!(form.validate_step(WizardStep::Listing).is_ok());
    }

    #[test]
    fn youtube_ids_come_out_of_every_link_shape() {
        assert_eq!(
            youtube_id_from_url("https://www.youtube.com/watch?v=Igw4qfW8qag"),
            Some("Igw4qfW8qag".into())
        );
        assert_eq!(
            youtube_id_from_url("https://www.youtube.com/watch?v=Igw4qfW8qag&t=90"),
            Some("Igw4qfW8qag".into())
        );
        assert_eq!(
            youtube_id_from_url("https://youtu.be/Igw4qfW8qag?si=xyz"),
            Some("Igw4qfW8qag".into())
        );
        assert_eq!(youtube_id_from_url(""), None);
    }

    #[test]
    fn invite_codes_have_the_dj_shape() {
        let code = random_invite_code();
        assert!(code.starts_with("DJ-"));
        assert_eq!(code.len(), 9);
        assert!(code[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
