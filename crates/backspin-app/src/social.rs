//! Social actions: likes, comments, follows and the crate. All of these
//! are local list rewrites with an explicit save-point; none of them touch
//! anything beyond their own slice plus the broadcast collection.

use chrono::Utc;
use tracing::debug;

use backspin_types::{
    AppEvent, Comment, LibraryTrack, MediaSource, Post, PostKind, PostMetadata,
};

use crate::app::App;
use crate::error::AppError;

impl App {
    /// Flip the like on a broadcast, adjusting its counter by one. Toggling
    /// twice restores the original count.
    pub fn toggle_like(&self, post_id: &str) -> Result<bool, AppError> {
        let (mut likes, mut posts) = {
            let state = self.state();
            if !state.posts.iter().any(|p| p.id == post_id) {
                return Err(AppError::UnknownPost(post_id.to_string()));
            }
            (state.liked.clone(), state.posts.clone())
        };

        let liked = if likes.contains(post_id) {
            likes.remove(post_id);
            false
        } else {
            likes.insert(post_id.to_string());
            true
        };

        let mut count = 0;
        for post in posts.iter_mut().filter(|p| p.id == post_id) {
            post.likes = if liked {
                post.likes + 1
            } else {
                post.likes.saturating_sub(1)
            };
            count = post.likes;
        }

        self.commit_likes_and_posts(likes, posts)?;

        self.emit(AppEvent::LikeToggled {
            post_id: post_id.to_string(),
            liked,
            likes: count,
        });
        Ok(liked)
    }

    /// Append a comment carrying the session user's snapshot.
    pub fn add_comment(&self, post_id: &str, text: &str) -> Result<Comment, AppError> {
        let user = self.require_user()?;
        if text.trim().is_empty() {
            return Err(AppError::MissingField("comment"));
        }

        let comment = Comment {
            id: App::fresh_id("c"),
            user_id: user.id,
            username: user.username,
            user_avatar: user.avatar,
            text: text.to_string(),
            timestamp: Utc::now(),
            likes: 0,
        };

        let mut posts = self.state().posts.clone();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::UnknownPost(post_id.to_string()))?;
        post.comments.push(comment.clone());

        self.commit_posts(posts)?;
        self.emit(AppEvent::CommentAdded {
            post_id: post_id.to_string(),
            comment_id: comment.id.clone(),
        });
        Ok(comment)
    }

    /// Follow or unfollow a node. Returns whether we are now following.
    pub fn toggle_follow(&self, user_id: &str) -> Result<bool, AppError> {
        let mut follows = self.state().follows.clone();
        let following = if follows.contains(user_id) {
            follows.remove(user_id);
            false
        } else {
            follows.insert(user_id.to_string());
            true
        };

        self.commit_follows(follows)?;
        self.emit(AppEvent::FollowToggled {
            user_id: user_id.to_string(),
            following,
        });
        Ok(following)
    }

    /// Add a broadcast's track to the crate, or pull it back out if it is
    /// already there. The crate entry's id is the originating post id.
    pub fn toggle_crate(&self, post_id: &str) -> Result<bool, AppError> {
        let (post, mut library) = {
            let state = self.state();
            let post = state
                .posts
                .iter()
                .find(|p| p.id == post_id)
                .cloned()
                .ok_or_else(|| AppError::UnknownPost(post_id.to_string()))?;
            (post, state.library.clone())
        };

        let added = if library.iter().any(|t| t.id == post_id) {
            library.retain(|t| t.id != post_id);
            false
        } else {
            library.insert(0, project_track(&post));
            true
        };

        self.commit_crate(library)?;
        debug!(post_id, added, "Crate toggled");
        self.emit(AppEvent::CrateChanged {
            track_id: post_id.to_string(),
            added,
        });
        Ok(added)
    }

    /// Rebroadcast a crate track to the feed as a fresh library-source post.
    pub fn post_track_to_feed(&self, track_id: &str) -> Result<Post, AppError> {
        let user = self.require_user()?;
        let track = self
            .state()
            .library
            .iter()
            .find(|t| t.id == track_id)
            .cloned()
            .ok_or_else(|| AppError::UnknownTrack(track_id.to_string()))?;

        let mut post = backspin_store::seed::blank_post(
            &App::fresh_id("post"),
            &user,
            Utc::now(),
        );
        post.track_title = track.title.clone();
        post.artist = track.artist.clone();
        post.audio_url = Some(track.preview_url.clone());
        post.thumbnail = Some(track.artwork.clone());
        post.description = format!(
            "Straight out of the crate! #vinyl #{}",
            track.genre.to_lowercase()
        );
        post.source = MediaSource::Library;
        post.categories = vec![track.genre.to_lowercase(), "vinyl".into()];
        post.metadata = PostMetadata {
            year: Some(track.year.clone()),
            genre: Some(track.genre.clone()),
            kind: Some(PostKind::Vinyl),
            ..Default::default()
        };
        post.year = Some(track.year);
        post.genre = Some(track.genre);
        post.label = Some(track.label);

        let mut posts = self.state().posts.clone();
        posts.insert(0, post.clone());
        self.commit_posts(posts)?;

        self.emit(AppEvent::PostCreated {
            post: Box::new(post.clone()),
        });
        Ok(post)
    }
}

/// Project a broadcast down to a crate entry, with the stock fallbacks for
/// missing label/year/genre/artwork.
fn project_track(post: &Post) -> LibraryTrack {
    LibraryTrack {
        id: post.id.clone(),
        title: post.track_title.clone(),
        artist: post.artist.clone(),
        label: post.label.clone().unwrap_or_else(|| "Unknown".into()),
        year: post.year.clone().unwrap_or_else(|| "199X".into()),
        genre: post.genre.clone().unwrap_or_else(|| "Rave".into()),
        artwork: post
            .thumbnail
            .clone()
            .unwrap_or_else(|| post.user.avatar.clone()),
        preview_url: post.preview_url().unwrap_or_default().to_string(),
        verified: post.user.is_privileged(),
        is_mix: post.is_mix,
        duration: post.duration.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backspin_store::seed;
    use backspin_types::Role;

    #[test]
    fn projection_uses_stock_fallbacks() {
        let author = seed::stock_profile();
        let mut post = seed::blank_post("post-x", &author, Utc::now());
        post.track_title = "Untitled Dub".into();
        post.artist = "White Label".into();

        let track = project_track(&post);
        assert_eq!(track.id, "post-x");
        assert_eq!(track.label, "Unknown");
        assert_eq!(track.year, "199X");
        assert_eq!(track.genre, "Rave");
        assert_eq!(track.artwork, author.avatar);
        assert!(!track.verified);
    }

    #[test]
    fn projection_prefers_audio_and_marks_privileged_authors() {
        let mut author = seed::stock_profile();
        author.role = Role::Verified;
        let mut post = seed::blank_post("post-y", &author, Utc::now());
        post.audio_url = Some("audio.mp3".into());
        post.video_url = Some("video.mp4".into());

        let track = project_track(&post);
        assert_eq!(track.preview_url, "audio.mp3");
        assert!(track.verified);
    }
}
