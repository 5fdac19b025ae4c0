use std::collections::BTreeSet;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use backspin_types::{InviteCode, LibraryTrack, Offer, Post, Theme, User};

use crate::Store;
use crate::seed;

/// Well-known slice keys. One key per state slice, mirroring the original
/// local-storage layout.
pub mod keys {
    pub const USER: &str = "backspin_user";
    pub const POSTS: &str = "backspin_posts";
    pub const OFFERS: &str = "backspin_offers";
    pub const INVITES: &str = "backspin_invites";
    pub const CRATE: &str = "backspin_crate";
    pub const LIKES: &str = "backspin_likes";
    pub const FOLLOWS: &str = "backspin_follows";
    pub const THEME: &str = "backspin_theme";
}

impl Store {
    /// Read one slice. Absent keys are `None`; malformed JSON is an error
    /// rather than silently propagated garbage.
    pub fn read_slice<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row("SELECT value FROM slices WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;

            match raw {
                Some(json) => {
                    let value = serde_json::from_str(&json)
                        .with_context(|| format!("malformed slice '{}'", key))?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        })
    }

    /// Write one slice, replacing any previous value.
    pub fn write_slice<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slices (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (key, &json),
            )?;
            Ok(())
        })?;
        debug!("Slice '{}' saved ({} bytes)", key, json.len());
        Ok(())
    }

    pub fn delete_slice(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM slices WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    /// Write several slices in one transaction. Either every entry lands or
    /// none does; mutations spanning slices stay consistent on disk.
    pub fn write_slices(&self, entries: &[(&str, String)]) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            for (key, json) in entries {
                tx.execute(
                    "INSERT INTO slices (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    (key, json),
                )?;
            }
            tx.commit()?;
            Ok(())
        })?;
        debug!("{} slices saved in one transaction", entries.len());
        Ok(())
    }

    // -- Typed slices --

    /// Load the broadcast collection, seeding and persisting the defaults
    /// on first run.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        match self.read_slice(keys::POSTS)? {
            Some(posts) => Ok(posts),
            None => {
                let posts = seed::seed_posts();
                self.write_slice(keys::POSTS, &posts)?;
                Ok(posts)
            }
        }
    }

    pub fn save_posts(&self, posts: &[Post]) -> Result<()> {
        self.write_slice(keys::POSTS, &posts)
    }

    /// Load the crate, seeding the starter track on first run.
    pub fn load_crate(&self) -> Result<Vec<LibraryTrack>> {
        match self.read_slice(keys::CRATE)? {
            Some(tracks) => Ok(tracks),
            None => {
                let tracks = seed::initial_crate();
                self.write_slice(keys::CRATE, &tracks)?;
                Ok(tracks)
            }
        }
    }

    pub fn save_crate(&self, tracks: &[LibraryTrack]) -> Result<()> {
        self.write_slice(keys::CRATE, &tracks)
    }

    pub fn load_offers(&self) -> Result<Vec<Offer>> {
        Ok(self.read_slice(keys::OFFERS)?.unwrap_or_default())
    }

    pub fn save_offers(&self, offers: &[Offer]) -> Result<()> {
        self.write_slice(keys::OFFERS, &offers)
    }

    pub fn load_invites(&self) -> Result<Vec<InviteCode>> {
        Ok(self.read_slice(keys::INVITES)?.unwrap_or_default())
    }

    pub fn save_invites(&self, invites: &[InviteCode]) -> Result<()> {
        self.write_slice(keys::INVITES, &invites)
    }

    pub fn load_session(&self) -> Result<Option<User>> {
        self.read_slice(keys::USER)
    }

    pub fn save_session(&self, user: &User) -> Result<()> {
        self.write_slice(keys::USER, user)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.delete_slice(keys::USER)
    }

    pub fn load_likes(&self) -> Result<BTreeSet<String>> {
        Ok(self.read_slice(keys::LIKES)?.unwrap_or_default())
    }

    pub fn save_likes(&self, likes: &BTreeSet<String>) -> Result<()> {
        self.write_slice(keys::LIKES, likes)
    }

    /// A like flip touches the liked set and the post counter; the two
    /// slices go to disk together.
    pub fn save_likes_and_posts(
        &self,
        likes: &BTreeSet<String>,
        posts: &[Post],
    ) -> Result<()> {
        self.write_slices(&[
            (keys::LIKES, serde_json::to_string(likes)?),
            (keys::POSTS, serde_json::to_string(&posts)?),
        ])
    }

    /// An invite claim upgrades the session user in the same stroke; the
    /// two slices go to disk together.
    pub fn save_session_and_invites(&self, user: &User, invites: &[InviteCode]) -> Result<()> {
        self.write_slices(&[
            (keys::USER, serde_json::to_string(user)?),
            (keys::INVITES, serde_json::to_string(&invites)?),
        ])
    }

    pub fn load_follows(&self) -> Result<BTreeSet<String>> {
        Ok(self.read_slice(keys::FOLLOWS)?.unwrap_or_default())
    }

    pub fn save_follows(&self, follows: &BTreeSet<String>) -> Result<()> {
        self.write_slice(keys::FOLLOWS, follows)
    }

    pub fn load_theme(&self) -> Result<Theme> {
        Ok(self.read_slice(keys::THEME)?.unwrap_or_default())
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.write_slice(keys::THEME, &theme)
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_round_trip() {
        let store = Store::open_in_memory().unwrap();

        let likes: BTreeSet<String> = ["post-1".to_string(), "post-2".to_string()]
            .into_iter()
            .collect();
        store.save_likes(&likes).unwrap();
        assert_eq!(store.load_likes().unwrap(), likes);

        assert!(store.load_session().unwrap().is_none());
        let user = seed::stock_profile();
        store.save_session(&user).unwrap();
        assert_eq!(store.load_session().unwrap().unwrap().id, user.id);

        store.clear_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn absent_posts_slice_seeds_and_persists() {
        let store = Store::open_in_memory().unwrap();

        let posts = store.load_posts().unwrap();
        assert_eq!(posts.len(), seed::seed_posts().len());

        // The seed is written back, so the raw slice now exists.
        let raw: Option<Vec<Post>> = store.read_slice(keys::POSTS).unwrap();
        assert!(raw.is_some());

        // Mutating and saving survives a reload.
        let mut posts = posts;
        posts.remove(0);
        store.save_posts(&posts).unwrap();
        assert_eq!(store.load_posts().unwrap().len(), posts.len());
    }

    #[test]
    fn absent_theme_defaults_to_dark() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.load_theme().unwrap(), Theme::Dark);

        store.save_theme(Theme::Light).unwrap();
        assert_eq!(store.load_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn malformed_slice_is_an_error_not_garbage() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO slices (key, value) VALUES (?1, ?2)",
                    (keys::POSTS, "{not json"),
                )?;
                Ok(())
            })
            .unwrap();

        let err = store.load_posts().unwrap_err();
        assert!(err.to_string().contains("malformed slice"));
    }

    #[test]
    fn grouped_writes_land_together() {
        let store = Store::open_in_memory().unwrap();

        let likes: BTreeSet<String> = ["post-1".to_string()].into_iter().collect();
        let mut posts = seed::seed_posts();
        posts[0].likes += 1;
        store.save_likes_and_posts(&likes, &posts).unwrap();
        assert_eq!(store.load_likes().unwrap(), likes);
        assert_eq!(store.load_posts().unwrap()[0].likes, posts[0].likes);

        let user = seed::stock_profile();
        let invites = vec![InviteCode {
            code: "DJ-AAAAAA".into(),
            created_by: user.id.clone(),
            used_by: Some(user.username.clone()),
            created_at: chrono::Utc::now(),
        }];
        store.save_session_and_invites(&user, &invites).unwrap();
        assert_eq!(store.load_session().unwrap().unwrap().id, user.id);
        assert!(store.load_invites().unwrap()[0].is_claimed());
    }

    #[test]
    fn writes_replace_previous_values() {
        let store = Store::open_in_memory().unwrap();
        store.write_slice("k", &1u32).unwrap();
        store.write_slice("k", &2u32).unwrap();
        assert_eq!(store.read_slice::<u32>("k").unwrap(), Some(2));
    }
}
