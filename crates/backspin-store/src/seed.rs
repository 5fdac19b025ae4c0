//! First-run seed data: the stock profile template new users are minted
//! from, three starter broadcasts and one crate track.

use chrono::{DateTime, TimeZone, Utc};

use backspin_types::{
    LibraryTrack, MediaSource, Post, PostKind, PostLinks, PostMetadata, Role, User, VinylSale,
};

/// Template profile used when minting a new session user.
pub fn stock_profile() -> User {
    User {
        id: "user-default-1".into(),
        username: "tape_hiss_92".into(),
        display_name: "DJ Undertow".into(),
        avatar: "https://picsum.photos/seed/undertow/200".into(),
        role: Role::Dj,
        followers: 1204,
        following: 85,
        bio: Some("Resident at The Depot. Jungle business only.".into()),
        banner: None,
        theme_color: Some("#00ffff".into()),
        post_count: None,
        total_likes: None,
        is_verified: false,
    }
}

/// Starter broadcasts. Deliberately none are live and no author is
/// privileged, so a fresh feed orders purely by recency.
pub fn seed_posts() -> Vec<Post> {
    let stock = stock_profile();

    let mut first = blank_post("post-1", &stock, at(2024, 1, 1));
    first.track_title = "Darkcore Pressure".into();
    first.artist = "MC Ruffneck & DJ Undertow".into();
    first.video_url =
        Some("https://storage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4".into());
    first.thumbnail = Some("https://picsum.photos/seed/pressure/600/1000".into());
    first.description = "The 94 dubplate finally surfaces. Pure pressure! #jungle #dnb".into();
    first.likes = 5400;
    first.reposts = 230;
    first.shares = 45;
    first.source = MediaSource::Library;
    first.categories = vec!["90s".into(), "global".into()];
    first.metadata = PostMetadata {
        year: Some("1994".into()),
        genre: Some("Jungle".into()),
        kind: Some(PostKind::Single),
        ..Default::default()
    };
    first.year = Some("1994".into());
    first.label = Some("Deep Cut".into());
    first.genre = Some("Jungle".into());

    let mut author = stock.clone();
    author.id = "u2".into();
    author.username = "wax_archivist".into();
    author.avatar = "https://picsum.photos/seed/wax/200".into();
    let mut second = blank_post("post-2", &author, at(2024, 1, 2));
    second.track_title = "Amen Economics".into();
    second.artist = "The Foundry".into();
    second.youtube_id = Some("Igw4qfW8qag".into());
    second.thumbnail = Some("https://img.youtube.com/vi/Igw4qfW8qag/maxresdefault.jpg".into());
    second.description = "Mint copy pulled from a car-boot box. 1993 heat. #vinyl #amen".into();
    second.likes = 8200;
    second.reposts = 450;
    second.shares = 89;
    second.source = MediaSource::Youtube;
    second.categories = vec!["90s".into(), "vinyl".into(), "global".into()];
    second.metadata = PostMetadata {
        year: Some("1993".into()),
        genre: Some("Jungle".into()),
        kind: Some(PostKind::Vinyl),
        condition: Some("NM".into()),
        price: Some("45".into()),
        ..Default::default()
    };
    second.year = Some("1993".into());
    second.label = Some("Third Rail".into());
    second.genre = Some("Jungle".into());
    second.price = Some("45".into());
    second.vinyl = Some(VinylSale {
        condition: "NM".into(),
        price: "45".into(),
        is_for_sale: true,
    });
    second.links = Some(PostLinks {
        youtube: Some("https://youtu.be/Igw4qfW8qag".into()),
        discogs: Some("https://www.discogs.com/master/12345".into()),
        ..Default::default()
    });

    let mut author = stock.clone();
    author.id = "u3".into();
    author.username = "deck_wrecker".into();
    author.avatar = "https://picsum.photos/seed/wrecker/200".into();
    let mut third = blank_post("post-3", &author, at(2024, 1, 3));
    third.track_title = "Live at Warehouse 95".into();
    third.artist = "DJ Gale".into();
    third.youtube_id = Some("X_8vH6pW5n8".into());
    third.thumbnail = Some("https://picsum.photos/seed/warehouse95/600/1000".into());
    third.description = "Sixty minutes of pure euphoria off the original tape. #hardcore #95".into();
    third.likes = 12000;
    third.reposts = 800;
    third.shares = 120;
    third.source = MediaSource::Youtube;
    third.categories = vec!["mixes".into(), "90s".into(), "global".into()];
    third.metadata = PostMetadata {
        year: Some("1995".into()),
        genre: Some("Hardcore".into()),
        kind: Some(PostKind::Mix),
        ..Default::default()
    };
    third.year = Some("1995".into());
    third.label = Some("Warehouse".into());
    third.genre = Some("Hardcore".into());
    third.is_mix = true;
    third.duration = Some("62:00".into());

    vec![first, second, third]
}

/// Starter crate contents.
pub fn initial_crate() -> Vec<LibraryTrack> {
    vec![LibraryTrack {
        id: "track-1".into(),
        title: "Roller's Theory".into(),
        artist: "Kata".into(),
        label: "Third Rail".into(),
        year: "1994".into(),
        genre: "Jungle".into(),
        artwork: "https://picsum.photos/seed/rollers/400".into(),
        preview_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3".into(),
        verified: true,
        is_mix: false,
        duration: None,
    }]
}

/// An empty broadcast shell with every counter and optional field zeroed.
pub fn blank_post(id: &str, author: &User, created_at: DateTime<Utc>) -> Post {
    Post {
        id: id.into(),
        user_id: author.id.clone(),
        user: author.clone(),
        track_title: String::new(),
        artist: String::new(),
        video_url: None,
        audio_url: None,
        youtube_id: None,
        thumbnail: None,
        images: vec![],
        description: String::new(),
        likes: 0,
        reposts: 0,
        shares: 0,
        comments: vec![],
        source: MediaSource::Upload,
        categories: vec![],
        metadata: PostMetadata::default(),
        created_at,
        year: None,
        label: None,
        genre: None,
        tags: vec![],
        is_mix: false,
        is_live: false,
        watch_count: None,
        duration: None,
        external_url: None,
        price: None,
        status: None,
        links: None,
        vinyl: None,
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_posts_are_unprivileged_and_not_live() {
        for post in seed_posts() {
            assert!(!post.is_live);
            assert!(!post.user.is_privileged());
        }
    }

    #[test]
    fn seed_timestamps_ascend() {
        let posts = seed_posts();
        assert!(posts[0].created_at < posts[1].created_at);
        assert!(posts[1].created_at < posts[2].created_at);
    }

    #[test]
    fn second_seed_post_is_a_listing() {
        let posts = seed_posts();
        assert!(posts[1].is_listing());
        assert_eq!(posts[1].asking_price(), 45.0);
    }
}
