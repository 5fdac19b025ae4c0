//! Feed shaping: which broadcasts a tab shows and in what order.

use std::cmp::Ordering;

use backspin_types::{EventStatus, MediaSource, Post, PostKind};

use crate::app::App;

/// Top-level navigation tabs. Only the feed tab applies the event gate and
/// the timeline filters; every other tab works from the full collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Feed,
    Crate,
    Events,
    Market,
    Profile,
    Studio,
}

/// Timeline filters on the feed tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    All,
    Nineties,
    Jungle,
    Vinyl,
}

/// Narrow and order the broadcast collection for a tab. Unapproved event
/// posts never reach the general feed; timeline filters are substring/
/// membership checks over the denormalized year/genre/category fields.
pub fn filter_feed(posts: &[Post], tab: Tab, timeline: Timeline) -> Vec<Post> {
    let mut posts: Vec<Post> = posts.to_vec();

    if tab == Tab::Feed {
        posts.retain(|p| !(p.is_event() && p.metadata.event_status != Some(EventStatus::Approved)));

        match timeline {
            Timeline::All => {}
            Timeline::Nineties => posts.retain(|p| {
                p.year.as_deref().is_some_and(|y| y.contains("90"))
                    || p.categories.iter().any(|c| c == "90s")
            }),
            Timeline::Jungle => posts.retain(|p| {
                p.genre
                    .as_deref()
                    .is_some_and(|g| g.eq_ignore_ascii_case("jungle"))
                    || p.categories.iter().any(|c| c == "jungle")
            }),
            Timeline::Vinyl => posts.retain(|p| {
                p.metadata.kind == Some(PostKind::Vinyl)
                    || p.categories.iter().any(|c| c == "vinyl")
                    || p.source == MediaSource::Marketplace
            }),
        }
    }

    posts.sort_by(rank);
    posts
}

/// Feed ordering: live broadcasts first, then privileged authors, then
/// newest first. Ties beyond that keep their incoming order (stable sort);
/// nothing stronger is promised.
pub fn rank(a: &Post, b: &Post) -> Ordering {
    match (a.is_live, b.is_live) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    match (a.user.is_privileged(), b.user.is_privileged()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    b.created_at.cmp(&a.created_at)
}

impl App {
    /// The general feed under a timeline filter.
    pub fn feed(&self, timeline: Timeline) -> Vec<Post> {
        filter_feed(&self.state().posts, Tab::Feed, timeline)
    }

    /// The broadcast collection as a given tab sees it.
    pub fn visible_posts(&self, tab: Tab, timeline: Timeline) -> Vec<Post> {
        filter_feed(&self.state().posts, tab, timeline)
    }

    /// Broadcasts authored by one node, feed-ordered.
    pub fn posts_by(&self, user_id: &str) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .state()
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(rank);
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backspin_store::seed;
    use backspin_types::{PostMetadata, Role};
    use chrono::{TimeZone, Utc};

    fn post(id: &str, day: u32) -> Post {
        let author = seed::stock_profile();
        seed::blank_post(id, &author, Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn plain_posts_order_newest_first() {
        let posts = vec![post("p1", 1), post("p2", 2), post("p3", 3)];
        let feed = filter_feed(&posts, Tab::Feed, Timeline::All);
        let ids: Vec<&str> = feed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p3", "p2", "p1"]);
    }

    #[test]
    fn live_outranks_verified_and_recency() {
        // A: live, unverified author, old. B: not live, verified, newer.
        let mut a = post("a", 1);
        a.is_live = true;
        let mut b = post("b", 20);
        b.user.role = Role::Verified;

        let feed = filter_feed(&[b, a], Tab::Feed, Timeline::All);
        assert_eq!(feed[0].id, "a");
        assert_eq!(feed[1].id, "b");
    }

    #[test]
    fn privileged_author_outranks_recency() {
        let mut old_verified = post("v", 1);
        old_verified.user.role = Role::Admin;
        let newer_plain = post("n", 20);

        let feed = filter_feed(&[newer_plain, old_verified], Tab::Feed, Timeline::All);
        assert_eq!(feed[0].id, "v");
    }

    #[test]
    fn unapproved_events_are_gated_from_the_feed() {
        let mut pending = post("ev", 10);
        pending.metadata = PostMetadata {
            kind: Some(PostKind::Event),
            event_status: Some(EventStatus::Pending),
            ..Default::default()
        };
        let plain = post("p", 1);

        let feed = filter_feed(&[pending.clone(), plain.clone()], Tab::Feed, Timeline::All);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "p");

        // Once approved it shows up.
        pending.metadata.event_status = Some(EventStatus::Approved);
        let feed = filter_feed(&[pending, plain], Tab::Feed, Timeline::All);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn events_tab_sees_ungated_collection() {
        let mut pending = post("ev", 10);
        pending.metadata.kind = Some(PostKind::Event);
        pending.metadata.event_status = Some(EventStatus::Pending);

        let all = filter_feed(&[pending], Tab::Events, Timeline::All);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn timeline_filters_narrow_by_year_genre_and_vinylness() {
        // The year match is a literal "90" substring, so 1994 would not
        // qualify on its own; seeds rely on the "90s" category for that.
        let mut nineties = post("n", 1);
        nineties.year = Some("1990".into());
        let mut tagged = post("t", 2);
        tagged.categories = vec!["90s".into()];
        let mut jungle = post("j", 3);
        jungle.genre = Some("JUNGLE".into());
        let mut wax = post("w", 4);
        wax.metadata.kind = Some(PostKind::Vinyl);
        let plain = post("x", 5);

        let all = [nineties, tagged, jungle, wax, plain];

        let ids = |tl: Timeline| -> Vec<String> {
            filter_feed(&all, Tab::Feed, tl)
                .into_iter()
                .map(|p| p.id)
                .collect()
        };

        assert_eq!(ids(Timeline::Nineties), ["t", "n"]);
        assert_eq!(ids(Timeline::Jungle), ["j"]);
        assert_eq!(ids(Timeline::Vinyl), ["w"]);
        assert_eq!(ids(Timeline::All).len(), 5);
    }
}
