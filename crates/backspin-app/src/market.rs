//! Marketplace: listing queries over the broadcast collection and the
//! offer lifecycle.

use chrono::Utc;
use tracing::info;

use backspin_types::{AppEvent, MarketCategory, NoticeKind, Offer, OfferStatus, Post};

use crate::app::App;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceBracket {
    #[default]
    All,
    /// Up to and including 50.
    UpTo50,
    /// Over 50, up to and including 200.
    To200,
    /// Over 200.
    Over200,
}

impl PriceBracket {
    fn admits(self, price: f64) -> bool {
        match self {
            PriceBracket::All => true,
            PriceBracket::UpTo50 => price <= 50.0,
            PriceBracket::To200 => price > 50.0 && price <= 200.0,
            PriceBracket::Over200 => price > 200.0,
        }
    }
}

/// Media condition filter, vinyl-grading style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionFilter {
    #[default]
    All,
    NearMint,
    VeryGood,
    Good,
}

impl ConditionFilter {
    fn admits(self, condition: Option<&str>) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::NearMint => condition == Some("NM"),
            ConditionFilter::VeryGood => condition == Some("VG"),
            ConditionFilter::Good => condition == Some("G"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketSort {
    #[default]
    Newest,
    PriceLowHigh,
    PriceHighLow,
}

/// Combined marketplace query.
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    /// `None` shows every category.
    pub category: Option<MarketCategory>,
    pub price: PriceBracket,
    pub condition: ConditionFilter,
    pub sort: MarketSort,
}

/// Pure listing query: marketplace-source or priced broadcasts, narrowed
/// and ordered per the filter.
pub fn market_listings(posts: &[Post], filter: &MarketFilter) -> Vec<Post> {
    let mut listings: Vec<Post> = posts
        .iter()
        .filter(|p| p.is_listing())
        .filter(|p| {
            filter
                .category
                .is_none_or(|c| p.metadata.market_category == Some(c))
        })
        .filter(|p| filter.price.admits(p.asking_price()))
        .filter(|p| filter.condition.admits(p.metadata.condition.as_deref()))
        .cloned()
        .collect();

    match filter.sort {
        MarketSort::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        MarketSort::PriceLowHigh => {
            listings.sort_by(|a, b| a.asking_price().total_cmp(&b.asking_price()))
        }
        MarketSort::PriceHighLow => {
            listings.sort_by(|a, b| b.asking_price().total_cmp(&a.asking_price()))
        }
    }

    listings
}

impl App {
    pub fn market(&self, filter: &MarketFilter) -> Vec<Post> {
        market_listings(&self.state().posts, filter)
    }

    /// Make a pending offer on a listing. The listing owner gets an offer
    /// notice; the offer lands at the head of the offer list.
    pub fn make_offer(&self, post_id: &str, amount: &str, notes: &str) -> Result<Offer, AppError> {
        let user = self.require_user()?;
        if amount.trim().is_empty() {
            return Err(AppError::MissingField("amount"));
        }

        let post = self
            .post(post_id)
            .ok_or_else(|| AppError::UnknownPost(post_id.to_string()))?;
        if post.user_id == user.id {
            return Err(AppError::SelfOffer);
        }

        let offer = Offer {
            id: App::fresh_id("offer"),
            post_id: post_id.to_string(),
            from_user_id: user.id.clone(),
            from_username: user.username.clone(),
            to_user_id: post.user_id.clone(),
            amount: amount.to_string(),
            notes: notes.to_string(),
            status: OfferStatus::Pending,
            timestamp: Utc::now(),
        };

        let mut offers = self.state().offers.clone();
        offers.insert(0, offer.clone());
        self.commit_offers(offers)?;

        info!(post_id, amount, from = %user.username, "Offer made");
        self.emit(AppEvent::OfferMade {
            offer: Box::new(offer.clone()),
        });
        self.publish_notice(
            "NEW OFFER RECEIVED",
            &format!(
                "@{} offered \u{a3}{} for your item!",
                user.username, amount
            ),
            NoticeKind::Offer,
        );
        Ok(offer)
    }

    /// Settle a pending offer. Pending goes to Accepted or Rejected and
    /// nowhere else; settled offers never move again.
    pub fn update_offer(&self, offer_id: &str, status: OfferStatus) -> Result<Offer, AppError> {
        if !matches!(status, OfferStatus::Accepted | OfferStatus::Rejected) {
            return Err(AppError::OfferClosed);
        }

        let mut offers = self.state().offers.clone();
        let offer = offers
            .iter_mut()
            .find(|o| o.id == offer_id)
            .ok_or_else(|| AppError::UnknownOffer(offer_id.to_string()))?;
        if offer.status != OfferStatus::Pending {
            return Err(AppError::OfferClosed);
        }
        offer.status = status;
        let updated = offer.clone();

        self.commit_offers(offers)?;
        self.emit(AppEvent::OfferUpdated {
            offer_id: offer_id.to_string(),
            status,
        });
        Ok(updated)
    }

    /// Offers received by a node, newest first.
    pub fn offers_received(&self, user_id: &str) -> Vec<Offer> {
        self.state()
            .offers
            .iter()
            .filter(|o| o.to_user_id == user_id)
            .cloned()
            .collect()
    }

    /// Offers a node has sent, newest first.
    pub fn offers_sent(&self, user_id: &str) -> Vec<Offer> {
        self.state()
            .offers
            .iter()
            .filter(|o| o.from_user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn offers_for_post(&self, post_id: &str) -> Vec<Offer> {
        self.state()
            .offers
            .iter()
            .filter(|o| o.post_id == post_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backspin_store::seed;
    use backspin_types::MediaSource;
    use chrono::{TimeZone, Utc};

    fn listing(id: &str, price: &str, condition: &str, day: u32) -> Post {
        let author = seed::stock_profile();
        let mut post = seed::blank_post(
            id,
            &author,
            Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap(),
        );
        post.source = MediaSource::Marketplace;
        post.price = Some(price.into());
        post.metadata.condition = Some(condition.into());
        post
    }

    #[test]
    fn price_brackets_have_inclusive_lower_bounds() {
        assert!(PriceBracket::UpTo50.admits(50.0));
        assert!(!PriceBracket::UpTo50.admits(50.01));
        assert!(PriceBracket::To200.admits(51.0));
        assert!(PriceBracket::To200.admits(200.0));
        assert!(!PriceBracket::To200.admits(50.0));
        assert!(PriceBracket::Over200.admits(200.5));
        assert!(!PriceBracket::Over200.admits(200.0));
    }

    #[test]
    fn unlisted_posts_stay_out_of_the_market() {
        let author = seed::stock_profile();
        let plain = seed::blank_post("p", &author, Utc::now());
        let listings = market_listings(&[plain, listing("l", "45", "NM", 1)], &MarketFilter::default());
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "l");
    }

    #[test]
    fn sorts_cover_recency_and_both_price_orders() {
        let posts = [
            listing("cheap", "10", "G", 1),
            listing("mid", "100", "VG", 2),
            listing("dear", "300", "NM", 3),
        ];

        let ids = |filter: &MarketFilter| -> Vec<String> {
            market_listings(&posts, filter).into_iter().map(|p| p.id).collect()
        };

        assert_eq!(ids(&MarketFilter::default()), ["dear", "mid", "cheap"]);
        assert_eq!(
            ids(&MarketFilter { sort: MarketSort::PriceLowHigh, ..Default::default() }),
            ["cheap", "mid", "dear"]
        );
        assert_eq!(
            ids(&MarketFilter { sort: MarketSort::PriceHighLow, ..Default::default() }),
            ["dear", "mid", "cheap"]
        );
        assert_eq!(
            ids(&MarketFilter { condition: ConditionFilter::VeryGood, ..Default::default() }),
            ["mid"]
        );
        assert_eq!(
            ids(&MarketFilter { price: PriceBracket::Over200, ..Default::default() }),
            ["dear"]
        );
    }
}
