//! This file defines the `Campaign` type: a promotional banner with an
//! uploaded image, of which at most one is active at a time.

use serde::Serialize;
use time::OffsetDateTime;

use crate::models::DatabaseID;

/// A promotional campaign banner.
///
/// At most one campaign is active at a time: creating a new one deactivates
/// all others. A campaign may additionally be bounded by an optional
/// start/end window; an active campaign outside its window is not shown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Campaign {
    /// The ID of the campaign, assigned by the store.
    pub id: DatabaseID,
    /// The URL the uploaded banner image is served from.
    pub image_url: String,
    /// Whether this is the campaign flagged for display.
    #[serde(skip_serializing)]
    pub is_active: bool,
    /// When the campaign starts being shown, if bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<OffsetDateTime>,
    /// When the campaign stops being shown, if bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<OffsetDateTime>,
}

impl Campaign {
    /// Whether the campaign should be displayed at `now`.
    ///
    /// The campaign must be the active one and `now` must fall within its
    /// window. A missing bound is treated as unbounded on that side.
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        if !self.is_active {
            return false;
        }

        if let Some(starts_at) = self.starts_at
            && now < starts_at
        {
            return false;
        }

        if let Some(ends_at) = self.ends_at
            && now > ends_at
        {
            return false;
        }

        true
    }
}

/// The data needed to create a new [Campaign], before the store assigns an
/// ID and flips the active flag.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignDraft {
    /// The URL the uploaded banner image will be served from.
    pub image_url: String,
    /// When the campaign starts being shown, if bounded.
    pub starts_at: Option<OffsetDateTime>,
    /// When the campaign stops being shown, if bounded.
    pub ends_at: Option<OffsetDateTime>,
}

#[cfg(test)]
mod campaign_tests {
    use time::{Duration, OffsetDateTime};

    use super::Campaign;

    fn campaign(
        is_active: bool,
        starts_at: Option<OffsetDateTime>,
        ends_at: Option<OffsetDateTime>,
    ) -> Campaign {
        Campaign {
            id: 1,
            image_url: "/uploads/banner.png".to_string(),
            is_active,
            starts_at,
            ends_at,
        }
    }

    #[test]
    fn inactive_campaign_is_not_live() {
        let now = OffsetDateTime::now_utc();

        assert!(!campaign(false, None, None).is_live(now));
    }

    #[test]
    fn unbounded_active_campaign_is_live() {
        let now = OffsetDateTime::now_utc();

        assert!(campaign(true, None, None).is_live(now));
    }

    #[test]
    fn campaign_outside_window_is_not_live() {
        let now = OffsetDateTime::now_utc();
        let hour = Duration::hours(1);

        assert!(!campaign(true, Some(now + hour), None).is_live(now));
        assert!(!campaign(true, None, Some(now - hour)).is_live(now));
        assert!(campaign(true, Some(now - hour), Some(now + hour)).is_live(now));
    }
}
