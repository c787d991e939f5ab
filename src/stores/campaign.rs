//! Defines the campaign store trait.

use time::OffsetDateTime;

use crate::{
    Error,
    models::{Campaign, CampaignDraft},
};

/// Handles the creation and retrieval of campaigns.
///
/// The "at most one active campaign" invariant is owned by the store:
/// [CampaignStore::replace_active] deactivates every other campaign and
/// inserts the new one as active in a single atomic step. Campaigns are
/// never updated or deleted in place.
pub trait CampaignStore {
    /// Insert `draft` as the new active campaign, deactivating all others.
    ///
    /// The deactivate-all and insert steps are atomic with respect to
    /// concurrent calls.
    fn replace_active(&mut self, draft: CampaignDraft) -> Result<Campaign, Error>;

    /// The campaign currently flagged for display whose window contains
    /// `now`.
    ///
    /// # Errors
    /// Returns [Error::NoActiveCampaign] when no campaign is active or the
    /// active one lies outside its window.
    fn get_active(&self, now: OffsetDateTime) -> Result<Campaign, Error>;
}
