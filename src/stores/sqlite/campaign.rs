//! Implements a SQLite backed campaign store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Campaign, CampaignDraft},
    stores::CampaignStore,
};

/// Stores campaigns in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCampaignStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCampaignStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CampaignStore for SQLiteCampaignStore {
    /// Insert `draft` as the new active campaign, deactivating all others.
    ///
    /// The deactivate-all and insert steps run inside a single SQL
    /// transaction; the shared connection lock serializes concurrent
    /// campaign creations, so two requests cannot both end up active.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    fn replace_active(&mut self, draft: CampaignDraft) -> Result<Campaign, Error> {
        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        tx.execute("UPDATE campaign SET is_active = 0 WHERE is_active = 1", ())?;

        let campaign = tx
            .prepare(
                "INSERT INTO campaign (image_url, is_active, starts_at, ends_at)
                 VALUES (?1, 1, ?2, ?3)
                 RETURNING id, image_url, is_active, starts_at, ends_at",
            )?
            .query_row(
                (&draft.image_url, draft.starts_at, draft.ends_at),
                Self::map_row,
            )?;

        tx.commit()?;

        Ok(campaign)
    }

    /// The campaign currently flagged for display whose window contains
    /// `now`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NoActiveCampaign] if no campaign is active or the active
    ///   one lies outside its window,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_active(&self, now: OffsetDateTime) -> Result<Campaign, Error> {
        let campaign = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, image_url, is_active, starts_at, ends_at FROM campaign
                 WHERE is_active = 1",
            )?
            .query_row([], Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::NoActiveCampaign,
                error => error.into(),
            })?;

        if !campaign.is_live(now) {
            return Err(Error::NoActiveCampaign);
        }

        Ok(campaign)
    }
}

impl CreateTable for SQLiteCampaignStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS campaign (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    image_url TEXT NOT NULL,
                    is_active INTEGER NOT NULL,
                    starts_at TEXT,
                    ends_at TEXT
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCampaignStore {
    type ReturnType = Campaign;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Campaign {
            id: row.get(offset)?,
            image_url: row.get(offset + 1)?,
            is_active: row.get(offset + 2)?,
            starts_at: row.get(offset + 3)?,
            ends_at: row.get(offset + 4)?,
        })
    }
}

#[cfg(test)]
mod sqlite_campaign_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{Error, db::CreateTable, models::CampaignDraft, stores::CampaignStore};

    use super::SQLiteCampaignStore;

    fn get_test_store() -> SQLiteCampaignStore {
        let connection = Connection::open_in_memory().unwrap();
        SQLiteCampaignStore::create_table(&connection).unwrap();

        SQLiteCampaignStore::new(Arc::new(Mutex::new(connection)))
    }

    fn draft(image_url: &str) -> CampaignDraft {
        CampaignDraft {
            image_url: image_url.to_string(),
            starts_at: None,
            ends_at: None,
        }
    }

    #[test]
    fn get_active_fails_when_no_campaigns_exist() {
        let store = get_test_store();

        let result = store.get_active(OffsetDateTime::now_utc());

        assert_eq!(result, Err(Error::NoActiveCampaign));
    }

    #[test]
    fn replace_active_deactivates_previous_campaign() {
        let mut store = get_test_store();
        let now = OffsetDateTime::now_utc();

        let first = store.replace_active(draft("/uploads/first.png")).unwrap();
        assert_eq!(store.get_active(now).unwrap().id, first.id);

        let second = store.replace_active(draft("/uploads/second.png")).unwrap();

        // Only the newest campaign is active, never both, never zero.
        let active = store.get_active(now).unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.image_url, "/uploads/second.png");
    }

    #[test]
    fn get_active_honours_display_window() {
        let mut store = get_test_store();
        let now = OffsetDateTime::now_utc();

        store
            .replace_active(CampaignDraft {
                image_url: "/uploads/later.png".to_string(),
                starts_at: Some(now + Duration::days(1)),
                ends_at: None,
            })
            .unwrap();

        // Active flag is set but the window has not opened yet.
        assert_eq!(store.get_active(now), Err(Error::NoActiveCampaign));
        assert!(store.get_active(now + Duration::days(2)).is_ok());
    }
}
