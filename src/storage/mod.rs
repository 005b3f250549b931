//! SQLite-backed record store.
//!
//! Two tables: `user` holds every profile ever seen, `tweet` holds one
//! row per labeled record (coordinate plus resolved region). A user
//! whose records all resolved to no region therefore has no `tweet`
//! rows and surfaces in the unlabeled query. Inserts are
//! insert-if-absent, so re-ingesting a feed is idempotent.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::dataset::ProfileRow;
use crate::error::Result;
use crate::record::{LocatedRecord, UserProfile};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS user (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    lang        TEXT,
    location    TEXT,
    utc_offset  INTEGER,
    timezone    TEXT
);
CREATE TABLE IF NOT EXISTS tweet (
    id       INTEGER PRIMARY KEY,
    lat      REAL NOT NULL,
    lon      REAL NOT NULL,
    region   TEXT NOT NULL,
    user_id  INTEGER NOT NULL REFERENCES user(id)
);
CREATE INDEX IF NOT EXISTS idx_tweet_user ON tweet(user_id);
";

/// Columns shared by the labeled and unlabeled queries. Both must
/// produce the same shape so the rows land in one dataset universe.
const PROFILE_COLUMNS: &str = "user.id, user.lang, user.location, user.utc_offset, user.timezone";

/// The record store.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (and if needed create) a store at a filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!(path = %path.as_ref().display(), "opened record store");
        Ok(Storage { conn })
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Storage { conn })
    }

    /// Insert a user profile unless one with the same id exists.
    /// Returns whether a row was inserted.
    pub fn insert_user(&self, user: &UserProfile) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user (id, name, lang, location, utc_offset, timezone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.name,
                user.lang,
                user.location,
                user.utc_offset,
                user.timezone
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Store one located record: the user always, the labeled tweet row
    /// only when the record resolved to a region. Returns whether a
    /// tweet row was inserted.
    pub fn store(&self, record: &LocatedRecord) -> Result<bool> {
        self.insert_user(&record.user)?;
        let Some(region) = &record.region else {
            debug!(record = record.id, "unlabeled record, user stored without tweet");
            return Ok(false);
        };
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO tweet (id, lat, lon, region, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.coordinate.lat,
                record.coordinate.lon,
                region,
                record.user.id
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Every labeled profile: users joined to their tweets' regions, one
    /// row per labeled tweet.
    pub fn load_labeled(&self) -> Result<Vec<ProfileRow>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS}, tweet.region
             FROM user JOIN tweet ON tweet.user_id = user.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProfileRow {
                    id: row.get(0)?,
                    lang: row.get(1)?,
                    location: row.get(2)?,
                    utc_offset: row.get(3)?,
                    timezone: row.get(4)?,
                    label: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// A bounded random sample of profiles with no labeled tweet at all,
    /// with the label column absent. The column shape matches
    /// [`Storage::load_labeled`].
    pub fn load_unlabeled(&self, limit: usize) -> Result<Vec<ProfileRow>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS}, NULL
             FROM user
             WHERE user.id NOT IN (SELECT user_id FROM tweet)
             ORDER BY RANDOM()
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ProfileRow {
                    id: row.get(0)?,
                    lang: row.get(1)?,
                    location: row.get(2)?,
                    utc_offset: row.get(3)?,
                    timezone: row.get(4)?,
                    label: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The combined dataset universe: all labeled rows plus a bounded
    /// sample of unlabeled ones.
    pub fn load_universe(&self, unlabeled_limit: usize) -> Result<Vec<ProfileRow>> {
        let mut universe = self.load_labeled()?;
        universe.extend(self.load_unlabeled(unlabeled_limit)?);
        Ok(universe)
    }

    /// Row counts (users, labeled tweets).
    pub fn counts(&self) -> Result<(u64, u64)> {
        let users: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        let tweets: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tweet", [], |row| row.get(0))?;
        Ok((users, tweets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geospatial::GeoPoint;

    fn user(id: i64, location: Option<&str>) -> UserProfile {
        UserProfile {
            id,
            name: format!("user{id}"),
            lang: Some("en".to_string()),
            location: location.map(str::to_string),
            utc_offset: Some(-18000),
            timezone: Some("Eastern".to_string()),
        }
    }

    fn record(id: i64, user_id: i64, region: Option<&str>) -> LocatedRecord {
        LocatedRecord {
            id,
            user: user(user_id, Some("new york")),
            coordinate: GeoPoint::new(40.0, -74.0).unwrap(),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn test_insert_user_is_idempotent() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.insert_user(&user(1, None)).unwrap());
        assert!(!storage.insert_user(&user(1, None)).unwrap());
        assert_eq!(storage.counts().unwrap(), (1, 0));
    }

    #[test]
    fn test_store_labeled_record() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.store(&record(100, 1, Some("New York"))).unwrap());
        assert!(!storage.store(&record(100, 1, Some("New York"))).unwrap());
        assert_eq!(storage.counts().unwrap(), (1, 1));

        let labeled = storage.load_labeled().unwrap();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].id, 1);
        assert_eq!(labeled[0].label.as_deref(), Some("New York"));
        assert_eq!(labeled[0].location.as_deref(), Some("new york"));
    }

    #[test]
    fn test_unknown_region_keeps_user_only() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(!storage.store(&record(100, 1, None)).unwrap());
        assert_eq!(storage.counts().unwrap(), (1, 0));

        let unlabeled = storage.load_unlabeled(10).unwrap();
        assert_eq!(unlabeled.len(), 1);
        assert_eq!(unlabeled[0].label, None);
    }

    #[test]
    fn test_user_with_any_labeled_tweet_is_not_unlabeled() {
        let storage = Storage::open_in_memory().unwrap();
        storage.store(&record(100, 1, Some("A"))).unwrap();
        storage.store(&record(101, 1, None)).unwrap();
        storage.store(&record(102, 2, None)).unwrap();

        let unlabeled = storage.load_unlabeled(10).unwrap();
        assert_eq!(unlabeled.len(), 1);
        assert_eq!(unlabeled[0].id, 2);
    }

    #[test]
    fn test_unlabeled_limit_bounds_the_sample() {
        let storage = Storage::open_in_memory().unwrap();
        for id in 0..20 {
            storage.insert_user(&user(id, None)).unwrap();
        }
        assert_eq!(storage.load_unlabeled(5).unwrap().len(), 5);
    }

    #[test]
    fn test_universe_combines_both_subsets() {
        let storage = Storage::open_in_memory().unwrap();
        storage.store(&record(100, 1, Some("A"))).unwrap();
        storage.store(&record(101, 2, None)).unwrap();

        let universe = storage.load_universe(10).unwrap();
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.iter().filter(|p| p.label.is_some()).count(), 1);
    }

    #[test]
    fn test_open_creates_and_reopens_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        {
            let storage = Storage::open(&path).unwrap();
            storage.store(&record(100, 1, Some("A"))).unwrap();
        }
        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.counts().unwrap(), (1, 1));
    }
}
