use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// MPA content-rating lookup record ("G", "PG-13", ...).
///
/// Clients referencing a rating only need to send the id; the name is
/// filled in from the lookup table when the film is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpaRating {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Genre lookup record. A film carries zero or more of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// A film record. `id` is assigned by storage on create; 0 means "new".
///
/// The set of users who liked the film is internal bookkeeping and is
/// never serialized to clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: Option<NaiveDate>,
    /// Running time in minutes.
    pub duration: Option<i64>,
    pub mpa: Option<MpaRating>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(skip)]
    pub liked_user_ids: HashSet<i64>,
}

impl Film {
    /// Drop duplicate genre ids, keeping the first occurrence of each.
    pub fn dedup_genres(&mut self) {
        let mut seen = HashSet::new();
        self.genres.retain(|g| seen.insert(g.id));
    }
}

/// A user record. The friend set is one-directional: `friend_ids`
/// holds who this user added, with no mutuality requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login: String,
    /// Display name; a blank name is replaced with the login by the API
    /// layer before persistence.
    #[serde(default)]
    pub name: String,
    pub birthday: Option<NaiveDate>,
    #[serde(skip)]
    pub friend_ids: HashSet<i64>,
}
