use roster_rank::Standing;
use serde::{Deserialize, Serialize};

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, stable identifier
    pub id: u32,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Current score
    pub score: i64,
    /// Position in the score ranking, derived on read and never trusted as input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl User {
    /// Build an unranked user.
    pub fn new(id: u32, name: impl Into<String>, email: impl Into<String>, score: i64) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            score,
            rank: None,
        }
    }

    /// Build the user the remote source generates for `id`.
    pub fn generated(id: u32, score: i64) -> Self {
        Self::new(id, format!("User {id}"), format!("email{id}@gmail.com"), score)
    }
}

impl Standing for User {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn set_rank(&mut self, rank: u32) {
        self.rank = Some(rank);
    }
}
