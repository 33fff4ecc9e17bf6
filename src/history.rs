//! Match history for one user
//!
//! Read-only view over the credential store. Nothing is cached: every call
//! reflects what is in the database right now.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::rc::Rc;

use crate::persistence::{CredentialStore, MatchRecord, StoreError};

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub when: DateTime<Utc>,
    pub score1: u32,
    pub score2: u32,
    pub winner: String,
}

impl From<MatchRecord> for MatchSummary {
    fn from(record: MatchRecord) -> Self {
        Self {
            when: record.played_at,
            score1: record.player1_score,
            score2: record.player2_score,
            winner: record.winner,
        }
    }
}

/// Win/loss totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryTotals {
    pub played: usize,
    pub wins: usize,
    pub losses: usize,
}

pub struct HistoryReporter {
    store: Rc<CredentialStore>,
    username: String,
    /// Winner label that counts as a win for this user
    player_label: String,
}

impl HistoryReporter {
    pub fn new(store: Rc<CredentialStore>, username: &str, player_label: &str) -> Self {
        Self {
            store,
            username: username.to_string(),
            player_label: player_label.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Past matches, most recent first
    pub fn list_matches(&self) -> Result<Vec<MatchSummary>, StoreError> {
        Ok(self
            .store
            .get_user_matches(&self.username)?
            .into_iter()
            .map(MatchSummary::from)
            .collect())
    }

    pub fn totals(&self) -> Result<HistoryTotals, StoreError> {
        let matches = self.list_matches()?;
        let wins = matches
            .iter()
            .filter(|m| m.winner == self.player_label)
            .count();
        Ok(HistoryTotals {
            played: matches.len(),
            wins,
            losses: matches.len() - wins,
        })
    }
}

/// Format a timestamp relative to `now`
pub fn format_when(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(when);
    let days = diff.num_days();
    let hours = diff.num_hours();
    let mins = diff.num_minutes();

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            when.format("%d.%m.%y").to_string()
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
