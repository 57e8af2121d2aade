//! Due-date scanning for the deadline notifier. Selection only; delivery
//! (email, notification rows) happens outside this crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId};
use crate::profile::UserId;

/// A pending "due soon" notification for an assigned card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueNotice {
    pub card_id: CardId,
    pub user_id: UserId,
    pub card_title: String,
    pub due_date: DateTime<Utc>,
    pub message: String,
}

/// Select every non-archived, assigned card whose due date falls strictly
/// between `now` and `now + threshold`.
pub fn due_notices(cards: &[Card], now: DateTime<Utc>, threshold: Duration) -> Vec<DueNotice> {
    let horizon = now + threshold;
    cards
        .iter()
        .filter(|card| !card.is_archived)
        .filter_map(|card| {
            let user_id = card.assigned_to?;
            let due_date = card.due_date?;
            if due_date > now && due_date < horizon {
                Some(DueNotice {
                    card_id: card.id,
                    user_id,
                    card_title: card.title.clone(),
                    due_date,
                    message: format!(
                        "Card \"{}\" is due in less than {} hours",
                        card.title,
                        threshold.num_hours()
                    ),
                })
            } else {
                None
            }
        })
        .collect()
}
