//! Per-user notification statistics.

use serde::{Deserialize, Serialize};

use litquest_entity::notification::NotificationKind;

/// Aggregate counts for one user's notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    /// Total notifications for the user.
    pub total: i64,
    /// Unread notifications for the user.
    pub unread: i64,
    /// Read notifications for the user.
    pub read: i64,
    /// Per-kind counts, one entry for every kind including zeroes.
    pub by_kind: Vec<KindCount>,
}

/// A single kind tally inside [`NotificationStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindCount {
    /// The notification kind.
    pub kind: NotificationKind,
    /// Number of notifications of that kind.
    pub count: i64,
}

impl NotificationStats {
    /// Assembles stats from totals and a (possibly sparse) grouped tally,
    /// zero-filling the kinds the tally did not mention.
    pub fn from_tally(total: i64, unread: i64, tally: &[(NotificationKind, i64)]) -> Self {
        let by_kind = NotificationKind::ALL
            .iter()
            .map(|&kind| KindCount {
                kind,
                count: tally
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map_or(0, |(_, c)| *c),
            })
            .collect();

        Self {
            total,
            unread,
            read: total - unread,
            by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fills_missing_kinds() {
        let tally = vec![
            (NotificationKind::RankUp, 3),
            (NotificationKind::LevelUp, 1),
        ];
        let stats = NotificationStats::from_tally(4, 2, &tally);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.read, 2);
        assert_eq!(stats.by_kind.len(), NotificationKind::ALL.len());

        let rank_up = stats
            .by_kind
            .iter()
            .find(|c| c.kind == NotificationKind::RankUp)
            .unwrap();
        assert_eq!(rank_up.count, 3);

        let friend = stats
            .by_kind
            .iter()
            .find(|c| c.kind == NotificationKind::FriendRequest)
            .unwrap();
        assert_eq!(friend.count, 0);
    }
}
