//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

use super::priority::NotificationPriority;

/// Kind of a user-facing notification. Closed enum; the `data` payload
/// schema of a [`super::Notification`] varies per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// An achievement was unlocked.
    AchievementUnlocked,
    /// The user advanced to a new rank.
    RankUp,
    /// Another user sent a friend request.
    FriendRequest,
    /// The user was invited to a guild.
    GuildInvitation,
    /// A mission was completed.
    MissionCompleted,
    /// The user leveled up.
    LevelUp,
    /// A direct message was received.
    MessageReceived,
    /// Platform-wide announcement.
    SystemAnnouncement,
    /// ML coins were credited.
    MlCoinsEarned,
    /// A streak milestone was reached.
    StreakMilestone,
    /// Feedback on a submitted exercise.
    ExerciseFeedback,
}

impl NotificationKind {
    /// All kinds, for grouped tallies and zero-filled stats.
    pub const ALL: [NotificationKind; 11] = [
        Self::AchievementUnlocked,
        Self::RankUp,
        Self::FriendRequest,
        Self::GuildInvitation,
        Self::MissionCompleted,
        Self::LevelUp,
        Self::MessageReceived,
        Self::SystemAnnouncement,
        Self::MlCoinsEarned,
        Self::StreakMilestone,
        Self::ExerciseFeedback,
    ];

    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AchievementUnlocked => "achievement_unlocked",
            Self::RankUp => "rank_up",
            Self::FriendRequest => "friend_request",
            Self::GuildInvitation => "guild_invitation",
            Self::MissionCompleted => "mission_completed",
            Self::LevelUp => "level_up",
            Self::MessageReceived => "message_received",
            Self::SystemAnnouncement => "system_announcement",
            Self::MlCoinsEarned => "ml_coins_earned",
            Self::StreakMilestone => "streak_milestone",
            Self::ExerciseFeedback => "exercise_feedback",
        }
    }

    /// Default priority for notifications of this kind.
    ///
    /// Priority is derived at creation time and stored independently,
    /// so re-mapping a kind later does not rewrite history.
    pub fn default_priority(&self) -> NotificationPriority {
        match self {
            Self::RankUp | Self::LevelUp | Self::SystemAnnouncement => NotificationPriority::High,
            Self::AchievementUnlocked
            | Self::FriendRequest
            | Self::GuildInvitation
            | Self::MissionCompleted
            | Self::MessageReceived
            | Self::StreakMilestone => NotificationPriority::Medium,
            Self::MlCoinsEarned | Self::ExerciseFeedback => NotificationPriority::Low,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for kind in NotificationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: NotificationKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_priority_derivation() {
        assert_eq!(
            NotificationKind::RankUp.default_priority(),
            NotificationPriority::High
        );
        assert_eq!(
            NotificationKind::MlCoinsEarned.default_priority(),
            NotificationPriority::Low
        );
    }
}
