//! Like/dislike state for a single visitor and review.
//!
//! Like and dislike are mutually exclusive. Each transition reports the
//! counter changes it implies so the stored totals can be adjusted with a
//! single relative update.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A visitor's current reaction to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    #[default]
    None,
    Liked,
    Disliked,
}

/// A click on the like or dislike control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionAction {
    Like,
    Dislike,
}

/// Change to apply to a review's like and dislike counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReactionDelta {
    pub likes: i32,
    pub dislikes: i32,
}

impl Reaction {
    /// Apply `action`, returning the new state and the counter changes.
    ///
    /// Repeating the active action clears it. Switching sides clears the
    /// other side in the same step.
    #[must_use]
    pub const fn apply(self, action: ReactionAction) -> (Self, ReactionDelta) {
        match (self, action) {
            (Self::None, ReactionAction::Like) => (Self::Liked, delta(1, 0)),
            (Self::Liked, ReactionAction::Like) => (Self::None, delta(-1, 0)),
            (Self::Disliked, ReactionAction::Like) => (Self::Liked, delta(1, -1)),
            (Self::None, ReactionAction::Dislike) => (Self::Disliked, delta(0, 1)),
            (Self::Disliked, ReactionAction::Dislike) => (Self::None, delta(0, -1)),
            (Self::Liked, ReactionAction::Dislike) => (Self::Disliked, delta(-1, 1)),
        }
    }

    /// Value used for the `data-reaction` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Liked => "liked",
            Self::Disliked => "disliked",
        }
    }
}

const fn delta(likes: i32, dislikes: i32) -> ReactionDelta {
    ReactionDelta { likes, dislikes }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised reaction action.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown reaction action: {0}")]
pub struct UnknownReactionAction(pub String);

impl FromStr for ReactionAction {
    type Err = UnknownReactionAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(UnknownReactionAction(other.to_owned())),
        }
    }
}

/// Error for an unrecognised stored reaction state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown reaction state: {0}")]
pub struct UnknownReaction(pub String);

impl FromStr for Reaction {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "liked" => Ok(Self::Liked),
            "disliked" => Ok(Self::Disliked),
            other => Err(UnknownReaction(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [Reaction; 3] = [Reaction::None, Reaction::Liked, Reaction::Disliked];
    const ALL_ACTIONS: [ReactionAction; 2] = [ReactionAction::Like, ReactionAction::Dislike];

    fn counters(state: Reaction) -> (i32, i32) {
        match state {
            Reaction::None => (0, 0),
            Reaction::Liked => (1, 0),
            Reaction::Disliked => (0, 1),
        }
    }

    #[test]
    fn test_like_while_disliked_clears_dislike() {
        let (state, delta) = Reaction::Disliked.apply(ReactionAction::Like);
        assert_eq!(state, Reaction::Liked);
        assert_eq!(delta, ReactionDelta { likes: 1, dislikes: -1 });
    }

    #[test]
    fn test_dislike_while_liked_clears_like() {
        let (state, delta) = Reaction::Liked.apply(ReactionAction::Dislike);
        assert_eq!(state, Reaction::Disliked);
        assert_eq!(delta, ReactionDelta { likes: -1, dislikes: 1 });
    }

    #[test]
    fn test_repeating_action_turns_it_off() {
        assert_eq!(Reaction::Liked.apply(ReactionAction::Like).0, Reaction::None);
        assert_eq!(
            Reaction::Disliked.apply(ReactionAction::Dislike).0,
            Reaction::None
        );
    }

    #[test]
    fn test_every_transition_moves_counters_by_at_most_one() {
        for state in ALL_STATES {
            for action in ALL_ACTIONS {
                let (next, delta) = state.apply(action);
                assert!(delta.likes.abs() <= 1 && delta.dislikes.abs() <= 1);
                assert_ne!(next, state);
            }
        }
    }

    #[test]
    fn test_delta_matches_state_contribution() {
        // The stored counters must always equal the sum of visitor states.
        for state in ALL_STATES {
            for action in ALL_ACTIONS {
                let (next, delta) = state.apply(action);
                let (before_likes, before_dislikes) = counters(state);
                let (after_likes, after_dislikes) = counters(next);
                assert_eq!(after_likes - before_likes, delta.likes);
                assert_eq!(after_dislikes - before_dislikes, delta.dislikes);
            }
        }
    }

    #[test]
    fn test_repeated_toggles_do_not_drift() {
        let sequence = [
            ReactionAction::Like,
            ReactionAction::Dislike,
            ReactionAction::Dislike,
            ReactionAction::Like,
            ReactionAction::Like,
            ReactionAction::Like,
            ReactionAction::Dislike,
        ];

        let (mut likes, mut dislikes) = (10, 4);
        let mut state = Reaction::None;
        for action in sequence.iter().cycle().take(70) {
            let (next, delta) = state.apply(*action);
            likes += delta.likes;
            dislikes += delta.dislikes;
            state = next;

            let (own_likes, own_dislikes) = counters(state);
            assert_eq!(likes, 10 + own_likes);
            assert_eq!(dislikes, 4 + own_dislikes);
        }
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("like".parse::<ReactionAction>(), Ok(ReactionAction::Like));
        assert_eq!(
            "dislike".parse::<ReactionAction>(),
            Ok(ReactionAction::Dislike)
        );
        assert!("love".parse::<ReactionAction>().is_err());
    }

    #[test]
    fn test_reaction_attribute_values() {
        assert_eq!(Reaction::None.to_string(), "none");
        assert_eq!(Reaction::Liked.as_str(), "liked");
        assert_eq!(Reaction::Disliked.as_str(), "disliked");
    }

    #[test]
    fn test_reaction_parses_its_own_attribute_value() {
        for state in ALL_STATES {
            assert_eq!(state.as_str().parse::<Reaction>(), Ok(state));
        }
        assert!("meh".parse::<Reaction>().is_err());
    }
}
