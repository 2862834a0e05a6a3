//! Authoritative session state for both game modes.
//!
//! These aggregates are the single mutable state of a session. Runtime layers
//! clone or query them but mutate them exclusively through the engines; every
//! transition replaces the phase wholesale, so observers always see a
//! coherent snapshot.

pub mod phase;

pub use phase::{MatchPhase, QuestPhase};

use crate::bank::{ConsumedSet, Question, Tier};
use crate::clock::GameClock;
use crate::config::RuleSet;

/// One of the two competing parties in match mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// Team answering in the given round. Rounds alternate, home first.
    pub fn for_round(round: u32) -> Self {
        if round % 2 == 0 {
            TeamSide::Home
        } else {
            TeamSide::Away
        }
    }
}

/// Cumulative scores for the two parties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scoreboard {
    pub home: u32,
    pub away: u32,
}

impl Scoreboard {
    pub fn get(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    pub fn add(&mut self, side: TeamSide, points: u32) {
        match side {
            TeamSide::Home => self.home += points,
            TeamSide::Away => self.away += points,
        }
    }
}

/// Flavor tier for the quest victory screen. Affects narration only, never
/// the win/lose outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VictoryMargin {
    Narrow,
    Clear,
    Triumphant,
}

impl VictoryMargin {
    /// Classify a winning margin (seeker score strictly above keeper score).
    pub fn from_lead(lead: u32) -> Self {
        match lead {
            0..=1 => VictoryMargin::Narrow,
            2..=4 => VictoryMargin::Clear,
            _ => VictoryMargin::Triumphant,
        }
    }
}

/// Invariant violations caught by the post-validation stage.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("clock armed outside a question-bearing phase ({phase})")]
    ClockOutsidePhase { phase: &'static str },

    #[error("winner recorded before either score reached the threshold")]
    PrematureWinner,
}

/// Mutable aggregate for a match-mode session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchState {
    /// RNG seed fixed at session start; replays reproduce every spin.
    pub seed: u64,
    /// Increments after every successful command; decorrelates RNG draws.
    pub nonce: u64,
    /// Increments whenever a question is armed or the session resets. Clock
    /// ticks and grade verdicts carry the attempt they were issued for, so a
    /// stale event can never land in a newer question.
    pub attempt: u64,
    pub phase: MatchPhase,
    pub scores: Scoreboard,
    /// Zero-based round index.
    pub round: u32,
    /// Team answering in the current round.
    pub active_team: TeamSide,
    /// Tier spun for the current round, once decided.
    pub tier: Option<Tier>,
    /// Correct answers so far in the current round.
    pub round_tally: u32,
    /// Questions already asked this session.
    pub consumed: ConsumedSet,
    pub clock: GameClock,
    /// Recorded the moment a side reaches the winning score.
    pub winner: Option<TeamSide>,
}

impl MatchState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            attempt: 0,
            phase: MatchPhase::TeamSetup,
            scores: Scoreboard::default(),
            round: 0,
            active_team: TeamSide::for_round(0),
            tier: None,
            round_tally: 0,
            consumed: ConsumedSet::new(),
            clock: GameClock::idle(),
            winner: None,
        }
    }

    /// Clear round-scoped fields when a round opens or ends.
    pub(crate) fn clear_round(&mut self) {
        self.tier = None;
        self.round_tally = 0;
    }

    /// Discard the session back to setup. The attempt counter stays
    /// monotonic so in-flight ticks and verdicts can never match a future
    /// question.
    pub(crate) fn reset(&mut self) {
        let seed = self.seed;
        let attempt = self.attempt + 1;
        *self = Self::new(seed);
        self.attempt = attempt;
    }

    /// Structural invariants checked after every transition.
    pub fn check_invariants(&self, rules: &RuleSet) -> Result<(), InvariantViolation> {
        if self.clock.is_armed() && !matches!(self.phase, MatchPhase::Question { .. }) {
            return Err(InvariantViolation::ClockOutsidePhase {
                phase: self.phase.label(),
            });
        }
        if self.winner.is_some()
            && self.scores.home < rules.match_rules.winning_score
            && self.scores.away < rules.match_rules.winning_score
        {
            return Err(InvariantViolation::PrematureWinner);
        }
        Ok(())
    }
}

/// Mutable aggregate for a quest-mode session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestState {
    pub seed: u64,
    pub nonce: u64,
    /// Stale-event guard, as in [`MatchState::attempt`].
    pub attempt: u64,
    pub phase: QuestPhase,
    /// The player's tally in the race against the Keeper.
    pub seeker_score: u32,
    /// The fictive adversary's tally: one per wrong answer or expiry.
    pub keeper_score: u32,
    /// Bonus currency earned on correct answers, reduced by hint usage.
    pub memory_keys: u32,
    /// Index into the hall sequence.
    pub hall_index: usize,
    /// Index into the current hall's challenge list.
    pub challenge_index: usize,
    /// Challenge lists per hall, built once at quest start with each hall's
    /// cap applied.
    pub challenges: Vec<Vec<Question>>,
    /// Hints revealed for the live challenge.
    pub hints_used: u32,
    pub clock: GameClock,
}

impl QuestState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            attempt: 0,
            phase: QuestPhase::TeamSetup,
            seeker_score: 0,
            keeper_score: 0,
            memory_keys: 0,
            hall_index: 0,
            challenge_index: 0,
            challenges: Vec::new(),
            hints_used: 0,
            clock: GameClock::idle(),
        }
    }

    /// Discard the session back to setup, keeping the attempt counter
    /// monotonic.
    pub(crate) fn reset(&mut self) {
        let seed = self.seed;
        let attempt = self.attempt + 1;
        *self = Self::new(seed);
        self.attempt = attempt;
    }

    /// Challenge list for the current hall.
    pub fn current_hall_challenges(&self) -> &[Question] {
        self.challenges
            .get(self.hall_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Structural invariants checked after every transition.
    pub fn check_invariants(&self, _rules: &RuleSet) -> Result<(), InvariantViolation> {
        if self.clock.is_armed() && !matches!(self.phase, QuestPhase::Challenge { .. }) {
            return Err(InvariantViolation::ClockOutsidePhase {
                phase: self.phase.label(),
            });
        }
        Ok(())
    }
}
