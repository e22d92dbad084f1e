use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// In-memory behaviour of `Like` predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeEvaluation {
    /// Only the query engine evaluates the pattern; in-memory evaluation fails.
    #[default]
    EngineOnly,
    /// Match SQL wildcards in memory, ignoring case.
    Emulate,
    EmulateCaseSensitive,
}

/// Source of the current local time for `{NOW}` sigils.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(now) => *now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub like: LikeEvaluation,
    pub clock: Clock,
}

impl CompileOptions {
    pub fn with_like(mut self, like: LikeEvaluation) -> Self {
        self.like = like;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn like(&self) -> LikeEvaluation {
        self.like
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }
}
