use serde::{Deserialize, Serialize};

/// Authorization lifecycle of an electronic document.
///
/// Only `Draft` documents may enter the processing pipeline; leaving
/// `Draft` is the exclusivity point that prevents concurrent runs over
/// the same document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Draft,
    Signed,
    Sent,
    Returned,
    Processing,
    Authorized,
    NotAuthorized,
    Voided,
}

impl LifecycleState {
    /// Terminal states: the engine never moves a document out of these.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Returned | Self::Authorized | Self::NotAuthorized | Self::Voided
        )
    }

    /// Whether a transition from `self` to `to` is admissible.
    ///
    /// `Processing` may still reach a terminal authorization state — an
    /// external scheduler resumes polling for documents the engine left
    /// there after exhausting its attempt ceiling. `Voided` is reachable
    /// only from `Authorized`, by administrative action outside the
    /// pipeline.
    pub fn may_transition(self, to: LifecycleState) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Signed)
                | (Self::Signed, Self::Sent)
                | (Self::Signed, Self::Returned)
                | (Self::Sent, Self::Authorized)
                | (Self::Sent, Self::NotAuthorized)
                | (Self::Sent, Self::Processing)
                | (Self::Processing, Self::Authorized)
                | (Self::Processing, Self::NotAuthorized)
                | (Self::Authorized, Self::Voided)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Signed => "signed",
            Self::Sent => "sent",
            Self::Returned => "returned",
            Self::Processing => "processing",
            Self::Authorized => "authorized",
            Self::NotAuthorized => "not-authorized",
            Self::Voided => "voided",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
