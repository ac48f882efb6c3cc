//! State machine trait for phase-like enums.

use super::ValidationError;

/// A closed set of states with explicit, checked transitions.
///
/// Implementors only describe the transition table; checked transitions
/// and the absorbing-state query come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all states reachable from `self` in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if `target` is reachable from `self` in one step.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Moves to `target`, or fails if the table does not allow it.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// True when the only way out of this state is back into itself.
    fn is_absorbing(&self) -> bool {
        self.valid_transitions().iter().all(|s| s == self)
    }
}
