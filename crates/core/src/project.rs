//! Project lifecycle state.
//!
//! States map to a SMALLINT column seeded 1-based in the `project_states`
//! lookup table. Financial computation branches on this state: approved
//! projects read budgets from their frozen approval snapshot, and allocation
//! edits are refused once a project is approved or completed.

use serde::Serialize;

/// State ID type matching SMALLINT in the database.
pub type StateId = i16;

/// Project lifecycle state.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Draft = 1,
    Pending = 2,
    Approved = 3,
    InDevelopment = 4,
    Completed = 5,
    Cancelled = 6,
}

impl ProjectState {
    /// Return the database state ID.
    pub fn id(self) -> StateId {
        self as StateId
    }

    /// Resolve a database state ID back to the enum.
    pub fn from_id(id: StateId) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::Pending),
            3 => Some(Self::Approved),
            4 => Some(Self::InDevelopment),
            5 => Some(Self::Completed),
            6 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether allocations under this project may still be created/edited.
    ///
    /// Approved projects are frozen (their budget entitlement is fixed by
    /// the snapshot) and completed projects are historical record.
    pub fn allows_allocation_edits(self) -> bool {
        !matches!(self, Self::Approved | Self::Completed)
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Approved)
                | (Self::Approved, Self::InDevelopment)
                | (Self::InDevelopment, Self::Completed)
                | (Self::Draft, Self::Cancelled)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Cancelled)
                | (Self::InDevelopment, Self::Cancelled)
        )
    }

    /// Resolve the snake_case wire name used in API payloads.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "in_development" => Some(Self::InDevelopment),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::InDevelopment => "In development",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl From<ProjectState> for StateId {
    fn from(value: ProjectState) -> Self {
        value as StateId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for state in [
            ProjectState::Draft,
            ProjectState::Pending,
            ProjectState::Approved,
            ProjectState::InDevelopment,
            ProjectState::Completed,
            ProjectState::Cancelled,
        ] {
            assert_eq!(ProjectState::from_id(state.id()), Some(state));
        }
    }

    #[test]
    fn wire_names_resolve() {
        assert_eq!(
            ProjectState::from_name("in_development"),
            Some(ProjectState::InDevelopment)
        );
        assert_eq!(ProjectState::from_name("draft"), Some(ProjectState::Draft));
        assert_eq!(ProjectState::from_name("Draft"), None);
        assert_eq!(ProjectState::from_name("unknown"), None);
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(ProjectState::from_id(0), None);
        assert_eq!(ProjectState::from_id(7), None);
    }

    #[test]
    fn approved_and_completed_freeze_allocations() {
        assert!(!ProjectState::Approved.allows_allocation_edits());
        assert!(!ProjectState::Completed.allows_allocation_edits());
        assert!(ProjectState::Draft.allows_allocation_edits());
        assert!(ProjectState::Pending.allows_allocation_edits());
        assert!(ProjectState::InDevelopment.allows_allocation_edits());
    }

    #[test]
    fn lifecycle_happy_path() {
        assert!(ProjectState::Draft.can_transition_to(ProjectState::Pending));
        assert!(ProjectState::Pending.can_transition_to(ProjectState::Approved));
        assert!(ProjectState::Approved.can_transition_to(ProjectState::InDevelopment));
        assert!(ProjectState::InDevelopment.can_transition_to(ProjectState::Completed));
    }

    #[test]
    fn illegal_transitions_rejected() {
        assert!(!ProjectState::Draft.can_transition_to(ProjectState::Approved));
        assert!(!ProjectState::Completed.can_transition_to(ProjectState::Cancelled));
        assert!(!ProjectState::Cancelled.can_transition_to(ProjectState::Draft));
        assert!(!ProjectState::Approved.can_transition_to(ProjectState::Pending));
    }
}
