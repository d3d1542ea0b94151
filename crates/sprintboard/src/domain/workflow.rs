//! Per-type status workflows.
//!
//! Each [`TicketType`] owns one transition table mapping a current status to
//! the statuses it may move to next. Anything not listed, including
//! self-transitions and moves out of the final status, is rejected. The same
//! tables govern sub-tasks, keyed by the parent ticket's type.
//!
//! | Type    | From          | To                       |
//! |---------|---------------|--------------------------|
//! | Story   | `OPEN`        | `IN_PROGRESS`            |
//! | Story   | `IN_PROGRESS` | `TESTING`, `OPEN`        |
//! | Story   | `TESTING`     | `IN_REVIEW`, `IN_PROGRESS` |
//! | Story   | `IN_REVIEW`   | `DEPLOYED`, `TESTING`    |
//! | Epic    | `OPEN`        | `IN_PROGRESS`            |
//! | Epic    | `IN_PROGRESS` | `COMPLETED`, `OPEN`      |
//! | On-call | `OPEN`        | `IN_PROGRESS`            |
//! | On-call | `IN_PROGRESS` | `RESOLVED`, `OPEN`       |

use super::{TicketStatus, TicketType};
use TicketStatus::{Completed, Deployed, InProgress, InReview, Open, Resolved, Testing};

/// One row of a transition table: a status and where it may go next.
type Transition = (TicketStatus, &'static [TicketStatus]);

const STORY_TRANSITIONS: &[Transition] = &[
    (Open, &[InProgress]),
    (InProgress, &[Testing, Open]),
    (Testing, &[InReview, InProgress]),
    (InReview, &[Deployed, Testing]),
];

const EPIC_TRANSITIONS: &[Transition] = &[(Open, &[InProgress]), (InProgress, &[Completed, Open])];

const ON_CALL_TRANSITIONS: &[Transition] =
    &[(Open, &[InProgress]), (InProgress, &[Resolved, Open])];

impl TicketType {
    /// The transition table for this type.
    pub fn transitions(self) -> &'static [(TicketStatus, &'static [TicketStatus])] {
        match self {
            TicketType::Story => STORY_TRANSITIONS,
            TicketType::Epic => EPIC_TRANSITIONS,
            TicketType::OnCall => ON_CALL_TRANSITIONS,
        }
    }

    /// The status that means "done" for this type.
    pub fn final_status(self) -> TicketStatus {
        match self {
            TicketType::Story => Deployed,
            TicketType::Epic => Completed,
            TicketType::OnCall => Resolved,
        }
    }

    /// Statuses reachable in one step from `current`, in table order.
    pub fn next_statuses(self, current: TicketStatus) -> &'static [TicketStatus] {
        self.transitions()
            .iter()
            .find(|(from, _)| *from == current)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    /// Returns true if moving from `from` to `to` is allowed for this type.
    pub fn can_transition(self, from: TicketStatus, to: TicketStatus) -> bool {
        self.next_statuses(from).contains(&to)
    }

    /// Every status in [`TicketStatus::ALL`] order that `current` may move to.
    pub fn valid_next_statuses(self, current: TicketStatus) -> Vec<TicketStatus> {
        TicketStatus::ALL
            .into_iter()
            .filter(|next| self.can_transition(current, *next))
            .collect()
    }

    /// Statuses a ticket of this type can ever hold.
    pub fn reachable_statuses(self) -> Vec<TicketStatus> {
        let mut reachable = vec![Open];
        let mut cursor = 0;
        while cursor < reachable.len() {
            for next in self.next_statuses(reachable[cursor]) {
                if !reachable.contains(next) {
                    reachable.push(*next);
                }
            }
            cursor += 1;
        }
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TicketType::Story, Open, InProgress)]
    #[case(TicketType::Story, InProgress, Testing)]
    #[case(TicketType::Story, InProgress, Open)]
    #[case(TicketType::Story, Testing, InReview)]
    #[case(TicketType::Story, Testing, InProgress)]
    #[case(TicketType::Story, InReview, Deployed)]
    #[case(TicketType::Story, InReview, Testing)]
    #[case(TicketType::Epic, Open, InProgress)]
    #[case(TicketType::Epic, InProgress, Completed)]
    #[case(TicketType::Epic, InProgress, Open)]
    #[case(TicketType::OnCall, Open, InProgress)]
    #[case(TicketType::OnCall, InProgress, Resolved)]
    #[case(TicketType::OnCall, InProgress, Open)]
    fn test_allowed_transitions(
        #[case] ticket_type: TicketType,
        #[case] from: TicketStatus,
        #[case] to: TicketStatus,
    ) {
        assert!(ticket_type.can_transition(from, to));
    }

    #[rstest]
    #[case(TicketType::Story, Open, Testing)]
    #[case(TicketType::Story, Open, Deployed)]
    #[case(TicketType::Story, InProgress, Deployed)]
    #[case(TicketType::Story, Deployed, InReview)]
    #[case(TicketType::Story, InProgress, InProgress)]
    #[case(TicketType::Epic, InProgress, Testing)]
    #[case(TicketType::Epic, Open, Completed)]
    #[case(TicketType::Epic, Completed, Open)]
    #[case(TicketType::OnCall, InProgress, Deployed)]
    #[case(TicketType::OnCall, Resolved, InProgress)]
    fn test_rejected_transitions(
        #[case] ticket_type: TicketType,
        #[case] from: TicketStatus,
        #[case] to: TicketStatus,
    ) {
        assert!(!ticket_type.can_transition(from, to));
    }

    #[test]
    fn test_final_status_is_terminal() {
        for ticket_type in TicketType::ALL {
            assert!(
                ticket_type
                    .valid_next_statuses(ticket_type.final_status())
                    .is_empty()
            );
        }
    }

    #[test]
    fn test_valid_next_statuses_follow_enum_order() {
        assert_eq!(
            TicketType::Story.valid_next_statuses(InProgress),
            vec![Open, Testing]
        );
        assert_eq!(
            TicketType::Epic.valid_next_statuses(InProgress),
            vec![Open, Completed]
        );
    }

    #[test]
    fn test_reachable_statuses() {
        assert_eq!(
            TicketType::Story.reachable_statuses(),
            vec![Open, InProgress, Testing, InReview, Deployed]
        );
        assert_eq!(
            TicketType::OnCall.reachable_statuses(),
            vec![Open, InProgress, Resolved]
        );
    }
}
