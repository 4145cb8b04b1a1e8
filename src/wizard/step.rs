//! Wizard step state machine — tracks which screen the visit is on.

use serde::{Deserialize, Serialize};

/// The steps of the upsell wizard.
///
/// Progresses `Email → Flight → TransferChoice → TransferDetails (only when
/// a transfer is wanted) → CatalogBrowse ⇄ CategoryDetail → Review →
/// Confirmed`, with `Confirmed → Email` closing the loop on start-over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Email,
    Flight,
    TransferChoice,
    TransferDetails,
    CatalogBrowse,
    CategoryDetail,
    Review,
    Confirmed,
}

impl Step {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (Email, Flight)
                | (Flight, TransferChoice)
                // Transfer branch: details when wanted, straight to the
                // catalog otherwise.
                | (TransferChoice, TransferDetails)
                | (TransferChoice, CatalogBrowse)
                | (TransferDetails, CatalogBrowse)
                // Category drill-down and back.
                | (CatalogBrowse, CategoryDetail)
                | (CategoryDetail, CatalogBrowse)
                | (CatalogBrowse, Review)
                | (CategoryDetail, Review)
                | (Review, CatalogBrowse)
                | (Review, Confirmed)
                // Start over.
                | (Confirmed, Email)
        )
    }

    /// Whether the selection may be edited on this step.
    pub fn allows_selection(&self) -> bool {
        matches!(self, Self::CatalogBrowse | Self::CategoryDetail | Self::Review)
    }

    /// Whether this step marks a completed order.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::Email
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Email => "email",
            Self::Flight => "flight",
            Self::TransferChoice => "transfer_choice",
            Self::TransferDetails => "transfer_details",
            Self::CatalogBrowse => "catalog_browse",
            Self::CategoryDetail => "category_detail",
            Self::Review => "review",
            Self::Confirmed => "confirmed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use Step::*;
        let transitions = [
            (Email, Flight),
            (Flight, TransferChoice),
            (TransferChoice, TransferDetails),
            (TransferChoice, CatalogBrowse),
            (TransferDetails, CatalogBrowse),
            (CatalogBrowse, CategoryDetail),
            (CategoryDetail, CatalogBrowse),
            (CatalogBrowse, Review),
            (CategoryDetail, Review),
            (Review, CatalogBrowse),
            (Review, Confirmed),
            (Confirmed, Email),
        ];
        for (from, to) in transitions {
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn invalid_transitions() {
        use Step::*;
        // Skip steps
        assert!(!Email.can_transition_to(TransferChoice));
        assert!(!Flight.can_transition_to(CatalogBrowse));
        assert!(!TransferChoice.can_transition_to(Review));
        // Go backward where no back edge exists
        assert!(!Flight.can_transition_to(Email));
        assert!(!CatalogBrowse.can_transition_to(TransferChoice));
        // The details step never jumps straight to review
        assert!(!TransferDetails.can_transition_to(Review));
        // Confirmed only restarts
        assert!(!Confirmed.can_transition_to(Review));
        // Self-transition
        assert!(!CatalogBrowse.can_transition_to(CatalogBrowse));
    }

    #[test]
    fn selection_steps() {
        use Step::*;
        assert!(CatalogBrowse.allows_selection());
        assert!(CategoryDetail.allows_selection());
        assert!(Review.allows_selection());
        assert!(!Email.allows_selection());
        assert!(!TransferDetails.allows_selection());
        assert!(!Confirmed.allows_selection());
    }

    #[test]
    fn display_matches_serde() {
        use Step::*;
        let steps = [
            Email,
            Flight,
            TransferChoice,
            TransferDetails,
            CatalogBrowse,
            CategoryDetail,
            Review,
            Confirmed,
        ];
        for step in steps {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }
}
