//! Pure classification of membership status transitions.

use changuard_types::{MembershipStatus, StatusTransition};

use crate::event::SignalKind;

/// Returns `true` if `old -> new` is a ban.
///
/// Only `member`, `restricted` and `left` count as prior states. An
/// administrator or creator being kicked is not a ban under this rule.
pub fn classify_ban(old: MembershipStatus, new: MembershipStatus) -> bool {
    use MembershipStatus::{Kicked, Left, Member, Restricted};

    matches!((old, new), (Member, Kicked) | (Restricted, Kicked) | (Left, Kicked))
}

/// Returns `true` if the subject ends up as an administrator or creator.
pub fn is_promotion(transition: &StatusTransition) -> bool {
    transition.new.is_admin()
}

/// Returns `true` if an administrator or creator ends up as a plain
/// member, leaves, or is kicked.
pub fn is_demotion(transition: &StatusTransition) -> bool {
    use MembershipStatus::{Kicked, Left, Member};

    transition.old.is_admin() && matches!(transition.new, Member | Left | Kicked)
}

/// Ban filter used by ban reporting.
///
/// Narrower than [`classify_ban`]: `left -> kicked` is not reported.
pub fn is_reported_ban(transition: &StatusTransition) -> bool {
    use MembershipStatus::{Kicked, Member, Restricted};

    transition.new == Kicked && matches!(transition.old, Member | Restricted)
}

/// Picks the display classification for a transition.
///
/// Promotion wins over demotion, which wins over ban.
pub fn classify(transition: &StatusTransition) -> Option<SignalKind> {
    if is_promotion(transition) {
        Some(SignalKind::Promotion)
    } else if is_demotion(transition) {
        Some(SignalKind::Demotion)
    } else if classify_ban(transition.old, transition.new) {
        Some(SignalKind::Ban)
    } else {
        None
    }
}
