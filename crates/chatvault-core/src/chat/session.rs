//! Session mutation rules shared by every store implementation.

use chatvault_types::chat::{ChatSession, SessionPatch};
use chrono::{DateTime, Duration, Utc};

/// Apply `patch` to `session`, returning whether anything changed.
///
/// `updated_at` is only touched when a field value actually changes, and
/// then always moves strictly forward (by at least one microsecond) even if
/// the clock has not advanced since the previous write.
pub fn apply_patch(session: &mut ChatSession, patch: &SessionPatch, now: DateTime<Utc>) -> bool {
    let mut changed = false;

    if let Some(name) = &patch.name {
        if *name != session.name {
            session.name = name.clone();
            changed = true;
        }
    }

    if let Some(is_favorite) = patch.is_favorite {
        if is_favorite != session.is_favorite {
            session.is_favorite = is_favorite;
            changed = true;
        }
    }

    if changed {
        let floor = session.updated_at + Duration::microseconds(1);
        session.updated_at = now.max(floor);
    }

    changed
}
