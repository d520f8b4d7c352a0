//! Weighted bead draw.
//!
//! Moves are chosen with probability `beads[p] / total` using one uniform
//! integer draw over the total and a cumulative scan in ascending position
//! order. Integer arithmetic means a position with zero beads can never be
//! selected.

use rand::Rng;

use super::matchbox::Matchbox;

/// Draw a position from `matchbox` with probability proportional to its beads.
///
/// # Errors
///
/// Returns [`crate::Error::ExhaustedMatchbox`] if the matchbox has no moves or
/// every move has zero beads.
pub fn draw(matchbox: &Matchbox, rng: &mut impl Rng) -> crate::Result<usize> {
    let total = matchbox.total_beads();
    if total == 0 {
        log::error!(
            "matchbox {} has no weighted moves to draw from",
            matchbox.state().encode()
        );
        return Err(crate::Error::ExhaustedMatchbox {
            state: matchbox.state().encode(),
        });
    }

    let ticket = rng.random_range(0..total);
    pick(matchbox.all_beads(), ticket).ok_or_else(|| crate::Error::ExhaustedMatchbox {
        state: matchbox.state().encode(),
    })
}

/// Position whose cumulative range `[before, before + count)` contains `ticket`.
fn pick(beads: impl Iterator<Item = (usize, u32)>, ticket: u64) -> Option<usize> {
    let mut cumulative = 0u64;
    for (position, count) in beads {
        cumulative += u64::from(count);
        if ticket < cumulative {
            return Some(position);
        }
    }
    None
}
