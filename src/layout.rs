//! Presentation slot lifecycle and placement policy.
//!
//! Slots sit on a horizontal rail anchored at the container's center. The
//! active slot is centered, an entering slot waits one step to the right at
//! zero opacity, and archived slots move left by one slot width plus
//! [`CHAR_SPACING`] per archive rank. Only [`RETENTION_DEPTH`] archived slots
//! are ever laid out; older ones are hidden.

/// Gap between neighbouring slots, in pixels.
pub const CHAR_SPACING: u32 = 20;

/// Number of archived slots kept visible.
pub const RETENTION_DEPTH: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Entering,
    Active,
    Archived,
    Hidden,
}

/// Where a slot should be drawn. `offset_px` is the left margin relative to
/// the container's horizontal center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    Visible { offset_px: i32, opacity: f32 },
    Hidden,
}

impl Placement {
    pub fn offset_px(&self) -> Option<i32> {
        match self {
            Placement::Visible { offset_px, .. } => Some(*offset_px),
            Placement::Hidden => None,
        }
    }
}

/// Resting position of the slot being quizzed.
pub fn active(size: u32) -> Placement {
    Placement::Visible {
        offset_px: -half(size),
        opacity: 1.0,
    }
}

/// Initial position of a newly created slot that will fade in.
pub fn entering(size: u32) -> Placement {
    Placement::Visible {
        offset_px: half(size) + CHAR_SPACING as i32,
        opacity: 0.0,
    }
}

/// Placement of an archived slot at 1-based `rank` (1 = most recent).
pub fn archived(size: u32, rank: usize) -> Placement {
    if rank == 0 || rank > RETENTION_DEPTH {
        return Placement::Hidden;
    }
    let size = f64::from(size);
    let step = size + f64::from(CHAR_SPACING);
    let offset = (-size / 2.0 - step * rank as f64).floor();
    Placement::Visible {
        offset_px: offset as i32,
        opacity: 1.0,
    }
}

fn half(size: u32) -> i32 {
    (size / 2) as i32
}
