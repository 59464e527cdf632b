//! Escalation planner: how revealing each slot of a ladder may be.
//!
//! Every ladder runs vague → setting → genre-ish → temporal → concrete. The
//! concrete-fact role only unlocks at the trivia start, so no single early
//! clue can give the answer away.

use serde::Serialize;

use super::subject::SubjectKind;

/// Semantic role of one slot, ordered from least to most revealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    /// Broad mood or vibe, nothing identifying.
    Mood,
    /// The world, scene or social setting.
    Setting,
    /// Genre texture or sound.
    Texture,
    /// Rough period, as a feel rather than a date.
    Era,
    /// One concrete, narrowing fact.
    ConcreteFact,
}

/// The instruction handed to the generator for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDescription {
    /// 1-based slot index.
    pub slot: usize,
    /// The role assigned to the slot.
    pub role: SlotRole,
    /// Natural-language instruction for that role.
    pub instruction: &'static str,
}

/// First slot at which a concrete, identifying fact is allowed.
#[must_use]
pub fn trivia_start(ladder_length: usize) -> usize {
    match ladder_length {
        0..=4 => ladder_length.max(2),
        5..=6 => 4,
        _ => 6,
    }
}

/// Role of `slot` (1-based, clamped into the ladder) in a ladder of
/// `ladder_length` slots.
#[must_use]
pub fn slot_role(ladder_length: usize, slot: usize) -> SlotRole {
    let length = ladder_length.max(1);
    let slot = slot.clamp(1, length);
    let start = trivia_start(length);

    if slot >= start {
        return SlotRole::ConcreteFact;
    }
    if slot == 1 {
        return SlotRole::Mood;
    }

    // Slots 2..start are the middle rungs.
    let middle = start - 2;
    let position = slot - 2;
    if position == 0 {
        SlotRole::Setting
    } else if position + 1 == middle {
        SlotRole::Era
    } else {
        SlotRole::Texture
    }
}

/// Instruction for `slot` of a ladder about a `kind` subject.
#[must_use]
pub fn role_for(kind: SubjectKind, ladder_length: usize, slot: usize) -> RoleDescription {
    let role = slot_role(ladder_length, slot);
    RoleDescription {
        slot: slot.clamp(1, ladder_length.max(1)),
        role,
        instruction: instruction(kind, role),
    }
}

/// Roles for every slot of the ladder, in order.
#[must_use]
pub fn role_plan(kind: SubjectKind, ladder_length: usize) -> Vec<RoleDescription> {
    (1..=ladder_length)
        .map(|slot| role_for(kind, ladder_length, slot))
        .collect()
}

fn instruction(kind: SubjectKind, role: SlotRole) -> &'static str {
    match (kind, role) {
        (SubjectKind::Movie, SlotRole::Mood) => {
            "Describe the overall mood of watching it. No names, places, plot events or anything identifying."
        }
        (SubjectKind::Movie, SlotRole::Setting) => {
            "Hint at the kind of world or setting the story lives in, kept broad."
        }
        (SubjectKind::Movie, SlotRole::Texture) => {
            "Hint at its genre texture: the pacing, the look, or how the soundtrack feels."
        }
        (SubjectKind::Movie, SlotRole::Era) => {
            "Suggest roughly when it came out through its decade feel, without any year."
        }
        (SubjectKind::Movie, SlotRole::ConcreteFact) => {
            "Give one concrete, narrowing fact, such as a well-known cast member, a famous scene, or its decade."
        }
        (SubjectKind::Music, SlotRole::Mood) => {
            "Describe the social moment you would hear it in and the vibe it brings to a room. Nothing identifying."
        }
        (SubjectKind::Music, SlotRole::Setting) => {
            "Hint at the places or occasions where it tends to get played."
        }
        (SubjectKind::Music, SlotRole::Texture) => {
            "Describe how it sounds: tempo, instruments, or the feel of the vocals."
        }
        (SubjectKind::Music, SlotRole::Era) => {
            "Suggest the decade it belongs to through its sound and feel, without any year."
        }
        (SubjectKind::Music, SlotRole::ConcreteFact) => {
            "Give one concrete, narrowing fact, such as where it was famously used, how big it was on the charts, or its decade."
        }
    }
}
