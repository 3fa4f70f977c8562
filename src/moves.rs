use serde::{Deserialize, Serialize};

/// Which hand throws a punch. Non-punch moves carry `Defensive` or `Footwork`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Side {
    Left,
    Right,
    Defensive,
    Footwork,
}

impl Side {
    /// Left/Right drive alternation; everything else is ignored by it.
    pub fn is_hand(&self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum MoveGroup {
    Punch,
    Defense,
    Footwork,
}

/// A single entry in the static move catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDefinition {
    pub id: &'static str,
    /// what gets spoken and shown for this move
    pub text: &'static str,
    pub side: Side,
    pub group: MoveGroup,
    pub is_body_shot: bool,
    /// relative likelihood inside an eligible pool
    pub weight: u32,
}

impl MoveDefinition {
    pub fn is_punch(&self) -> bool {
        self.group == MoveGroup::Punch
    }

    /// Overhand and elbow only show up when rare punches are enabled
    pub fn is_rare(&self) -> bool {
        matches!(self.id, "O" | "E")
    }
}

const fn punch(
    id: &'static str,
    text: &'static str,
    side: Side,
    is_body_shot: bool,
    weight: u32,
) -> MoveDefinition {
    MoveDefinition {
        id,
        text,
        side,
        group: MoveGroup::Punch,
        is_body_shot,
        weight,
    }
}

const fn other(id: &'static str, text: &'static str, group: MoveGroup, weight: u32) -> MoveDefinition {
    let side = match group {
        MoveGroup::Footwork => Side::Footwork,
        _ => Side::Defensive,
    };
    MoveDefinition {
        id,
        text,
        side,
        group,
        is_body_shot: false,
        weight,
    }
}

static CATALOG: [MoveDefinition; 21] = [
    punch("1", "1", Side::Left, false, 10),
    punch("2", "2", Side::Right, false, 10),
    punch("3", "3", Side::Left, false, 8),
    punch("4", "4", Side::Right, false, 8),
    punch("5", "5", Side::Left, false, 7),
    punch("6", "6", Side::Right, false, 7),
    punch("1b", "1 body", Side::Left, true, 5),
    punch("2b", "2 body", Side::Right, true, 5),
    punch("3b", "3 body", Side::Left, true, 4),
    punch("4b", "4 body", Side::Right, true, 4),
    punch("5b", "5 body", Side::Left, true, 3),
    punch("6b", "6 body", Side::Right, true, 3),
    punch("O", "Overhand", Side::Right, false, 2),
    punch("E", "Elbow", Side::Right, false, 1),
    other("S", "Slip", MoveGroup::Defense, 5),
    other("R", "Roll", MoveGroup::Defense, 4),
    other("P", "Parry", MoveGroup::Defense, 3),
    other("B", "Block", MoveGroup::Defense, 3),
    other("A", "Angle", MoveGroup::Footwork, 4),
    other("F", "Feint", MoveGroup::Footwork, 3),
    other("L", "L Step", MoveGroup::Footwork, 2),
];

/// Every move the app knows about, in catalog order
pub fn all() -> &'static [MoveDefinition] {
    &CATALOG
}

pub fn lookup(id: &str) -> Option<&'static MoveDefinition> {
    CATALOG.iter().find(|m| m.id == id)
}
