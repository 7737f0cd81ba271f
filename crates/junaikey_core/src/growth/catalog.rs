//! Static growth catalog: spirits, avatars, professions, milestones.
//!
//! # Invariants
//! - Spirit ids are unique and there are exactly twelve of them.
//! - Every avatar references a catalog spirit by id.
//! - Profession bonuses are keyed by spirit id, never by display name.

/// Element-aligned growth track definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiritDef {
    pub id: &'static str,
    pub name: &'static str,
    pub element: &'static str,
    pub domain: &'static str,
    pub description: &'static str,
}

/// Secondary growth entity bound to one spirit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarDef {
    pub id: &'static str,
    pub name: &'static str,
    pub spirit_id: &'static str,
}

/// One multiplicative bonus granted by a profession.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfessionBonus {
    pub spirit_id: &'static str,
    pub multiplier: f64,
}

/// Selectable experience modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfessionDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Display text only. Bonus math reads `bonuses`.
    pub bonus_description: &'static str,
    pub bonuses: &'static [ProfessionBonus],
    pub core_avatar_ids: &'static [&'static str],
}

impl ProfessionDef {
    /// Multiplier applied to awards for `spirit_id`, if this profession
    /// boosts it.
    pub fn multiplier_for(&self, spirit_id: &str) -> Option<f64> {
        self.bonuses
            .iter()
            .find(|bonus| bonus.spirit_id == spirit_id)
            .map(|bonus| bonus.multiplier)
    }
}

/// Named level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub level: u32,
    pub title: &'static str,
}

pub const SPIRITS: [SpiritDef; 12] = [
    SpiritDef {
        id: "fire",
        name: "Ignis",
        element: "fire",
        domain: "Creativity",
        description: "Kindles new ideas and bold first drafts.",
    },
    SpiritDef {
        id: "water",
        name: "Undine",
        element: "water",
        domain: "Empathy",
        description: "Flows through relationships and shared context.",
    },
    SpiritDef {
        id: "wood",
        name: "Dryad",
        element: "wood",
        domain: "Growth",
        description: "Tends long-running habits and slow learning.",
    },
    SpiritDef {
        id: "metal",
        name: "Ferrum",
        element: "metal",
        domain: "Discipline",
        description: "Sharpens focus, structure and follow-through.",
    },
    SpiritDef {
        id: "earth",
        name: "Gaia",
        element: "earth",
        domain: "Foundation",
        description: "Holds the knowledge base steady and organized.",
    },
    SpiritDef {
        id: "wind",
        name: "Sylph",
        element: "wind",
        domain: "Exploration",
        description: "Carries curiosity toward unfamiliar topics.",
    },
    SpiritDef {
        id: "thunder",
        name: "Raiju",
        element: "thunder",
        domain: "Action",
        description: "Turns decisions into immediate execution.",
    },
    SpiritDef {
        id: "ice",
        name: "Glacies",
        element: "ice",
        domain: "Clarity",
        description: "Preserves distilled, well-reasoned insight.",
    },
    SpiritDef {
        id: "light",
        name: "Lumen",
        element: "light",
        domain: "Wisdom",
        description: "Illuminates connections between notes.",
    },
    SpiritDef {
        id: "shadow",
        name: "Umbra",
        element: "shadow",
        domain: "Reflection",
        description: "Surfaces blind spots and unspoken assumptions.",
    },
    SpiritDef {
        id: "void",
        name: "Nyx",
        element: "void",
        domain: "Possibility",
        description: "Keeps room open for ideas not yet formed.",
    },
    SpiritDef {
        id: "time",
        name: "Chronos",
        element: "time",
        domain: "Persistence",
        description: "Rewards returning to the same work day after day.",
    },
];

pub const AVATARS: [AvatarDef; 8] = [
    AvatarDef {
        id: "avatar_blaze",
        name: "Blaze Artisan",
        spirit_id: "fire",
    },
    AvatarDef {
        id: "avatar_tide",
        name: "Tide Listener",
        spirit_id: "water",
    },
    AvatarDef {
        id: "avatar_grove",
        name: "Grove Keeper",
        spirit_id: "wood",
    },
    AvatarDef {
        id: "avatar_forge",
        name: "Forge Warden",
        spirit_id: "metal",
    },
    AvatarDef {
        id: "avatar_gale",
        name: "Gale Scout",
        spirit_id: "wind",
    },
    AvatarDef {
        id: "avatar_prism",
        name: "Prism Sage",
        spirit_id: "light",
    },
    AvatarDef {
        id: "avatar_veil",
        name: "Veil Walker",
        spirit_id: "shadow",
    },
    AvatarDef {
        id: "avatar_hourglass",
        name: "Hourglass Monk",
        spirit_id: "time",
    },
];

pub const PROFESSIONS: [ProfessionDef; 5] = [
    ProfessionDef {
        id: "alchemist",
        name: "Alchemist",
        bonus_description: "Ignis and Ferrum experience ×1.5",
        bonuses: &[
            ProfessionBonus {
                spirit_id: "fire",
                multiplier: 1.5,
            },
            ProfessionBonus {
                spirit_id: "metal",
                multiplier: 1.5,
            },
        ],
        core_avatar_ids: &["avatar_blaze", "avatar_forge"],
    },
    ProfessionDef {
        id: "sage",
        name: "Sage",
        bonus_description: "Lumen experience ×2",
        bonuses: &[ProfessionBonus {
            spirit_id: "light",
            multiplier: 2.0,
        }],
        core_avatar_ids: &["avatar_prism"],
    },
    ProfessionDef {
        id: "navigator",
        name: "Navigator",
        bonus_description: "Sylph and Undine experience ×1.2",
        bonuses: &[
            ProfessionBonus {
                spirit_id: "wind",
                multiplier: 1.2,
            },
            ProfessionBonus {
                spirit_id: "water",
                multiplier: 1.2,
            },
        ],
        core_avatar_ids: &["avatar_gale", "avatar_tide"],
    },
    ProfessionDef {
        id: "chronomancer",
        name: "Chronomancer",
        bonus_description: "Chronos experience ×2.5",
        bonuses: &[ProfessionBonus {
            spirit_id: "time",
            multiplier: 2.5,
        }],
        core_avatar_ids: &["avatar_hourglass"],
    },
    ProfessionDef {
        id: "architect",
        name: "Architect",
        bonus_description: "Gaia and Dryad experience ×1.3",
        bonuses: &[
            ProfessionBonus {
                spirit_id: "earth",
                multiplier: 1.3,
            },
            ProfessionBonus {
                spirit_id: "wood",
                multiplier: 1.3,
            },
        ],
        core_avatar_ids: &["avatar_grove"],
    },
];

pub const MILESTONES: [Milestone; 5] = [
    Milestone {
        level: 5,
        title: "Awakened",
    },
    Milestone {
        level: 10,
        title: "Attuned",
    },
    Milestone {
        level: 20,
        title: "Ascended",
    },
    Milestone {
        level: 35,
        title: "Exalted",
    },
    Milestone {
        level: 50,
        title: "Transcendent",
    },
];

pub fn spirit_def(id: &str) -> Option<&'static SpiritDef> {
    SPIRITS.iter().find(|spirit| spirit.id == id)
}

pub fn avatar_def(id: &str) -> Option<&'static AvatarDef> {
    AVATARS.iter().find(|avatar| avatar.id == id)
}

pub fn profession(id: &str) -> Option<&'static ProfessionDef> {
    PROFESSIONS.iter().find(|profession| profession.id == id)
}

/// Milestones with `from < level <= to`.
pub fn milestones_crossed(from: u32, to: u32) -> Vec<Milestone> {
    MILESTONES
        .iter()
        .filter(|milestone| milestone.level > from && milestone.level <= to)
        .copied()
        .collect()
}
