use serde::{Serialize, Serializer};
use std::fmt;

/// Fixed technology milestones in the talent tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Anchor {
    /// Hand crafting, available from the start
    Character,
    CraftingBench,
    MachineBench,
    Fabricator,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::Character,
        Anchor::CraftingBench,
        Anchor::MachineBench,
        Anchor::Fabricator,
    ];

    /// Assumed for benches nothing else can place
    pub const HIGHEST: Anchor = Anchor::Fabricator;

    pub fn rank(self) -> u8 {
        match self {
            Anchor::Character => 1,
            Anchor::CraftingBench => 2,
            Anchor::MachineBench => 3,
            Anchor::Fabricator => 4,
        }
    }

    /// Talent / bench name of the anchor
    pub fn name(self) -> &'static str {
        match self {
            Anchor::Character => "Character",
            Anchor::CraftingBench => "Crafting_Bench",
            Anchor::MachineBench => "Machine_Bench",
            Anchor::Fabricator => "Fabricator",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
