//! Source table definitions for the Icarus data export

use serde::Serialize;
use std::fmt;

/// A table exported from the game's data archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SourceTable {
    Consumable,
    ProcessorRecipes,
    ModifierStates,
    ItemsStatic,
    Itemable,
    Talents,
    ItemTemplate,
    WorkshopItems,
    FarmingSeeds,
    FarmingGrowthStates,
    ItemRewards,
    CraftingTags,
    TagQueries,
}

/// All source tables in load order
pub static ALL_SOURCES: &[SourceTable] = &[
    SourceTable::Consumable,
    SourceTable::ProcessorRecipes,
    SourceTable::ModifierStates,
    SourceTable::ItemsStatic,
    SourceTable::Itemable,
    SourceTable::Talents,
    SourceTable::ItemTemplate,
    SourceTable::WorkshopItems,
    SourceTable::FarmingSeeds,
    SourceTable::FarmingGrowthStates,
    SourceTable::ItemRewards,
    SourceTable::CraftingTags,
    SourceTable::TagQueries,
];

/// Tables whose `Name` column feeds the identifier index, in registration order
pub static INDEXED_SOURCES: &[SourceTable] = &[
    SourceTable::ItemsStatic,
    SourceTable::Consumable,
    SourceTable::ItemTemplate,
    SourceTable::WorkshopItems,
];

impl SourceTable {
    /// Table name as used by the game (e.g. `D_ItemsStatic`)
    pub fn name(self) -> &'static str {
        match self {
            SourceTable::Consumable => "D_Consumable",
            SourceTable::ProcessorRecipes => "D_ProcessorRecipes",
            SourceTable::ModifierStates => "D_ModifierStates",
            SourceTable::ItemsStatic => "D_ItemsStatic",
            SourceTable::Itemable => "D_Itemable",
            SourceTable::Talents => "D_Talents",
            SourceTable::ItemTemplate => "D_ItemTemplate",
            SourceTable::WorkshopItems => "D_WorkshopItems",
            SourceTable::FarmingSeeds => "D_FarmingSeeds",
            SourceTable::FarmingGrowthStates => "D_FarmingGrowthStates",
            SourceTable::ItemRewards => "D_ItemRewards",
            SourceTable::CraftingTags => "D_CraftingTags",
            SourceTable::TagQueries => "D_TagQueries",
        }
    }

    /// Path of the table file relative to the export root
    pub fn relative_path(self) -> &'static str {
        match self {
            SourceTable::Consumable => "Traits/D_Consumable.json",
            SourceTable::ProcessorRecipes => "Crafting/D_ProcessorRecipes.json",
            SourceTable::ModifierStates => "Modifiers/D_ModifierStates.json",
            SourceTable::ItemsStatic => "Items/D_ItemsStatic.json",
            SourceTable::Itemable => "Traits/D_Itemable.json",
            SourceTable::Talents => "Talents/D_Talents.json",
            SourceTable::ItemTemplate => "Items/D_ItemTemplate.json",
            SourceTable::WorkshopItems => "MetaWorkshop/D_WorkshopItems.json",
            SourceTable::FarmingSeeds => "Farming/D_FarmingSeeds.json",
            SourceTable::FarmingGrowthStates => "Farming/D_FarmingGrowthStates.json",
            SourceTable::ItemRewards => "Items/D_ItemRewards.json",
            SourceTable::CraftingTags => "Crafting/D_CraftingTags.json",
            SourceTable::TagQueries => "Tags/D_TagQueries.json",
        }
    }

    /// Whether the pipeline refuses to run without this table
    pub fn required(self) -> bool {
        matches!(
            self,
            SourceTable::Consumable
                | SourceTable::ProcessorRecipes
                | SourceTable::ModifierStates
                | SourceTable::ItemsStatic
                | SourceTable::Itemable
                | SourceTable::Talents
        )
    }

    /// Look up a table by its game name
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_SOURCES.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
