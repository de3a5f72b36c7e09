//! Technology tier calculation
//!
//! A crafted item's tier is the rank of the cheapest anchor among its
//! recipe's benches, plus a tenth per talent-tree step between that anchor
//! and the recipe's required talent. Harvested items sit at tier 0 and items
//! bought from orbit get a fixed sentinel tier above every crafted tier.

use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::anchors::Anchor;
use super::talents::TalentGraph;
use crate::index::IdentifierIndex;
use crate::recipes::{BenchRanking, Recipe, RecipeIndex};
use crate::source::{GameData, SourceTable};

/// Total tier reported for orbital-only items
pub const ORBITAL_TIER: f64 = 10.0;

/// Talent steps that make up one whole tier
const STEPS_PER_TIER: f64 = 10.0;

/// Offsets never reach the next whole tier
const MAX_OFFSET_STEPS: u32 = 9;

/// Distance assumed when the required talent is not below the anchor
const UNREACHABLE_DISTANCE: u32 = 1;

/// Gameplay tags marking an item as gathered from the world
pub const HARVEST_TAG_PREFIXES: &[&str] = &[
    "Item.Creature.Loot",
    "Item.Plant",
    "NPC.Fish",
    "Item.Consumable.Food.Raw",
    "Item.Consumable.Food.Berry",
];

/// Benches every character can build without a talent
const BASELINE_BENCHES: &[&str] = &["Campfire", "Firepit", "Drying_Rack"];

/// Benches unlocked early but never listed as talent rewards
const EARLY_BENCHES: &[&str] = &["PotBellyStove", "Cooking_Station", "Curing_Bench"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierInfo {
    /// Anchor rank 1-4, or 0 when not crafted
    pub base_tier: u8,
    /// Talent depth below the anchor, 0.0-0.9
    pub fractional_offset: f64,
    pub total_tier: f64,
    #[serde(serialize_with = "serialize_anchor")]
    pub anchor_bench: Option<Anchor>,
    pub is_harvested: bool,
    pub is_orbital: bool,
}

impl TierInfo {
    pub fn harvested() -> Self {
        Self {
            base_tier: 0,
            fractional_offset: 0.0,
            total_tier: 0.0,
            anchor_bench: None,
            is_harvested: true,
            is_orbital: false,
        }
    }

    pub fn orbital() -> Self {
        Self {
            base_tier: 0,
            fractional_offset: 0.0,
            total_tier: ORBITAL_TIER,
            anchor_bench: None,
            is_harvested: false,
            is_orbital: true,
        }
    }

    pub fn crafted(anchor: Anchor, fractional_offset: f64) -> Self {
        Self {
            base_tier: anchor.rank(),
            fractional_offset,
            total_tier: f64::from(anchor.rank()) + fractional_offset,
            anchor_bench: Some(anchor),
            is_harvested: false,
            is_orbital: false,
        }
    }

    /// Anchor name, or "none"
    pub fn anchor_name(&self) -> &'static str {
        self.anchor_bench.map(Anchor::name).unwrap_or("none")
    }
}

impl Default for TierInfo {
    fn default() -> Self {
        Self::harvested()
    }
}

fn serialize_anchor<S: Serializer>(anchor: &Option<Anchor>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(anchor.map(Anchor::name).unwrap_or("none"))
}

/// Assigns tiers using the talent graph and both indices
///
/// All state is built in [`TierCalculator::new`]; lookups take `&self`.
/// The bench-anchor memo is filled for every bench the recipe index knows
/// during construction, so it is never written afterwards.
pub struct TierCalculator<'a> {
    ids: &'a IdentifierIndex,
    recipes: &'a RecipeIndex,
    talents: TalentGraph,
    /// static item id -> gameplay tags
    static_tags: HashMap<String, Vec<String>>,
    orbital: HashSet<String>,
    anchor_cache: HashMap<String, Anchor>,
}

impl<'a> TierCalculator<'a> {
    pub fn new(data: &GameData, ids: &'a IdentifierIndex, recipes: &'a RecipeIndex) -> Self {
        let static_tags = data
            .rows(SourceTable::ItemsStatic)
            .iter()
            .map(|row| {
                let tags = row.gameplay_tags().into_iter().map(str::to_string).collect();
                (row.name().to_string(), tags)
            })
            .collect();

        let mut calculator = Self {
            ids,
            recipes,
            talents: TalentGraph::from_rows(data.rows(SourceTable::Talents)),
            static_tags,
            orbital: orbital_items(data, ids),
            anchor_cache: HashMap::new(),
        };

        let cache: HashMap<String, Anchor> = recipes
            .benches()
            .into_iter()
            .map(|bench| (bench.to_string(), calculator.compute_bench_anchor(bench)))
            .collect();
        calculator.anchor_cache = cache;

        info!(
            talents = calculator.talents.len(),
            orbital = calculator.orbital.len(),
            benches = calculator.anchor_cache.len(),
            "tier calculator ready"
        );
        calculator
    }

    /// Items reachable from the orbital workshop
    pub fn orbital_items(&self) -> &HashSet<String> {
        &self.orbital
    }

    pub fn talents(&self) -> &TalentGraph {
        &self.talents
    }

    pub fn is_orbital(&self, item_id: &str) -> bool {
        self.orbital.contains(item_id) || self.orbital.contains(&format!("Item_{}", item_id))
    }

    /// Whether the item's static row carries a harvest tag
    pub fn is_harvested(&self, item_id: &str) -> bool {
        let static_id = self
            .ids
            .translate(SourceTable::Consumable, SourceTable::ItemsStatic, item_id)
            .unwrap_or(item_id);

        self.static_tags
            .get(static_id)
            .or_else(|| self.static_tags.get(&format!("Item_{}", static_id)))
            .is_some_and(|tags| {
                tags.iter()
                    .any(|tag| HARVEST_TAG_PREFIXES.iter().any(|p| tag.starts_with(p)))
            })
    }

    /// Technology anchor for a crafting bench
    pub fn resolve_bench_anchor(&self, bench: &str) -> Anchor {
        match self.anchor_cache.get(bench) {
            Some(anchor) => *anchor,
            None => self.compute_bench_anchor(bench),
        }
    }

    fn compute_bench_anchor(&self, bench: &str) -> Anchor {
        if let Some(anchor) = Anchor::from_name(bench) {
            return anchor;
        }

        match self.talents.unlocking_talent(bench) {
            // Nothing above the talent reaches an anchor: it hangs off the root
            Some(talent) => self
                .talents
                .nearest_anchor(talent)
                .unwrap_or(Anchor::Character),
            None => fallback_bench_anchor(bench),
        }
    }

    /// Talent steps from an anchor down to a talent
    pub fn talent_distance(&self, anchor: Anchor, talent: &str) -> u32 {
        self.talents
            .distance(anchor.name(), talent)
            .unwrap_or(UNREACHABLE_DISTANCE)
    }

    /// Tier of an item as produced by one recipe, or uncrafted when `None`
    pub fn calculate_tier(&self, item_id: &str, recipe: Option<&Recipe>) -> TierInfo {
        if self.is_orbital(item_id) {
            return TierInfo::orbital();
        }

        let is_recipe_output = self.recipes.contains_key(item_id)
            || self.recipes.contains_key(&format!("Item_{}", item_id));

        if self.is_harvested(item_id) || (!is_recipe_output && recipe.is_none()) {
            return TierInfo::harvested();
        }

        let Some(recipe) = recipe else {
            return TierInfo::harvested();
        };

        // strict comparison keeps the first bench on equal rank
        let mut best: Option<Anchor> = None;
        for bench in &recipe.benches {
            let anchor = self.resolve_bench_anchor(bench);
            if best.map_or(true, |b| anchor.rank() < b.rank()) {
                best = Some(anchor);
            }
        }
        let anchor = best.unwrap_or(Anchor::HIGHEST);

        let offset = match (&recipe.requirement, best) {
            (Some(talent), Some(anchor)) => {
                let steps = self.talent_distance(anchor, talent).min(MAX_OFFSET_STEPS);
                f64::from(steps) / STEPS_PER_TIER
            }
            _ => 0.0,
        };

        TierInfo::crafted(anchor, offset)
    }
}

impl BenchRanking for TierCalculator<'_> {
    fn bench_rank(&self, bench: &str) -> u8 {
        self.resolve_bench_anchor(bench).rank()
    }
}

fn fallback_bench_anchor(bench: &str) -> Anchor {
    if BASELINE_BENCHES.contains(&bench) {
        return Anchor::Character;
    }
    if EARLY_BENCHES.contains(&bench) {
        return Anchor::CraftingBench;
    }
    if bench.contains("T3_") {
        return Anchor::MachineBench;
    }
    if bench.contains("T4_") {
        return Anchor::Fabricator;
    }
    debug!(bench, "no talent unlocks bench, assuming highest anchor");
    Anchor::HIGHEST
}

/// Walk workshop templates to every static item, consumable and byproduct
/// they lead to
fn orbital_items(data: &GameData, ids: &IdentifierIndex) -> HashSet<String> {
    let byproducts: HashMap<&str, Vec<&str>> = data
        .rows(SourceTable::Consumable)
        .iter()
        .map(|row| (row.name(), row.row_refs("Byproducts")))
        .filter(|(_, b)| !b.is_empty())
        .collect();

    let mut stack: Vec<String> = data
        .rows(SourceTable::WorkshopItems)
        .iter()
        .filter_map(|row| row.row_ref("Item"))
        .map(str::to_string)
        .collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut orbital: HashSet<String> = HashSet::new();

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }

        if let Some(static_id) = ids.translate(SourceTable::ItemTemplate, SourceTable::ItemsStatic, &current) {
            orbital.insert(static_id.to_string());
            if let Some(consumable) = ids.translate(SourceTable::ItemsStatic, SourceTable::Consumable, static_id) {
                orbital.insert(consumable.to_string());
                for byproduct in byproducts.get(consumable).into_iter().flatten() {
                    if !visited.contains(*byproduct) {
                        stack.push(byproduct.to_string());
                    }
                }
            }
        }

        // the template id may already be a static id
        if let Some(consumable) = ids.translate(SourceTable::ItemsStatic, SourceTable::Consumable, &current) {
            orbital.insert(consumable.to_string());
        }

        orbital.insert(current);
    }

    orbital
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRow;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<SourceRow> {
        values.into_iter().map(SourceRow::from_value).collect()
    }

    fn talent(name: &str, parents: &[&str], unlocks: Option<&str>) -> Value {
        let mut value = json!({
            "Name": name,
            "RequiredTalents": parents.iter().map(|p| json!({"RowName": p})).collect::<Vec<_>>(),
        });
        if let Some(item) = unlocks {
            value["ExtraData"] = json!({"RowName": item});
        }
        value
    }

    fn recipe(name: &str, output: &str, benches: &[&str], talent: Option<&str>) -> Value {
        let mut value = json!({
            "Name": name,
            "RecipeSets": benches.iter().map(|b| json!({"RowName": b})).collect::<Vec<_>>(),
            "Outputs": [{"Element": {"RowName": output}, "Count": 1}],
        });
        if let Some(t) = talent {
            value["Requirement"] = json!({"RowName": t});
        }
        value
    }

    struct Fixture {
        data: GameData,
        ids: IdentifierIndex,
        recipes: RecipeIndex,
    }

    impl Fixture {
        fn new(tables: Vec<(SourceTable, Vec<Value>)>) -> Self {
            let data = GameData::from_tables(tables.into_iter().map(|(t, v)| (t, rows(v))));
            let ids = IdentifierIndex::from_game_data(&data);
            let recipes = RecipeIndex::build(
                data.rows(SourceTable::ProcessorRecipes),
                data.rows(SourceTable::ItemsStatic),
                &ids,
            );
            Self { data, ids, recipes }
        }

        fn calculator(&self) -> TierCalculator<'_> {
            TierCalculator::new(&self.data, &self.ids, &self.recipes)
        }
    }

    fn talent_tree() -> Vec<Value> {
        vec![
            talent("Crafting_Bench", &[], Some("Item_Crafting_Bench")),
            talent("Cooking", &["Crafting_Bench"], Some("Item_Cooking_Pot")),
            talent("Stews", &["Cooking"], None),
            talent("Hearty_Stews", &["Stews"], None),
            talent("Machine_Bench", &[], None),
            talent("Mortar", &["Machine_Bench"], Some("Item_Mortar_And_Pestle")),
            talent("Loop_A", &["Loop_B"], Some("Item_Loop_Bench")),
            talent("Loop_B", &["Loop_A"], None),
        ]
    }

    #[test]
    fn test_campfire_recipe_is_tier_one() {
        let fx = Fixture::new(vec![
            (SourceTable::Talents, talent_tree()),
            (
                SourceTable::ProcessorRecipes,
                vec![recipe("Cooked_Meat", "Cooked_Meat", &["Campfire"], None)],
            ),
        ]);
        let calc = fx.calculator();
        let r = &fx.recipes.recipes()[0];

        let tier = calc.calculate_tier("Cooked_Meat", Some(r));
        assert_eq!(tier.base_tier, 1);
        assert_eq!(tier.fractional_offset, 0.0);
        assert_eq!(tier.total_tier, 1.0);
        assert_eq!(tier.anchor_bench, Some(Anchor::Character));
        assert!(!tier.is_harvested);
    }

    #[test]
    fn test_talent_depth_adds_offset() {
        let fx = Fixture::new(vec![
            (SourceTable::Talents, talent_tree()),
            (
                SourceTable::ProcessorRecipes,
                vec![recipe("Hearty_Stew", "Hearty_Stew", &["Cooking_Pot"], Some("Hearty_Stews"))],
            ),
        ]);
        let calc = fx.calculator();
        let tier = calc.calculate_tier("Hearty_Stew", Some(&fx.recipes.recipes()[0]));

        assert_eq!(calc.resolve_bench_anchor("Cooking_Pot"), Anchor::CraftingBench);
        assert_eq!(tier.base_tier, 2);
        assert_eq!(tier.fractional_offset, 0.3);
        assert!((tier.total_tier - 2.3).abs() < 1e-9);
    }

    #[test]
    fn test_lowest_bench_wins() {
        let fx = Fixture::new(vec![
            (SourceTable::Talents, talent_tree()),
            (
                SourceTable::ProcessorRecipes,
                vec![recipe("Flour", "Flour", &["Mortar_And_Pestle", "Firepit"], None)],
            ),
        ]);
        let calc = fx.calculator();
        let tier = calc.calculate_tier("Flour", Some(&fx.recipes.recipes()[0]));
        assert_eq!(tier.anchor_bench, Some(Anchor::Character));
        assert_eq!(calc.bench_rank("Mortar_And_Pestle"), 3);
    }

    #[test]
    fn test_unreachable_talent_uses_fallback_distance() {
        let fx = Fixture::new(vec![
            (SourceTable::Talents, talent_tree()),
            (
                SourceTable::ProcessorRecipes,
                vec![recipe("Odd", "Odd", &["Crafting_Bench"], Some("Mortar"))],
            ),
        ]);
        let calc = fx.calculator();
        assert_eq!(calc.talent_distance(Anchor::Fabricator, "Mortar"), 1);
        let tier = calc.calculate_tier("Odd", Some(&fx.recipes.recipes()[0]));
        // Mortar hangs off Machine_Bench, not Crafting_Bench
        assert_eq!(tier.base_tier, 2);
        assert!((tier.total_tier - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_bench_table() {
        let fx = Fixture::new(vec![(SourceTable::Talents, talent_tree())]);
        let calc = fx.calculator();
        assert_eq!(calc.resolve_bench_anchor("Campfire"), Anchor::Character);
        assert_eq!(calc.resolve_bench_anchor("Curing_Bench"), Anchor::CraftingBench);
        assert_eq!(calc.resolve_bench_anchor("T3_Smoker"), Anchor::MachineBench);
        assert_eq!(calc.resolve_bench_anchor("T4_Smoker"), Anchor::Fabricator);
        assert_eq!(calc.resolve_bench_anchor("Mystery_Bench"), Anchor::Fabricator);
        assert_eq!(calc.resolve_bench_anchor("Machine_Bench"), Anchor::MachineBench);
        // cyclic talent with no anchor above it
        assert_eq!(calc.resolve_bench_anchor("Loop_Bench"), Anchor::Character);
    }

    #[test]
    fn test_uncrafted_item_is_harvested() {
        let fx = Fixture::new(vec![(SourceTable::Talents, talent_tree())]);
        let tier = fx.calculator().calculate_tier("Stone", None);
        assert_eq!(tier.base_tier, 0);
        assert!(tier.is_harvested);
        assert_eq!(tier.anchor_name(), "none");
    }

    #[test]
    fn test_harvest_tag_overrides_recipe() {
        let fx = Fixture::new(vec![
            (
                SourceTable::ItemsStatic,
                vec![json!({
                    "Name": "Item_Raw_Meat",
                    "Manual_Tags": {"GameplayTags": [{"TagName": "Item.Creature.Loot.Meat"}]}
                })],
            ),
            (SourceTable::Consumable, vec![json!({"Name": "Raw_Meat"})]),
            (
                SourceTable::ProcessorRecipes,
                vec![recipe("Butcher", "Raw_Meat", &["Butchery_Bench"], None)],
            ),
        ]);
        let calc = fx.calculator();
        assert!(calc.is_harvested("Raw_Meat"));
        let tier = calc.calculate_tier("Raw_Meat", Some(&fx.recipes.recipes()[0]));
        assert_eq!(tier, TierInfo::harvested());
    }

    #[test]
    fn test_orbital_beats_plant_tag() {
        let fx = Fixture::new(vec![
            (
                SourceTable::WorkshopItems,
                vec![json!({"Name": "Workshop_Seeds", "Item": {"RowName": "Workshop_Seed_Pack"}})],
            ),
            (SourceTable::ItemTemplate, vec![json!({"Name": "Workshop_Seed_Pack"})]),
            (
                SourceTable::ItemsStatic,
                vec![json!({
                    "Name": "Item_Workshop_Seed_Pack",
                    "Manual_Tags": {"GameplayTags": [{"TagName": "Item.Plant.Seed"}]}
                })],
            ),
            (
                SourceTable::Consumable,
                vec![json!({"Name": "Workshop_Seed_Pack", "Byproducts": [{"RowName": "Bonus_Seed"}]})],
            ),
        ]);
        let calc = fx.calculator();

        assert!(calc.orbital_items().contains("Workshop_Seed_Pack"));
        assert!(calc.orbital_items().contains("Item_Workshop_Seed_Pack"));
        assert!(calc.orbital_items().contains("Bonus_Seed"));

        let tier = calc.calculate_tier("Workshop_Seed_Pack", None);
        assert!(tier.is_orbital);
        assert!(!tier.is_harvested);
        assert_eq!(tier.total_tier, ORBITAL_TIER);
        assert_eq!(tier.base_tier, 0);
    }

    #[test]
    fn test_orbital_walk_survives_byproduct_cycles() {
        let fx = Fixture::new(vec![
            (
                SourceTable::WorkshopItems,
                vec![json!({"Name": "W", "Item": {"RowName": "Pack_A"}}), json!({"Name": "N", "Item": {"RowName": "None"}})],
            ),
            (SourceTable::ItemTemplate, vec![json!({"Name": "Pack_A"}), json!({"Name": "Pack_B"})]),
            (SourceTable::ItemsStatic, vec![json!({"Name": "Pack_A"}), json!({"Name": "Pack_B"})]),
            (
                SourceTable::Consumable,
                vec![
                    json!({"Name": "Pack_A", "Byproducts": [{"RowName": "Pack_B"}]}),
                    json!({"Name": "Pack_B", "Byproducts": [{"RowName": "Pack_A"}]}),
                ],
            ),
        ]);
        let calc = fx.calculator();
        let mut orbital: Vec<_> = calc.orbital_items().iter().cloned().collect();
        orbital.sort();
        assert_eq!(orbital, vec!["Pack_A", "Pack_B"]);
        assert!(!calc.orbital_items().contains("None"));
    }

    #[test]
    fn test_serialized_anchor() {
        let json = serde_json::to_value(TierInfo::crafted(Anchor::MachineBench, 0.2)).unwrap();
        assert_eq!(json["anchor_bench"], "Machine_Bench");
        assert_eq!(json["base_tier"], 3);
        let json = serde_json::to_value(TierInfo::harvested()).unwrap();
        assert_eq!(json["anchor_bench"], "none");
    }
}
