//! Property tests for identifier normalization and cross-table translation.

use proptest::prelude::*;

use icarus_consumables::index::{normalize, IdentifierIndex, Registration, STRUCTURAL_PREFIXES};
use icarus_consumables::source::SourceTable;

/// Literal ids without a structural prefix of their own
fn base_id() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,8}(_[A-Z][a-z]{2,8}){0,2}".prop_filter("plain id", |id| {
        id != "None" && !STRUCTURAL_PREFIXES.iter().any(|p| id.starts_with(p))
    })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(id in "[A-Za-z0-9_ -]{0,24}") {
        let once = normalize(&id);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn structural_prefix_is_ignored(base in base_id(), prefix in prop::sample::select(vec!["Food_", "Drink_", "Item_"])) {
        prop_assert_eq!(normalize(&format!("{}{}", prefix, base)), normalize(&base));
    }

    #[test]
    fn translate_round_trips(base in base_id()) {
        let static_id = format!("Item_{}", base);
        let mut index = IdentifierIndex::new();
        prop_assert_eq!(index.register(SourceTable::ItemsStatic, &static_id), Registration::Inserted);
        prop_assert_eq!(index.register(SourceTable::Consumable, &base), Registration::Inserted);

        let consumable = index.translate(SourceTable::ItemsStatic, SourceTable::Consumable, &static_id);
        prop_assert_eq!(consumable, Some(base.as_str()));

        let back = index.translate(SourceTable::Consumable, SourceTable::ItemsStatic, &base);
        prop_assert_eq!(back, Some(static_id.as_str()));
    }

    #[test]
    fn first_registration_wins(base in base_id()) {
        let mut index = IdentifierIndex::new();
        index.register(SourceTable::ItemsStatic, &base);
        let rejected = index.register(SourceTable::ItemsStatic, &format!("Food_{}", base));

        prop_assert_eq!(rejected, Registration::Rejected { existing: base.clone() });
        prop_assert_eq!(index.literal_id_in(SourceTable::ItemsStatic, &normalize(&base)), Some(base.as_str()));
        prop_assert_eq!(index.collisions(), 1);
    }
}
