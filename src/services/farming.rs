use std::collections::HashMap;

use serde::Serialize;

use crate::source::{nested_row_name, SourceRow};

const GROWTH_STAGES: &[&str] = &["Stage1", "Stage2", "Stage3", "Stage4"];

/// Growth time and harvest range for a farmed crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthInfo {
    pub time_seconds: i64,
    pub yield_min: i64,
    pub yield_max: i64,
}

#[derive(Debug, Default, Clone)]
pub struct FarmingService {
    crops: HashMap<String, GrowthInfo>,
}

impl FarmingService {
    pub fn new(seeds: &[SourceRow], growth_states: &[SourceRow], rewards: &[SourceRow]) -> Self {
        let stage_times: HashMap<&str, i64> = growth_states
            .iter()
            .map(|r| (r.name(), r.i64_field("TimeToNextState").unwrap_or(0)))
            .collect();
        let rewards: HashMap<&str, &SourceRow> = rewards.iter().map(|r| (r.name(), r)).collect();

        let mut crops: HashMap<String, GrowthInfo> = HashMap::new();

        for seed in seeds {
            let Some(reward_id) = seed.row_ref("CropRewards") else {
                continue;
            };

            let time_seconds: i64 = GROWTH_STAGES
                .iter()
                .filter_map(|stage| seed.row_ref(stage))
                .filter_map(|state| stage_times.get(state))
                .sum();

            let Some(reward) = rewards.get(reward_id) else {
                continue;
            };

            for entry in reward.array("Rewards") {
                let Some(item) = nested_row_name(entry, "Item") else {
                    continue;
                };
                let info = GrowthInfo {
                    time_seconds,
                    yield_min: entry.get("MinRandomStackCount").and_then(|v| v.as_i64()).unwrap_or(0),
                    yield_max: entry.get("MaxRandomStackCount").and_then(|v| v.as_i64()).unwrap_or(0),
                };

                // several seeds can yield the same item; keep the main crop
                match crops.get(item) {
                    Some(existing) if existing.yield_min >= info.yield_min => {}
                    _ => {
                        crops.insert(item.to_string(), info);
                    }
                }
            }
        }

        Self { crops }
    }

    pub fn growth_info(&self, item: &str) -> Option<GrowthInfo> {
        self.crops.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}
