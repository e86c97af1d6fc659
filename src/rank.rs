use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::bnet::{BnetClient, BnetError};
use crate::cache::ItemCache;
use crate::config::Locale;
use crate::model::{Equipment, Fetch, ItemData, RankedRow};

/// Weighted sum of the item's preview stats. Stats the item lacks count as 0.
pub fn rank(item: &ItemData, weights: &BTreeMap<String, f64>) -> f64 {
    let Some(stats) = item["preview_item"]["stats"].as_array() else {
        return 0.0;
    };
    weights
        .iter()
        .map(|(stat, weight)| {
            let value = stats
                .iter()
                .find(|s| s["type"]["type"].as_str() == Some(stat.as_str()))
                .and_then(|s| s["value"].as_f64())
                .unwrap_or(0.0);
            value * weight
        })
        .sum()
}

pub fn wowhead_link(locale: Locale, item_id: u64) -> String {
    format!("https://{}.wowhead.com/item={}", locale.wowhead_subdomain(), item_id)
}

fn inventory_type(item: &ItemData) -> &str {
    item["inventory_type"]["type"].as_str().unwrap_or_default()
}

fn subclass_id(item: &ItemData) -> Option<u64> {
    item["item_subclass"]["id"].as_u64()
}

/// Turn candidate items into sorted spreadsheet rows.
///
/// Candidates of an item subclass the character does not wear are dropped, as
/// are candidates ranked below what is already equipped in that slot.
pub fn build_rows(
    equipment: &Equipment,
    candidates: &[ItemData],
    weights: &BTreeMap<String, f64>,
    locale: Locale,
) -> Vec<RankedRow> {
    let subclasses: BTreeSet<u64> = equipment.values().filter_map(subclass_id).collect();
    let equipped_ranks: BTreeMap<&str, f64> = equipment
        .iter()
        .map(|(slot, item)| (slot.as_str(), rank(item, weights)))
        .collect();

    let mut rows: Vec<RankedRow> = candidates
        .iter()
        .filter(|item| subclass_id(item).is_some_and(|id| subclasses.contains(&id)))
        .map(|item| {
            let id = item["id"].as_u64().unwrap_or_default();
            let slot = inventory_type(item).to_string();
            let equipped = equipment
                .get(&slot)
                .is_some_and(|worn| worn["id"].as_u64() == Some(id));
            RankedRow {
                id,
                name: item["name"].as_str().unwrap_or_default().to_string(),
                level: item["level"].as_u64().unwrap_or_default() as u32,
                rank: rank(item, weights),
                equipped: if equipped { "X".to_string() } else { String::new() },
                wowhead_url: wowhead_link(locale, id),
                slot,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.slot.cmp(&b.slot).then(b.rank.total_cmp(&a.rank)));

    info!("Currently equipped ranking:");
    for (slot, equipped_rank) in &equipped_ranks {
        info!("- {}: {}", slot, equipped_rank);
        rows.retain(|row| row.slot != *slot || row.rank >= *equipped_rank);
    }
    rows
}

/// Fetch the character's gear and every candidate upgrade, then rank them.
pub async fn rank_upgrades(
    client: &mut BnetClient,
    cache: &mut ItemCache,
    weights: &BTreeMap<String, f64>,
) -> Result<Fetch<Vec<RankedRow>>, BnetError> {
    info!("Reading character's equipment...");
    let equipment = match client.character_equipment(cache).await? {
        Fetch::Data(e) => e,
        Fetch::Unavailable(reason) => return Ok(Fetch::Unavailable(reason)),
    };

    info!("Reading top items...");
    let mut candidates = Vec::new();
    for (slot, item) in &equipment {
        let level = item["level"].as_u64().unwrap_or_default() as u32;
        match client.top_items(level, slot, cache).await? {
            Fetch::Data(items) => candidates.extend(items),
            Fetch::Unavailable(reason) => warn!("No candidates for {}: {}", slot, reason),
        }
    }

    info!("Ranking items based on given stat weights...");
    let locale = client.settings().locale;
    Ok(Fetch::Data(build_rows(&equipment, &candidates, weights, locale)))
}
