use crate::catalog::{CatalogSnapshot, Vehicle, rating_key};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Control state of the catalog filters. Empty selections mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub nations: BTreeSet<String>,
    pub class: Option<String>,
    pub ratings: BTreeSet<String>,
    pub search: String,
}

impl FilterState {
    pub fn with_nation(mut self, nation: &str) -> Self {
        self.nations.insert(nation.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_rating(mut self, rating: &str) -> Self {
        self.ratings.insert(rating.to_string());
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    /// Toggles a nation chip; returns whether it is now selected.
    pub fn toggle_nation(&mut self, nation: &str) -> bool {
        if self.nations.remove(nation) {
            false
        } else {
            self.nations.insert(nation.to_string());
            true
        }
    }

    pub fn toggle_rating(&mut self, rating: &str) -> bool {
        if self.ratings.remove(rating) {
            false
        } else {
            self.ratings.insert(rating.to_string());
            true
        }
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if !self.nations.is_empty() && !self.nations.contains(&vehicle.nation) {
            return false;
        }
        if let Some(class) = self.class.as_deref().filter(|class| !class.is_empty())
            && vehicle.class != class
        {
            return false;
        }
        if !self.ratings.is_empty() && !self.ratings.contains(&vehicle.rating) {
            return false;
        }
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            vehicle.name,
            vehicle.rank,
            vehicle.notes.as_deref().unwrap_or("")
        )
        .to_lowercase();
        haystack.contains(&query)
    }

    /// Filtered vehicles in catalog order.
    pub fn apply<'a>(&self, catalog: &'a CatalogSnapshot) -> Vec<&'a Vehicle> {
        catalog
            .vehicles
            .iter()
            .filter(|vehicle| self.matches(vehicle))
            .collect()
    }
}

/// Distinct ratings present in the catalog, in rating-step order.
pub fn available_ratings(catalog: &CatalogSnapshot) -> Vec<&str> {
    let mut ratings: Vec<&str> = catalog
        .vehicles
        .iter()
        .map(|vehicle| vehicle.rating.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    ratings.sort_by(|a, b| rating_key(a).cmp(&rating_key(b)));
    ratings
}

/// Rank labels with vehicle counts, sorted by label.
pub fn rank_summary(vehicles: &[&Vehicle]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for vehicle in vehicles {
        *counts.entry(vehicle.rank.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(rank, count)| (rank.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Vehicle::new("m4a1", "M4A1", "usa", "medium", "III", "4.0"),
            Vehicle::new("t34", "T-34", "ussr", "medium", "III", "4.0").with_notes("Wartime"),
            Vehicle::new("m1", "M1 Abrams", "usa", "mbt", "VII", "10.3"),
            Vehicle::new("m24", "M24", "usa", "light", "II", "2.7"),
        ])
    }

    fn ids(list: &[&Vehicle]) -> Vec<String> {
        list.iter().map(|vehicle| vehicle.id.clone()).collect()
    }

    #[test]
    fn empty_filter_keeps_catalog_order() {
        let catalog = catalog();
        let list = FilterState::default().apply(&catalog);
        assert_eq!(ids(&list), vec!["m4a1", "t34", "m1", "m24"]);
    }

    #[test]
    fn combines_nation_class_and_rating() {
        let catalog = catalog();
        let filter = FilterState::default()
            .with_nation("usa")
            .with_class("medium")
            .with_rating("4.0");
        assert_eq!(ids(&filter.apply(&catalog)), vec!["m4a1"]);
    }

    #[test]
    fn search_matches_name_rank_and_notes() {
        let catalog = catalog();
        assert_eq!(
            ids(&FilterState::default().with_search("abrams").apply(&catalog)),
            vec!["m1"]
        );
        assert_eq!(
            ids(&FilterState::default().with_search("  WARTIME ").apply(&catalog)),
            vec!["t34"]
        );
        assert_eq!(
            ids(&FilterState::default().with_search("vii").apply(&catalog)),
            vec!["m1"]
        );
    }

    #[test]
    fn toggling_chips() {
        let mut filter = FilterState::default();
        assert!(filter.toggle_nation("usa"));
        assert!(!filter.toggle_nation("usa"));
        assert!(filter.nations.is_empty());
        assert!(filter.toggle_rating("4.0"));
        assert!(filter.ratings.contains("4.0"));
    }

    #[test]
    fn ratings_follow_step_order() {
        let mut catalog = catalog();
        catalog
            .vehicles
            .push(Vehicle::new("x", "X", "usa", "mbt", "VII", "9.7"));
        assert_eq!(available_ratings(&catalog), vec!["2.7", "4.0", "9.7", "10.3"]);
    }

    #[test]
    fn rank_summary_counts() {
        let catalog = catalog();
        let list = FilterState::default().apply(&catalog);
        assert_eq!(
            rank_summary(&list),
            vec![
                ("II".to_string(), 1),
                ("III".to_string(), 2),
                ("VII".to_string(), 1)
            ]
        );
    }
}
