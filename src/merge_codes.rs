//! Merge codes for multi-day stripes.
//!
//! A merge code (`A1`, `B1`, … `Z1`, `A2`, …) stands in for the
//! `mergeWithPrevious` flag in the day-line text form. Codes are assigned in
//! first-encounter order so the same schedule always yields the same codes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::ScheduleDay;

/// How codes are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeCodeStrategy {
    /// One code per display name. Two unrelated runs sharing a name share a
    /// code, which decodes as one long run.
    #[default]
    ByName,
    /// A fresh code for every contiguous run.
    ByRun,
}

/// Code for the i-th merged key (0-based): letter cycles A..Z, number counts laps.
pub fn code_for_index(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    format!("{}{}", letter, index / 26 + 1)
}

/// Display key → merge code, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeCodeMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl MergeCodeMap {
    fn insert_key(&mut self, key: &str) {
        if self.index.contains_key(key) {
            return;
        }
        let code = code_for_index(self.entries.len());
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), code));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// `(key, code)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assign a code to every display key that has at least one
/// `merge_with_previous` occurrence anywhere in the schedule.
pub fn assign_merge_codes(days: &[ScheduleDay]) -> MergeCodeMap {
    let mut map = MergeCodeMap::default();
    for stripe in days.iter().flat_map(|d| d.stripes.iter()) {
        if stripe.merge_with_previous {
            map.insert_key(stripe.display_key());
        }
    }
    map
}

/// Whether the next day in the sequence continues a block keyed `key`.
fn continues_on_next_day(days: &[ScheduleDay], index: usize, key: &str) -> bool {
    days.get(index + 1).is_some_and(|next| {
        next.stripes
            .iter()
            .any(|s| s.merge_with_previous && s.display_key() == key)
    })
}

/// Per-stripe code annotations, indexed `[day][stripe]`.
///
/// A stripe is annotated only when it is part of a merge chain at its
/// position: it continues the previous day, or the next day continues it.
/// The `merge_with_previous` flags are trusted as given.
pub fn stripe_codes(days: &[ScheduleDay], strategy: MergeCodeStrategy) -> Vec<Vec<Option<String>>> {
    match strategy {
        MergeCodeStrategy::ByName => name_keyed_codes(days),
        MergeCodeStrategy::ByRun => run_keyed_codes(days),
    }
}

fn name_keyed_codes(days: &[ScheduleDay]) -> Vec<Vec<Option<String>>> {
    let codes = assign_merge_codes(days);
    days.iter()
        .enumerate()
        .map(|(i, day)| {
            // A second sighting of a code on the same line decodes as a
            // continuation, so each key opens at most one chain per day.
            let mut taken: HashSet<&str> = HashSet::new();
            day.stripes
                .iter()
                .map(|stripe| {
                    let key = stripe.display_key();
                    let in_chain = stripe.merge_with_previous
                        || (!taken.contains(key) && continues_on_next_day(days, i, key));
                    if !in_chain {
                        return None;
                    }
                    taken.insert(key);
                    codes.get(key).map(str::to_string)
                })
                .collect()
        })
        .collect()
}

fn run_keyed_codes(days: &[ScheduleDay]) -> Vec<Vec<Option<String>>> {
    let mut next_index = 0usize;
    let mut open: HashMap<String, String> = HashMap::new();
    let mut result = Vec::with_capacity(days.len());

    for (i, day) in days.iter().enumerate() {
        let mut still_open: HashMap<String, String> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();
        let mut day_codes = Vec::with_capacity(day.stripes.len());

        for stripe in &day.stripes {
            let key = stripe.display_key();
            let continued = if stripe.merge_with_previous && !taken.contains(key) {
                open.get(key).cloned()
            } else {
                None
            };

            let code = match continued {
                Some(code) => Some(code),
                // A continuation with no visible head (e.g. the run started
                // last month) or a head of a new run opens a fresh code.
                None if stripe.merge_with_previous || continues_on_next_day(days, i, key) => {
                    let code = code_for_index(next_index);
                    next_index += 1;
                    Some(code)
                }
                None => None,
            };

            if let Some(ref code) = code {
                taken.insert(key.to_string());
                still_open.insert(key.to_string(), code.clone());
            }
            day_codes.push(code);
        }

        open = still_open;
        result.push(day_codes);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stripe;
    use chrono::NaiveDate;

    fn feb(day: u32, stripes: Vec<Stripe>) -> ScheduleDay {
        ScheduleDay::new(NaiveDate::from_ymd_opt(2026, 2, day).unwrap(), stripes)
    }

    #[test]
    fn test_code_for_index() {
        assert_eq!(code_for_index(0), "A1");
        assert_eq!(code_for_index(1), "B1");
        assert_eq!(code_for_index(25), "Z1");
        assert_eq!(code_for_index(26), "A2");
        assert_eq!(code_for_index(53), "B3");
    }

    #[test]
    fn test_assign_empty_schedule() {
        assert!(assign_merge_codes(&[]).is_empty());
    }

    #[test]
    fn test_assign_in_first_encounter_order() {
        let days = vec![
            feb(2, vec![Stripe::new("SHOOT"), Stripe::new("EDIT")]),
            feb(3, vec![Stripe::continued("EDIT"), Stripe::continued("SHOOT")]),
        ];
        let codes = assign_merge_codes(&days);
        let pairs: Vec<_> = codes.iter().collect();
        assert_eq!(pairs, vec![("EDIT", "A1"), ("SHOOT", "B1")]);
        assert_eq!(codes, assign_merge_codes(&days));
    }

    #[test]
    fn test_assign_keys_by_label() {
        let days = vec![
            feb(2, vec![Stripe::new("X").with_label("Review")]),
            feb(3, vec![Stripe::continued("Y").with_label("Review")]),
        ];
        let codes = assign_merge_codes(&days);
        assert_eq!(codes.get("Review"), Some("A1"));
        assert_eq!(codes.get("Y"), None);
    }

    #[test]
    fn test_twenty_seventh_key_wraps() {
        let days: Vec<ScheduleDay> = (0..27)
            .map(|i| feb(1, vec![Stripe::continued(format!("ACT{}", i))]))
            .collect();
        let codes = assign_merge_codes(&days);
        assert_eq!(codes.len(), 27);
        assert_eq!(codes.get("ACT0"), Some("A1"));
        assert_eq!(codes.get("ACT25"), Some("Z1"));
        assert_eq!(codes.get("ACT26"), Some("A2"));
    }

    #[test]
    fn test_standalone_stripe_sharing_merged_name_gets_no_code() {
        let days = vec![
            feb(2, vec![Stripe::new("DESIGN")]),
            feb(3, vec![Stripe::continued("DESIGN")]),
            feb(4, vec![Stripe::new("AWARD")]),
            feb(5, vec![Stripe::new("DESIGN")]),
        ];
        let codes = stripe_codes(&days, MergeCodeStrategy::ByName);
        assert_eq!(codes[0], vec![Some("A1".to_string())]);
        assert_eq!(codes[1], vec![Some("A1".to_string())]);
        assert_eq!(codes[2], vec![None]);
        assert_eq!(codes[3], vec![None]);
    }

    #[test]
    fn test_by_name_codes_one_head_per_day() {
        let days = vec![
            feb(2, vec![Stripe::new("DESIGN"), Stripe::new("DESIGN")]),
            feb(3, vec![Stripe::continued("DESIGN")]),
        ];
        let codes = stripe_codes(&days, MergeCodeStrategy::ByName);
        assert_eq!(codes[0], vec![Some("A1".to_string()), None]);
        assert_eq!(codes[1], vec![Some("A1".to_string())]);
    }

    #[test]
    fn test_by_name_shares_code_across_runs() {
        let days = vec![
            feb(2, vec![Stripe::new("PREP")]),
            feb(3, vec![Stripe::continued("PREP")]),
            feb(4, vec![]),
            feb(5, vec![Stripe::new("PREP")]),
            feb(6, vec![Stripe::continued("PREP")]),
        ];
        let codes = stripe_codes(&days, MergeCodeStrategy::ByName);
        assert_eq!(codes[3], vec![Some("A1".to_string())]);
        assert_eq!(codes[4], vec![Some("A1".to_string())]);
    }

    #[test]
    fn test_by_run_assigns_fresh_code_per_run() {
        let days = vec![
            feb(2, vec![Stripe::new("PREP"), Stripe::new("EDIT")]),
            feb(3, vec![Stripe::continued("PREP"), Stripe::continued("EDIT")]),
            feb(4, vec![Stripe::new("EDIT")]),
            feb(5, vec![Stripe::new("PREP")]),
            feb(6, vec![Stripe::continued("PREP")]),
        ];
        let codes = stripe_codes(&days, MergeCodeStrategy::ByRun);
        let a1 = Some("A1".to_string());
        let b1 = Some("B1".to_string());
        let c1 = Some("C1".to_string());
        assert_eq!(codes[0], vec![a1.clone(), b1.clone()]);
        assert_eq!(codes[1], vec![a1, b1]);
        assert_eq!(codes[2], vec![None]);
        assert_eq!(codes[3], vec![c1.clone()]);
        assert_eq!(codes[4], vec![c1]);
    }

    #[test]
    fn test_by_run_orphan_continuation_opens_run() {
        let days = vec![
            feb(1, vec![Stripe::continued("TRAVEL")]),
            feb(2, vec![Stripe::continued("TRAVEL")]),
        ];
        let codes = stripe_codes(&days, MergeCodeStrategy::ByRun);
        assert_eq!(codes[0], vec![Some("A1".to_string())]);
        assert_eq!(codes[1], vec![Some("A1".to_string())]);
    }

    #[test]
    fn test_strategy_serde_names() {
        let by_run: MergeCodeStrategy = serde_json::from_str("\"byRun\"").unwrap();
        assert_eq!(by_run, MergeCodeStrategy::ByRun);
        assert_eq!(
            serde_json::to_string(&MergeCodeStrategy::ByName).unwrap(),
            "\"byName\""
        );
    }
}
