use std::collections::HashMap;

use lazy_static::lazy_static;

use super::record::{NutritionRecord, NutritionSource};

/// (name, kcal, protein, carbs, fat) per 100 g.
///
/// Substring matching returns the first hit in this order, so compound names
/// sit above the single words they contain.
const TABLE: &[(&str, f64, f64, f64, f64)] = &[
    ("pineapple", 50.0, 0.5, 13.0, 0.1),
    ("apple", 52.0, 0.3, 14.0, 0.2),
    ("banana", 89.0, 1.1, 23.0, 0.3),
    ("orange", 47.0, 0.9, 12.0, 0.1),
    ("strawberry", 32.0, 0.7, 7.7, 0.3),
    ("lemon", 29.0, 1.1, 9.3, 0.3),
    ("broccoli", 34.0, 2.8, 7.0, 0.4),
    ("carrot", 41.0, 0.9, 10.0, 0.2),
    ("cucumber", 15.0, 0.7, 3.6, 0.1),
    ("mushroom", 22.0, 3.1, 3.3, 0.3),
    ("caesar salad", 190.0, 5.0, 8.0, 16.0),
    ("salad", 20.0, 1.5, 3.5, 0.2),
    ("cheeseburger", 303.0, 15.0, 30.0, 14.0),
    ("hamburger", 295.0, 17.0, 24.0, 14.0),
    ("hot dog", 290.0, 10.0, 24.0, 17.0),
    ("french fries", 312.0, 3.4, 41.0, 15.0),
    ("pizza", 266.0, 11.0, 33.0, 10.0),
    ("burrito", 206.0, 8.0, 26.0, 7.5),
    ("sandwich", 250.0, 11.0, 28.0, 10.0),
    ("sushi", 143.0, 5.8, 28.0, 0.6),
    ("fried rice", 163.0, 3.9, 30.0, 2.5),
    ("rice", 130.0, 2.7, 28.0, 0.3),
    ("spaghetti", 158.0, 5.8, 31.0, 0.9),
    ("pasta", 131.0, 5.0, 25.0, 1.1),
    ("bagel", 257.0, 10.0, 50.0, 1.6),
    ("pretzel", 380.0, 10.0, 80.0, 2.6),
    ("bread", 265.0, 9.0, 49.0, 3.2),
    ("chicken breast", 165.0, 31.0, 0.0, 3.6),
    ("chicken wings", 203.0, 30.0, 0.0, 8.1),
    ("steak", 271.0, 25.0, 0.0, 19.0),
    ("salmon", 208.0, 20.0, 0.0, 13.0),
    ("egg", 155.0, 13.0, 1.1, 11.0),
    ("guacamole", 157.0, 2.0, 8.5, 14.7),
    ("soup", 40.0, 2.0, 5.0, 1.2),
    ("chocolate cake", 371.0, 5.0, 53.0, 16.0),
    ("ice cream", 207.0, 3.5, 24.0, 11.0),
    ("donut", 452.0, 4.9, 51.0, 25.0),
];

const DEFAULT_FACTS: (f64, f64, f64, f64) = (200.0, 10.0, 20.0, 8.0);

lazy_static! {
    static ref EXACT_INDEX: HashMap<&'static str, usize> = TABLE
        .iter()
        .enumerate()
        .map(|(i, row)| (row.0, i))
        .collect();
}

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn record_at(idx: usize) -> NutritionRecord {
    let (_, kcal, protein, carbs, fat) = TABLE[idx];
    NutritionRecord::new(kcal, protein, carbs, fat, NutritionSource::Local)
}

/// Exact match first, then substring containment either way in table order.
pub fn lookup(name: &str) -> Option<NutritionRecord> {
    let query = normalize(name);
    if query.is_empty() {
        return None;
    }
    if let Some(&idx) = EXACT_INDEX.get(query.as_str()) {
        return Some(record_at(idx));
    }
    TABLE
        .iter()
        .position(|row| row.0.contains(query.as_str()) || query.contains(row.0))
        .map(record_at)
}

pub fn default_record() -> NutritionRecord {
    let (kcal, protein, carbs, fat) = DEFAULT_FACTS;
    NutritionRecord::new(kcal, protein, carbs, fat, NutritionSource::Local)
}

/// Never fails: unknown names get the generic default.
pub fn resolve_local(name: &str) -> NutritionRecord {
    lookup(name).unwrap_or_else(default_record)
}

#[cfg(test)]
mod local_table_tests {
    use super::*;

    #[test]
    fn apple_exact_match() {
        let r = resolve_local("apple");
        assert_eq!(r, NutritionRecord::new(52.0, 0.3, 14.0, 0.2, NutritionSource::Local));
    }

    #[test]
    fn lookup_is_trimmed_and_case_insensitive() {
        assert_eq!(resolve_local(" Apple "), resolve_local("apple"));
        assert_eq!(resolve_local("PIZZA").kcal_per_100g(), 266.0);
    }

    #[test]
    fn query_containing_a_key_matches() {
        assert_eq!(resolve_local("pepperoni pizza").kcal_per_100g(), 266.0);
    }

    #[test]
    fn key_containing_the_query_matches_in_table_order() {
        // "chicken" is inside both chicken entries; the first one wins.
        assert_eq!(resolve_local("chicken").kcal_per_100g(), 165.0);
    }

    #[test]
    fn exact_match_beats_earlier_substring_hit() {
        // "rice" appears inside "fried rice", which is listed first.
        assert_eq!(resolve_local("rice").kcal_per_100g(), 130.0);
    }

    #[test]
    fn unknown_food_gets_default() {
        let r = resolve_local("quantum soufflé xyz");
        assert_eq!(r, NutritionRecord::new(200.0, 10.0, 20.0, 8.0, NutritionSource::Local));
    }

    #[test]
    fn blank_query_gets_default() {
        assert!(lookup("   ").is_none());
        assert_eq!(resolve_local(""), default_record());
    }

    #[test]
    fn keys_are_already_normalized_and_unique() {
        assert_eq!(EXACT_INDEX.len(), TABLE.len());
        for row in TABLE {
            assert_eq!(normalize(row.0), row.0);
        }
    }

    #[test]
    fn compound_keys_precede_the_words_they_contain() {
        for (i, outer) in TABLE.iter().enumerate() {
            for (j, inner) in TABLE.iter().enumerate() {
                if i != j && outer.0.contains(inner.0) {
                    assert!(i < j, "{:?} must be listed before {:?}", outer.0, inner.0);
                }
            }
        }
    }

    #[test]
    fn pineapple_phrase_is_not_taken_for_apple() {
        assert_eq!(resolve_local("pineapple juice").kcal_per_100g(), 50.0);
        assert_eq!(resolve_local("apple pie").kcal_per_100g(), 52.0);
    }
}
