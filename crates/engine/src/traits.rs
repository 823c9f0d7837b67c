//! Trait vocabulary and behavioral modifiers.
//!
//! An actor's trait text is free-form; the engine reads it as a bag of flags
//! detected by case-insensitive substring match against a fixed vocabulary.
//! The featurizer exposes the flags in vocabulary order, so the list below is
//! part of the observation contract: extending it changes `N_OBS`.
//!
//! Behavioral consequences (how a trait bends the heuristic policy) are not
//! hardwired; they come from a [`TraitCatalog`] passed into policy
//! construction.

use serde::{Deserialize, Serialize};

/// Number of trait flags in the observation vector.
pub const NUM_TRAIT_FLAGS: usize = 10;

/// The fixed trait vocabulary, in observation order.
pub const TRAIT_KEYWORDS: [&str; NUM_TRAIT_FLAGS] = [
    "regeneration",
    "pack_tactics",
    "skirmisher",
    "nimble",
    "brute",
    "reckless",
    "reach",
    "ambusher",
    "magic_resistance",
    "spellcaster",
];

/// Whether `keyword` occurs in the trait text. Underscored keywords also
/// match their spaced spelling ("pack tactics").
pub fn trait_matches(traits: &str, keyword: &str) -> bool {
    let haystack = traits.to_lowercase();
    haystack.contains(keyword) || haystack.contains(&keyword.replace('_', " "))
}

/// Detects the full flag vector for an actor's trait text.
pub fn trait_flags(traits: &str) -> [bool; NUM_TRAIT_FLAGS] {
    let mut flags = [false; NUM_TRAIT_FLAGS];
    if traits.is_empty() {
        return flags;
    }
    for (i, keyword) in TRAIT_KEYWORDS.iter().enumerate() {
        flags[i] = trait_matches(traits, keyword);
    }
    flags
}

/// Decision-making adjustments a trait grants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitModifiers {
    pub prefer_melee: bool,
    pub prefer_ranged: bool,
    pub hit_and_run: bool,
    pub prefer_damage: bool,
    pub prefer_control: bool,
    pub reach_bonus: i32,
}

impl TraitModifiers {
    /// Folds another rule's modifiers into this one.
    fn merge(&mut self, other: &TraitModifiers) {
        self.prefer_melee |= other.prefer_melee;
        self.prefer_ranged |= other.prefer_ranged;
        self.hit_and_run |= other.hit_and_run;
        self.prefer_damage |= other.prefer_damage;
        self.prefer_control |= other.prefer_control;
        self.reach_bonus += other.reach_bonus;
    }
}

/// One catalog entry: a keyword and the modifiers it grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRule {
    pub keyword: String,
    pub modifiers: TraitModifiers,
}

/// Explicit trait-to-modifier configuration, passed into policy
/// construction rather than loaded lazily from disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCatalog {
    pub rules: Vec<TraitRule>,
}

impl TraitCatalog {
    /// Accumulated modifiers for an actor's trait text.
    pub fn modifiers_for(&self, traits: &str) -> TraitModifiers {
        let mut merged = TraitModifiers::default();
        if traits.is_empty() {
            return merged;
        }
        for rule in &self.rules {
            if trait_matches(traits, &rule.keyword) {
                merged.merge(&rule.modifiers);
            }
        }
        merged
    }
}

impl Default for TraitCatalog {
    fn default() -> Self {
        let rule = |keyword: &str, modifiers: TraitModifiers| TraitRule {
            keyword: keyword.to_string(),
            modifiers,
        };
        Self {
            rules: vec![
                rule("skirmisher", TraitModifiers { hit_and_run: true, ..Default::default() }),
                rule("nimble", TraitModifiers { hit_and_run: true, ..Default::default() }),
                rule("brute", TraitModifiers { prefer_damage: true, ..Default::default() }),
                rule("reckless", TraitModifiers { prefer_damage: true, ..Default::default() }),
                rule("pack_tactics", TraitModifiers { prefer_melee: true, ..Default::default() }),
                rule("ambusher", TraitModifiers { prefer_ranged: true, ..Default::default() }),
                rule("spellcaster", TraitModifiers { prefer_control: true, ..Default::default() }),
                rule("reach", TraitModifiers { reach_bonus: 1, ..Default::default() }),
            ],
        }
    }
}
