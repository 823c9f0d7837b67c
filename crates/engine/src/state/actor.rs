//! Actor records: creatures, their attacks, spells, and special abilities.
//!
//! These are the structured records the engine consumes; parsing free-form
//! stat blocks into them is an ingestion concern handled elsewhere. Records
//! that differ in resolution policy carry a sum-typed effect so the resolver
//! can dispatch without inspecting strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use super::Position;

/// The six ability scores every actor carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

/// Fixed ability-score map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    #[serde(rename = "STR")]
    pub str: i32,
    #[serde(rename = "DEX")]
    pub dex: i32,
    #[serde(rename = "CON")]
    pub con: i32,
    #[serde(rename = "INT")]
    pub int: i32,
    #[serde(rename = "WIS")]
    pub wis: i32,
    #[serde(rename = "CHA")]
    pub cha: i32,
}

impl AbilityScores {
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    /// `floor((score - 10) / 2)`, exact for scores below 10.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.score(ability) - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    /// All 10: an average creature.
    fn default() -> Self {
        Self { str: 10, dex: 10, con: 10, int: 10, wis: 10, cha: 10 }
    }
}

/// The closed vocabulary of condition tags tracked per actor.
///
/// The featurizer exposes exactly these ten as flags, in declaration order;
/// extending the vocabulary changes `N_OBS` and requires a schema bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumCount, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Prone,
    Stunned,
    Poisoned,
    Frightened,
    Restrained,
    Grappled,
    Blinded,
    Paralyzed,
    Charmed,
    Deafened,
}

/// Delivery classification for weapon attacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    #[default]
    Melee,
    Ranged,
    Both,
}

impl AttackKind {
    pub fn is_melee(self) -> bool {
        matches!(self, AttackKind::Melee | AttackKind::Both)
    }

    pub fn is_ranged(self) -> bool {
        matches!(self, AttackKind::Ranged | AttackKind::Both)
    }
}

/// A weapon or natural attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub name: String,
    pub to_hit: i32,
    pub damage: String,
    pub range_ft: i32,
    #[serde(default)]
    pub attack_type: AttackKind,
}

/// How a spell resolves against its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellEffect {
    /// Spell attack roll against AC.
    Attack { to_hit: i32 },
    /// Saving throw against the caster's DC; half damage on success.
    Save { dc: i32, save: Ability },
}

/// A damaging spell known by an actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellRecord {
    pub name: String,
    pub range_ft: i32,
    pub damage: String,
    #[serde(flatten)]
    pub effect: SpellEffect,
}

impl SpellRecord {
    pub fn is_attack(&self) -> bool {
        matches!(self.effect, SpellEffect::Attack { .. })
    }

    pub fn is_save(&self) -> bool {
        matches!(self.effect, SpellEffect::Save { .. })
    }
}

/// How a special ability resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityEffect {
    Attack {
        to_hit: i32,
    },
    Save {
        dc: i32,
        save: Ability,
        /// Condition appended to the target's list on a failed save.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
    },
    /// No attack or save; consumes the standard action.
    Utility,
}

/// A special ability (breath weapon, howl, burrow, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub name: String,
    pub range_ft: i32,
    #[serde(default)]
    pub damage: String,
    #[serde(flatten)]
    pub effect: AbilityEffect,
    /// Recharge abilities go unavailable after use and are restored by a
    /// start-of-turn d6 roll of 5+.
    #[serde(default)]
    pub recharge: bool,
    /// Limited-use abilities; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<u32>,
}

/// A combatant on either roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub speed_ft: i32,
    pub pos: Position,
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub attacks: Vec<AttackRecord>,
    #[serde(default)]
    pub spells: Vec<SpellRecord>,
    #[serde(default)]
    pub special_abilities: Vec<SpecialAbility>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Free-form trait text, interrogated by substring against the fixed
    /// trait vocabulary.
    #[serde(default)]
    pub traits: String,
    /// Recharge availability by ability name. Absent means available.
    #[serde(default)]
    pub ability_recharge: BTreeMap<String, bool>,
    /// Remaining uses by ability name. Absent means the record's full count.
    #[serde(default)]
    pub ability_uses: BTreeMap<String, u32>,
    #[serde(default)]
    pub dodging: bool,
    #[serde(default)]
    pub dashing: bool,
    #[serde(default)]
    pub disengaging: bool,
}

impl Actor {
    /// Minimal constructor; callers fill in attacks and the rest.
    pub fn new(name: impl Into<String>, hp: i32, ac: i32, speed_ft: i32, pos: Position) -> Self {
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            ac,
            speed_ft,
            pos,
            abilities: AbilityScores::default(),
            attacks: Vec::new(),
            spells: Vec::new(),
            special_abilities: Vec::new(),
            conditions: Vec::new(),
            traits: String::new(),
            ability_recharge: BTreeMap::new(),
            ability_uses: BTreeMap::new(),
            dodging: false,
            dashing: false,
            disengaging: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Appends a condition tag, idempotently.
    pub fn add_condition(&mut self, condition: Condition) -> bool {
        if self.conditions.contains(&condition) {
            return false;
        }
        self.conditions.push(condition);
        true
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Whether a special ability can be used right now: recharge flag up and
    /// uses remaining.
    pub fn ability_available(&self, ability: &SpecialAbility) -> bool {
        if ability.recharge && !self.ability_recharge.get(&ability.name).copied().unwrap_or(true) {
            return false;
        }
        if let Some(total) = ability.uses {
            let remaining = self.ability_uses.get(&ability.name).copied().unwrap_or(total);
            if remaining == 0 {
                return false;
            }
        }
        true
    }

    /// Marks a recharge ability spent.
    pub fn expend_recharge(&mut self, name: &str) {
        self.ability_recharge.insert(name.to_string(), false);
    }

    /// Decrements a limited-use counter, flooring at zero.
    pub fn expend_use(&mut self, name: &str, total: u32) {
        let remaining = self.ability_uses.get(name).copied().unwrap_or(total);
        self.ability_uses.insert(name.to_string(), remaining.saturating_sub(1));
    }

    /// Clears the per-turn stance flags at the start of this actor's turn.
    pub fn clear_stances(&mut self) {
        self.dodging = false;
        self.dashing = false;
        self.disengaging = false;
    }
}
