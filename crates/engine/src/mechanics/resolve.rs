//! Attack, save, and ability resolution primitives.
//!
//! These are pure with respect to actor state: they roll and report, and the
//! action-application layer decides what to mutate. A natural 1 always
//! misses, a natural 20 always hits and doubles the damage-dice count, and a
//! successful save halves damage with integer division.

use serde::{Deserialize, Serialize};

use crate::state::{
    AbilityEffect, Actor, AttackRecord, Condition, SpecialAbility, SpellEffect, SpellRecord,
};

use super::dice::Dice;

/// Outcome of a d20 attack roll against AC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub hit: bool,
    pub crit: bool,
    pub crit_miss: bool,
    pub roll: i32,
    pub total: i32,
    pub target_ac: i32,
    pub damage: i32,
}

/// Outcome of a saving throw against a DC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRoll {
    pub saved: bool,
    pub roll: i32,
    pub total: i32,
    pub dc: i32,
    pub damage: i32,
}

/// Outcome of a special ability, dispatched on its effect kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityOutcome {
    Attack(AttackRoll),
    Save {
        roll: SaveRoll,
        /// Condition to apply to the target; set only on a failed save.
        condition: Option<Condition>,
    },
    Utility,
}

/// Result of applying damage to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub damage: i32,
    pub old_hp: i32,
    pub new_hp: i32,
    /// True when this damage took the target from alive to downed.
    pub downed: bool,
}

/// Rolls d20 + `to_hit` against `target_ac` and, on a hit, rolls damage.
pub fn attack_roll(to_hit: i32, target_ac: i32, damage: &str, dice: &mut Dice) -> AttackRoll {
    let roll = dice.d20();
    let total = roll + to_hit;

    let mut outcome = AttackRoll {
        hit: false,
        crit: false,
        crit_miss: false,
        roll,
        total,
        target_ac,
        damage: 0,
    };

    if roll == 1 {
        outcome.crit_miss = true;
        return outcome;
    }
    if roll == 20 {
        outcome.hit = true;
        outcome.crit = true;
    } else if total >= target_ac {
        outcome.hit = true;
    }
    if outcome.hit {
        outcome.damage = dice.damage(damage, outcome.crit);
    }
    outcome
}

/// Rolls d20 + `save_mod` against `dc`; full damage on failure, half
/// (integer division) on success.
pub fn save_roll(dc: i32, save_mod: i32, damage: &str, dice: &mut Dice) -> SaveRoll {
    let roll = dice.d20();
    let total = roll + save_mod;
    let saved = total >= dc;

    let full = dice.damage(damage, false);
    let damage = if saved { full / 2 } else { full };

    SaveRoll { saved, roll, total, dc, damage }
}

/// Resolves a weapon attack against a target.
pub fn resolve_attack(target: &Actor, attack: &AttackRecord, dice: &mut Dice) -> AttackRoll {
    attack_roll(attack.to_hit, target.ac, &attack.damage, dice)
}

/// Resolves a spell with an attack roll. Callers must have checked the spell
/// is attack-typed; save spells resolve through [`resolve_spell_save`].
pub fn resolve_spell_attack(target: &Actor, spell: &SpellRecord, dice: &mut Dice) -> Option<AttackRoll> {
    match spell.effect {
        SpellEffect::Attack { to_hit } => Some(attack_roll(to_hit, target.ac, &spell.damage, dice)),
        SpellEffect::Save { .. } => None,
    }
}

/// Resolves a save-or-suffer spell against the target's save modifier.
pub fn resolve_spell_save(target: &Actor, spell: &SpellRecord, dice: &mut Dice) -> Option<SaveRoll> {
    match spell.effect {
        SpellEffect::Save { dc, save } => {
            let save_mod = target.abilities.modifier(save);
            Some(save_roll(dc, save_mod, &spell.damage, dice))
        }
        SpellEffect::Attack { .. } => None,
    }
}

/// Resolves a special ability, dispatching on its effect kind. Save-typed
/// abilities report the condition to apply when the target failed.
pub fn resolve_ability(target: &Actor, ability: &SpecialAbility, dice: &mut Dice) -> AbilityOutcome {
    match ability.effect {
        AbilityEffect::Attack { to_hit } => {
            AbilityOutcome::Attack(attack_roll(to_hit, target.ac, &ability.damage, dice))
        }
        AbilityEffect::Save { dc, save, condition } => {
            let save_mod = target.abilities.modifier(save);
            let roll = save_roll(dc, save_mod, &ability.damage, dice);
            let condition = if roll.saved { None } else { condition };
            AbilityOutcome::Save { roll, condition }
        }
        AbilityEffect::Utility => AbilityOutcome::Utility,
    }
}

/// Applies damage, flooring hp at zero, and reports the transition.
pub fn apply_damage(target: &mut Actor, amount: i32) -> DamageReport {
    let old_hp = target.hp;
    target.hp = (old_hp - amount).max(0);
    DamageReport {
        damage: amount,
        old_hp,
        new_hp: target.hp,
        downed: target.hp == 0 && old_hp > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Ability, Position};

    fn dummy(ac: i32) -> Actor {
        let mut actor = Actor::new("dummy", 20, ac, 30, Position::new(0, 0));
        actor.abilities.dex = 10;
        actor
    }

    #[test]
    fn natural_one_never_hits_and_natural_twenty_always_does() {
        let mut dice = Dice::new(11);
        // Against AC 0 with +30 to hit every non-1 roll clears AC; against
        // AC 100 only a natural 20 can hit. Scan enough rolls to see both
        // boundary faces.
        let mut saw_crit = false;
        let mut saw_crit_miss = false;
        for _ in 0..600 {
            let vs_easy = attack_roll(30, 0, "1d1", &mut dice);
            if vs_easy.crit_miss {
                saw_crit_miss = true;
                assert_eq!(vs_easy.roll, 1);
                assert!(!vs_easy.hit);
                assert_eq!(vs_easy.damage, 0);
            } else {
                assert!(vs_easy.hit);
            }

            let vs_hard = attack_roll(0, 100, "1d1", &mut dice);
            if vs_hard.hit {
                saw_crit = true;
                assert_eq!(vs_hard.roll, 20);
                assert!(vs_hard.crit);
                // d1 dice: a crit rolls exactly two of them.
                assert_eq!(vs_hard.damage, 2);
            }
        }
        assert!(saw_crit && saw_crit_miss);
    }

    #[test]
    fn crit_doubles_dice_count_only() {
        let mut dice = Dice::new(3);
        for _ in 0..600 {
            let outcome = attack_roll(30, 0, "2d1+3", &mut dice);
            if outcome.crit {
                assert_eq!(outcome.damage, 7);
            } else if outcome.hit {
                assert_eq!(outcome.damage, 5);
            }
        }
    }

    #[test]
    fn successful_save_halves_with_integer_division() {
        let mut dice = Dice::new(5);
        // Flat 9 damage keeps the halving observable: 9 on fail, 4 on save.
        let always_saves = save_roll(1, 20, "9", &mut dice);
        assert!(always_saves.saved);
        assert_eq!(always_saves.damage, 4);

        let never_saves = save_roll(40, 0, "9", &mut dice);
        assert!(!never_saves.saved);
        assert_eq!(never_saves.damage, 9);
    }

    #[test]
    fn spell_resolution_enforces_the_type_gate() {
        let mut dice = Dice::new(1);
        let target = dummy(10);
        let save_spell = SpellRecord {
            name: "Burning Hands".into(),
            range_ft: 15,
            damage: "3d6".into(),
            effect: SpellEffect::Save { dc: 13, save: Ability::Dex },
        };
        assert!(resolve_spell_attack(&target, &save_spell, &mut dice).is_none());
        assert!(resolve_spell_save(&target, &save_spell, &mut dice).is_some());
    }

    #[test]
    fn failed_save_reports_the_condition() {
        let mut dice = Dice::new(9);
        let mut target = dummy(10);
        target.abilities.str = 1; // -5 save modifier: dc 30 is unreachable
        let slam = SpecialAbility {
            name: "Slam".into(),
            range_ft: 5,
            damage: "5".into(),
            effect: AbilityEffect::Save {
                dc: 30,
                save: Ability::Str,
                condition: Some(Condition::Prone),
            },
            recharge: false,
            uses: None,
        };
        match resolve_ability(&target, &slam, &mut dice) {
            AbilityOutcome::Save { roll, condition } => {
                assert!(!roll.saved);
                assert_eq!(roll.damage, 5);
                assert_eq!(condition, Some(Condition::Prone));
            }
            other => panic!("expected save outcome, got {other:?}"),
        }
    }

    #[test]
    fn damage_floors_at_zero_and_reports_downing() {
        let mut actor = dummy(10);
        actor.hp = 3;
        let report = apply_damage(&mut actor, 10);
        assert_eq!(report.new_hp, 0);
        assert!(report.downed);

        let again = apply_damage(&mut actor, 5);
        assert_eq!(again.new_hp, 0);
        assert!(!again.downed);
    }
}
