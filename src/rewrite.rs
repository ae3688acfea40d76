use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::UpdateError;
use crate::formatter::Updater;
use crate::items::legacy_item_name;
use crate::value::{Compound, Value};

/// Keys whose nested compounds keep numeric ids as-is. These hold data
/// (enchantment ids, potion effect ids, map decorations) where the numeric
/// form is still the 1.9 wire format.
const KEEP_ID_KEYS: [&str; 5] = ["ench", "CustomPotionEffects", "SkullOwner", "Decorations", "tag"];

/// A legacy numeric item id, with an optional type suffix to strip.
static ITEM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)[bBsSlL]?$").unwrap());

impl Updater {
    /// Rewrite a top-level entity tag. `base_entity` is the entity the tag
    /// is attached to, used when a `Riding` chain is inverted: the returned
    /// string, when present, is the mount's type and should replace the
    /// entity token in the surrounding command.
    pub fn rewrite_compound(
        &self,
        tag: Compound,
        base_entity: Option<&str>,
    ) -> Result<(Compound, Option<String>), UpdateError> {
        self.rewrite_tag(tag, base_entity, true, true)
    }

    /// Rewrite a nested tag in place. No `Riding` inversion happens at this
    /// level; the chain is flattened bottom-up as recursion unwinds.
    pub(crate) fn rewrite_nested(
        &self,
        tag: Compound,
        remap_ids: bool,
    ) -> Result<Compound, UpdateError> {
        let (tag, _) = self.rewrite_tag(tag, None, remap_ids, false)?;
        Ok(tag)
    }

    fn rewrite_tag(
        &self,
        tag: Compound,
        base_entity: Option<&str>,
        remap_ids: bool,
        is_root: bool,
    ) -> Result<(Compound, Option<String>), UpdateError> {
        let mut out = Compound::new();
        for (key, value) in tag {
            let child_remap = remap_ids && !KEEP_ID_KEYS.contains(&key.as_str());
            let rewritten = match value {
                Value::Compound(child) => {
                    Value::Compound(self.rewrite_nested(child, child_remap)?)
                }
                Value::List(items) => Value::List(self.rewrite_list(items, child_remap)?),
                scalar => scalar,
            };
            out.insert(key, rewritten);
        }
        let mut tag = out;

        if self.options().remap_ids && remap_ids {
            let digits = match tag.get("id") {
                Some(Value::Scalar(id)) => ITEM_ID.captures(id).map(|caps| caps[1].to_string()),
                _ => None,
            };
            if let Some(digits) = digits {
                let name = digits
                    .parse::<i32>()
                    .ok()
                    .and_then(legacy_item_name)
                    .ok_or_else(|| UpdateError::UnknownItemId { id: digits.clone() })?;
                tag.insert(
                    "id".to_string(),
                    Value::scalar(format!("\"minecraft:{}\"", name)),
                );
            }
        }

        // Command blocks carry a quoted command string of their own.
        if let Some(Value::Scalar(command)) = tag.get("Command").cloned() {
            let inner = if command.len() >= 2
                && command.starts_with('"')
                && command.ends_with('"')
            {
                &command[1..command.len() - 1]
            } else {
                command.as_str()
            };
            let updated = self.format_command(inner)?;
            tag.insert(
                "Command".to_string(),
                Value::scalar(format!("\"{}\"", updated)),
            );
        }

        // Equipment[weapon, armor...] splits into HandItems and ArmorItems.
        if let Some(Value::List(mut equipment)) = tag.get("Equipment").cloned() {
            tag.shift_remove("Equipment");
            let hand = if equipment.is_empty() {
                Value::empty_compound()
            } else {
                equipment.remove(0)
            };
            tag.insert(
                "HandItems".to_string(),
                Value::List(vec![hand, Value::empty_compound()]),
            );
            tag.insert("ArmorItems".to_string(), Value::List(equipment));
        }

        if let Some(health) = tag.shift_remove("HealF") {
            tag.insert("Health".to_string(), health);
        }

        if let Some(Value::List(mut chances)) = tag.get("DropChances").cloned() {
            tag.shift_remove("DropChances");
            let hand = if chances.is_empty() {
                Vec::new()
            } else {
                let first = chances.remove(0);
                vec![first.clone(), first]
            };
            tag.insert("HandDropChances".to_string(), Value::List(hand));
            tag.insert("ArmorDropChances".to_string(), Value::List(chances));
        }

        // Invert Riding: the ridden entity becomes the outer tag, carrying
        // the rider in its Passengers list.
        let mut mounted = false;
        if let Some(Value::Compound(riding)) = tag.get("Riding").cloned() {
            tag.shift_remove("Riding");
            let mut mount = self.rewrite_nested(riding, remap_ids)?;
            let mut rider = tag;
            // The rider is about to become a passenger, so its id must name
            // the entity the surrounding command was summoning.
            if let Some(base) = base_entity {
                rider.insert("id".to_string(), Value::scalar(base));
            }
            let slot = mount
                .entry("Passengers".to_string())
                .or_insert_with(|| Value::List(Vec::new()));
            if !matches!(slot, Value::List(_)) {
                *slot = Value::List(Vec::new());
            }
            if let Value::List(passengers) = slot {
                passengers.push(Value::Compound(rider));
            }
            tag = mount;
            mounted = true;
        }

        if is_root && mounted && matches!(tag.get("id"), Some(Value::Scalar(_))) {
            if let Some(Value::Scalar(id)) = tag.shift_remove("id") {
                return Ok((tag, Some(id)));
            }
        }
        Ok((tag, None))
    }

    fn rewrite_list(
        &self,
        items: Vec<Value>,
        remap_ids: bool,
    ) -> Result<Vec<Value>, UpdateError> {
        items
            .into_iter()
            .map(|item| match item {
                Value::Compound(child) => {
                    Ok(Value::Compound(self.rewrite_nested(child, remap_ids)?))
                }
                Value::List(inner) => Ok(Value::List(self.rewrite_list(inner, remap_ids)?)),
                scalar => Ok(scalar),
            })
            .collect()
    }
}
