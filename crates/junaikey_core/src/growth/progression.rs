//! Persisted progression store: spirits, avatars and profession selection.
//!
//! # Responsibility
//! - Apply experience awards with profession bonuses and level rollover.
//! - Propagate each award to the avatar linked to the target spirit.
//! - Persist the whole progression document on every mutation.
//!
//! # Invariants
//! - Every spirit and avatar satisfies `exp < exp_to_next_level(level)`.
//! - A mutation is committed in memory only after it was persisted.
//! - Unknown spirit ids and profession ids never raise errors.
//!
//! # See also
//! - `crate::growth::leveling` for the threshold curve.

use crate::growth::catalog::{self, Milestone, ProfessionDef};
use crate::growth::leveling::{self, LevelProgress};
use crate::storage::{
    load_or_default, save_document, LoadSource, StoragePort, PROGRESSION_NAMESPACE,
};
use crate::store::StoreResult;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Persisted spirit growth track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spirit {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub exp: u64,
    #[serde(default)]
    pub element: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub description: String,
}

/// Persisted avatar growth track. `spirit_id` is a weak reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub spirit_id: String,
    pub level: u32,
    pub exp: u64,
}

/// Whole progression document as persisted under one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    pub spirits: Vec<Spirit>,
    pub avatars: Vec<Avatar>,
    #[serde(default)]
    pub selected_profession_id: Option<String>,
}

impl ProgressionState {
    /// Fresh state built from the catalog: every entity at level 1.
    pub fn seed() -> Self {
        Self {
            spirits: catalog::SPIRITS
                .iter()
                .map(|def| Spirit {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    level: 1,
                    exp: 0,
                    element: def.element.to_string(),
                    domain: def.domain.to_string(),
                    description: def.description.to_string(),
                })
                .collect(),
            avatars: catalog::AVATARS
                .iter()
                .map(|def| Avatar {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    spirit_id: def.spirit_id.to_string(),
                    level: 1,
                    exp: 0,
                })
                .collect(),
            selected_profession_id: None,
        }
    }

    /// Repairs leveling invariants and appends catalog entries missing from
    /// documents written by older builds. Returns how many entities changed.
    fn rehydrate(&mut self) -> usize {
        let mut repaired = 0;

        for spirit in &mut self.spirits {
            let normalized = leveling::normalize(spirit.level, spirit.exp);
            if (normalized.level, normalized.exp) != (spirit.level, spirit.exp) {
                spirit.level = normalized.level;
                spirit.exp = normalized.exp;
                repaired += 1;
            }
        }
        for avatar in &mut self.avatars {
            let normalized = leveling::normalize(avatar.level, avatar.exp);
            if (normalized.level, normalized.exp) != (avatar.level, avatar.exp) {
                avatar.level = normalized.level;
                avatar.exp = normalized.exp;
                repaired += 1;
            }
        }

        let seed = Self::seed();
        for spirit in seed.spirits {
            if !self.spirits.iter().any(|existing| existing.id == spirit.id) {
                self.spirits.push(spirit);
                repaired += 1;
            }
        }
        for avatar in seed.avatars {
            if !self.avatars.iter().any(|existing| existing.id == avatar.id) {
                self.avatars.push(avatar);
                repaired += 1;
            }
        }

        repaired
    }
}

/// Level change applied to the avatar linked to an awarded spirit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarProgress {
    pub avatar_id: String,
    pub progress: LevelProgress,
}

/// Outcome of one successful `add_exp` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpAward {
    pub spirit_id: String,
    pub base_amount: u64,
    /// Profession multiplier, when one applied.
    pub multiplier: Option<f64>,
    /// Amount added to both the spirit and its avatar.
    pub applied_amount: u64,
    pub spirit: LevelProgress,
    pub avatar: Option<AvatarProgress>,
    /// Milestones the spirit reached with this award.
    pub milestones: Vec<Milestone>,
}

/// Owner of the persisted progression document.
pub struct ProgressionStore {
    storage: Arc<dyn StoragePort>,
    state: ProgressionState,
    /// spirit id -> index into `state.avatars` of the first linked avatar.
    avatar_index: HashMap<String, usize>,
    load_source: LoadSource,
}

impl ProgressionStore {
    /// Loads persisted progression, falling back to the seed on missing or
    /// corrupt data.
    pub fn load(storage: Arc<dyn StoragePort>) -> Self {
        let loaded = load_or_default(
            storage.as_ref(),
            PROGRESSION_NAMESPACE,
            ProgressionState::seed,
        );
        let mut state = loaded.value;
        let repaired = state.rehydrate();
        if repaired > 0 {
            info!(
                "event=progression_rehydrate module=growth status=ok repaired={repaired} source={}",
                loaded.source.as_str()
            );
        }

        let avatar_index = build_avatar_index(&state.avatars);
        Self {
            storage,
            state,
            avatar_index,
            load_source: loaded.source,
        }
    }

    /// Where the current state was loaded from.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn snapshot(&self) -> ProgressionState {
        self.state.clone()
    }

    pub fn spirit(&self, spirit_id: &str) -> Option<&Spirit> {
        self.state.spirits.iter().find(|spirit| spirit.id == spirit_id)
    }

    /// Avatar linked to `spirit_id`, if any.
    pub fn avatar_for_spirit(&self, spirit_id: &str) -> Option<&Avatar> {
        self.avatar_index
            .get(spirit_id)
            .and_then(|index| self.state.avatars.get(*index))
    }

    pub fn selected_profession_id(&self) -> Option<&str> {
        self.state.selected_profession_id.as_deref()
    }

    /// Catalog entry for the selection. Unknown ids resolve to `None`.
    pub fn selected_profession(&self) -> Option<&'static ProfessionDef> {
        self.selected_profession_id().and_then(catalog::profession)
    }

    /// Sum of all spirit levels.
    pub fn summoner_level(&self) -> u32 {
        self.state
            .spirits
            .iter()
            .fold(0u32, |total, spirit| total.saturating_add(spirit.level))
    }

    /// Awards experience to a spirit and its linked avatar.
    ///
    /// Returns `Ok(None)` without touching state when `spirit_id` is unknown.
    ///
    /// # Errors
    /// - Returns `StoreError::Storage` when persisting fails; in-memory state
    ///   is left unchanged.
    pub fn add_exp(&mut self, spirit_id: &str, base_amount: u64) -> StoreResult<Option<ExpAward>> {
        let Some(spirit_pos) = self
            .state
            .spirits
            .iter()
            .position(|spirit| spirit.id == spirit_id)
        else {
            debug!("event=exp_award module=growth status=skip reason=unknown_spirit spirit_id={spirit_id}");
            return Ok(None);
        };

        let multiplier = self
            .selected_profession()
            .and_then(|profession| profession.multiplier_for(spirit_id));
        let applied_amount = multiplier.map_or(base_amount, |factor| scale(base_amount, factor));

        let mut next = self.state.clone();
        let spirit = &mut next.spirits[spirit_pos];
        let previous_level = spirit.level;
        let spirit_progress = leveling::apply_exp(spirit.level, spirit.exp, applied_amount);
        spirit.level = spirit_progress.level;
        spirit.exp = spirit_progress.exp;

        let avatar = match self.avatar_index.get(spirit_id).copied() {
            Some(avatar_pos) => next.avatars.get_mut(avatar_pos).map(|avatar| {
                let progress = leveling::apply_exp(avatar.level, avatar.exp, applied_amount);
                avatar.level = progress.level;
                avatar.exp = progress.exp;
                AvatarProgress {
                    avatar_id: avatar.id.clone(),
                    progress,
                }
            }),
            None => None,
        };

        save_document(self.storage.as_ref(), PROGRESSION_NAMESPACE, &next)?;
        self.state = next;

        let milestones = catalog::milestones_crossed(previous_level, spirit_progress.level);
        info!(
            "event=exp_award module=growth status=ok spirit_id={spirit_id} base={base_amount} applied={applied_amount} level={} levels_gained={} avatar_linked={}",
            spirit_progress.level,
            spirit_progress.levels_gained,
            avatar.is_some()
        );

        Ok(Some(ExpAward {
            spirit_id: spirit_id.to_string(),
            base_amount,
            multiplier,
            applied_amount,
            spirit: spirit_progress,
            avatar,
            milestones,
        }))
    }

    /// Overwrites the selected profession. The id is not validated.
    pub fn select_profession(&mut self, profession_id: impl Into<String>) -> StoreResult<()> {
        let profession_id = profession_id.into();
        if catalog::profession(&profession_id).is_none() {
            debug!("event=profession_select module=growth status=ok known=false profession_id={profession_id}");
        }
        self.replace_selection(Some(profession_id))
    }

    /// Clears the selected profession.
    pub fn clear_profession(&mut self) -> StoreResult<()> {
        self.replace_selection(None)
    }

    /// Restores the catalog seed and persists it.
    pub fn reset(&mut self) -> StoreResult<()> {
        let seed = ProgressionState::seed();
        save_document(self.storage.as_ref(), PROGRESSION_NAMESPACE, &seed)?;
        self.avatar_index = build_avatar_index(&seed.avatars);
        self.state = seed;
        Ok(())
    }

    fn replace_selection(&mut self, selection: Option<String>) -> StoreResult<()> {
        let mut next = self.state.clone();
        next.selected_profession_id = selection;
        save_document(self.storage.as_ref(), PROGRESSION_NAMESPACE, &next)?;
        self.state = next;
        Ok(())
    }
}

fn build_avatar_index(avatars: &[Avatar]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (pos, avatar) in avatars.iter().enumerate() {
        if index.contains_key(&avatar.spirit_id) {
            warn!(
                "event=avatar_index module=growth status=skip reason=duplicate_link spirit_id={} avatar_id={}",
                avatar.spirit_id, avatar.id
            );
            continue;
        }
        index.insert(avatar.spirit_id.clone(), pos);
    }
    index
}

fn scale(base_amount: u64, multiplier: f64) -> u64 {
    (base_amount as f64 * multiplier).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::{build_avatar_index, scale, Avatar, ProgressionState};

    #[test]
    fn scale_floors_fractional_results() {
        assert_eq!(scale(33, 1.5), 49);
        assert_eq!(scale(10, 2.5), 25);
        assert_eq!(scale(0, 2.0), 0);
    }

    #[test]
    fn seed_covers_every_catalog_spirit_at_level_one() {
        let seed = ProgressionState::seed();
        assert_eq!(seed.spirits.len(), 12);
        assert!(seed.spirits.iter().all(|spirit| spirit.level == 1 && spirit.exp == 0));
        assert!(seed.selected_profession_id.is_none());
    }

    #[test]
    fn avatar_index_keeps_first_link_for_duplicate_spirits() {
        let avatar = |id: &str| Avatar {
            id: id.to_string(),
            name: id.to_string(),
            spirit_id: "fire".to_string(),
            level: 1,
            exp: 0,
        };
        let index = build_avatar_index(&[avatar("a"), avatar("b")]);
        assert_eq!(index.get("fire"), Some(&0));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rehydrate_repairs_invariants_and_restores_missing_spirits() {
        let mut state = ProgressionState::seed();
        state.spirits.retain(|spirit| spirit.id != "void");
        state.spirits[0].level = 0;
        state.spirits[0].exp = 250;

        let repaired = state.rehydrate();
        assert_eq!(repaired, 2);
        assert!(state.spirits.iter().any(|spirit| spirit.id == "void"));
        assert_eq!(state.spirits[0].level, 2);
        assert_eq!(state.spirits[0].exp, 150);
    }
}
