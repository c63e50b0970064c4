// src/core/pipeline.rs
//! Turns source material into the presented sequence:
//! typography → familiarity filter → range → sort → repetitions.

use crate::config::{SortOrder, UserSettings};
use crate::core::typography::simplify_material;
use crate::core::types::MaterialItem;
use crate::learning::{Familiarity, FamiliarityStore};
use rand::seq::SliceRandom;
use rand::Rng;

/// Everything the pipeline reads, passed in explicitly.
pub struct PipelineContext<'a> {
    pub settings: &'a UserSettings,
    pub familiarity: &'a FamiliarityStore,
    /// Revision lessons keep every class and ignore `start_from_word`.
    pub revision_mode: bool,
}

pub fn present_material<R: Rng + ?Sized>(source: &[MaterialItem], ctx: &PipelineContext<'_>, rng: &mut R) -> Vec<MaterialItem> {
    let material = if ctx.settings.simple_typography {
        simplify_material(source)
    } else {
        source.to_vec()
    };
    let material = filter_by_familiarity(material, ctx);
    let material = select_range(material, ctx.settings, ctx.revision_mode);
    let material = sort_material(material, ctx.familiarity, ctx.settings, rng);
    repeat_material(&material, ctx.settings.effective_repetitions())
}

/// Keeps items whose familiarity class is enabled.
pub fn filter_by_familiarity(material: Vec<MaterialItem>, ctx: &PipelineContext<'_>) -> Vec<MaterialItem> {
    let settings = ctx.settings;
    let wanted = |class: Familiarity| {
        ctx.revision_mode
            || match class {
                Familiarity::New => settings.new_words,
                Familiarity::Seen => settings.seen_words,
                Familiarity::Retained => settings.retained_words,
            }
    };
    let view = ctx.familiarity.view(settings.space_placement);
    material.into_iter().filter(|item| wanted(view.classify(&item.phrase))).collect()
}

/// Applies `start_from_word` (1-based) and `limit_number_of_words` (0 = all).
pub fn select_range(material: Vec<MaterialItem>, settings: &UserSettings, revision_mode: bool) -> Vec<MaterialItem> {
    let limit = settings.limit_number_of_words as usize;
    let offset = if revision_mode {
        0
    } else {
        (settings.start_from_word as usize).saturating_sub(1)
    };
    let start = offset.min(material.len());
    let end = if limit > 0 { (start + limit).min(material.len()) } else { material.len() };
    material[start..end].to_vec()
}

pub fn sort_material<R: Rng + ?Sized>(
    mut material: Vec<MaterialItem>,
    familiarity: &FamiliarityStore,
    settings: &UserSettings,
    rng: &mut R,
) -> Vec<MaterialItem> {
    match settings.sort_order {
        SortOrder::Off => {}
        SortOrder::Random => material.shuffle(rng),
        SortOrder::New | SortOrder::Old => {
            let view = familiarity.view(settings.space_placement);
            material.sort_by_key(|item| std::cmp::Reverse(view.count(&item.phrase)));
            if settings.sort_order == SortOrder::New {
                material.reverse();
            }
        }
    }
    material
}

/// Concatenates the material `repetitions` times.
pub fn repeat_material(material: &[MaterialItem], repetitions: u32) -> Vec<MaterialItem> {
    let passes = repetitions.clamp(1, crate::config::MAX_REPETITIONS) as usize;
    let mut repeated = Vec::with_capacity(material.len() * passes);
    for _ in 0..passes {
        repeated.extend_from_slice(material);
    }
    repeated
}
