//! Context assembly from retained search results.

use crate::rag::types::{AnswerMode, ContextUnit};
use crate::types::RetainedResults;
use rand::Rng;

/// Build the context units for `mode`, in retrieval order.
///
/// Quick mode yields one caption per result. Best mode yields every page
/// chunk of every result.
pub fn assemble_context(retained: &RetainedResults, mode: AnswerMode) -> Vec<ContextUnit> {
    let units: Vec<ContextUnit> = match mode {
        AnswerMode::Quick => retained
            .iter()
            .map(|result| ContextUnit {
                text: result.caption.clone(),
                source: result.location.clone(),
            })
            .collect(),
        AnswerMode::Best => retained
            .iter()
            .flat_map(|result| {
                result.chunks.iter().map(move |chunk| ContextUnit {
                    text: chunk.clone(),
                    source: result.location.clone(),
                })
            })
            .collect(),
    };

    tracing::debug!(
        "Assembled {} context units from {} results ({} mode)",
        units.len(),
        retained.len(),
        mode
    );
    units
}

/// Language tag of one retained result, chosen uniformly at random.
///
/// Results can mix languages; this only gives the prompt a hint.
pub fn pick_language<R: Rng + ?Sized>(retained: &RetainedResults, rng: &mut R) -> Option<String> {
    if retained.is_empty() {
        return None;
    }

    let pick = rng.gen_range(0..retained.len());
    retained.iter().nth(pick).map(|r| r.language.clone())
}
