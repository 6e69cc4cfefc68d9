//! Explicit provenance for entities synthesized by round application.

use serde::{Deserialize, Serialize};

pub const ROUND_HOLDER_PREFIX: &str = "Round Investors - ";
pub const CONVERTIBLE_HOLDER_PREFIX: &str = "Convertible Investors - ";
pub const ROUND_EVENT_PREFIX: &str = "Round:";

/// Holder id of the investors who bought into a round.
pub fn round_holder_id(series_name: &str) -> String {
    format!("{ROUND_HOLDER_PREFIX}{series_name}")
}

/// Holder id of a converted instrument's investors.
pub fn convertible_holder_id(convertible_id: &str) -> String {
    format!("{CONVERTIBLE_HOLDER_PREFIX}{convertible_id}")
}

/// Provenance implied by a derived holder id, for documents written before
/// provenance was recorded.
pub fn legacy_holder_source(holder_id: &str) -> Option<DerivedSource> {
    if let Some(series) = holder_id.strip_prefix(ROUND_HOLDER_PREFIX) {
        return Some(DerivedSource::round(series));
    }
    holder_id
        .strip_prefix(CONVERTIBLE_HOLDER_PREFIX)
        .map(DerivedSource::convertible)
}

/// Provenance implied by a `Round: ...` event description.
pub fn legacy_event_source(description: &str) -> Option<DerivedSource> {
    let rest = description.strip_prefix(ROUND_EVENT_PREFIX)?.trim_start();
    if let Some((_, convertible_id)) = rest.rsplit_once(" convertible ") {
        return Some(DerivedSource::convertible(convertible_id));
    }
    let series = rest
        .strip_suffix(" new shares")
        .or_else(|| rest.strip_suffix(" pool top-up"))
        .unwrap_or(rest);
    Some(DerivedSource::round(series))
}

/// Marks a holding, dilution event, or share class as derived from a
/// financing round or convertible, so it can be dropped and regenerated
/// without matching on user-editable ids or descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedSource {
    #[serde(rename_all = "camelCase")]
    Round { series_name: String },
    #[serde(rename_all = "camelCase")]
    Convertible { convertible_id: String },
}

impl DerivedSource {
    pub fn round(series_name: &str) -> Self {
        DerivedSource::Round {
            series_name: series_name.to_string(),
        }
    }

    pub fn convertible(convertible_id: &str) -> Self {
        DerivedSource::Convertible {
            convertible_id: convertible_id.to_string(),
        }
    }

    pub fn is_round(&self) -> bool {
        matches!(self, DerivedSource::Round { .. })
    }

    pub fn convertible_id(&self) -> Option<&str> {
        match self {
            DerivedSource::Convertible { convertible_id } => Some(convertible_id),
            DerivedSource::Round { .. } => None,
        }
    }
}
