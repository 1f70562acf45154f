//! Compiled-in card profiles and lookups over them.

mod cards;
mod profile;

use std::sync::LazyLock;

use tracing::warn;

use crate::errors::{CashbackError, CashbackResult};
use crate::types::CategorySpendResult;

pub use profile::{CardProfile, CategoryRule, ColumnMapping, LogicalField};

static BUILTIN: LazyLock<CardRegistry> =
    LazyLock::new(|| CardRegistry::new(cards::builtin_profiles()));

/// An ordered, immutable set of card profiles.
#[derive(Debug, Clone)]
pub struct CardRegistry {
    profiles: Vec<CardProfile>,
}

impl CardRegistry {
    pub fn new(profiles: Vec<CardProfile>) -> Self {
        Self { profiles }
    }

    /// The cards shipped with the crate.
    pub fn builtin() -> &'static CardRegistry {
        &BUILTIN
    }

    /// `(key, display name)` pairs in configuration order.
    pub fn list_profiles(&self) -> Vec<(&str, &str)> {
        self.profiles
            .iter()
            .map(|p| (p.key.as_str(), p.name.as_str()))
            .collect()
    }

    pub fn get_profile(&self, key: &str) -> CashbackResult<&CardProfile> {
        self.profiles.iter().find(|p| p.key == key).ok_or_else(|| {
            warn!(card = key, "card profile not found");
            CashbackError::Configuration(key.to_string())
        })
    }

    pub fn fresh_spend_results(&self, key: &str) -> CashbackResult<Vec<CategorySpendResult>> {
        self.get_profile(key).map(CardProfile::fresh_spend_results)
    }
}
