use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tether_compare::{Comparator, EquivalenceMode, FilterConfig};

use crate::error::EvalResult;

/// Configuration for the sync evaluator.
///
/// ```toml
/// equivalence = "proxy"
///
/// [filter]
/// mode = "exclude"
/// fields = ["badd9cf9-53e0-4d0c-bcc0-2d784c282f6a"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Which fields are significant when versions are compared.
    pub filter: FilterConfig,
    /// How two versions sharing a key are judged equivalent.
    pub equivalence: EquivalenceMode,
}

impl EvaluatorConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults;
    /// unknown keys are rejected.
    pub fn from_toml_str(src: &str) -> EvalResult<Self> {
        Ok(toml::from_str(src)?)
    }

    /// Build the comparator this configuration describes.
    pub fn comparator(&self) -> Comparator {
        Comparator::new(Arc::from(self.filter.build()), self.equivalence.build())
    }
}
