use std::{io::Read, path::Path};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    candidates::filter::FilterConfig,
    foundation::error::{QuoteframeError, QuoteframeResult},
    overlay::style::OverlayStyle,
    ranking::ranker::RankingConfig,
};

/// Immutable configuration for the whole filter, rank and render pipeline.
///
/// Every section and field is optional in JSON; missing values take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Candidate filter settings.
    pub filter: FilterConfig,
    /// Ranking settings.
    pub ranking: RankingConfig,
    /// Caption style.
    pub overlay: OverlayStyle,
}

impl PipelineConfig {
    /// Parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> QuoteframeResult<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
            .map_err(|e| match e {
                QuoteframeError::Validation(msg) => {
                    QuoteframeError::validation(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
    }

    /// Parse and validate JSON from `reader`.
    pub fn from_reader(reader: impl Read) -> QuoteframeResult<Self> {
        let cfg: Self = serde_json::from_reader(reader)
            .map_err(|e| QuoteframeError::validation(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate every section.
    pub fn validate(&self) -> QuoteframeResult<()> {
        self.filter.validate()?;
        self.ranking.validate()?;
        self.overlay.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
