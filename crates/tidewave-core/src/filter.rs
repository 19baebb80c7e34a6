use tidewave_types::models::{Scope, Splash};
use tracing::debug;

use crate::error::CoreError;

/// The tide and user names a scope may refer to.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    tides: Vec<String>,
    authors: Vec<String>,
}

impl ScopeRegistry {
    pub fn new(tides: Vec<String>, authors: Vec<String>) -> Self {
        Self { tides, authors }
    }

    pub fn has_tide(&self, name: &str) -> bool {
        self.tides.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn has_author(&self, name: &str) -> bool {
        self.authors.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Routing uses this to answer 404 for pages of unknown tides or users.
    pub fn validate(&self, scope: &Scope) -> Result<(), CoreError> {
        match scope {
            Scope::Global => Ok(()),
            Scope::Tide(name) if self.has_tide(name) => Ok(()),
            Scope::Author(name) if self.has_author(name) => Ok(()),
            Scope::Tide(name) | Scope::Author(name) => Err(CoreError::InvalidScope(name.clone())),
        }
    }
}

/// Newest-first feed for `scope`. A scope naming an unknown tide or author
/// applies no filter and yields the whole sorted feed.
pub fn filter_splashes(all: &[Splash], scope: &Scope, registry: &ScopeRegistry) -> Vec<Splash> {
    let mut sorted = all.to_vec();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));

    if registry.validate(scope).is_err() {
        debug!("Scope {:?} is not registered, returning unfiltered feed", scope);
        return sorted;
    }

    match scope {
        Scope::Global => sorted,
        Scope::Tide(name) => sorted
            .into_iter()
            .filter(|s| s.tides.iter().any(|t| t.eq_ignore_ascii_case(name)))
            .collect(),
        Scope::Author(name) => sorted
            .into_iter()
            .filter(|s| s.author.eq_ignore_ascii_case(name))
            .collect(),
    }
}
