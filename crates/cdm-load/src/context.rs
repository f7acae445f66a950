//! Everything the rules read but never write.

use cdm_standards::ConceptResolver;

use crate::settings::LoadSettings;

/// Shared, read-only inputs of a load run.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub resolver: ConceptResolver,
    pub settings: LoadSettings,
}

impl LoadContext {
    pub fn new(resolver: ConceptResolver) -> Self {
        Self {
            resolver,
            settings: LoadSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: LoadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &str {
        &self.settings.registry.name
    }
}
