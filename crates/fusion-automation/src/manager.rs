//! Automation registry
//!
//! Keeps the loaded automation definitions and answers the two questions
//! the pipeline asks: which enabled automations belong to an organization,
//! and does any of them need visual context.

use dashmap::DashMap;
use tracing::{debug, info};

use crate::{AutomationConfig, AutomationError, AutomationResult};

/// Manages all loaded automations
pub struct AutomationManager {
    /// All automations by ID
    automations: DashMap<String, AutomationConfig>,
}

impl AutomationManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            automations: DashMap::new(),
        }
    }

    /// Load automation configs, assigning ids where missing
    pub fn load(&self, configs: Vec<AutomationConfig>) -> AutomationResult<()> {
        for mut config in configs {
            let id = config
                .id
                .get_or_insert_with(|| ulid::Ulid::new().to_string().to_lowercase())
                .clone();
            info!(automation = %config.name, id = %id, "Loaded automation");
            self.automations.insert(id, config);
        }
        Ok(())
    }

    /// Add a single automation, returning its id
    pub fn add(&self, mut config: AutomationConfig) -> AutomationResult<String> {
        let id = config
            .id
            .get_or_insert_with(|| ulid::Ulid::new().to_string().to_lowercase())
            .clone();
        if self.automations.contains_key(&id) {
            return Err(AutomationError::InvalidConfig(format!(
                "automation with id {id} already exists"
            )));
        }
        self.automations.insert(id.clone(), config);
        Ok(id)
    }

    /// Get an automation by ID
    pub fn get(&self, id: &str) -> Option<AutomationConfig> {
        self.automations.get(id).map(|a| a.value().clone())
    }

    /// Enable an automation
    pub fn enable(&self, id: &str) -> AutomationResult<()> {
        self.set_enabled(id, true)
    }

    /// Disable an automation
    pub fn disable(&self, id: &str) -> AutomationResult<()> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> AutomationResult<()> {
        let mut automation = self
            .automations
            .get_mut(id)
            .ok_or_else(|| AutomationError::NotFound(id.to_string()))?;
        automation.enabled = enabled;
        debug!(automation = %automation.name, enabled, "Toggled automation");
        Ok(())
    }

    /// Enabled automations belonging to an organization
    pub fn for_organization(&self, organization_id: &str) -> Vec<AutomationConfig> {
        self.automations
            .iter()
            .filter(|a| a.enabled && a.organization_id == organization_id)
            .map(|a| a.value().clone())
            .collect()
    }

    /// Whether any enabled automation of the organization needs visual context
    pub fn any_requires_thumbnail(&self, organization_id: &str) -> bool {
        self.automations
            .iter()
            .any(|a| a.enabled && a.organization_id == organization_id && a.requires_thumbnail())
    }

    /// Number of loaded automations
    pub fn count(&self) -> usize {
        self.automations.len()
    }
}

impl Default for AutomationManager {
    fn default() -> Self {
        Self::new()
    }
}
