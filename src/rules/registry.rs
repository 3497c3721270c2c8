//! Rule registry: one per audit run, keyed by rule id, ordered by first
//! registration.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Rule, RuleCategory, RuleMetadata};
use crate::config::RuleOverride;

/// A rule plus its run-time settings.
#[derive(Clone)]
pub struct RegisteredRule {
    rule: Arc<dyn Rule>,
    metadata: RuleMetadata,
    enabled: bool,
    base_hours: f64,
}

impl RegisteredRule {
    fn new(rule: Arc<dyn Rule>) -> Self {
        let metadata = rule.metadata();
        Self {
            base_hours: metadata.default_hours,
            enabled: true,
            metadata,
            rule,
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    pub fn category(&self) -> RuleCategory {
        self.metadata.category
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn base_hours(&self) -> f64 {
        self.base_hours
    }

    pub fn rule(&self) -> &Arc<dyn Rule> {
        &self.rule
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("id", &self.metadata.id)
            .field("enabled", &self.enabled)
            .field("base_hours", &self.base_hours)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, or replace the one with the same id in place.
    /// A replaced rule keeps its position and starts enabled with its
    /// own default hours.
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let entry = RegisteredRule::new(rule);
        tracing::debug!(rule_id = %entry.id(), name = %entry.metadata.name, "registering rule");
        match self.index.get(entry.id()) {
            Some(&slot) => self.rules[slot] = entry,
            None => {
                self.index.insert(entry.id().to_string(), self.rules.len());
                self.rules.push(entry);
            }
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<&RegisteredRule> {
        self.index.get(rule_id).map(|&slot| &self.rules[slot])
    }

    fn get_mut(&mut self, rule_id: &str) -> Option<&mut RegisteredRule> {
        let slot = *self.index.get(rule_id)?;
        Some(&mut self.rules[slot])
    }

    /// Returns false when no rule has this id.
    pub fn enable(&mut self, rule_id: &str) -> bool {
        self.set_enabled(rule_id, true)
    }

    /// Returns false when no rule has this id.
    pub fn disable(&mut self, rule_id: &str) -> bool {
        self.set_enabled(rule_id, false)
    }

    fn set_enabled(&mut self, rule_id: &str, enabled: bool) -> bool {
        match self.get_mut(rule_id) {
            Some(entry) => {
                entry.enabled = enabled;
                tracing::debug!(rule_id, enabled, "rule toggled");
                true
            }
            None => false,
        }
    }

    /// Returns false when no rule has this id.
    pub fn set_base_hours(&mut self, rule_id: &str, base_hours: f64) -> bool {
        match self.get_mut(rule_id) {
            Some(entry) => {
                entry.base_hours = base_hours.max(0.0);
                tracing::debug!(rule_id, base_hours, "rule hours overridden");
                true
            }
            None => false,
        }
    }

    /// All rules in registration order.
    pub fn all(&self) -> &[RegisteredRule] {
        &self.rules
    }

    /// Snapshot of the enabled rules in registration order.
    pub fn enabled(&self) -> Vec<RegisteredRule> {
        self.rules.iter().filter(|r| r.enabled).cloned().collect()
    }

    pub fn category_of(&self, rule_id: &str) -> Option<RuleCategory> {
        self.get(rule_id).map(RegisteredRule::category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply `[rules.<id>]` config overrides. Returns the ids that match
    /// no registered rule.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, RuleOverride>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (rule_id, over) in overrides {
            if self.get(rule_id).is_none() {
                tracing::warn!(rule_id = %rule_id, "config override for unknown rule");
                unknown.push(rule_id.clone());
                continue;
            }
            if let Some(enabled) = over.enabled {
                self.set_enabled(rule_id, enabled);
            }
            if let Some(hours) = over.base_hours {
                self.set_base_hours(rule_id, hours);
            }
        }
        unknown
    }

    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.metadata.clone()).collect()
    }
}
