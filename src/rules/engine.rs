use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use super::registry::{RegisteredRule, RuleRegistry};
use super::{Finding, RuleMetadata, ScanContext};

/// A rule that failed during execution and contributed no findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// In rule registration order, then in each rule's emission order.
    pub findings: Vec<Finding>,
    pub failures: Vec<RuleFailure>,
}

/// Runs the enabled rules of a registry against a scan context.
pub struct RuleEngine {
    registry: RuleRegistry,
}

impl RuleEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> RuleRegistry {
        self.registry
    }

    /// Run every rule enabled at call time, one after another. A failing
    /// rule is recorded and skipped; it never stops the rules after it.
    pub fn run(&self, ctx: &ScanContext) -> ExecutionOutcome {
        let snapshot = self.registry.enabled();
        tracing::debug!(count = snapshot.len(), "executing enabled rules");

        let mut outcome = ExecutionOutcome::default();
        for entry in &snapshot {
            match run_one(entry, ctx) {
                Ok(findings) => {
                    tracing::debug!(rule_id = %entry.id(), findings = findings.len(), "rule finished");
                    check_categories(entry, &findings);
                    outcome.findings.extend(findings);
                }
                Err(message) => {
                    tracing::warn!(rule_id = %entry.id(), error = %message, "rule failed, skipping");
                    outcome.failures.push(RuleFailure {
                        rule_id: entry.id().to_string(),
                        message,
                    });
                }
            }
        }

        tracing::debug!(total = outcome.findings.len(), "all rules finished");
        outcome
    }

    /// Findings only; failures are logged and dropped.
    pub fn run_all(&self, ctx: &ScanContext) -> Vec<Finding> {
        self.run(ctx).findings
    }

    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.registry.list_rules()
    }
}

fn run_one(entry: &RegisteredRule, ctx: &ScanContext) -> Result<Vec<Finding>, String> {
    tracing::debug!(rule_id = %entry.id(), base_hours = entry.base_hours(), "executing rule");
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        entry.rule().execute(ctx, entry.base_hours())
    }));
    match result {
        Ok(Ok(findings)) => Ok(findings),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("rule panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("rule panicked: {s}")
    } else {
        "rule panicked".into()
    }
}

fn check_categories(entry: &RegisteredRule, findings: &[Finding]) {
    let expected = entry.category();
    if let Some(f) = findings.iter().find(|f| f.metadata.category() != expected) {
        tracing::warn!(
            rule_id = %entry.id(),
            expected = %expected,
            actual = %f.metadata.category(),
            "finding metadata does not match rule category"
        );
    }
}
