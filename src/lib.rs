//! umbraco-audit: upgrade effort estimator for Umbraco 13 LTS to 17 LTS.
//!
//! Scans a project tree with a fixed set of detectors, looks declared
//! NuGet packages up against the registry, and turns every finding into
//! an hour estimate.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use umbraco_audit::{audit, AuditOptions};
//!
//! let report = audit(Path::new("./MySite"), &AuditOptions::default()).unwrap();
//! println!("{}h over {} findings", report.summary.total_hours, report.findings.len());
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod packages;
pub mod report;
pub mod rules;
pub mod scanner;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use config::{Config, CONFIG_FILE_NAME};
use error::{AuditError, Result};
use output::OutputFormat;
use packages::transport::{HttpTransport, OfflineTransport, RegistryTransport};
use packages::PackageResolver;
use report::{build_report, AuditReport, Diagnostic, ProjectInfo};
use rules::{RuleEngine, RuleMetadata, ScanContext};
use scanner::manifest::{extract_primary_version, parse_manifest};
use scanner::FileScanner;

/// Last Umbraco 13 release; projects should be on it before moving to 17.
pub const RECOMMENDED_SOURCE_VERSION: &str = "13.13.0";

/// Options for an audit invocation.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Path to config file (defaults to `.umbraco-audit.toml` in the project root).
    pub config_path: Option<PathBuf>,
    /// Attach code context to findings.
    pub verbose: bool,
    pub debug: bool,
    /// Skip every registry lookup.
    pub offline: bool,
}

/// Run a complete audit against the live NuGet registry, or none at all
/// when `options.offline` is set.
pub fn audit(path: &Path, options: &AuditOptions) -> Result<AuditReport> {
    let transport: Arc<dyn RegistryTransport> = if options.offline {
        Arc::new(OfflineTransport)
    } else {
        Arc::new(HttpTransport::new()?)
    };
    audit_with_transport(path, options, transport)
}

/// Run a complete audit with the given registry transport.
pub fn audit_with_transport(
    path: &Path,
    options: &AuditOptions,
    transport: Arc<dyn RegistryTransport>,
) -> Result<AuditReport> {
    let started = Instant::now();

    if !path.exists() {
        return Err(AuditError::PathNotFound(path.display().to_string()));
    }
    let root = if path.is_file() {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    } else {
        path
    };

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;

    let scanner = FileScanner::new(root, &config.exclude_paths)?;
    let project_files = scanner.discover(&["**/*.csproj"])?;
    let Some(primary) = project_files.first() else {
        return Err(AuditError::NoProjectFiles(root.display().to_string()));
    };

    let Some(version) = extract_primary_version(&parse_manifest(primary)) else {
        return Err(AuditError::UnknownFrameworkVersion(
            primary.display().to_string(),
        ));
    };

    let mut diagnostics = Vec::new();
    if needs_interim_upgrade(&version) {
        diagnostics.push(
            Diagnostic::warning(format!(
                "Umbraco {version} detected. Upgrade to {RECOMMENDED_SOURCE_VERSION} first, \
                 it is the supported starting point for the move to 17"
            ))
            .with_file(primary.clone()),
        );
    }

    tracing::info!(
        root = %scanner.root().display(),
        version = %version,
        projects = project_files.len(),
        "auditing Umbraco project"
    );

    let resolver = Arc::new(PackageResolver::new(transport, config.registry.clone()));
    let mut registry = rules::builtin::registry(resolver.clone());
    for rule_id in registry.apply_overrides(&config.rules) {
        diagnostics.push(
            Diagnostic::warning(format!("Config override for unknown rule '{rule_id}'"))
                .with_file(config_path.clone()),
        );
    }

    let ctx = ScanContext::new(scanner, project_files)
        .with_verbose(options.verbose)
        .with_debug(options.debug);

    let engine = RuleEngine::new(registry);
    let outcome = engine.run(&ctx);

    for failure in &outcome.failures {
        diagnostics.push(Diagnostic::error(format!(
            "Rule {} failed: {}",
            failure.rule_id, failure.message
        )));
    }

    let unresolved = resolver.failures();
    if options.offline {
        if !unresolved.is_empty() {
            diagnostics.push(Diagnostic::info(format!(
                "Offline mode: skipped registry lookups for {} package(s)",
                unresolved.len()
            )));
        }
    } else {
        for pkg in &unresolved {
            diagnostics.push(Diagnostic::warning(format!(
                "Could not resolve package {}: {}",
                pkg.package_name,
                pkg.error.as_deref().unwrap_or("unknown error")
            )));
        }
    }

    let project = ProjectInfo {
        root_path: ctx.root_path.clone(),
        umbraco_version: Some(version),
        project_files: ctx.project_files.clone(),
        files_scanned: ctx.files_scanned(),
        scan_duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    let report = build_report(project, outcome.findings, engine.registry(), diagnostics);
    tracing::info!(
        findings = report.summary.total_findings,
        hours = report.summary.total_hours,
        "audit finished"
    );
    Ok(report)
}

/// Render an audit report in the specified format.
pub fn render_report(report: &AuditReport, format: OutputFormat, verbose: bool) -> Result<String> {
    output::render(report, format, verbose)
}

/// Metadata of every built-in rule, in execution order.
pub fn list_rules() -> Vec<RuleMetadata> {
    let resolver = Arc::new(PackageResolver::new(
        Arc::new(OfflineTransport),
        config::RegistrySettings::default(),
    ));
    rules::builtin::registry(resolver).list_rules()
}

fn needs_interim_upgrade(version: &str) -> bool {
    version.split('.').next() == Some("13") && version != RECOMMENDED_SOURCE_VERSION
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::packages::transport::Fetched;
    use crate::report::DiagnosticLevel;
    use crate::rules::Severity;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "tests/fixtures/sample-umbraco-project";

    fn offline() -> AuditOptions {
        AuditOptions {
            offline: true,
            ..AuditOptions::default()
        }
    }

    fn count(report: &AuditReport, rule_id: &str) -> usize {
        report.findings_for(rule_id).count()
    }

    /// Knows only `Umbraco.Cms`, at 17.0.0 targeting net10.0.
    struct CmsOnlyRegistry;

    impl RegistryTransport for CmsOnlyRegistry {
        fn fetch(&self, url: &str) -> Result<Fetched> {
            if url.ends_with("/umbraco.cms/index.json") {
                return Ok(Fetched::Body(
                    r#"{"items": [{"items": [
                        {"catalogEntry": {"version": "17.0.0",
                          "dependencyGroups": [{"targetFramework": "net10.0"}]}},
                        {"catalogEntry": {"version": "17.1.0-rc1",
                          "dependencyGroups": [{"targetFramework": "net10.0"}]}}
                    ]}]}"#
                        .into(),
                ));
            }
            Ok(Fetched::NotFound)
        }
    }

    #[test]
    fn sample_project_offline() {
        let report = audit(Path::new(SAMPLE), &offline()).unwrap();

        assert_eq!(report.project.umbraco_version.as_deref(), Some("13.5.2"));
        assert_eq!(report.project.project_files.len(), 1);
        assert_eq!(report.rule_results.len(), 11);

        assert_eq!(count(&report, "rule-01-nuget-packages"), 0);
        assert_eq!(count(&report, "rule-02-obsolete-controllers"), 1);
        assert_eq!(count(&report, "rule-02-removed-extensions"), 1);
        assert_eq!(count(&report, "rule-03-tiptap-import"), 1);
        assert_eq!(count(&report, "rule-04-removed-packages"), 1);
        assert_eq!(count(&report, "rule-05-program-cs"), 1);
        assert_eq!(count(&report, "rule-06-view-imports"), 1);
        assert_eq!(count(&report, "rule-07-angular-detection"), 2);
        assert_eq!(count(&report, "rule-08-published-snapshot-interfaces"), 2);
        assert_eq!(count(&report, "rule-09-uda-property-editors"), 1);
        assert_eq!(count(&report, "rule-10-license-files"), 1);

        assert_eq!(report.summary.total_findings, 12);
        assert_eq!(report.summary.rules_triggered, 10);
        assert_eq!(report.summary.total_hours, 8.5);
        assert_eq!(report.summary.total_days, 1.1);
        assert!(report.project.files_scanned >= 10);
    }

    #[test]
    fn warns_about_interim_upgrade() {
        let report = audit(Path::new(SAMPLE), &offline()).unwrap();
        let warning = report
            .diagnostics
            .iter()
            .find(|d| d.level == DiagnosticLevel::Warning)
            .unwrap();
        assert!(warning.message.contains("13.13.0"));
        assert!(warning.file.as_ref().unwrap().ends_with("Site.csproj"));

        let offline_notes: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Info)
            .collect();
        assert_eq!(offline_notes.len(), 1);
        assert!(offline_notes[0].message.contains("4 package(s)"));
    }

    #[test]
    fn outdated_framework_package_flagged() {
        let report =
            audit_with_transport(Path::new(SAMPLE), &offline(), Arc::new(CmsOnlyRegistry))
                .unwrap();

        let packages: Vec<_> = report.findings_for("rule-01-nuget-packages").collect();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].line_content, "Umbraco.Cms: 13.5.2 -> 17.0.0");
        assert_eq!(packages[0].severity, Severity::Warning);
        assert_eq!(packages[0].line_number, 0);
        assert_eq!(report.summary.total_hours, 9.0);
    }

    #[test]
    fn unresolved_packages_become_warnings_online() {
        let options = AuditOptions::default();
        let report =
            audit_with_transport(Path::new(SAMPLE), &options, Arc::new(CmsOnlyRegistry)).unwrap();

        let unresolved: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.message.starts_with("Could not resolve package"))
            .collect();
        assert_eq!(unresolved.len(), 3);
        assert!(unresolved
            .iter()
            .all(|d| d.message.ends_with("Package not found")));
    }

    #[test]
    fn config_override_disables_rule_and_rescales_hours() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("audit.toml");
        fs::write(
            &config,
            r#"
[rules."rule-07-angular-detection"]
enabled = false

[rules."rule-05-program-cs"]
base_hours = 2.0

[rules."rule-99-missing"]
enabled = false
"#,
        )
        .unwrap();

        let options = AuditOptions {
            config_path: Some(config),
            ..offline()
        };
        let report = audit(Path::new(SAMPLE), &options).unwrap();

        assert_eq!(count(&report, "rule-07-angular-detection"), 0);
        let angular = report
            .rule_results
            .iter()
            .find(|r| r.rule_id == "rule-07-angular-detection")
            .unwrap();
        assert!(!angular.enabled);

        let program: Vec<_> = report.findings_for("rule-05-program-cs").collect();
        assert_eq!(program[0].hours, 2.0);

        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("'rule-99-missing'")));
    }

    #[test]
    fn verbose_attaches_snippets() {
        let options = AuditOptions {
            verbose: true,
            ..offline()
        };
        let report = audit(Path::new(SAMPLE), &options).unwrap();
        let program = report.findings_for("rule-05-program-cs").next().unwrap();
        let snippet = program.snippet.as_ref().unwrap();
        assert!(snippet.line.contains("UseInstallerEndpoints()"));
    }

    #[test]
    fn missing_path_is_fatal() {
        let err = audit(Path::new("/nonexistent/site"), &offline()).unwrap_err();
        assert!(matches!(err, AuditError::PathNotFound(_)));
    }

    #[test]
    fn directory_without_projects_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# not a site").unwrap();
        let err = audit(dir.path(), &offline()).unwrap_err();
        assert!(matches!(err, AuditError::NoProjectFiles(_)));
    }

    #[test]
    fn project_without_umbraco_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Lib.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();
        let err = audit(dir.path(), &offline()).unwrap_err();
        assert!(matches!(err, AuditError::UnknownFrameworkVersion(_)));
    }

    #[test]
    fn non_utf8_project_file_still_detects_version() {
        let dir = TempDir::new().unwrap();
        let mut csproj = b"<Project Sdk=\"Microsoft.NET.Sdk.Web\">\n<!-- Caf".to_vec();
        csproj.push(0xE9);
        csproj.extend_from_slice(
            b" -->\n<ItemGroup>\n<PackageReference Include=\"Umbraco.Cms\" Version=\"13.5.2\" />\n\
              </ItemGroup>\n</Project>\n",
        );
        fs::write(dir.path().join("Site.csproj"), csproj).unwrap();

        let report = audit(dir.path(), &offline()).unwrap();
        assert_eq!(report.project.umbraco_version.as_deref(), Some("13.5.2"));
    }

    #[test]
    fn file_path_audits_its_directory() {
        let report = audit(&Path::new(SAMPLE).join("Site.csproj"), &offline()).unwrap();
        assert_eq!(count(&report, "rule-05-program-cs"), 1);
    }

    #[test]
    fn recommended_version_needs_no_interim_step() {
        assert!(needs_interim_upgrade("13.5.2"));
        assert!(!needs_interim_upgrade("13.13.0"));
        assert!(!needs_interim_upgrade("14.0.0"));
    }

    #[test]
    fn lists_every_builtin_rule() {
        let rules = list_rules();
        assert_eq!(rules.len(), 11);
        assert_eq!(rules[0].id, "rule-01-nuget-packages");
    }
}
