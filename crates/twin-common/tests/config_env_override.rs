//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration"
//! ems_type: "test"
//! ems_scope: "code"
//! ems_description: "TWIN_CONFIG override; kept alone in its own test binary."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::io::Write;

use tempfile::NamedTempFile;
use twin_common::AppConfig;

#[test]
fn env_path_takes_precedence_and_must_exist() {
    let mut env_file = NamedTempFile::new().unwrap();
    writeln!(env_file, "[dashboard]\ntitle = \"From Env\"").unwrap();
    env_file.flush().unwrap();
    let mut candidate = NamedTempFile::new().unwrap();
    writeln!(candidate, "[dashboard]\ntitle = \"From Candidate\"").unwrap();
    candidate.flush().unwrap();

    std::env::set_var(AppConfig::ENV_CONFIG_PATH, env_file.path());
    let loaded = AppConfig::load_with_source(&[candidate.path()]).unwrap();
    assert_eq!(loaded.config.dashboard.title, "From Env");
    assert_eq!(loaded.source.as_deref(), Some(env_file.path()));

    let missing = env_file.path().with_extension("missing");
    std::env::set_var(AppConfig::ENV_CONFIG_PATH, &missing);
    assert!(AppConfig::load_with_source(&[candidate.path()]).is_err());

    std::env::remove_var(AppConfig::ENV_CONFIG_PATH);
    let loaded = AppConfig::load_with_source(&[candidate.path()]).unwrap();
    assert_eq!(loaded.config.dashboard.title, "From Candidate");
}
