//! todocal config command implementation

use serde::Serialize;

use crate::cli::{open_session, Globals};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct ConfigValueReport {
    key: String,
    value: String,
}

pub fn run_get(globals: Globals, key: &str) -> Result<()> {
    let session = open_session(globals.data_dir.clone())?;
    let value = session
        .config()
        .get(key)
        .ok_or_else(|| Error::NotFound(format!("no config key '{key}'")))?;

    let mut human = HumanOutput::new(format!("{key} = {value}"));
    push_fault(&mut human, session.config_fault());
    emit_success(
        globals.output(),
        "config get",
        &ConfigValueReport {
            key: key.to_string(),
            value,
        },
        Some(&human),
    )
}

pub fn run_set(globals: Globals, key: &str, value: &str) -> Result<()> {
    let mut session = open_session(globals.data_dir.clone())?;
    session.config_mut().set(key, value)?;
    session.flush()?;

    let key = key.trim().to_string();
    let value = session.config().get(&key).unwrap_or_default();
    let human = HumanOutput::new(format!("{key} = {value}"));
    emit_success(
        globals.output(),
        "config set",
        &ConfigValueReport { key, value },
        Some(&human),
    )
}

pub fn run_list(globals: Globals) -> Result<()> {
    let session = open_session(globals.data_dir.clone())?;
    let entries = session.config().entries();

    let mut human = HumanOutput::new(format!(
        "Settings in {}",
        session.storage().config_file().display()
    ));
    for (key, value) in &entries {
        human.push_summary(key.clone(), value.clone());
    }
    push_fault(&mut human, session.config_fault());

    let report: std::collections::BTreeMap<String, String> = entries.into_iter().collect();
    emit_success(globals.output(), "config list", &report, Some(&human))
}

fn push_fault(human: &mut HumanOutput, fault: Option<&str>) {
    if let Some(fault) = fault {
        human.push_warning(format!("config.toml ignored, showing defaults: {fault}"));
    }
}
