//! Host configuration file access.

use clap::Subcommand;
use reveille_core::RuntimeOptions;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as TOML
    Show,
    /// Print one value
    Get { key: String },
    /// Set one value and save
    Set { key: String, value: String },
    /// Print the configuration file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let options = RuntimeOptions::load_or_default();
            print!("{}", toml::to_string_pretty(&options)?);
        }
        ConfigAction::Get { key } => {
            let options = RuntimeOptions::load_or_default();
            let json = serde_json::to_value(&options)?;
            match json.get(&key) {
                Some(serde_json::Value::String(s)) => println!("{s}"),
                Some(other) => println!("{other}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let options = RuntimeOptions::load_or_default();
            let mut json = serde_json::to_value(&options)?;
            let object = json
                .as_object_mut()
                .ok_or("config did not serialize to a table")?;
            let existing = object
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse()?),
                serde_json::Value::Number(_) => {
                    serde_json::Value::Number(value.parse::<u64>()?.into())
                }
                _ => serde_json::Value::String(value.clone()),
            };
            object.insert(key, new_value);

            let updated: RuntimeOptions = serde_json::from_value(json)?;
            updated.save()?;
        }
        ConfigAction::Path => {
            println!("{}", RuntimeOptions::path()?.display());
        }
    }
    Ok(())
}
