use anyhow::Result;

use crate::config::Config;

pub fn handle_get_command(key: String) -> Result<()> {
    let config = Config::load()?;
    match config.get(&key) {
        Some(value) => println!("{value}"),
        None => println!("(not set)"),
    }
    Ok(())
}

pub fn handle_set_command(key: String, value: String) -> Result<()> {
    let mut config = Config::load()?;
    config.set(&key, value)?;
    config.save()?;

    println!("✓ Set {key}");
    Ok(())
}

pub fn handle_unset_command(key: String) -> Result<()> {
    let mut config = Config::load()?;
    config.unset(&key)?;
    config.save()?;

    println!("✓ Unset {key}");
    Ok(())
}

pub fn handle_list_command() -> Result<()> {
    let config = Config::load()?;
    println!("Configuration ({}):", Config::get_config_path()?.display());
    for (key, value) in config.list() {
        println!("  {key} = {value}");
    }
    Ok(())
}

pub fn handle_path_command() -> Result<()> {
    println!("{}", Config::get_config_path()?.display());
    Ok(())
}
