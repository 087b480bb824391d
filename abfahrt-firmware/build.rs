//! Build script for abfahrt-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates appliance.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate appliance.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=appliance.toml");

    let config_path = Path::new("appliance.toml");
    if !config_path.exists() {
        panic!("appliance.toml not found - the firmware requires it next to Cargo.toml");
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read appliance.toml: {}", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("invalid TOML syntax in appliance.toml: {}", e),
    };

    let mut errors = Vec::new();

    for section in ["station", "night", "display", "net", "api"] {
        if config.get(section).is_none() {
            errors.push(format!("missing [{}] section", section));
        }
    }

    if let Some(station) = config.get("station").and_then(|s| s.as_table()) {
        for key in ["id", "id2"] {
            match station.get(key) {
                Some(toml::Value::String(s)) if !s.is_empty() => {}
                Some(_) => errors.push(format!("[station] {} must be a non-empty string", key)),
                None => errors.push(format!("[station] missing '{}'", key)),
            }
        }
        if let Some(toml::Value::Integer(limit)) = station.get("limit") {
            if *limit < 1 || *limit > 16 {
                errors.push("[station] limit must be 1-16".to_string());
            }
        }
    }

    if let Some(night) = config.get("night").and_then(|s| s.as_table()) {
        for (key, max) in [
            ("start_hour", 23),
            ("start_minute", 59),
            ("end_hour", 23),
            ("end_minute", 59),
        ] {
            if let Some(toml::Value::Integer(v)) = night.get(key) {
                if *v < 0 || *v > max {
                    errors.push(format!("[night] {} must be 0-{}", key, max));
                }
            }
        }
    }

    if let Some(display) = config.get("display").and_then(|s| s.as_table()) {
        if let Some(toml::Value::Integer(b)) = display.get("brightness") {
            if *b < 0 || *b > 4 {
                errors.push("[display] brightness must be 0-4".to_string());
            }
        }
    }

    if let Some(net) = config.get("net").and_then(|s| s.as_table()) {
        match net.get("ssid") {
            Some(toml::Value::String(s)) if !s.is_empty() => {}
            _ => errors.push("[net] missing non-empty 'ssid'".to_string()),
        }
    }

    if let Some(api) = config.get("api").and_then(|s| s.as_table()) {
        for key in ["stationboard", "price", "ntp"] {
            match api.get(key) {
                Some(toml::Value::String(s)) if !s.is_empty() => {}
                _ => errors.push(format!("[api] missing non-empty '{}'", key)),
            }
        }
    }

    if !errors.is_empty() {
        panic!("invalid appliance.toml:\n  {}", errors.join("\n  "));
    }
}
