//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::defaults::LOG_LEVELS;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `section.key` with `FromStr`, reporting `reason` on failure.
fn parse_value<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match props.get(key) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(section, key, v, reason)),
        None => Ok(None),
    }
}

/// Parse a strictly positive, finite float.
fn parse_positive(
    props: &Properties,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ConfigFileError> {
    let reason = "must be a positive number";
    match parse_value::<f64>(props, section, key, reason)? {
        Some(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        Some(_) => Err(invalid(
            section,
            key,
            props.get(key).unwrap_or_default(),
            reason,
        )),
        None => Ok(None),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [dwell] section
    if let Some(section) = ini.section(Some("dwell")) {
        if let Some(v) = parse_value::<u32>(
            section,
            "dwell",
            "trace_interval_secs",
            "must be a positive integer (seconds)",
        )? {
            if v == 0 {
                return Err(invalid(
                    "dwell",
                    "trace_interval_secs",
                    "0",
                    "must be a positive integer (seconds)",
                ));
            }
            config.dwell.trace_interval_secs = v;
        }
    }

    // [registry] section
    if let Some(section) = ini.section(Some("registry")) {
        if let Some(v) =
            parse_value::<usize>(section, "registry", "capacity", "must be a positive integer")?
        {
            if v == 0 {
                return Err(invalid(
                    "registry",
                    "capacity",
                    "0",
                    "must be a positive integer",
                ));
            }
            config.registry.capacity = v;
        }
        if let Some(v) = section.get("match_key") {
            config.registry.match_key = v.parse().map_err(|_| {
                invalid(
                    "registry",
                    "match_key",
                    v,
                    "must be 'tile' or 'tile_hour_dow'",
                )
            })?;
        }
        if let Some(v) = parse_value::<u8>(
            section,
            "registry",
            "hour_sentinel",
            "must be an integer between 0 and 255",
        )? {
            config.registry.hour_sentinel = v;
        }
        if let Some(v) = parse_value::<u8>(
            section,
            "registry",
            "dow_sentinel",
            "must be an integer between 0 and 255",
        )? {
            config.registry.dow_sentinel = v;
        }
    }

    // [trust] section
    if let Some(section) = ini.section(Some("trust")) {
        let trust = &mut config.trust;
        let references: [(&str, &mut f64); 8] = [
            ("qualifying_hours_per_day", &mut trust.qualifying_hours_per_day),
            ("qualifying_locations_per_day", &mut trust.qualifying_locations_per_day),
            ("qualifying_day_fraction", &mut trust.qualifying_day_fraction),
            ("qualifying_location_fraction", &mut trust.qualifying_location_fraction),
            ("qualifying_hours_fraction", &mut trust.qualifying_hours_fraction),
            ("area_density", &mut trust.area_density),
            ("tile_length_km", &mut trust.tile_length_km),
            ("max_bound_area_km2", &mut trust.max_bound_area_km2),
        ];
        for (key, field) in references {
            if let Some(v) = parse_positive(section, "trust", key)? {
                *field = v;
            }
        }
        if let Some(v) = parse_value::<usize>(
            section,
            "trust",
            "min_locations",
            "must be a non-negative integer",
        )? {
            trust.min_locations = v;
        }
        if let Some(v) =
            parse_value::<u32>(section, "trust", "ramp_days", "must be a non-negative integer")?
        {
            trust.ramp_days = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("level") {
            let v = v.trim().to_lowercase();
            if !LOG_LEVELS.contains(&v.as_str()) {
                return Err(invalid(
                    "logging",
                    "level",
                    &v,
                    "must be one of: trace, debug, info, warn, error",
                ));
            }
            config.logging.level = v;
        }
    }

    Ok(config)
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
