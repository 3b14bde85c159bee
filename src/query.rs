//! Query-side preparation and validation.
//!
//! A parameter map goes through three stages before dispatch: defaults are
//! injected for required names the caller omitted, temporal values are
//! rendered to their wire formats, and the finished name set is checked
//! against the service's required set. The stages are pure and hold no
//! state beyond the read-only catalog.

use std::collections::BTreeSet;

use log::{info, warn};

use crate::catalog;
use crate::error::{Error, Result};
use crate::params::{ParamValue, Params};

/// Fill in defaults for required parameters the caller omitted.
pub fn apply_defaults(service_code: &str, params: &mut Params) -> Result<()> {
    let required = catalog::required_parameters(service_code)?;
    for (name, value) in catalog::DEFAULT_PARAM_VALUES {
        if required.contains(name) && !params.contains(name) {
            params.set(*name, *value);
        }
    }
    Ok(())
}

/// Render registered date, time and datetime parameters to their wire
/// formats.
///
/// Runs after defaulting and before validation, so a caller-supplied
/// temporal value is stringified before anything is sent. Values that are
/// already strings pass through untouched, which makes the rendering
/// idempotent. Unrecognized value/name combinations are left alone; a
/// malformed value fails server-side rather than here.
pub fn format_temporal(params: &mut Params) {
    let rendered: Vec<(String, String)> = params
        .iter()
        .filter_map(|(name, value)| render_temporal(name, value).map(|s| (name.clone(), s)))
        .collect();

    for (name, value) in rendered {
        params.set(name, value);
    }
}

fn render_temporal(name: &str, value: &ParamValue) -> Option<String> {
    if catalog::is_date_param(name) {
        // A full timestamp in a date slot contributes its date part.
        return match value {
            ParamValue::Date(d) => Some(d.format(catalog::DATE_FORMAT).to_string()),
            ParamValue::DateTime(dt) => Some(dt.format(catalog::DATE_FORMAT).to_string()),
            _ => None,
        };
    }

    if catalog::is_time_param(name) {
        return match value {
            ParamValue::Time(t) => Some(t.format(catalog::TIME_FORMAT).to_string()),
            ParamValue::DateTime(dt) => Some(dt.format(catalog::TIME_FORMAT).to_string()),
            _ => None,
        };
    }

    if catalog::is_datetime_param(name) {
        return match value {
            ParamValue::DateTime(dt) => Some(dt.format(catalog::DATETIME_FORMAT).to_string()),
            _ => None,
        };
    }

    None
}

/// Confirm the supplied parameter names cover the service's required set.
///
/// Names beyond the required set are tolerated and logged; the API ignores
/// superfluous query parameters. Missing names are fatal.
pub fn validate_params(service_code: &str, params: &Params) -> Result<()> {
    let required: BTreeSet<&str> = catalog::required_parameters(service_code)?
        .into_iter()
        .collect();
    let supplied: BTreeSet<&str> = params.names().collect();

    for extra in supplied.difference(&required) {
        info!("extra parameter for {service_code}: {extra}");
    }

    let missing: Vec<String> = required
        .difference(&supplied)
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        for name in &missing {
            warn!("missing parameter for {service_code}: {name}");
        }
        return Err(Error::MissingParameters {
            service_code: service_code.to_string(),
            missing,
        });
    }

    Ok(())
}
