//! Static BMRS service catalog.
//!
//! Every report the API serves is addressed by a service code. Codes share
//! parameter requirements through a numbered group, so the catalog is two
//! tables: service to group, and group to required parameter names. A third
//! column records whether the response body echoes the requested code under
//! `dataItem` (the transparency `B…` services do, the legacy ones do not).
//!
//! The tables are fixed at compile time and never mutated; [`verify`] checks
//! their consistency once at client construction.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Query-string name under which the API key is sent. Required by every
/// service.
pub const API_KEY_PARAM: &str = "APIKey";

/// Literal the server places in `responseMetadata/description` when the
/// query was accepted.
pub const SUCCESS_DESCRIPTION: &str = "Success";

/// Discriminator field carried by heterogeneous item lists.
pub const RECORD_TYPE_FIELD: &str = "recordType";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parameter names carrying a calendar date, sent as `YYYY-MM-DD`.
pub const DATE_PARAMS: &[&str] = &[
    "SettlementDate",
    "FromSettlementDate",
    "ToSettlementDate",
    "StartDate",
    "EndDate",
    "FromDate",
    "ToDate",
    "FromClearedDate",
    "ToClearedDate",
];

/// Parameter names carrying a time of day, sent as `HH:MM:SS`.
pub const TIME_PARAMS: &[&str] = &["StartTime", "EndTime"];

/// Parameter names carrying a combined timestamp, sent as
/// `YYYY-MM-DD HH:MM:SS`.
pub const DATETIME_PARAMS: &[&str] = &["FromDateTime", "ToDateTime"];

/// Defaults injected for required parameters the caller omitted.
///
/// A single entry today; the mechanism applies to any required name.
pub const DEFAULT_PARAM_VALUES: &[(&str, &str)] = &[
    // all settlement periods of the day
    ("Period", "*"),
];

#[derive(Debug, Clone, Copy)]
struct Service {
    code: &'static str,
    group: u8,
    echoes_data_item: bool,
}

const fn svc(code: &'static str, group: u8, echoes_data_item: bool) -> Service {
    Service {
        code,
        group,
        echoes_data_item,
    }
}

const SERVICES: &[Service] = &[
    svc("B0610", 1, true),
    svc("B0620", 1, true),
    svc("B0630", 2, true),
    svc("B0640", 3, true),
    svc("B0650", 4, true),
    svc("B0710", 5, true),
    svc("B0720", 5, true),
    svc("B0810", 4, true),
    svc("B0910", 4, true),
    svc("B1010", 5, true),
    svc("B1020", 5, true),
    svc("B1030", 5, true),
    svc("B1320", 1, true),
    svc("B1330", 3, true),
    svc("B1410", 4, true),
    svc("B1420", 4, true),
    svc("B1430", 1, true),
    svc("B1440", 1, true),
    svc("B1510", 5, true),
    svc("B1520", 5, true),
    svc("B1530", 5, true),
    svc("B1540", 5, true),
    svc("B1610", 1, true),
    svc("B1620", 1, true),
    svc("B1630", 1, true),
    svc("B1720", 1, true),
    svc("B1730", 1, true),
    svc("B1740", 1, true),
    svc("B1750", 1, true),
    svc("B1760", 1, true),
    svc("B1770", 1, true),
    svc("B1780", 1, true),
    svc("B1790", 1, true),
    svc("B1810", 1, true),
    svc("B1820", 1, true),
    svc("B1830", 1, true),
    svc("BMUNITSEARCH", 14, false),
    svc("BOD", 11, false),
    svc("CDN", 7, false),
    svc("DEMCI", 15, false),
    svc("DEMMF2T14D", 11, false),
    svc("DEMMF2T52W", 11, false),
    svc("DERBMDATA", 8, false),
    svc("DERSYSDATA", 12, false),
    svc("DETSYSPRICES", 8, false),
    svc("DEVINDOD", 6, false),
    svc("DISBSAD", 6, false),
    svc("DYNBMDATA", 8, false),
    svc("FORDAYDEM", 6, false),
    svc("FOU2T14D", 11, false),
    svc("FOU2T52W", 11, false),
    svc("FREQ", 9, false),
    svc("FUELHH", 6, false),
    svc("FUELINST", 9, false),
    svc("FUELINSTHHCUR", 10, false),
    svc("HISTACCEPTS", 8, false),
    svc("HISTSYSWARN", 11, false),
    svc("INDOITSDO", 6, false),
    svc("INDPKDEMINFO", 11, false),
    svc("INDTRIADDEMINFO", 11, false),
    svc("INTERFUELHH", 6, false),
    svc("LATESTACCEPTS", 11, false),
    svc("LOLPDRM", 15, false),
    svc("MELIMBALNGC", 6, false),
    svc("MID", 6, false),
    svc("MKTDEPTHDATA", 13, false),
    svc("NETBSAD", 8, false),
    svc("NONBM", 6, false),
    svc("NOU2T14D", 11, false),
    svc("NOU2T52W", 11, false),
    svc("NOUY1", 11, false),
    svc("NOUY2", 11, false),
    svc("NOUY3", 11, false),
    svc("NOUY4", 11, false),
    svc("NOUY5", 11, false),
    svc("PHYBMDATA", 8, false),
    svc("PKDEMYESTTDYTOM", 11, false),
    svc("QAS", 6, false),
    svc("ROLSYSDEM", 6, false),
    svc("SOSOP", 11, false),
    svc("SOSOT", 11, false),
    svc("STORAW", 16, false),
    svc("SYSDEM", 6, false),
    svc("SYSMSG", 11, false),
    svc("SYSWARN", 6, false),
    svc("SYSWARNTDYTOM", 11, false),
    svc("TEMP", 6, false),
    svc("TRADINGUNIT", 8, false),
    svc("UOU2T14D", 11, false),
    svc("UOU2T52W", 11, false),
    svc("WINDFORFUELHH", 6, false),
    svc("WINDFORPK", 6, false),
    svc("ZOU2T14D", 11, false),
    svc("ZOU2T52W", 11, false),
    svc("ZOUY1", 11, false),
    svc("ZOUY2", 11, false),
    svc("ZOUY3", 11, false),
    svc("ZOUY4", 11, false),
    svc("ZOUY5", 11, false),
];

/// Parameters required by each group, on top of the API key.
///
/// Group 11 services take the key alone.
const GROUP_TO_REQUIRED: &[(u8, &[&str])] = &[
    (1, &["SettlementDate", "Period"]),
    (2, &["Year", "Week"]),
    (3, &["Year", "Month"]),
    (4, &["Year"]),
    (5, &["StartDate", "EndTime", "StartTime", "EndDate"]),
    (6, &["FromDate", "ToDate"]),
    (7, &["FromClearedDate", "ToClearedDate"]),
    (8, &["SettlementDate", "SettlementPeriod"]),
    (9, &["FromDateTime", "ToDateTime"]),
    (10, &["FuelType"]),
    (11, &[]),
    (12, &["FromSettlementDate", "ToSettlementDate", "SettlementPeriod"]),
    (13, &["SettlementDate"]),
    (14, &["BmUnitId", "BmUnitType", "LeadPartyName", "NgcBmUnitName"]),
    (15, &["FromSettlementDate", "ToSettlementDate"]),
    (16, &["FromSettlementDate"]),
];

fn service(code: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.code == code)
}

fn group_required(group: u8) -> Option<&'static [&'static str]> {
    GROUP_TO_REQUIRED
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, params)| *params)
}

/// All service codes in the catalog, in table order.
pub fn service_codes() -> impl Iterator<Item = &'static str> {
    SERVICES.iter().map(|s| s.code)
}

pub fn is_known_service(code: &str) -> bool {
    service(code).is_some()
}

/// Required query parameter names for a service: the API key plus the
/// service group's parameters.
pub fn required_parameters(service_code: &str) -> Result<BTreeSet<&'static str>> {
    let svc = service(service_code)
        .ok_or_else(|| Error::UnknownService(service_code.to_string()))?;
    let params = group_required(svc.group).ok_or_else(|| {
        Error::Configuration(format!(
            "service {service_code} references undefined group {}",
            svc.group
        ))
    })?;

    let mut required = BTreeSet::from([API_KEY_PARAM]);
    required.extend(params.iter().copied());
    Ok(required)
}

/// Whether the response body echoes the requested code under `dataItem`.
///
/// Unknown codes answer `false`; rejecting them is the validators' job.
pub fn echoes_data_item(service_code: &str) -> bool {
    service(service_code).is_some_and(|s| s.echoes_data_item)
}

pub fn default_value(name: &str) -> Option<&'static str> {
    DEFAULT_PARAM_VALUES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

pub fn is_date_param(name: &str) -> bool {
    DATE_PARAMS.contains(&name)
}

pub fn is_time_param(name: &str) -> bool {
    TIME_PARAMS.contains(&name)
}

pub fn is_datetime_param(name: &str) -> bool {
    DATETIME_PARAMS.contains(&name)
}

/// Consistency check run once at client construction: every group a service
/// references must be defined, or that service's required set would come out
/// wrong at query time.
pub fn verify() -> Result<()> {
    let mut undefined: Vec<u8> = SERVICES
        .iter()
        .map(|s| s.group)
        .filter(|g| group_required(*g).is_none())
        .collect();
    undefined.sort_unstable();
    undefined.dedup();

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "service groups without a parameter list: {undefined:?}"
        )))
    }
}
