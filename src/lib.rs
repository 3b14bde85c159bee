#![forbid(unsafe_code)]

//! Rust client for the Elexon BMRS (Balancing Mechanism Reporting Service)
//! API.
//!
//! You name a report by its service code and supply its parameters; the
//! crate knows which parameters each service requires, fills in defaults,
//! renders dates and times to the wire formats, issues the GET, checks the
//! XML envelope for service-level success, and flattens the item list into
//! records ready for tabulation.
//!
//! **Quick start**
//! ```no_run
//! use chrono::NaiveDate;
//! use elexon_bmrs::{Client, ClientOptions, Params};
//!
//! let client = Client::new("my-api-key", ClientOptions::default())?;
//!
//! // Actual generation per type (B1630); Period defaults to "*".
//! let records = client.query_records(
//!     "B1630",
//!     Params::new().with("SettlementDate", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
//! )?;
//! println!("{} rows", records.len());
//! # Ok::<(), elexon_bmrs::Error>(())
//! ```
//!
//! **Key file and date ranges**
//! ```no_run
//! use chrono::NaiveDate;
//! use elexon_bmrs::{Client, ClientOptions, Params};
//!
//! let client = Client::from_key_file(None, ClientOptions::default())?;
//! let march = client.query_date_range(
//!     "B1770",
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//!     Params::new(),
//! )?;
//! # Ok::<(), elexon_bmrs::Error>(())
//! ```
//!
//! Notes:
//! - Access requires a BMRS API key (free registration with Elexon).
//! - The catalog of service codes is closed; unknown codes are rejected
//!   before any request is sent.

mod catalog;
mod client;
mod error;
mod params;
mod query;
mod response;
mod xml;

pub use crate::catalog::{
    API_KEY_PARAM, RECORD_TYPE_FIELD, default_value, echoes_data_item, is_known_service,
    required_parameters, service_codes,
};
pub use crate::client::{Client, ClientOptions, QueryChecks};
pub use crate::error::{Error, Result};
pub use crate::params::{ParamValue, Params};
pub use crate::query::{apply_defaults, format_temporal, validate_params};
pub use crate::response::{
    Record, RecordsByType, ResponseEnvelope, extract_records, extract_records_by_type,
    partition_by_record_type, validate_response,
};
pub use crate::xml::Node;
