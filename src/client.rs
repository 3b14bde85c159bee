use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::catalog::{self, API_KEY_PARAM};
use crate::error::{Error, Result};
use crate::params::Params;
use crate::query::{apply_defaults, format_temporal, validate_params};
use crate::response::{
    Record, RecordsByType, ResponseEnvelope, extract_records, extract_records_by_type,
    validate_response,
};

const DEFAULT_BASE_URL: &str = "https://api.bmreports.com/BMRS";
const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_KEY_FILENAME: &str = "api_key.txt";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub api_version: String,
    /// Key file read by [`Client::from_key_file`] when no path is given.
    pub key_file: PathBuf,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            key_file: PathBuf::from(DEFAULT_KEY_FILENAME),
        }
    }
}

/// Which validation stages run for a query. Both are on by default.
#[derive(Debug, Clone, Copy)]
pub struct QueryChecks {
    pub query: bool,
    pub response: bool,
}

impl Default for QueryChecks {
    fn default() -> Self {
        Self {
            query: true,
            response: true,
        }
    }
}

/// Blocking client for the BMRS API.
///
/// The query pipeline itself (catalog lookup, defaulting, formatting,
/// validation, extraction) is pure and stateless; the client adds the API
/// key, the HTTP transport and the URL layout around it.
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    base_url: Url,
    api_version: String,
    http: HttpClient,
}

impl Client {
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Result<Self> {
        // A service row pointing at an undefined group is a packaging bug;
        // surface it before any query can be built.
        catalog::verify()?;

        let base_url = Url::parse(&options.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("elexon-bmrs-rs/0.1"));
        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            api_version: options.api_version,
            http,
        })
    }

    /// Construct from a one-line key file.
    ///
    /// Falls back to the options' key file path when `key_file` is `None`.
    pub fn from_key_file(key_file: Option<&Path>, options: ClientOptions) -> Result<Self> {
        let path = key_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| options.key_file.clone());
        let api_key = fs::read_to_string(&path)?.trim().to_string();
        Self::new(api_key, options)
    }

    /// Endpoint for one service: `{base}/{code}/{version}`.
    pub fn service_url(&self, service_code: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            service_code,
            self.api_version
        )
    }

    /// Query one service and return the validated envelope.
    pub fn query(&self, service_code: &str, params: Params) -> Result<ResponseEnvelope> {
        self.query_with(service_code, params, QueryChecks::default())
    }

    /// Query with explicit control over the two validation stages.
    pub fn query_with(
        &self,
        service_code: &str,
        mut params: Params,
        checks: QueryChecks,
    ) -> Result<ResponseEnvelope> {
        params.set(API_KEY_PARAM, self.api_key.as_str());
        apply_defaults(service_code, &mut params)?;
        format_temporal(&mut params);
        if checks.query {
            validate_params(service_code, &params)?;
        }

        let url = self.service_url(service_code);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .query(&params.to_query())
            .header(ACCEPT, "application/xml")
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = ResponseEnvelope::from_xml(&body)?;
        if checks.response {
            validate_response(service_code, &envelope)?;
        }
        Ok(envelope)
    }

    /// Query and flatten the body's item list into records.
    pub fn query_records(&self, service_code: &str, params: Params) -> Result<Vec<Record>> {
        let envelope = self.query(service_code, params)?;
        extract_records(&envelope)
    }

    /// Query and partition the body's records by record type.
    pub fn query_records_by_type(
        &self,
        service_code: &str,
        params: Params,
    ) -> Result<RecordsByType> {
        let envelope = self.query(service_code, params)?;
        extract_records_by_type(&envelope)
    }

    /// Query a settlement-date service day by day over an inclusive range
    /// and concatenate the records.
    ///
    /// Strictly sequential; the first failing day aborts the loop and
    /// discards the days already fetched.
    pub fn query_date_range(
        &self,
        service_code: &str,
        from: NaiveDate,
        to: NaiveDate,
        params: Params,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut day = from;
        while day <= to {
            let mut daily = params.clone();
            daily.set("SettlementDate", day);
            records.extend(self.query_records(service_code, daily)?);
            day += Duration::days(1);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_url_layout() {
        let client = Client::new("k", ClientOptions::default()).unwrap();
        assert_eq!(
            client.service_url("B1630"),
            "https://api.bmreports.com/BMRS/B1630/v1"
        );
    }

    #[test]
    fn service_url_tolerates_trailing_slash() {
        let client = Client::new(
            "k",
            ClientOptions {
                base_url: "https://example.invalid/BMRS/".to_string(),
                ..ClientOptions::default()
            },
        )
        .unwrap();
        assert_eq!(
            client.service_url("FUELINST"),
            "https://example.invalid/BMRS/FUELINST/v1"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let result = Client::new(
            "k",
            ClientOptions {
                base_url: "not a url".to_string(),
                ..ClientOptions::default()
            },
        );
        assert!(matches!(result, Err(Error::Url(_))));
    }
}
