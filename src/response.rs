//! Response envelope validation and record extraction.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::catalog::{self, RECORD_TYPE_FIELD, SUCCESS_DESCRIPTION};
use crate::error::{Error, Result};
use crate::xml::{self, Node};

/// One flat item row, field name to text value.
pub type Record = BTreeMap<String, String>;

/// Records partitioned by record type, in first-seen key order.
pub type RecordsByType = Vec<(String, Vec<Record>)>;

/// Parsed `response` document root.
///
/// Wraps the node tree produced by [`crate::xml::parse`] and knows where the
/// metadata and body live inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    root: Node,
}

impl ResponseEnvelope {
    /// Parse a raw XML body and locate the `response` root element.
    pub fn from_xml(text: &str) -> Result<Self> {
        let doc = xml::parse(text)?;
        let root = doc
            .get("response")
            .cloned()
            .ok_or_else(|| Error::MalformedResponse("missing response root element".into()))?;
        Ok(Self { root })
    }

    /// Wrap an already-parsed root element.
    pub fn from_node(root: Node) -> Self {
        Self { root }
    }

    fn lookup(&self, path: &[&str]) -> Result<&Node> {
        let mut node = &self.root;
        for (depth, key) in path.iter().enumerate() {
            node = node.get(key).ok_or_else(|| {
                Error::MalformedResponse(format!("missing {}", path[..=depth].join("/")))
            })?;
        }
        Ok(node)
    }

    fn text_at(&self, path: &[&str]) -> Result<&str> {
        self.lookup(path)?.as_text().ok_or_else(|| {
            Error::MalformedResponse(format!("{} is not a text value", path.join("/")))
        })
    }

    /// Server-side status description from the metadata section.
    pub fn description(&self) -> Result<&str> {
        self.text_at(&["responseMetadata", "description"])
    }

    /// Query string the server echoes back in the metadata section.
    pub fn query_string(&self) -> Result<&str> {
        self.text_at(&["responseMetadata", "queryString"])
    }

    /// Data-item code declared in the body of list-type services.
    pub fn data_item(&self) -> Result<&str> {
        self.text_at(&["responseBody", "dataItem"])
    }
}

/// Check service-level success and, for transparency services, the echoed
/// data-item code.
///
/// A non-success description means the server rejected the query inside an
/// otherwise healthy HTTP exchange. A mismatched echo means something
/// upstream mixed up responses and is not a condition callers should
/// routinely handle.
pub fn validate_response(service_code: &str, envelope: &ResponseEnvelope) -> Result<()> {
    let description = envelope.description()?;
    let query_string = envelope.query_string()?;

    if description != SUCCESS_DESCRIPTION {
        warn!("query rejected for {service_code}: {description}");
        return Err(Error::QueryRejected {
            description: description.to_string(),
            query_string: query_string.to_string(),
        });
    }

    if catalog::echoes_data_item(service_code) {
        let returned = envelope.data_item()?;
        if returned != service_code {
            return Err(Error::ServiceCodeMismatch {
                requested: service_code.to_string(),
                returned: returned.to_string(),
            });
        }
    }

    Ok(())
}

/// Flatten the body's item list into records.
///
/// A body holding exactly one item parses as a bare map rather than a list;
/// that shape is normalized to a one-element sequence up front.
pub fn extract_records(envelope: &ResponseEnvelope) -> Result<Vec<Record>> {
    let items = envelope.lookup(&["responseBody", "responseList", "item"])?;

    let items: Vec<&Node> = match items {
        Node::List(nodes) => nodes.iter().collect(),
        single => vec![single],
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| record_from_item(item, index))
        .collect()
}

fn record_from_item(item: &Node, index: usize) -> Result<Record> {
    let fields = item
        .as_map()
        .ok_or_else(|| Error::MalformedResponse(format!("item {index} is not an element")))?;

    let mut record = Record::new();
    for (name, value) in fields {
        match value.as_text() {
            Some(text) => {
                record.insert(name.clone(), text.to_string());
            }
            None => debug!("item {index}: skipping nested field {name}"),
        }
    }
    Ok(record)
}

/// Partition the body's records by their record type field.
///
/// Key order follows first appearance; record order within a type is the
/// document order.
pub fn extract_records_by_type(envelope: &ResponseEnvelope) -> Result<RecordsByType> {
    partition_by_record_type(extract_records(envelope)?)
}

/// Partition an already-extracted record sequence by record type.
pub fn partition_by_record_type(records: Vec<Record>) -> Result<RecordsByType> {
    let mut groups: RecordsByType = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let kind = record
            .get(RECORD_TYPE_FIELD)
            .ok_or(Error::MissingDiscriminator { index })?
            .clone();
        match groups.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, members)) => members.push(record),
            None => groups.push((kind, vec![record])),
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(xml: &str) -> ResponseEnvelope {
        ResponseEnvelope::from_xml(xml).unwrap()
    }

    fn success_envelope(data_item: &str, items_xml: &str) -> ResponseEnvelope {
        envelope(&format!(
            "<response>\
               <responseMetadata>\
                 <httpCode>200</httpCode>\
                 <description>Success</description>\
                 <queryString>q</queryString>\
               </responseMetadata>\
               <responseBody>\
                 <dataItem>{data_item}</dataItem>\
                 <responseList>{items_xml}</responseList>\
               </responseBody>\
             </response>"
        ))
    }

    #[test]
    fn success_with_matching_echo_passes() {
        let env = success_envelope("B1630", "<item><a>1</a></item>");
        validate_response("B1630", &env).unwrap();
    }

    #[test]
    fn echo_mismatch_is_reported() {
        let env = success_envelope("B1640", "<item><a>1</a></item>");
        match validate_response("B1630", &env) {
            Err(Error::ServiceCodeMismatch {
                requested,
                returned,
            }) => {
                assert_eq!(requested, "B1630");
                assert_eq!(returned, "B1640");
            }
            other => panic!("expected ServiceCodeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn non_echoing_services_skip_the_body_check() {
        // No responseBody at all; metadata alone satisfies FUELINST.
        let env = envelope(
            "<response>\
               <responseMetadata>\
                 <description>Success</description>\
                 <queryString>q</queryString>\
               </responseMetadata>\
             </response>",
        );
        validate_response("FUELINST", &env).unwrap();
    }

    #[test]
    fn rejection_wins_regardless_of_body() {
        let env = envelope(
            "<response>\
               <responseMetadata>\
                 <description>Invalid Request</description>\
                 <queryString>APIKey=x</queryString>\
               </responseMetadata>\
               <responseBody>\
                 <dataItem>B1630</dataItem>\
               </responseBody>\
             </response>",
        );
        match validate_response("B1630", &env) {
            Err(Error::QueryRejected {
                description,
                query_string,
            }) => {
                assert_eq!(description, "Invalid Request");
                assert_eq!(query_string, "APIKey=x");
            }
            other => panic!("expected QueryRejected, got {other:?}"),
        }
    }

    #[test]
    fn missing_metadata_is_malformed() {
        let env = envelope("<response><responseBody/></response>");
        assert!(matches!(
            validate_response("B1630", &env),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn multi_item_bodies_extract_in_order() {
        let env = success_envelope(
            "B1630",
            "<item><period>1</period><mw>10</mw></item>\
             <item><period>2</period><mw>20</mw></item>\
             <item><period>3</period><mw>30</mw></item>",
        );
        let records = extract_records(&env).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["period"], "1");
        assert_eq!(records[2]["mw"], "30");
    }

    #[test]
    fn single_item_bodies_normalize_to_one_record() {
        let env = success_envelope("B1630", "<item><period>1</period><mw>10</mw></item>");
        let records = extract_records(&env).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["mw"], "10");
    }

    #[test]
    fn empty_fields_extract_as_empty_strings() {
        let env = success_envelope("B1630", "<item><period>1</period><note/></item>");
        let records = extract_records(&env).unwrap();
        assert_eq!(records[0]["note"], "");
    }

    #[test]
    fn missing_item_list_is_malformed() {
        let env = envelope(
            "<response>\
               <responseMetadata>\
                 <description>Success</description>\
                 <queryString>q</queryString>\
               </responseMetadata>\
               <responseBody><dataItem>B1630</dataItem></responseBody>\
             </response>",
        );
        assert!(matches!(
            extract_records(&env),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn partition_preserves_first_seen_order() {
        let env = success_envelope(
            "FUELINST",
            "<item><recordType>a</recordType><v>1</v></item>\
             <item><recordType>b</recordType><v>2</v></item>\
             <item><recordType>b</recordType><v>3</v></item>",
        );
        let by_type = extract_records_by_type(&env).unwrap();

        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].0, "a");
        assert_eq!(by_type[1].0, "b");
        assert_eq!(by_type[0].1[0]["v"], "1");
        let b_values: Vec<&str> = by_type[1].1.iter().map(|r| r["v"].as_str()).collect();
        assert_eq!(b_values, ["2", "3"]);
    }

    #[test]
    fn partition_flattens_back_to_the_original_sequence() {
        let env = success_envelope(
            "FUELINST",
            "<item><recordType>a</recordType><v>1</v></item>\
             <item><recordType>b</recordType><v>2</v></item>\
             <item><recordType>a</recordType><v>3</v></item>",
        );
        let original = extract_records(&env).unwrap();
        let by_type = extract_records_by_type(&env).unwrap();

        // Every group is the subsequence of the original with that type, so
        // replaying the original's type sequence drains the groups back into
        // the original order.
        let mut queues: Vec<(String, std::collections::VecDeque<Record>)> = by_type
            .into_iter()
            .map(|(kind, members)| (kind, members.into()))
            .collect();
        let mut replayed: Vec<Record> = Vec::new();
        for record in &original {
            let kind = &record[RECORD_TYPE_FIELD];
            let queue = queues.iter_mut().find(|(k, _)| k == kind).unwrap();
            replayed.push(queue.1.pop_front().unwrap());
        }
        assert_eq!(replayed, original);
        assert!(queues.iter().all(|(_, q)| q.is_empty()));
    }

    #[test]
    fn records_without_the_discriminator_fail() {
        let env = success_envelope(
            "FUELINST",
            "<item><recordType>a</recordType><v>1</v></item>\
             <item><v>2</v></item>",
        );
        assert!(matches!(
            extract_records_by_type(&env),
            Err(Error::MissingDiscriminator { index: 1 })
        ));
    }
}
