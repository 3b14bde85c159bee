//! XML-to-mapping parsing for the response envelope.
//!
//! The API's responses are small documents of nested elements whose leaves
//! are text; attributes and namespaces do not occur. [`parse`] folds such a
//! document into a [`Node`] tree: elements become maps keyed by tag name,
//! leaves become text, and repeated sibling tags are promoted to a list.
//! A `responseList` with one `item` therefore parses as a map where a
//! multi-item list parses as a list; the extractor normalizes that shape.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;

use crate::error::{Error, Result};

/// One parsed XML value: element content, or the text of a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Map(BTreeMap<String, Node>),
    List(Vec<Node>),
}

impl Node {
    /// Child lookup; `None` for text and list nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(children) => children.get(key),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Map(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }
}

struct Frame {
    tag: String,
    children: BTreeMap<String, Node>,
    text: String,
}

/// Parse a document into a one-entry map keyed by the root tag.
pub fn parse(text: &str) -> Result<Node> {
    let mut reader = Reader::from_str(text);

    let mut top: BTreeMap<String, Node> = BTreeMap::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push(Frame {
                    tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    children: BTreeMap::new(),
                    text: String::new(),
                });
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut top, tag, Node::Text(String::new()));
            }
            Event::Text(e) => {
                let text = e
                    .decode()
                    .ok()
                    .and_then(|c| unescape(&c).map(|u| u.into_owned()).ok())
                    .unwrap_or_else(|| String::from_utf8_lossy(&e).into_owned());
                let text = text.trim();
                if !text.is_empty() {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(text);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::MalformedResponse("unbalanced element close".into()))?;
                let node = if frame.children.is_empty() {
                    Node::Text(frame.text)
                } else {
                    // Mixed content does not occur in this API; stray text
                    // around child elements is dropped.
                    Node::Map(frame.children)
                };
                attach(&mut stack, &mut top, frame.tag, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::MalformedResponse("unterminated element".into()));
    }

    Ok(Node::Map(top))
}

/// Insert a finished element into its parent, promoting repeated sibling
/// tags to a list.
fn attach(stack: &mut [Frame], top: &mut BTreeMap<String, Node>, tag: String, node: Node) {
    let target = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => top,
    };

    match target.get_mut(&tag) {
        None => {
            target.insert(tag, node);
        }
        Some(Node::List(items)) => items.push(node),
        Some(existing) => {
            let first = std::mem::replace(existing, Node::List(Vec::new()));
            if let Node::List(items) = existing {
                items.push(first);
                items.push(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_become_text() {
        let doc = parse("<a><b>hello</b></a>").unwrap();
        assert_eq!(
            doc.get("a").and_then(|a| a.get("b")).and_then(Node::as_text),
            Some("hello")
        );
    }

    #[test]
    fn single_child_is_a_map_not_a_list() {
        let doc = parse("<list><item><v>1</v></item></list>").unwrap();
        let item = doc.get("list").and_then(|l| l.get("item")).unwrap();
        assert!(item.as_map().is_some());
        assert!(item.as_list().is_none());
    }

    #[test]
    fn repeated_siblings_promote_to_a_list() {
        let doc = parse("<list><item>1</item><item>2</item><item>3</item></list>").unwrap();
        let items = doc
            .get("list")
            .and_then(|l| l.get("item"))
            .and_then(Node::as_list)
            .unwrap();
        let texts: Vec<&str> = items.iter().filter_map(Node::as_text).collect();
        assert_eq!(texts, ["1", "2", "3"]);
    }

    #[test]
    fn empty_elements_become_empty_text() {
        let doc = parse("<a><b/><c></c></a>").unwrap();
        let a = doc.get("a").unwrap();
        assert_eq!(a.get("b").and_then(Node::as_text), Some(""));
        assert_eq!(a.get("c").and_then(Node::as_text), Some(""));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let doc = parse("<a>\n  <b>  x  </b>\n</a>").unwrap();
        assert_eq!(
            doc.get("a").and_then(|a| a.get("b")).and_then(Node::as_text),
            Some("x")
        );
    }

    #[test]
    fn declarations_are_skipped() {
        let doc = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><a><b>x</b></a>").unwrap();
        assert!(doc.get("a").is_some());
    }

    #[test]
    fn truncated_documents_fail() {
        assert!(parse("<a><b>x</b>").is_err());
    }
}
