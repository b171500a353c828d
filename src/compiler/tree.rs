//! Abstract Document Tree.
//!
//! The converter's JSON (pandoc's `{"t": .., "c": ..}` encoding) parsed into
//! a closed set of node variants. Only paragraphs, links and images are
//! understood; everything else is kept structurally so the tree serializes
//! back to an equivalent JSON document.

use serde_json::{Map, Value};

/// A link or image target: `"c": [<leading>.., [<url>, <rest>..]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Attributes and description inlines.
    pub leading: Vec<Node>,
    pub url: String,
    /// Remaining target-tuple fields (the title).
    pub rest: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `Para` with its inlines.
    Paragraph(Vec<Node>),
    Link(Target),
    Image(Target),
    /// Any other tagged node. Content is absent for nodes like `Space`.
    Element {
        tag: String,
        content: Option<Box<Node>>,
    },
    /// Untagged object, e.g. the document root or `meta`.
    Map(Vec<(String, Node)>),
    List(Vec<Node>),
    Leaf(Value),
}

impl Node {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_value).collect()),
            Value::Object(map) => Self::from_object(map),
            leaf => Self::Leaf(leaf),
        }
    }

    fn from_object(mut map: Map<String, Value>) -> Self {
        let is_tagged = map.get("t").is_some_and(Value::is_string)
            && map.keys().all(|k| k == "t" || k == "c");
        if !is_tagged {
            return Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_value(v)))
                    .collect(),
            );
        }

        let tag = match map.remove("t") {
            Some(Value::String(tag)) => tag,
            _ => String::new(),
        };
        let content = map.remove("c");

        match content {
            Some(Value::Array(inlines)) if tag == "Para" => {
                Self::Paragraph(inlines.into_iter().map(Self::from_value).collect())
            }
            Some(Value::Array(fields)) if tag == "Link" || tag == "Image" => {
                match Target::parse(fields) {
                    Ok(target) if tag == "Link" => Self::Link(target),
                    Ok(target) => Self::Image(target),
                    Err(fields) => Self::Element {
                        tag,
                        content: Some(Box::new(Self::from_value(Value::Array(fields)))),
                    },
                }
            }
            content => Self::Element {
                tag,
                content: content.map(|c| Box::new(Self::from_value(c))),
            },
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Paragraph(inlines) => tagged("Para", Some(list(inlines))),
            Self::Link(target) => tagged("Link", Some(target.to_value())),
            Self::Image(target) => tagged("Image", Some(target.to_value())),
            Self::Element { tag, content } => tagged(tag, content.as_deref().map(Self::to_value)),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Self::List(items) => list(items),
            Self::Leaf(value) => value.clone(),
        }
    }

    /// Visit the target of every link and image, depth first.
    ///
    /// Link descriptions are visited too, so an image inside a link is
    /// reached as well.
    pub fn for_each_target(&mut self, f: &mut impl FnMut(&mut String)) {
        match self {
            Self::Paragraph(children) | Self::List(children) => {
                children.iter_mut().for_each(|c| c.for_each_target(f));
            }
            Self::Link(target) | Self::Image(target) => {
                f(&mut target.url);
                target.leading.iter_mut().for_each(|c| c.for_each_target(f));
            }
            Self::Element { content, .. } => {
                if let Some(content) = content {
                    content.for_each_target(f);
                }
            }
            Self::Map(entries) => {
                entries.iter_mut().for_each(|(_, v)| v.for_each_target(f));
            }
            Self::Leaf(_) => {}
        }
    }
}

impl Target {
    /// Split `[<leading>.., [<url>, <rest>..]]`. Gives the fields back when
    /// the shape does not match.
    fn parse(mut fields: Vec<Value>) -> Result<Self, Vec<Value>> {
        let url_ok = matches!(
            fields.last(),
            Some(Value::Array(tuple)) if matches!(tuple.first(), Some(Value::String(_)))
        );
        if !url_ok {
            return Err(fields);
        }

        let Some(Value::Array(mut tuple)) = fields.pop() else {
            return Err(fields);
        };
        let Value::String(url) = tuple.remove(0) else {
            return Err(fields);
        };

        Ok(Self {
            leading: fields.into_iter().map(Node::from_value).collect(),
            url,
            rest: tuple,
        })
    }

    fn to_value(&self) -> Value {
        let mut tuple = Vec::with_capacity(self.rest.len() + 1);
        tuple.push(Value::String(self.url.clone()));
        tuple.extend(self.rest.iter().cloned());

        let mut fields: Vec<Value> = self.leading.iter().map(Node::to_value).collect();
        fields.push(Value::Array(tuple));
        Value::Array(fields)
    }
}

fn tagged(tag: &str, content: Option<Value>) -> Value {
    let mut map = Map::new();
    map.insert("t".into(), Value::String(tag.into()));
    if let Some(content) = content {
        map.insert("c".into(), content);
    }
    Value::Object(map)
}

fn list(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(Node::to_value).collect())
}

/// A whole document as produced by the converter's tree mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DocTree {
    pub root: Node,
}

impl DocTree {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self {
            root: Node::from_value(value),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.root.to_value())
    }
}
