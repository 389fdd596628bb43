//! Minimal element tree over `quick-xml` events
//!
//! The depletion chain schema is small and attribute heavy, so a tiny owned
//! tree is far easier to work with than matching on events everywhere. Unknown
//! elements survive a read/write cycle untouched.

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::f;

// standard library
use std::str::FromStr;

// external crates
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Owned XML element with attributes in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Attribute key/value pairs
    pub attributes: Vec<(String, String)>,
    /// Child elements
    pub children: Vec<Element>,
    /// Trimmed text content, if any
    pub text: Option<String>,
}

impl Element {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Raw attribute value
    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value that must be present
    pub(crate) fn required(&self, key: &str) -> Result<&str> {
        self.attr(key).ok_or_else(|| {
            Error::MalformedChain(f!("<{}> is missing the \"{key}\" attribute", self.name))
        })
    }

    /// Parse an attribute value if present
    pub(crate) fn parse_attr<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.attr(key)
            .map(|v| {
                v.trim().parse::<T>().map_err(|_| {
                    Error::ParseError(f!("bad \"{key}\" value \"{v}\" on <{}>", self.name))
                })
            })
            .transpose()
    }

    pub(crate) fn push_attr(&mut self, key: &str, value: impl ToString) {
        self.attributes.push((key.to_string(), value.to_string()));
    }

    /// Whitespace separated numbers in the text content
    pub(crate) fn numbers(&self) -> Result<Vec<f64>> {
        self.text
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| Error::ParseError(f!("bad number \"{v}\" in <{}>", self.name)))
            })
            .collect()
    }

    /// First child with a matching tag
    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Parse a full document into its root element
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::MalformedChain("unbalanced closing tag".into()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        let text = t.unescape()?;
                        match current.text.as_mut() {
                            Some(existing) => {
                                existing.push(' ');
                                existing.push_str(&text);
                            }
                            None => current.text = Some(text.into_owned()),
                        }
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if !stack.is_empty() {
            return Err(Error::MalformedChain(f!("unclosed <{}>", stack[0].name)));
        }
        root.ok_or_else(|| Error::MalformedChain("document has no root element".into()))
    }

    /// Serialise the element as a document with an XML declaration
    pub fn to_document(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        self.write(&mut writer)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::MalformedChain(f!("non utf-8 output: {e}")))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    fn from_start(e: &BytesStart) -> Result<Element> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut element = Element::new(&name);
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(Error::MalformedChain(f!(
                    "second root element <{}>",
                    element.name
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements() {
        let xml = r#"<?xml version="1.0"?>
            <a x="1">
              <b y="two &amp; three"/>
              <c>  1.0 2.0
                3.0 </c>
            </a>"#;
        let root = Element::parse(xml).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attr("y"), Some("two & three"));
        assert_eq!(root.child("c").unwrap().numbers().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn write_then_read() {
        let mut root = Element::new("root");
        root.push_attr("k", "a<b");
        let mut child = Element::new("values");
        child.text = Some("1 2 3".into());
        root.children.push(child);
        root.children.push(Element::new("empty"));

        let doc = root.to_document().unwrap();
        assert!(doc.starts_with("<?xml"));
        assert_eq!(Element::parse(&doc).unwrap(), root);
    }

    #[test]
    fn unbalanced() {
        assert!(Element::parse("<a><b></a>").is_err());
        assert!(Element::parse("").is_err());
    }
}
