//! Thin XML writer over quick-xml for the spec document

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{LaunchError, Result};

pub(crate) struct SpecWriter {
    writer: Writer<Vec<u8>>,
}

impl SpecWriter {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// Writes the XML declaration and the DOCTYPE of the spec
    pub(crate) fn preamble(&mut self, public_id: &str, dtd_url: &str) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        let doctype = format!(r#"spec PUBLIC "{}" "{}""#, public_id, dtd_url);
        self.write(Event::DocType(BytesText::from_escaped(doctype)))
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    /// Writes `<name>text</name>`, or `<name/>` when the text is empty
    pub(crate) fn element(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name, &[]);
        }
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| LaunchError::Serialize(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| LaunchError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_and_escaping() {
        let mut writer = SpecWriter::new();
        writer.start("layer", &[("name", "a&b")]).unwrap();
        writer.element("cmd", "x < y").unwrap();
        writer.element("tags", "").unwrap();
        writer.end("layer").unwrap();

        assert_eq!(
            writer.into_string().unwrap(),
            r#"<layer name="a&amp;b"><cmd>x &lt; y</cmd><tags/></layer>"#
        );
    }

    #[test]
    fn test_preamble() {
        let mut writer = SpecWriter::new();
        writer.preamble("Public Id", "http://host/spec.dtd").unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            r#"<?xml version="1.0"?><!DOCTYPE spec PUBLIC "Public Id" "http://host/spec.dtd">"#
        );
    }
}
