//! Streaming XML plumbing shared by the OOXML state machines.
//!
//! Both the document and the slide parsers are driven by [`walk`], which
//! tokenizes a part with `quick-xml`, keeps an [`ElementStack`] of open
//! element local names, and forwards structural events to a
//! [`MarkupHandler`]. Self-closing elements are delivered as a start
//! immediately followed by an end, so handlers never need to special-case
//! them.

use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Stack of currently open element local names, outermost first.
#[derive(Debug, Default, Clone)]
pub struct ElementStack {
    names: Vec<String>,
}

impl ElementStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    /// Whether an element with this local name is open anywhere above.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Innermost open element.
    pub fn current(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Receiver of the structural events produced by [`walk`].
pub trait MarkupHandler {
    /// An element opened. `stack` already includes it.
    fn start(&mut self, element: &BytesStart<'_>, name: &str, stack: &ElementStack);

    /// An element closed. `stack` still includes it.
    fn end(&mut self, name: &str, stack: &ElementStack);

    /// Unescaped character data.
    fn text(&mut self, text: &str);
}

/// Tokenize `input` and drive `handler` until end of input.
///
/// Fails with [`Error::MalformedXml`] naming `part` on invalid UTF-8,
/// mismatched end tags, or elements still open at end of input.
pub fn walk<R, H>(input: R, part: &str, handler: &mut H) -> Result<()>
where
    R: BufRead,
    H: MarkupHandler,
{
    let mut reader = Reader::from_reader(input);
    reader.check_end_names(true);

    let mut stack = ElementStack::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::malformed(part, stack.current(), e))?;

        match event {
            Event::Start(ref e) => {
                let name = element_name(e);
                stack.push(&name);
                handler.start(e, &name, &stack);
            }
            Event::Empty(ref e) => {
                let name = element_name(e);
                stack.push(&name);
                handler.start(e, &name, &stack);
                handler.end(&name, &stack);
                stack.pop();
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                handler.end(&name, &stack);
                stack.pop();
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::malformed(part, stack.current(), err))?;
                handler.text(&text);
            }
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e)
                    .map_err(|err| Error::malformed(part, stack.current(), err))?;
                handler.text(text);
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if let Some(open) = stack.current() {
        return Err(Error::malformed(
            part,
            Some(open),
            format!("unexpected end of input with {} element(s) still open", stack.depth()),
        ));
    }

    Ok(())
}

/// Local name of an element, with any namespace prefix removed.
pub fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// Value of the attribute whose local name is `name`, if present.
///
/// Prefixes are ignored, so `w:val` and `val` both match `"val"`.
pub fn attr_value(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name.as_bytes())
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// Wrap run text in Markdown emphasis markers.
///
/// Empty text stays empty so no stray `**` pairs appear in the output.
pub fn format_run(text: &str, bold: bool, italic: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    match (bold, italic) {
        (true, true) => format!("***{}***", text),
        (true, false) => format!("**{}**", text),
        (false, true) => format!("*{}*", text),
        (false, false) => text.to_string(),
    }
}
