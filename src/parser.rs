use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors that can occur while extracting release entries from an appcast.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is structurally unparsable. Feed-level: no partial
    /// result is produced.
    #[error("XML parse error: {0}")]
    Xml(String),
}

/// One `<item>` entry as it appears in the feed, before date normalization
/// and description cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub version: String,
    pub short_version: String,
    pub pub_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Version,
    ShortVersion,
    PubDate,
    Description,
}

impl Field {
    fn of(tag: &[u8]) -> Option<Self> {
        match tag {
            b"sparkle:version" => Some(Field::Version),
            b"sparkle:shortVersionString" => Some(Field::ShortVersion),
            b"pubDate" => Some(Field::PubDate),
            b"description" => Some(Field::Description),
            _ => None,
        }
    }
}

fn field_mut<'a>(item: &'a mut RawItem, field: Field) -> &'a mut String {
    match field {
        Field::Version => &mut item.version,
        Field::ShortVersion => &mut item.short_version,
        Field::PubDate => &mut item.pub_date,
        Field::Description => &mut item.description,
    }
}

/// Parses appcast XML and extracts every `<item>` entry in document order.
///
/// Parsing is tolerant: mismatched or unmatched end tags are accepted, text
/// with unknown entities is taken verbatim, and a missing child never aborts
/// the item or the feed - each absent field defaults to an empty string. An
/// item is kept even when all four fields are empty, so the result is
/// one-to-one with the feed's items.
///
/// # Errors
///
/// Returns [`ParseError::Xml`] when the document is structurally
/// unparsable (e.g. an unterminated comment or CDATA section). This is the
/// only feed-level failure; callers present the fallback error document.
pub fn parse_appcast(bytes: &[u8]) -> Result<Vec<RawItem>, ParseError> {
    let content = String::from_utf8_lossy(bytes);
    let mut reader = Reader::from_str(&content);
    let reader_config = reader.config_mut();
    reader_config.trim_text(true);
    reader_config.check_end_names = false;
    reader_config.allow_unmatched_ends = true;

    let mut items = Vec::new();
    let mut current = RawItem::default();
    let mut in_item = false;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    field = None;
                    current = RawItem::default();
                }
                tag if in_item => {
                    if let Some(f) = Field::of(tag) {
                        field = Some(f);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                // A self-closing <item/> is still an entry
                if e.name().as_ref() == b"item" {
                    items.push(RawItem::default());
                }
            }
            Ok(Event::Text(t)) => {
                if let (true, Some(f)) = (in_item, field) {
                    // Unknown entities fall back to the raw text rather than
                    // failing the feed
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&t).into_owned(),
                    };
                    field_mut(&mut current, f).push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (true, Some(f)) = (in_item, field) {
                    let text = String::from_utf8_lossy(&t);
                    field_mut(&mut current, f).push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    if in_item {
                        items.push(std::mem::take(&mut current));
                        in_item = false;
                    }
                    field = None;
                }
                tag => {
                    // Only the field's own end tag closes it; end tags of
                    // markup nested inside a description are passed over
                    if Field::of(tag) == field {
                        field = None;
                    }
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(items)
}
