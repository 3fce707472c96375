//! Dublin Core episode catalog
//!
//! Rendering is driven by [`CatalogField`]: a closed list of the semantic
//! fields the catalog carries, in document order, each mapped to its
//! element name and to the value shape that decides how it renders.

use chrono::{DateTime, Duration, Utc};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{format_duration, format_timestamp, XmlError};
use crate::models::EventMetadata;

const DUBLINCORE_NS: &str = "http://www.opencastproject.org/xsd/1.0/dublincore/";
const DC_TERMS_NS: &str = "http://purl.org/dc/terms/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Temporal scheme written into the period block
const PERIOD_SCHEME: &str = "W3C-DTF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogField {
    Title,
    Subjects,
    Description,
    Language,
    Spatial,
    RightsHolder,
    License,
    IsPartOf,
    Creator,
    Contributor,
    Publisher,
    Created,
    Temporal,
    Extent,
}

/// Value shape of a field; selects the rendering rule
enum FieldValue<'a> {
    /// Single text node
    Text(&'a str),
    /// Values joined by `,` without added whitespace
    List(&'a [String]),
    /// Canonical timestamp text
    Timestamp(&'a DateTime<Utc>),
    /// `terms:Period` block
    Period {
        start: &'a DateTime<Utc>,
        end: &'a DateTime<Utc>,
    },
    /// `terms:ISO8601` duration, skipped when absent
    Extent(Option<&'a Duration>),
}

impl CatalogField {
    const ORDER: [CatalogField; 14] = [
        CatalogField::Title,
        CatalogField::Subjects,
        CatalogField::Description,
        CatalogField::Language,
        CatalogField::Spatial,
        CatalogField::RightsHolder,
        CatalogField::License,
        CatalogField::IsPartOf,
        CatalogField::Creator,
        CatalogField::Contributor,
        CatalogField::Publisher,
        CatalogField::Created,
        CatalogField::Temporal,
        CatalogField::Extent,
    ];

    fn element(self) -> &'static str {
        match self {
            CatalogField::Title => "terms:title",
            CatalogField::Subjects => "terms:subjects",
            CatalogField::Description => "terms:description",
            CatalogField::Language => "terms:language",
            CatalogField::Spatial => "terms:spatial",
            CatalogField::RightsHolder => "terms:rightsHolder",
            CatalogField::License => "terms:license",
            CatalogField::IsPartOf => "terms:isPartOf",
            CatalogField::Creator => "terms:creator",
            CatalogField::Contributor => "terms:contributor",
            CatalogField::Publisher => "terms:publisher",
            CatalogField::Created => "terms:created",
            CatalogField::Temporal => "terms:temporal",
            CatalogField::Extent => "terms:extent",
        }
    }

    fn value(self, meta: &EventMetadata) -> FieldValue<'_> {
        match self {
            CatalogField::Title => FieldValue::Text(&meta.title),
            CatalogField::Subjects => FieldValue::List(&meta.subjects),
            CatalogField::Description => FieldValue::Text(&meta.description),
            CatalogField::Language => FieldValue::Text(&meta.language),
            CatalogField::Spatial => FieldValue::Text(&meta.spatial),
            CatalogField::RightsHolder => FieldValue::Text(&meta.rights_holder),
            CatalogField::License => FieldValue::Text(&meta.license),
            CatalogField::IsPartOf => FieldValue::Text(&meta.series_id),
            CatalogField::Creator => FieldValue::List(&meta.creators),
            CatalogField::Contributor => FieldValue::List(&meta.contributors),
            CatalogField::Publisher => FieldValue::List(&meta.publishers),
            CatalogField::Created => FieldValue::Timestamp(&meta.started),
            CatalogField::Temporal => FieldValue::Period {
                start: &meta.started,
                end: &meta.ended,
            },
            CatalogField::Extent => FieldValue::Extent(meta.extent.as_ref()),
        }
    }
}

/// Render the episode catalog for `meta`
///
/// Empty values still produce an element, written as a start/end pair.
pub fn build_episode_catalog(meta: &EventMetadata) -> Result<String, XmlError> {
    if meta.ended < meta.started {
        return Err(XmlError::Validation(format!(
            "Event ends ({}) before it starts ({})",
            format_timestamp(&meta.ended),
            format_timestamp(&meta.started)
        )));
    }

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
        .map_err(XmlError::write)?;

    let root = BytesStart::new("dublincore").with_attributes([
        ("xmlns", DUBLINCORE_NS),
        ("xmlns:terms", DC_TERMS_NS),
        ("xmlns:xsi", XSI_NS),
    ]);
    writer.write_event(Event::Start(root)).map_err(XmlError::write)?;

    for field in CatalogField::ORDER {
        let element = field.element();
        match field.value(meta) {
            FieldValue::Text(text) => write_text_element(&mut writer, element, None, text)?,
            FieldValue::List(values) => {
                write_text_element(&mut writer, element, None, &values.join(","))?
            }
            FieldValue::Timestamp(ts) => {
                write_text_element(&mut writer, element, None, &format_timestamp(ts))?
            }
            FieldValue::Period { start, end } => {
                let period = format!(
                    "start={}; end={}; scheme={}; ",
                    format_timestamp(start),
                    format_timestamp(end),
                    PERIOD_SCHEME
                );
                write_text_element(&mut writer, element, Some("terms:Period"), &period)?
            }
            FieldValue::Extent(Some(duration)) => write_text_element(
                &mut writer,
                element,
                Some("terms:ISO8601"),
                &format_duration(duration)?,
            )?,
            FieldValue::Extent(None) => {}
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("dublincore")))
        .map_err(XmlError::write)?;

    String::from_utf8(writer.into_inner()).map_err(XmlError::write)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    xsi_type: Option<&str>,
    text: &str,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(name);
    if let Some(xsi_type) = xsi_type {
        start.push_attribute(("xsi:type", xsi_type));
    }
    writer.write_event(Event::Start(start)).map_err(XmlError::write)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(XmlError::write)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(XmlError::write)?;
    Ok(())
}
