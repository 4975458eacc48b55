use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, warn};

use crate::error::MalformedDocument;
use crate::track::TrackPoint;

type Result<T> = std::result::Result<T, MalformedDocument>;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a GPX document into its track points, flattened across every
/// track and segment in document order.
///
/// A well-formed document without any `<trkpt>` yields an empty vector.
pub fn parse_gpx(bytes: &[u8]) -> Result<Vec<TrackPoint>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let xml = std::str::from_utf8(bytes)?;
    let mut reader = Reader::from_str(xml);
    let mut points = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                check_root(&e)?;
                parse_root(&mut reader, &mut points)?;
                break;
            }
            Ok(Event::Empty(e)) => {
                check_root(&e)?;
                break;
            }
            Ok(Event::Text(e)) if !e.iter().all(|b| b.is_ascii_whitespace()) => {
                return Err(MalformedDocument::NotGpx(
                    "text content found before the root element".to_string(),
                ));
            }
            Ok(Event::Eof) => {
                return Err(MalformedDocument::NotGpx(
                    "no root element found".to_string(),
                ));
            }
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    // Only comments, processing instructions and whitespace may follow the root.
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Err(MalformedDocument::NotGpx(format!(
                    "element <{}> found after the root element",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Ok(Event::Text(e)) if !e.iter().all(|b| b.is_ascii_whitespace()) => {
                return Err(MalformedDocument::NotGpx(
                    "text content found after the root element".to_string(),
                ));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    debug!(points = points.len(), "parsed GPX document");
    Ok(points)
}

fn check_root(e: &BytesStart<'_>) -> Result<()> {
    if e.local_name().as_ref() == b"gpx" {
        Ok(())
    } else {
        Err(MalformedDocument::NotGpx(format!(
            "root element is <{}>, expected <gpx>",
            String::from_utf8_lossy(e.name().as_ref())
        )))
    }
}

/// Parse the children of `<gpx>`. Only tracks are of interest.
fn parse_root<'a>(reader: &mut Reader<&'a [u8]>, points: &mut Vec<TrackPoint>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trk" => parse_track(reader, points)?,
                _ => {
                    // wpt, rte, metadata, extensions
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gpx" => break,
            Ok(Event::Eof) => return Err(MalformedDocument::UnexpectedEof("gpx")),
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>, points: &mut Vec<TrackPoint>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkseg" => parse_segment(reader, points)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(MalformedDocument::UnexpectedEof("trk")),
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>, points: &mut Vec<TrackPoint>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => points.push(parse_point(&e, reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e)?;
                    points.push(TrackPoint::new(lat, lon));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(MalformedDocument::UnexpectedEof("trkseg")),
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse lat/lon attributes from a `<trkpt>` start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let val = std::str::from_utf8(&attr.value)?;
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate("lat", val, 90.0)?),
            b"lon" => lon = Some(parse_coordinate("lon", val, 180.0)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(MalformedDocument::MissingAttribute {
        element: "trkpt",
        attribute: "lat",
    })?;
    let lon = lon.ok_or(MalformedDocument::MissingAttribute {
        element: "trkpt",
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

fn parse_coordinate(attribute: &'static str, raw: &str, limit: f64) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
        _ => Err(MalformedDocument::InvalidAttribute {
            element: "trkpt",
            attribute,
            value: raw.to_string(),
        }),
    }
}

/// Parse a `<trkpt>` element and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<TrackPoint> {
    let (lat, lon) = parse_lat_lon(start)?;
    let mut point = TrackPoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.elevation = text.trim().parse::<f64>().ok().filter(|v| v.is_finite());
                    if point.elevation.is_none() {
                        warn!(value = text.trim(), lat, lon, "ignoring unparsable <ele>");
                    }
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.time = parse_time(&text);
                    if point.time.is_none() {
                        warn!(value = text.trim(), lat, lon, "ignoring unparsable <time>");
                    }
                }
                _ => {
                    // name, desc, sym, extensions, ...
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(MalformedDocument::UnexpectedEof("trkpt")),
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    Ok(point)
}

/// GPX timestamps are xsd:dateTime. Offsets are optional there; a missing
/// offset is read as UTC.
fn parse_time(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|t| t.assume_utc()))
        .ok()
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, character references and the
/// predefined entities (`&amp;`, `&lt;`, ...). Other entities are dropped.
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Ok(Event::CData(e)) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else if let Some(resolved) =
                    resolve_predefined_entity(std::str::from_utf8(e.as_ref())?)
                {
                    text.push_str(resolved);
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(MalformedDocument::Xml(e)),
            _ => {}
        }
    }

    Ok(text)
}
