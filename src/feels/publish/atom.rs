//! Atom channel: `www/atom.xml`.

use super::html::{markdown_to_html, page_name};
use crate::config::FeelsConfig;
use crate::error::{FeelsError, Result};
use crate::model::Entry;
use crate::paths::{Owner, ATOM_FILE};
use crate::store::StorageBackend;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;
use std::io::Cursor;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_err(e: impl Display) -> FeelsError {
    FeelsError::Feed(e.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn start(writer: &mut XmlWriter, elem: BytesStart<'_>) -> Result<()> {
    writer.write_event(Event::Start(elem)).map_err(xml_err)
}

fn end(writer: &mut XmlWriter, tag: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_err)
}

/// `<tag>text</tag>`
fn text_elem(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
    start(writer, BytesStart::new(tag))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    end(writer, tag)
}

/// `<tag attr="val" ... />`
fn empty_elem(writer: &mut XmlWriter, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut elem = BytesStart::new(tag);
    for (k, v) in attrs {
        elem.push_attribute((*k, *v));
    }
    writer.write_event(Event::Empty(elem)).map_err(xml_err)
}

fn write_entry(writer: &mut XmlWriter, url: &str, owner: &Owner, entry: &Entry) -> Result<()> {
    start(writer, BytesStart::new("entry"))?;
    text_elem(writer, "id", &format!("{}/{}", url, entry.id))?;
    text_elem(writer, "title", &entry.id.iso_date())?;
    let link = format!("{}/{}", url, page_name(&entry.id));
    empty_elem(writer, "link", &[("rel", "alternate"), ("href", &link)])?;

    start(writer, BytesStart::new("author"))?;
    text_elem(writer, "name", &owner.name)?;
    end(writer, "author")?;

    text_elem(writer, "published", &format!("{}T00:00:00Z", entry.id.iso_date()))?;
    text_elem(writer, "updated", &timestamp(entry.modified_at))?;

    let mut content = BytesStart::new("content");
    content.push_attribute(("type", "html"));
    start(writer, content)?;
    writer
        .write_event(Event::Text(BytesText::new(&markdown_to_html(&entry.body))))
        .map_err(xml_err)?;
    end(writer, "content")?;

    end(writer, "entry")
}

/// Render the feed document for `entries` (newest-first).
pub fn render(owner: &Owner, config: &FeelsConfig, entries: &[Entry]) -> Result<String> {
    let url = config.publish_url(owner);
    let updated = entries
        .iter()
        .map(|e| e.modified_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", ATOM_NS));
    feed.push_attribute(("xml:lang", "en"));
    start(&mut writer, feed)?;

    text_elem(&mut writer, "id", &url)?;
    text_elem(&mut writer, "title", &format!("{}'s feels", owner.name))?;
    start(&mut writer, BytesStart::new("author"))?;
    text_elem(&mut writer, "name", &owner.name)?;
    end(&mut writer, "author")?;
    empty_elem(
        &mut writer,
        "link",
        &[("rel", "alternate"), ("href", &format!("{}/", url))],
    )?;
    empty_elem(
        &mut writer,
        "link",
        &[("rel", "self"), ("href", &format!("{}/{}", url, ATOM_FILE))],
    )?;
    text_elem(&mut writer, "updated", &timestamp(updated))?;

    for entry in entries {
        write_entry(&mut writer, &url, owner, entry)?;
    }
    end(&mut writer, "feed")?;

    let mut xml = String::from_utf8(writer.into_inner().into_inner()).map_err(xml_err)?;
    xml.push('\n');
    Ok(xml)
}

pub fn sync<B: StorageBackend>(
    backend: &B,
    owner: &Owner,
    config: &FeelsConfig,
    entries: &[Entry],
) -> Result<usize> {
    let xml = render(owner, config, entries)?;
    backend.atomic_write(&owner.www_dir().join(ATOM_FILE), xml.as_bytes())?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryId;
    use chrono::TimeZone;

    fn config() -> FeelsConfig {
        FeelsConfig {
            publishing: true,
            atom: true,
            publish_dir: Some("blog".into()),
            ..Default::default()
        }
    }

    fn entry(id: &str, body: &str, modified: DateTime<Utc>) -> Entry {
        Entry {
            id: EntryId::parse(id).unwrap(),
            owner: "endorphant".into(),
            body: body.into(),
            created_at: modified,
            modified_at: modified,
        }
    }

    #[test]
    fn empty_feed_uses_epoch() {
        let owner = Owner::new("endorphant", "/home/endorphant");
        let xml = render(&owner, &config(), &[]).unwrap();
        assert!(xml.contains("<updated>1970-01-01T00:00:00Z</updated>"));
        assert!(xml.contains("<id>https://tilde.town/~endorphant/blog</id>"));
        assert!(xml.contains("<name>endorphant</name>"));
        assert!(!xml.contains("<entry>"));
    }

    #[test]
    fn entries_carry_ids_links_and_dates() {
        let owner = Owner::new("endorphant", "/home/endorphant");
        let newer = Utc.with_ymd_and_hms(2024, 6, 4, 9, 30, 0).unwrap();
        let older = Utc.with_ymd_and_hms(2024, 6, 3, 22, 0, 0).unwrap();
        let entries = vec![
            entry("20240604", "second <b>day</b>", newer),
            entry("20240603", "first", older),
        ];

        let xml = render(&owner, &config(), &entries).unwrap();
        assert!(xml.contains("<updated>2024-06-04T09:30:00Z</updated>"));
        assert!(xml.contains("<id>https://tilde.town/~endorphant/blog/20240603</id>"));
        assert!(xml.contains("href=\"https://tilde.town/~endorphant/blog/20240603.html\""));
        assert!(xml.contains("<title>2024-06-03</title>"));
        assert!(xml.contains("<published>2024-06-03T00:00:00Z</published>"));
        assert!(xml.contains("href=\"https://tilde.town/~endorphant/blog/atom.xml\""));
        // Content is escaped html.
        assert!(xml.contains("&lt;b&gt;day&lt;/b&gt;"));

        let first = xml.find("20240604</id>").unwrap();
        let second = xml.find("20240603</id>").unwrap();
        assert!(first < second);
    }
}
