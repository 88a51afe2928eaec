//! HTML channel: `www/index.html` plus one permalink page per entry.

use crate::error::Result;
use crate::model::{Entry, EntryId};
use crate::paths::{Owner, INDEX_FILE};
use crate::store::StorageBackend;
use pulldown_cmark::{html, Options, Parser};
use std::collections::BTreeSet;
use tracing::debug;

const DEFAULT_HEADER: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>~{owner}'s feels</title>
    <link rel="stylesheet" href="style.css" />
  </head>
  <body>
    <div id="meta">
      <h1><a href="index.html">~{owner}</a>'s feels</h1>
    </div>

    <div id="tlogs">
"#;

const DEFAULT_FOOTER: &str = r#"    </div>
  </body>
</html>
"#;

/// Name of the permalink page for `id`.
pub fn page_name(id: &EntryId) -> String {
    format!("{}.html", id)
}

fn page_id(name: &str) -> Option<EntryId> {
    let stem = name.strip_suffix(".html")?;
    EntryId::parse(stem)
}

/// Markdown to HTML. Raw HTML in the body passes through untouched.
pub fn markdown_to_html(body: &str) -> String {
    let parser = Parser::new_ext(body, Options::all());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn render_entry(entry: &Entry) -> String {
    let id = entry.id;
    let date = entry.id.date();
    format!(
        "      <p><a name=\"{id}\"></a><br /><br /></p>\n\
         <div class=\"entry\">\n\
         <h5><a href=\"#{id}\">{day}</a> {month}</h5>\n\
         {body}\
         <p class=\"permalink\"><a href=\"{page}\">permalink</a></p>\n\
         </div>\n",
        day = date.format("%d"),
        month = date.format("%B %Y"),
        body = markdown_to_html(&entry.body),
        page = page_name(&id),
    )
}

struct Frame {
    header: String,
    footer: String,
}

impl Frame {
    fn load<B: StorageBackend>(backend: &B, owner: &Owner) -> Result<Self> {
        let header = backend
            .read_to_string(&owner.header_file())?
            .unwrap_or_else(|| DEFAULT_HEADER.replace("{owner}", &owner.name));
        let footer = backend
            .read_to_string(&owner.footer_file())?
            .unwrap_or_else(|| DEFAULT_FOOTER.to_string());
        Ok(Self { header, footer })
    }

    fn wrap<'e>(&self, entries: impl IntoIterator<Item = &'e Entry>) -> String {
        let mut out = self.header.clone();
        for entry in entries {
            out.push_str(&render_entry(entry));
        }
        out.push_str(&self.footer);
        out
    }
}

/// Regenerate the index and permalink pages for `entries` (newest-first) and
/// remove pages of entries that are no longer published.
pub fn sync<B: StorageBackend>(backend: &B, owner: &Owner, entries: &[Entry]) -> Result<usize> {
    let www = owner.www_dir();
    backend.ensure_dir(&www)?;
    let frame = Frame::load(backend, owner)?;

    backend.atomic_write(&www.join(INDEX_FILE), frame.wrap(entries).as_bytes())?;
    for entry in entries {
        let page = frame.wrap(std::iter::once(entry));
        backend.atomic_write(&www.join(page_name(&entry.id)), page.as_bytes())?;
    }

    let live: BTreeSet<EntryId> = entries.iter().map(|e| e.id).collect();
    for name in backend.list_files(&www)? {
        if let Some(id) = page_id(&name) {
            if !live.contains(&id) {
                backend.remove_file(&www.join(&name))?;
                debug!(owner = %owner.name, %id, "removed stale page");
            }
        }
    }

    Ok(entries.len())
}

/// Ids with a permalink page currently on disk.
pub fn published_ids<B: StorageBackend>(backend: &B, owner: &Owner) -> Result<Vec<EntryId>> {
    let mut ids: Vec<_> = backend
        .list_files(&owner.www_dir())?
        .iter()
        .filter_map(|name| page_id(name))
        .collect();
    ids.sort();
    Ok(ids)
}
