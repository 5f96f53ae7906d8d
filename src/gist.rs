//! Gist documents as returned by the GitHub API.
//!
//! The same shape comes back from the user listing (files without content)
//! and from the single-gist endpoint (files with inline content, or a
//! `truncated` flag when the file is too large to inline).

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    pub id: String,
    /// API URL of this gist; fetching it yields the full file manifest.
    pub url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub description: Option<String>,
    /// Files in the order the server listed them.
    #[serde(default, deserialize_with = "files_in_order")]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    /// Filled from the manifest key, which is authoritative.
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Gist {
    /// True when every file can be resolved without fetching the gist itself.
    ///
    /// Listing entries carry neither inline content nor the `truncated` flag,
    /// so they always need the detail fetch.
    pub fn has_manifest(&self) -> bool {
        !self.files.is_empty()
            && self
                .files
                .iter()
                .all(|f| if f.truncated { f.raw_url.is_some() } else { f.content.is_some() })
    }

    /// Public page of this gist under `web_base`, in `<web_base>/<username>/<id>` form.
    pub fn canonical_url(&self, web_base: &str, username: &str) -> String {
        format!("{}/{}/{}", web_base.trim_end_matches('/'), username, self.id)
    }
}

/// A file of a gist together with its full text.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile {
    pub filename: String,
    pub text: String,
}

fn files_in_order<'de, D>(deserializer: D) -> Result<Vec<FileEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FilesVisitor;

    impl<'de> Visitor<'de> for FilesVisitor {
        type Value = Vec<FileEntry>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of filename to file object")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut files = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, mut entry)) = map.next_entry::<String, FileEntry>()? {
                entry.filename = name;
                files.push(entry);
            }
            Ok(files)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(FilesVisitor)
}
