use serde::{Deserialize, Serialize};

/// What kind of annotation the Kindle recorded for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClippingKind {
    Highlight,
    Note,
    Bookmark,
}

/// One parsed annotation from the clippings file.
///
/// `title` is kept exactly as it appears on the entry's header line;
/// duplicate titles with different casing stay distinct. `location` and
/// `page` are the raw field text ("901-902"), empty when the metadata line
/// lacks them. `text` is empty only for bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipping {
    pub title: String,
    pub author: String,
    pub kind: ClippingKind,
    pub location: String,
    pub page: String,
    pub text: String,
}
