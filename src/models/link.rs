//! `staqq://document?id=<uuid>` deep links.

use url::Url;
use uuid::Uuid;

const SCHEME: &str = "staqq";
const DOCUMENT_HOST: &str = "document";

/// Build the deep link for a document.
pub fn document_link(id: &Uuid) -> String {
    format!("{}://{}?id={}", SCHEME, DOCUMENT_HOST, id)
}

/// Extract the document id from a deep link.
///
/// Returns `None` for other schemes, other hosts, or a missing/invalid id.
pub fn parse_document_link(link: &str) -> Option<Uuid> {
    let url = Url::parse(link.trim()).ok()?;
    if url.scheme() != SCHEME || url.host_str() != Some(DOCUMENT_HOST) {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| Uuid::parse_str(&value).ok())
}
