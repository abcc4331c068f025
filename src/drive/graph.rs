//! Microsoft Graph (OneDrive) implementation of the drive capabilities.
//!
//! - listing: `GET /me/drive/items/{id}/children`, following `@odata.nextLink`
//! - deletion: `DELETE /me/drive/items/{id}`, confirmed only by `204 No Content`
//!
//! Every request carries the bearer token from a [`CredentialProvider`]. A
//! `401` invalidates the cached token and the request is sent once more with
//! a freshly acquired one; a second `401` is a fatal [`AuthError::Rejected`].
//! Retries for transient failures are not done here;
//! wrap the client in [`super::Resilient`].

use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use serde::de::IgnoredAny;
use serde::Deserialize;

use super::{DeleteItem, DriveEntry, DriveError, FolderRef, ItemId, ListChildren};
use crate::auth::{AuthError, CredentialProvider};

/// Default Graph endpoint.
pub const GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Properties requested for each child.
const CHILD_FIELDS: &str = "id,name,size,file,folder,webUrl";

#[derive(Debug, Deserialize)]
struct ChildrenPage {
    #[serde(default)]
    value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveItem {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    file: Option<FileFacet>,
    #[serde(default)]
    folder: Option<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct FileFacet {
    #[serde(default)]
    hashes: Option<Hashes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Hashes {
    #[serde(default)]
    quick_xor_hash: Option<String>,
}

impl From<DriveItem> for DriveEntry {
    fn from(item: DriveItem) -> Self {
        let is_file = item.file.is_some();
        let content_hash = item
            .file
            .and_then(|f| f.hashes)
            .and_then(|h| h.quick_xor_hash);
        Self {
            id: item.id,
            name: item.name,
            is_file,
            is_folder: item.folder.is_some(),
            size: item.size,
            content_hash,
            locator: item.web_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

fn parse_page(body: &str) -> Result<ChildrenPage, DriveError> {
    serde_json::from_str(body).map_err(|e| DriveError::Decode(e.to_string()))
}

/// Turn a non-success reply into a [`DriveError::Status`].
///
/// Graph error bodies are condensed to `code: message`; anything else is
/// passed through verbatim.
fn status_error(status: StatusCode, body: &str) -> DriveError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if parsed.error.message.is_empty() => parsed.error.code,
        Ok(parsed) => format!("{}: {}", parsed.error.code, parsed.error.message),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.trim().to_string(),
    };
    DriveError::Status {
        status: status.as_u16(),
        detail,
    }
}

fn transport(e: reqwest::Error) -> DriveError {
    DriveError::Transport(e.to_string())
}

/// OneDrive client for the signed-in user's drive.
#[derive(Debug)]
pub struct GraphClient<C> {
    http: Client,
    base_url: String,
    credentials: C,
}

impl<C: CredentialProvider> GraphClient<C> {
    /// Create a client against `base_url` (normally [`GRAPH_URL`]).
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>, credentials: C) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn children_url(&self, folder: &FolderRef) -> String {
        format!(
            "{}/me/drive/items/{}/children?$select={}",
            self.base_url, folder, CHILD_FIELDS
        )
    }

    fn item_url(&self, id: &ItemId) -> String {
        format!("{}/me/drive/items/{}", self.base_url, id)
    }

    fn send_once(&self, method: &Method, url: &str) -> Result<Response, DriveError> {
        let token = self.credentials.access_token()?;
        self.http
            .request(method.clone(), url)
            .bearer_auth(token)
            .send()
            .map_err(transport)
    }

    /// Send an authorized request, renewing the token once on `401`.
    fn send(&self, method: Method, url: &str) -> Result<Response, DriveError> {
        let response = self.send_once(&method, url)?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::debug!("Token rejected for {} {}, acquiring a new one", method, url);
        self.credentials.invalidate();
        let response = self.send_once(&method, url)?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // The renewed token is no better; keep it out of the cache.
        self.credentials.invalidate();
        let status = response.status();
        let body = response.text().unwrap_or_default();
        let detail = status_error(status, &body).detail();
        Err(DriveError::Auth(AuthError::Rejected(detail)))
    }
}

impl<C: CredentialProvider> ListChildren for GraphClient<C> {
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError> {
        let mut url = self.children_url(folder);
        let mut entries = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = self.send(Method::GET, &url)?;
            let status = response.status();
            let body = response.text().map_err(transport)?;
            if status != StatusCode::OK {
                return Err(status_error(status, &body));
            }

            let page = parse_page(&body)?;
            pages += 1;
            entries.extend(page.value.into_iter().map(DriveEntry::from));

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        log::trace!(
            "Folder {}: {} children in {} page(s)",
            folder,
            entries.len(),
            pages
        );
        Ok(entries)
    }
}

impl<C: CredentialProvider> DeleteItem for GraphClient<C> {
    fn delete_item(&self, id: &ItemId) -> Result<(), DriveError> {
        let response = self.send(Method::DELETE, &self.item_url(id))?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(status_error(status, &body))
    }
}
