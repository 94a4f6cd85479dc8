//! Collaborator API: the trait the synchronizer talks to, the endpoint table,
//! and the blocking HTTP implementation.
//!
//! [`Endpoint`] is the single source of truth for method, path and body of
//! every call. [`HttpApi`] sends it; [`crate::memory::InMemoryApi`] records it.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;
use crate::model::{
    BugId, HeadingId, HistoryEntry, HistoryId, ItemId, NoteId, Session, date_or_empty::FORMAT,
};

/// Default collaborator address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:10101";

/// Operations offered by the remote collaborator.
///
/// Methods returning `()` treat any success response as an ack and never
/// inspect its body.
pub trait SessionApi {
    fn fetch_session(&mut self) -> Result<Session, ApiError>;
    /// Returns the server's representation of the updated session.
    fn save_session_info(&mut self, website: &str, start_date: NaiveDate)
    -> Result<Session, ApiError>;
    fn complete_session(&mut self, end_date: NaiveDate) -> Result<(), ApiError>;
    fn reset_session(&mut self) -> Result<(), ApiError>;

    fn set_item_checked(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        checked: bool,
    ) -> Result<(), ApiError>;
    fn create_heading(&mut self, title: &str) -> Result<(), ApiError>;
    fn update_heading(&mut self, id: HeadingId, title: &str) -> Result<(), ApiError>;
    fn delete_heading(&mut self, id: HeadingId) -> Result<(), ApiError>;
    fn create_item(&mut self, heading: HeadingId, text: &str) -> Result<(), ApiError>;
    fn update_item(&mut self, heading: HeadingId, item: ItemId, text: &str)
    -> Result<(), ApiError>;
    fn delete_item(&mut self, heading: HeadingId, item: ItemId) -> Result<(), ApiError>;

    fn create_note(&mut self, text: &str) -> Result<(), ApiError>;
    fn update_note(&mut self, id: NoteId, text: &str) -> Result<(), ApiError>;
    fn delete_note(&mut self, id: NoteId) -> Result<(), ApiError>;

    fn create_bug(&mut self, title: &str, description: &str) -> Result<(), ApiError>;
    fn update_bug(&mut self, id: BugId, title: &str, description: &str) -> Result<(), ApiError>;
    fn delete_bug(&mut self, id: BugId) -> Result<(), ApiError>;

    fn list_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError>;
    fn delete_history_entry(&mut self, id: HistoryId) -> Result<(), ApiError>;
}

/// Lets a caller lend its collaborator to a synchronizer and keep using it
/// afterwards.
impl<A: SessionApi + ?Sized> SessionApi for &mut A {
    fn fetch_session(&mut self) -> Result<Session, ApiError> {
        (**self).fetch_session()
    }
    fn save_session_info(
        &mut self,
        website: &str,
        start_date: NaiveDate,
    ) -> Result<Session, ApiError> {
        (**self).save_session_info(website, start_date)
    }
    fn complete_session(&mut self, end_date: NaiveDate) -> Result<(), ApiError> {
        (**self).complete_session(end_date)
    }
    fn reset_session(&mut self) -> Result<(), ApiError> {
        (**self).reset_session()
    }
    fn set_item_checked(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        checked: bool,
    ) -> Result<(), ApiError> {
        (**self).set_item_checked(heading, item, checked)
    }
    fn create_heading(&mut self, title: &str) -> Result<(), ApiError> {
        (**self).create_heading(title)
    }
    fn update_heading(&mut self, id: HeadingId, title: &str) -> Result<(), ApiError> {
        (**self).update_heading(id, title)
    }
    fn delete_heading(&mut self, id: HeadingId) -> Result<(), ApiError> {
        (**self).delete_heading(id)
    }
    fn create_item(&mut self, heading: HeadingId, text: &str) -> Result<(), ApiError> {
        (**self).create_item(heading, text)
    }
    fn update_item(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        text: &str,
    ) -> Result<(), ApiError> {
        (**self).update_item(heading, item, text)
    }
    fn delete_item(&mut self, heading: HeadingId, item: ItemId) -> Result<(), ApiError> {
        (**self).delete_item(heading, item)
    }
    fn create_note(&mut self, text: &str) -> Result<(), ApiError> {
        (**self).create_note(text)
    }
    fn update_note(&mut self, id: NoteId, text: &str) -> Result<(), ApiError> {
        (**self).update_note(id, text)
    }
    fn delete_note(&mut self, id: NoteId) -> Result<(), ApiError> {
        (**self).delete_note(id)
    }
    fn create_bug(&mut self, title: &str, description: &str) -> Result<(), ApiError> {
        (**self).create_bug(title, description)
    }
    fn update_bug(&mut self, id: BugId, title: &str, description: &str) -> Result<(), ApiError> {
        (**self).update_bug(id, title, description)
    }
    fn delete_bug(&mut self, id: BugId) -> Result<(), ApiError> {
        (**self).delete_bug(id)
    }
    fn list_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        (**self).list_history()
    }
    fn delete_history_entry(&mut self, id: HistoryId) -> Result<(), ApiError> {
        (**self).delete_history_entry(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One collaborator call: method, path relative to the base URL, JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Endpoint {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    #[must_use]
    pub fn fetch_session() -> Self {
        Self::new(Method::Get, "/api/session", None)
    }

    #[must_use]
    pub fn save_session_info(website: &str, start_date: NaiveDate) -> Self {
        let body = json!({
            "target_website": website,
            "start_date": start_date.format(FORMAT).to_string(),
        });
        Self::new(Method::Post, "/api/session/info", Some(body))
    }

    #[must_use]
    pub fn complete_session(end_date: NaiveDate) -> Self {
        let body = json!({ "end_date": end_date.format(FORMAT).to_string() });
        Self::new(Method::Post, "/api/session/complete", Some(body))
    }

    #[must_use]
    pub fn reset_session() -> Self {
        Self::new(Method::Post, "/api/session/reset", None)
    }

    #[must_use]
    pub fn set_item_checked(heading: HeadingId, item: ItemId, checked: bool) -> Self {
        let body = json!({ "heading_id": heading, "item_id": item, "checked": checked });
        Self::new(Method::Post, "/api/checklist/item", Some(body))
    }

    #[must_use]
    pub fn create_heading(title: &str) -> Self {
        Self::new(Method::Post, "/api/checklist/heading", Some(json!({ "title": title })))
    }

    #[must_use]
    pub fn update_heading(id: HeadingId, title: &str) -> Self {
        Self::new(
            Method::Put,
            format!("/api/checklist/heading/{id}"),
            Some(json!({ "title": title })),
        )
    }

    #[must_use]
    pub fn delete_heading(id: HeadingId) -> Self {
        Self::new(Method::Delete, format!("/api/checklist/heading/{id}"), None)
    }

    #[must_use]
    pub fn create_item(heading: HeadingId, text: &str) -> Self {
        let body = json!({ "heading_id": heading, "text": text });
        Self::new(Method::Put, "/api/checklist/item", Some(body))
    }

    #[must_use]
    pub fn update_item(heading: HeadingId, item: ItemId, text: &str) -> Self {
        Self::new(
            Method::Put,
            format!("/api/checklist/item/{heading}/{item}"),
            Some(json!({ "text": text })),
        )
    }

    #[must_use]
    pub fn delete_item(heading: HeadingId, item: ItemId) -> Self {
        Self::new(Method::Delete, format!("/api/checklist/item/{heading}/{item}"), None)
    }

    #[must_use]
    pub fn create_note(text: &str) -> Self {
        Self::new(Method::Post, "/api/notes", Some(json!({ "text": text })))
    }

    #[must_use]
    pub fn update_note(id: NoteId, text: &str) -> Self {
        Self::new(Method::Put, format!("/api/notes/{id}"), Some(json!({ "text": text })))
    }

    #[must_use]
    pub fn delete_note(id: NoteId) -> Self {
        Self::new(Method::Delete, format!("/api/notes/{id}"), None)
    }

    #[must_use]
    pub fn create_bug(title: &str, description: &str) -> Self {
        let body = json!({ "title": title, "description": description });
        Self::new(Method::Post, "/api/bugs", Some(body))
    }

    #[must_use]
    pub fn update_bug(id: BugId, title: &str, description: &str) -> Self {
        let body = json!({ "title": title, "description": description });
        Self::new(Method::Put, format!("/api/bugs/{id}"), Some(body))
    }

    #[must_use]
    pub fn delete_bug(id: BugId) -> Self {
        Self::new(Method::Delete, format!("/api/bugs/{id}"), None)
    }

    #[must_use]
    pub fn list_history() -> Self {
        Self::new(Method::Get, "/api/history", None)
    }

    #[must_use]
    pub fn delete_history_entry(id: HistoryId) -> Self {
        Self::new(Method::Delete, format!("/api/history/{id}"), None)
    }
}

/// `POST /api/session/info` wraps the session in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct InfoResponse {
    data: Session,
}

/// Blocking HTTP client for the collaborator.
///
/// No retries and no timeout: a call runs until the server answers or the
/// transport fails.
#[derive(Debug, Clone)]
pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpApi {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("qatrack/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, endpoint: &Endpoint) -> Result<ureq::Response, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!(method = endpoint.method.as_str(), path = %endpoint.path, "collaborator request");

        let request = self.agent.request(endpoint.method.as_str(), &url);
        let result = match &endpoint.body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, _)) => Err(ApiError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                Err(ApiError::Transport(transport.to_string()))
            }
        }
    }

    fn ack(&self, endpoint: &Endpoint) -> Result<(), ApiError> {
        self.send(endpoint).map(drop)
    }

    fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        self.send(endpoint)?
            .into_json::<T>()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

impl Default for HttpApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SessionApi for HttpApi {
    fn fetch_session(&mut self) -> Result<Session, ApiError> {
        self.fetch(&Endpoint::fetch_session())
    }

    fn save_session_info(
        &mut self,
        website: &str,
        start_date: NaiveDate,
    ) -> Result<Session, ApiError> {
        self.fetch::<InfoResponse>(&Endpoint::save_session_info(website, start_date))
            .map(|resp| resp.data)
    }

    fn complete_session(&mut self, end_date: NaiveDate) -> Result<(), ApiError> {
        self.ack(&Endpoint::complete_session(end_date))
    }

    fn reset_session(&mut self) -> Result<(), ApiError> {
        self.ack(&Endpoint::reset_session())
    }

    fn set_item_checked(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        checked: bool,
    ) -> Result<(), ApiError> {
        self.ack(&Endpoint::set_item_checked(heading, item, checked))
    }

    fn create_heading(&mut self, title: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::create_heading(title))
    }

    fn update_heading(&mut self, id: HeadingId, title: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::update_heading(id, title))
    }

    fn delete_heading(&mut self, id: HeadingId) -> Result<(), ApiError> {
        self.ack(&Endpoint::delete_heading(id))
    }

    fn create_item(&mut self, heading: HeadingId, text: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::create_item(heading, text))
    }

    fn update_item(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        text: &str,
    ) -> Result<(), ApiError> {
        self.ack(&Endpoint::update_item(heading, item, text))
    }

    fn delete_item(&mut self, heading: HeadingId, item: ItemId) -> Result<(), ApiError> {
        self.ack(&Endpoint::delete_item(heading, item))
    }

    fn create_note(&mut self, text: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::create_note(text))
    }

    fn update_note(&mut self, id: NoteId, text: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::update_note(id, text))
    }

    fn delete_note(&mut self, id: NoteId) -> Result<(), ApiError> {
        self.ack(&Endpoint::delete_note(id))
    }

    fn create_bug(&mut self, title: &str, description: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::create_bug(title, description))
    }

    fn update_bug(&mut self, id: BugId, title: &str, description: &str) -> Result<(), ApiError> {
        self.ack(&Endpoint::update_bug(id, title, description))
    }

    fn delete_bug(&mut self, id: BugId) -> Result<(), ApiError> {
        self.ack(&Endpoint::delete_bug(id))
    }

    fn list_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.fetch(&Endpoint::list_history())
    }

    fn delete_history_entry(&mut self, id: HistoryId) -> Result<(), ApiError> {
        self.ack(&Endpoint::delete_history_entry(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_endpoint_matches_wire_contract() {
        let ep = Endpoint::set_item_checked(HeadingId(3), ItemId(7), true);
        assert_eq!(ep.method, Method::Post);
        assert_eq!(ep.path, "/api/checklist/item");
        assert_eq!(
            ep.body,
            Some(json!({ "heading_id": 3, "item_id": 7, "checked": true }))
        );
    }

    #[test]
    fn item_create_and_update_use_put_with_different_addressing() {
        let create = Endpoint::create_item(HeadingId(2), "Logout");
        assert_eq!(create.method, Method::Put);
        assert_eq!(create.path, "/api/checklist/item");
        assert_eq!(create.body, Some(json!({ "heading_id": 2, "text": "Logout" })));

        let update = Endpoint::update_item(HeadingId(2), ItemId(5), "Log out");
        assert_eq!(update.method, Method::Put);
        assert_eq!(update.path, "/api/checklist/item/2/5");
        assert_eq!(update.body, Some(json!({ "text": "Log out" })));
    }

    #[test]
    fn deletes_carry_no_body() {
        for ep in [
            Endpoint::delete_heading(HeadingId(1)),
            Endpoint::delete_item(HeadingId(1), ItemId(2)),
            Endpoint::delete_note(NoteId(3)),
            Endpoint::delete_bug(BugId(4)),
            Endpoint::delete_history_entry(HistoryId(5)),
        ] {
            assert_eq!(ep.method, Method::Delete);
            assert!(ep.body.is_none(), "{} should have no body", ep.path);
        }
    }

    #[test]
    fn session_endpoints_format_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let info = Endpoint::save_session_info("example.com", day);
        assert_eq!(
            info.body,
            Some(json!({ "target_website": "example.com", "start_date": "2024-01-01" }))
        );

        let complete = Endpoint::complete_session(day);
        assert_eq!(complete.path, "/api/session/complete");
        assert_eq!(complete.body, Some(json!({ "end_date": "2024-01-01" })));

        assert!(Endpoint::reset_session().body.is_none());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpApi::new("http://localhost:10101/");
        assert_eq!(api.base_url(), "http://localhost:10101");
    }

    #[test]
    fn unreachable_server_is_transport_failure() {
        // Port 9 (discard) is closed on test hosts.
        let mut api = HttpApi::new("http://127.0.0.1:9");
        match api.fetch_session() {
            Err(ApiError::Transport(_)) => {}
            other => panic!("expected transport failure, got {other:?}"),
        }
    }
}
