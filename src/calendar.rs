//! Google Calendar client.
//!
//! Talks to the Calendar v3 REST API directly over reqwest. OAuth consent
//! happens out of band: a pre-provisioned token cache file supplies the
//! refresh token, and [`CalendarClient::connect`] exchanges it for a fresh
//! access token at startup, writing the result back to the cache file.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{Error, Result};

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client credentials in Google's download format.
#[derive(Debug, Deserialize)]
struct ClientCredentials {
    #[serde(alias = "web")]
    installed: OAuthClient,
}

#[derive(Debug, Deserialize)]
struct OAuthClient {
    client_id: String,
    client_secret: String,
}

/// Cached OAuth token, in the shape the provisioning step writes.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// A calendar event as returned by the events list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

/// Event boundary: timed events carry `dateTime`, all-day events only
/// `date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<CalendarEvent>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

impl CalendarEvent {
    /// The event's start and end as date strings, preferring the precise
    /// timestamp and falling back to the date-only field per side.
    pub fn date_range(&self) -> (String, String) {
        (self.start.as_date_string(), self.end.as_date_string())
    }
}

impl EventTime {
    fn as_date_string(&self) -> String {
        self.date_time
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }
}

/// Authenticated Google Calendar client.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    access_token: String,
}

impl CalendarClient {
    /// Build a client from an OAuth credentials file and a token cache
    /// file. Refreshes the access token when the cache holds a refresh
    /// token, writing the refreshed token back to the cache.
    pub async fn connect(
        credentials_path: impl AsRef<Path>,
        token_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let credentials = read_credentials(credentials_path.as_ref())?;
        let token_path = token_path.as_ref().to_path_buf();
        let cached = read_token(&token_path)?;

        let http = reqwest::Client::new();

        let access_token = if let Some(refresh_token) = cached.refresh_token.clone() {
            let refreshed =
                refresh_access_token(&http, &credentials.installed, &refresh_token).await?;
            save_token(
                &token_path,
                &CachedToken {
                    access_token: refreshed.access_token.clone(),
                    expiry: expiry_from_lifetime(refreshed.expires_in),
                    ..cached
                },
            )?;
            refreshed.access_token
        } else {
            cached.access_token
        };

        Ok(Self { http, access_token })
    }

    /// List events between two timestamps, oldest first. Returns an empty
    /// vec when nothing matches.
    pub async fn list_events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        calendar_id: &str,
    ) -> Result<Vec<CalendarEvent>> {
        info!(calendar_id, %from, %to, "Querying calendar events");

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", from.to_rfc3339()),
                ("timeMax", to.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("showDeleted", "false".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .http
                .get(format!("{}/{}/events", EVENTS_URL, calendar_id))
                .bearer_auth(&self.access_token)
                .query(&query)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(calendar_id, %status, "Event list request failed");
                return Err(Error::Calendar(format!(
                    "event list failed with {}: {}",
                    status, body
                )));
            }

            let page: EventListResponse = response.json().await?;
            if let Some(items) = page.items {
                events.extend(items);
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if events.is_empty() {
            info!(calendar_id, "No events found in range");
        }

        Ok(events)
    }

    /// Delete a single event by id.
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/{}/events/{}", EVENTS_URL, calendar_id, event_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(calendar_id, event_id, %status, "Event deletion failed");
            return Err(Error::Calendar(format!(
                "deleting event {} failed with {}",
                event_id, status
            )));
        }

        info!(event_id, "Event deleted");
        Ok(())
    }
}

fn read_credentials(path: &Path) -> Result<ClientCredentials> {
    info!(path = %path.display(), "Reading OAuth client credentials");
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn read_token(path: &Path) -> Result<CachedToken> {
    let data = fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), "Token cache missing; provision it before startup");
        Error::Io(e)
    })?;
    Ok(serde_json::from_str(&data)?)
}

fn save_token(path: &Path, token: &CachedToken) -> Result<()> {
    info!(path = %path.display(), "Saving refreshed token");
    fs::write(path, serde_json::to_string(token)?)?;
    Ok(())
}

async fn refresh_access_token(
    http: &reqwest::Client,
    client: &OAuthClient,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let params = [
        ("refresh_token", refresh_token),
        ("client_id", &client.client_id),
        ("client_secret", &client.client_secret),
        ("grant_type", "refresh_token"),
    ];

    let response = http.post(TOKEN_URL).form(&params).send().await?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Calendar(format!("token refresh failed: {}", body)));
    }

    Ok(response.json().await?)
}

/// Expiry timestamp for a token that lives `expires_in` seconds from now.
/// Provisioning tooling reads this back from the cache file, so a refreshed
/// token must not keep the previous expiry.
fn expiry_from_lifetime(expires_in: Option<i64>) -> Option<String> {
    expires_in.map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339())
}
