use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use shellbot_common::{new_transaction_id, EventHandler, Messenger, RoomId, TransportError, UserId};

use crate::error::{classify, http_error};
use crate::sync::SyncResponse;

/// Connection settings for a homeserver session.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
    /// Long-poll timeout passed to `/sync`.
    pub sync_timeout: Duration,
    /// Upper bound on login, sync and join requests. Message sends are not
    /// timed out.
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user_id: String,
    access_token: String,
}

/// A logged-in Matrix session.
pub struct MatrixClient {
    http: reqwest::Client,
    homeserver: Url,
    access_token: String,
    user_id: UserId,
    sync_timeout: Duration,
    request_timeout: Duration,
    rooms: RwLock<BTreeSet<RoomId>>,
    since: Mutex<Option<String>>,
}

impl MatrixClient {
    /// Log in with a password. No sync is performed.
    pub async fn login(config: &MatrixConfig) -> Result<Self, TransportError> {
        let homeserver = Url::parse(&config.homeserver).map_err(|e| {
            TransportError::Protocol(format!("invalid homeserver url {}: {e}", config.homeserver))
        })?;
        let http = reqwest::Client::builder().build().map_err(classify)?;

        let body = serde_json::json!({
            "type": "m.login.password",
            "identifier": { "type": "m.id.user", "user": config.username },
            "password": config.password,
            "initial_device_display_name": "shellbot",
        });
        let response = http
            .post(endpoint(&homeserver, &["login"])?)
            .timeout(config.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let login: LoginResponse = read_json(response).await?;

        info!(user = %login.user_id, homeserver = %homeserver, "logged in");
        Ok(Self::with_session(
            http,
            homeserver,
            login.access_token,
            UserId::new(login.user_id),
            config.sync_timeout,
            config.request_timeout,
        ))
    }

    fn with_session(
        http: reqwest::Client,
        homeserver: Url,
        access_token: String,
        user_id: UserId,
        sync_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            homeserver,
            access_token,
            user_id,
            sync_timeout,
            request_timeout,
            rooms: RwLock::new(BTreeSet::new()),
            since: Mutex::new(None),
        }
    }

    /// Run the initial sync.
    ///
    /// Records joined rooms and the sync position, and hands only pending
    /// invitations to `handler`. Messages already in the rooms are skipped
    /// so old commands are never replayed into the shell.
    pub async fn prime(&self, handler: &dyn EventHandler) -> Result<(), TransportError> {
        let response = self.sync(Duration::ZERO).await?;
        self.apply(&response);
        let invites = response.invites(&self.user_id);
        debug!(
            rooms = self.destinations().len(),
            invites = invites.len(),
            "initial sync complete"
        );
        for event in invites {
            handler.handle(event).await;
        }
        Ok(())
    }

    async fn sync(&self, timeout: Duration) -> Result<SyncResponse, TransportError> {
        let mut url = endpoint(&self.homeserver, &["sync"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeout", &timeout.as_millis().to_string());
            if let Some(since) = self.since_token() {
                query.append_pair("since", &since);
            }
        }
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(classify)?;
        read_json(response).await
    }

    /// Fold a sync response into the session state.
    fn apply(&self, response: &SyncResponse) {
        {
            let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
            for room in response.rooms.join.keys() {
                rooms.insert(RoomId::new(room.as_str()));
            }
            for room in response.rooms.leave.keys() {
                rooms.remove(&RoomId::new(room.as_str()));
            }
        }
        *self.since.lock().unwrap_or_else(|e| e.into_inner()) = Some(response.next_batch.clone());
    }

    fn since_token(&self) -> Option<String> {
        self.since.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Messenger for MatrixClient {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn destinations(&self) -> Vec<RoomId> {
        self.rooms
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    async fn deliver(
        &self,
        room: &RoomId,
        plain: &str,
        formatted: &str,
    ) -> Result<(), TransportError> {
        let txn = new_transaction_id();
        let url = endpoint(
            &self.homeserver,
            &["rooms", room.as_str(), "send", "m.room.message", &txn],
        )?;
        let body = serde_json::json!({
            "msgtype": "m.text",
            "body": plain,
            "format": "org.matrix.custom.html",
            "formatted_body": formatted,
        });
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        read_json::<serde_json::Value>(response).await?;
        debug!(room = %room, bytes = plain.len(), "message sent");
        Ok(())
    }

    async fn join(&self, room: &RoomId) -> Result<(), TransportError> {
        let url = endpoint(&self.homeserver, &["join", room.as_str()])?;
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(classify)?;
        read_json::<serde_json::Value>(response).await?;
        self.rooms
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(room.clone());
        info!(room = %room, "joined room");
        Ok(())
    }

    async fn listen(&self, handler: &dyn EventHandler) -> Result<(), TransportError> {
        loop {
            let response = self.sync(self.sync_timeout).await?;
            self.apply(&response);
            for event in response.events(&self.user_id) {
                handler.handle(event).await;
            }
        }
    }
}

/// `<homeserver>/_matrix/client/v3/<segments>`, with each segment
/// percent-encoded.
fn endpoint(homeserver: &Url, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = homeserver.clone();
    url.path_segments_mut()
        .map_err(|_| TransportError::Protocol(format!("homeserver url cannot be a base: {homeserver}")))?
        .pop_if_empty()
        .extend(["_matrix", "client", "v3"])
        .extend(segments);
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    let text = response.text().await.map_err(classify)?;
    if !status.is_success() {
        return Err(http_error(status.as_u16(), &text));
    }
    serde_json::from_str(&text)
        .map_err(|e| TransportError::Protocol(format!("malformed response: {e}")))
}
