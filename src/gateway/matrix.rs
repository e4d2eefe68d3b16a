use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::types::{
    CreateRoomRequest, ErrorResponse, LoginRequest, LoginResponse, RoomIdResponse, SyncResponse,
    UserIdentifier,
};
use super::{GatewayError, SessionGateway};
use crate::event::MessageContent;
use crate::room::models::{RoomAlias, RoomId};
use crate::user::UserId;

const CLIENT_API: [&str; 3] = ["_matrix", "client", "v3"];
const DEVICE_DISPLAY_NAME: &str = "welcome-bot";

/// Must outlive the long-poll timeout used for `/sync`
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Password login credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Matrix client-server API session
pub struct MatrixGateway {
    client: reqwest::Client,
    homeserver: Url,
    access_token: String,
    user_id: UserId,
}

impl MatrixGateway {
    /// Log in with a password and keep the resulting access token
    #[instrument(skip(credentials), fields(username = %credentials.username))]
    pub async fn login(homeserver: &str, credentials: &Credentials) -> Result<Self, GatewayError> {
        let homeserver = Url::parse(homeserver)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", homeserver, e)))?;
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let request = LoginRequest {
            login_type: "m.login.password",
            identifier: UserIdentifier {
                id_type: "m.id.user",
                user: &credentials.username,
            },
            password: &credentials.password,
            initial_device_display_name: DEVICE_DISPLAY_NAME,
        };

        let response = client
            .post(endpoint(&homeserver, &["login"])?)
            .json(&request)
            .send()
            .await?;
        let login: LoginResponse = parse_response(response).await?;

        info!(user_id = %login.user_id, "Login successful");

        Ok(Self {
            client,
            homeserver,
            access_token: login.access_token,
            user_id: UserId::new(login.user_id),
        })
    }

    /// The account this session is logged in as
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Invalidate the access token
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(&["logout"])?)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;
        let _: Value = parse_response(response).await?;

        info!(user_id = %self.user_id, "Logged out");
        Ok(())
    }

    /// One long-poll round of `/sync`
    pub(super) async fn sync(
        &self,
        since: Option<&str>,
        timeout: Duration,
    ) -> Result<SyncResponse, GatewayError> {
        let mut query = vec![("timeout", timeout.as_millis().to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_string()));
        }

        let response = self
            .client
            .get(self.url(&["sync"])?)
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;
        parse_response(response).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        endpoint(&self.homeserver, segments)
    }
}

#[async_trait]
impl SessionGateway for MatrixGateway {
    #[instrument(skip(self))]
    async fn resolve_alias(&self, alias: &RoomAlias) -> Result<RoomId, GatewayError> {
        let response = self
            .client
            .get(self.url(&["directory", "room", alias.as_str()])?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let resolved: RoomIdResponse = parse_response(response).await?;

        debug!(alias = %alias, room_id = %resolved.room_id, "Resolved room alias");
        Ok(RoomId::new(resolved.room_id))
    }

    #[instrument(skip(self))]
    async fn join_room(&self, room_id: &RoomId) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(&["rooms", room_id.as_str(), "join"])?)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;
        let _: RoomIdResponse = parse_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_direct_room(&self, invitee: &UserId) -> Result<RoomId, GatewayError> {
        let request = CreateRoomRequest {
            preset: "private_chat",
            invite: vec![invitee.as_str()],
            is_direct: true,
        };

        let response = self
            .client
            .post(self.url(&["createRoom"])?)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let created: RoomIdResponse = parse_response(response).await?;

        debug!(invitee = %invitee, room_id = %created.room_id, "Created direct room");
        Ok(RoomId::new(created.room_id))
    }

    #[instrument(skip(self))]
    async fn leave_room(&self, room_id: &RoomId) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(&["rooms", room_id.as_str(), "leave"])?)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;
        let _: Value = parse_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self, content), fields(msgtype = %content.msgtype))]
    async fn send_message(
        &self,
        room_id: &RoomId,
        content: &MessageContent,
    ) -> Result<(), GatewayError> {
        let txn_id = Uuid::new_v4().to_string();
        let response = self
            .client
            .put(self.url(&[
                "rooms",
                room_id.as_str(),
                "send",
                "m.room.message",
                &txn_id,
            ])?)
            .bearer_auth(&self.access_token)
            .json(content)
            .send()
            .await?;
        let _: Value = parse_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_account_data(&self, event_type: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(self.url(&["user", self.user_id.as_str(), "account_data", event_type])?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        parse_response(response).await
    }

    #[instrument(skip(self, value))]
    async fn set_account_data(
        &self,
        event_type: &str,
        value: &Value,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .put(self.url(&["user", self.user_id.as_str(), "account_data", event_type])?)
            .bearer_auth(&self.access_token)
            .json(value)
            .send()
            .await?;
        let _: Value = parse_response(response).await?;
        Ok(())
    }
}

/// Build a client API URL, percent-encoding each path segment
fn endpoint(homeserver: &Url, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = homeserver.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayError::InvalidUrl(homeserver.to_string()))?
        .pop_if_empty()
        .extend(CLIENT_API)
        .extend(segments);
    Ok(url)
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or(ErrorResponse {
            errcode: "M_UNKNOWN".to_string(),
            error: body,
        });
        return Err(GatewayError::api(status.as_u16(), error.errcode, error.error));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}
