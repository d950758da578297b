//! High-level workspace client
//!
//! Wires configuration, token acquisition and the dispatcher together and
//! exposes the platform's business operations on top of them.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use wwsdk_common::auth::{
    ClientCredentials, CredentialFormat, OAuthClient, RenewalPolicy, TokenLifecycleManager,
    TokenState,
};
use wwsdk_common::graphql::{queries, FieldSpec, RequiredFieldPolicy};
use wwsdk_common::normalize::{jsonify, map_collection, Picked};
use wwsdk_domain::constants::{
    ACQUISITION_RETRY_SECS, APP_ID_LENGTH, APP_SECRET_LENGTH, MAX_ACQUISITION_FAILURES,
    PHOTOS_ROUTE, RENEW_BEFORE_EXPIRY_SECS,
};
use wwsdk_domain::{
    add_member_input, extract_information, ActionTarget, AddFocusInput, AppMessage, FocusRequest,
    MessageContent, NlpInformation, SdkConfig, SdkError, TargetedMessageInput, UiPayload,
};

use super::auth::{AccessTokenProvider, ManagedToken, StaticToken};
use super::dispatcher::{GraphqlPayload, RequestDispatcher, RequestEnvelope};
use super::files::{self, Dimensions};
use crate::errors::to_sdk;
use crate::http::HttpClient;

/// Renewal policy built from the platform constants.
pub fn platform_renewal_policy() -> RenewalPolicy {
    RenewalPolicy {
        renew_before: Duration::from_secs(RENEW_BEFORE_EXPIRY_SECS),
        retry_interval: Duration::from_secs(ACQUISITION_RETRY_SECS),
        max_failures: MAX_ACQUISITION_FAILURES,
        format: CredentialFormat {
            client_id_len: APP_ID_LENGTH,
            client_secret_len: APP_SECRET_LENGTH,
        },
    }
}

/// Authenticated client for one app.
pub struct WorkspaceClient {
    dispatcher: RequestDispatcher,
    app_id: Option<String>,
    tokens: Option<Arc<TokenLifecycleManager<OAuthClient>>>,
    field_policy: RequiredFieldPolicy,
}

impl WorkspaceClient {
    /// Connect using `config`.
    ///
    /// A pre-issued token is used as-is. Otherwise the app credentials are
    /// validated, a token lifecycle manager is started, and this call returns
    /// once the first token has been acquired.
    ///
    /// # Errors
    /// - [`SdkError::Config`] for an unusable configuration
    /// - [`SdkError::InvalidCredentialFormat`] before any request is made
    /// - [`SdkError::AcquisitionFailed`] once acquisition has given up
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub async fn connect(config: SdkConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let http = HttpClient::new()?;

        if let Some(token) = config.token.clone() {
            info!("Using pre-issued token");
            let client = Self::with_provider(http, &config.base_url, Arc::new(StaticToken::new(token)))?;
            return Ok(client.with_app_id(config.app_id));
        }

        let credentials = config.credentials().ok_or_else(|| {
            SdkError::Config("app_id and app_secret are required without a token".to_string())
        })?;

        let exchange = OAuthClient::with_client(http.inner().clone(), &config.base_url);
        let manager = Arc::new(TokenLifecycleManager::with_policy(exchange, platform_renewal_policy()));

        let handle = manager
            .start(ClientCredentials::new(credentials.app_id.clone(), credentials.app_secret.clone()))
            .map_err(to_sdk)?;
        handle.wait().await.map_err(to_sdk)?;
        info!(app_id = %credentials.app_id, "Authenticated");

        let provider = Arc::new(ManagedToken::new(manager.accessor()));
        let mut client = Self::with_provider(http, &config.base_url, provider)?;
        client.app_id = Some(credentials.app_id);
        client.tokens = Some(manager);
        Ok(client)
    }

    /// Client over an arbitrary token source. Nothing is acquired.
    pub fn with_provider(
        http: HttpClient,
        base_url: &str,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, SdkError> {
        Ok(Self {
            dispatcher: RequestDispatcher::new(http, base_url, auth)?,
            app_id: None,
            tokens: None,
            field_policy: RequiredFieldPolicy::Inject,
        })
    }

    #[must_use]
    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id;
        self
    }

    /// How getters treat a field selection without `id`. Defaults to
    /// [`RequiredFieldPolicy::Inject`].
    #[must_use]
    pub fn with_field_policy(mut self, policy: RequiredFieldPolicy) -> Self {
        self.field_policy = policy;
        self
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Token state when tokens are managed, `None` for a pre-issued token.
    pub fn token_state(&self) -> Option<TokenState> {
        self.tokens.as_ref().map(|manager| manager.state())
    }

    /// Stop token renewal. Requests made afterwards fail authentication.
    pub async fn shutdown(&self) {
        if let Some(manager) = &self.tokens {
            manager.stop().await;
        }
    }

    /// Fetch app configuration data for a configuration `token`.
    #[instrument(skip(self, token))]
    pub async fn get_configuration_data(&self, token: &str) -> Result<Value, SdkError> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or_else(|| SdkError::Config("app_id is required for configuration data".into()))?;

        let route = format!("v1/apps/{app_id}/configurationData/{token}");
        Ok(self.dispatcher.dispatch(RequestEnvelope::get(route)).await?.body)
    }

    /// The authenticated app.
    #[instrument(skip(self, fields))]
    pub async fn get_me(&self, fields: FieldSpec) -> Result<Picked, SdkError> {
        let query = queries::get_me(fields, self.field_policy).map_err(to_sdk)?;
        let data = self.graphql(GraphqlPayload::query(query)).await?;
        self.pick_from("me", data)
    }

    #[instrument(skip(self, fields))]
    pub async fn get_space(&self, space_id: &str, fields: FieldSpec) -> Result<Picked, SdkError> {
        let query = queries::get_space(fields, self.field_policy).map_err(to_sdk)?;
        let data =
            self.graphql(GraphqlPayload::with_variables(query, json!({ "id": space_id }))).await?;
        self.pick_from("space", data)
    }

    /// A message, with each string annotation parsed into JSON.
    #[instrument(skip(self, fields))]
    pub async fn get_message(&self, message_id: &str, fields: FieldSpec) -> Result<Picked, SdkError> {
        let query = queries::get_message(fields, self.field_policy).map_err(to_sdk)?;
        let data =
            self.graphql(GraphqlPayload::with_variables(query, json!({ "id": message_id }))).await?;

        match self.pick_from("message", data)? {
            Picked::Found(message) => {
                let message =
                    map_collection("annotations", jsonify, message).map_err(to_sdk)?;
                Ok(Picked::Found(message))
            }
            Picked::Missing => Ok(Picked::Missing),
        }
    }

    /// Post an app message into a space.
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        space_id: &str,
        content: impl Into<MessageContent>,
    ) -> Result<Value, SdkError> {
        info!("Sending message to conversation '{space_id}'");
        let body = serde_json::to_value(AppMessage::new(content.into()))?;
        let request = RequestEnvelope::post(format!("v1/spaces/{space_id}/messages")).json(body);
        Ok(self.dispatcher.dispatch(request).await?.body)
    }

    /// Create a plain text message through GraphQL.
    #[instrument(skip(self, content))]
    pub async fn send_synchronous_message(
        &self,
        space_id: &str,
        content: &str,
    ) -> Result<Picked, SdkError> {
        let variables = json!({ "input": { "conversationId": space_id, "content": content } });
        self.graphql(GraphqlPayload::with_variables(queries::CREATE_SYNCHRONOUS_MESSAGE, variables))
            .await
    }

    #[instrument(skip(self, member_ids), fields(members = member_ids.len()))]
    pub async fn add_member(&self, space_id: &str, member_ids: &[String]) -> Result<Picked, SdkError> {
        let variables = add_member_input(space_id, member_ids);
        let data = self.graphql(GraphqlPayload::with_variables(queries::ADD_MEMBER, variables)).await?;
        self.pick_from("updateSpace", data)
    }

    /// Attach a focus to `request.phrase` within `message`.
    ///
    /// `message` may come from [`Self::get_message`] (with `content` selected)
    /// or straight from a webhook.
    #[instrument(skip_all, fields(phrase = %request.phrase))]
    pub async fn add_message_focus(
        &self,
        message: &Value,
        request: FocusRequest,
    ) -> Result<Picked, SdkError> {
        let input = AddFocusInput::for_message(message, request)?;
        if input.message_focus.start < 0 {
            warn!(message_id = %input.message_id, "phrase not found in message text");
        }
        info!("Adding message focus to message '{}'", input.message_id);

        let variables = json!({ "input": serde_json::to_value(&input)? });
        self.graphql(GraphqlPayload::with_variables(queries::ADD_MESSAGE_FOCUS, variables)).await
    }

    /// Send an action-fulfillment dialog to a single user.
    #[instrument(skip(self, target, items), fields(items = items.len()))]
    pub async fn send_targeted_message(
        &self,
        user_id: &str,
        target: ActionTarget,
        items: Vec<UiPayload>,
    ) -> Result<Picked, SdkError> {
        info!("Sending targeted message to user {user_id}");
        let input = TargetedMessageInput::new(user_id, target, items);
        if input.is_empty() {
            error!("Targeted message has no annotations or attachments for {user_id}");
        }

        let variables = json!({ "input": serde_json::to_value(&input)? });
        self.graphql(GraphqlPayload::with_variables(queries::CREATE_TARGETED_MESSAGE, variables))
            .await
    }

    /// Download a file's contents.
    #[instrument(skip(self))]
    pub async fn get_file(&self, file_id: &str) -> Result<Vec<u8>, SdkError> {
        let route = format!("files/api/v1/files/file/{file_id}");
        let metadata = self.dispatcher.dispatch(RequestEnvelope::get(route)).await?.body;

        let location = metadata
            .pointer("/entries/0/urls/redirect_download")
            .and_then(Value::as_str)
            .ok_or_else(|| SdkError::MissingProperty("entries[0].urls.redirect_download".into()))?;

        self.dispatcher.download(location).await
    }

    /// Upload a file into a space.
    ///
    /// Images are sent at `dims` when given and at their full size otherwise.
    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub async fn send_file(
        &self,
        space_id: &str,
        path: impl AsRef<Path>,
        dims: Option<Dimensions>,
    ) -> Result<Value, SdkError> {
        let path = path.as_ref();
        info!("Sending file '{}' to conversation '{space_id}'", path.display());

        let content_type = files::content_type(path);
        let mut route = format!("v1/spaces/{space_id}/files");
        if let Some(dims) = files::upload_dimensions(path, &content_type, dims).await? {
            route.push_str(&format!("?dim={}", dims.as_query()));
        }

        let form = files::file_form(path, &content_type).await?;
        Ok(self.dispatcher.dispatch_multipart(&route, form).await?.body)
    }

    /// Replace the app's profile photo with a JPEG.
    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub async fn upload_photo(&self, path: impl AsRef<Path>) -> Result<Value, SdkError> {
        let form = files::file_form(path.as_ref(), "image/jpeg").await?;
        Ok(self.dispatcher.dispatch_multipart(PHOTOS_ROUTE, form).await?.body)
    }

    /// NLP annotations of a message fetched with [`Self::get_message`].
    pub fn extract_information(&self, message: &Value) -> NlpInformation {
        extract_information(message)
    }

    async fn graphql(&self, payload: GraphqlPayload) -> Result<Picked, SdkError> {
        self.dispatcher.send_graphql(payload).await
    }

    fn pick_from(&self, property: &str, data: Picked) -> Result<Picked, SdkError> {
        match data {
            Picked::Found(data) => wwsdk_common::normalize::pick(property, data).map_err(to_sdk),
            Picked::Missing => Ok(Picked::Missing),
        }
    }
}

impl std::fmt::Debug for WorkspaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceClient")
            .field("base_url", &self.dispatcher.base_url().as_str())
            .field("app_id", &self.app_id)
            .field("managed_tokens", &self.tokens.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};
    use wwsdk_domain::{card, generic};

    use super::*;

    fn client(server: &MockServer) -> WorkspaceClient {
        WorkspaceClient::with_provider(
            HttpClient::new().unwrap(),
            &server.uri(),
            Arc::new(StaticToken::new("tok")),
        )
        .unwrap()
        .with_app_id(Some("app-1".into()))
    }

    async fn mount_graphql(server: &MockServer, response: Value) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(server)
            .await;
    }

    fn graphql_body(request: &Request) -> Value {
        serde_json::from_slice(&request.body).unwrap()
    }

    #[tokio::test]
    async fn get_me_injects_id_and_picks_me() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {"me": {"id": "u1", "displayName": "Bot"}}})).await;

        let me = client(&server).get_me(FieldSpec::from(["displayName"])).await.unwrap();
        assert_eq!(me, Picked::Found(json!({"id": "u1", "displayName": "Bot"})));

        let requests = server.received_requests().await.unwrap();
        let query = graphql_body(&requests[0])["query"].as_str().unwrap().to_string();
        assert!(query.contains("displayName id"));
    }

    #[tokio::test]
    async fn get_space_reports_missing_space() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {}})).await;

        let space = client(&server).get_space("s1", FieldSpec::from(["id"])).await.unwrap();
        assert!(space.is_missing());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(graphql_body(&requests[0])["variables"], json!({"id": "s1"}));
    }

    #[tokio::test]
    async fn get_message_parses_annotations() {
        let server = MockServer::start().await;
        mount_graphql(
            &server,
            json!({"data": {"message": {
                "id": "m1",
                "annotations": ["{\"type\":\"generic\",\"text\":\"hi\"}"]
            }}}),
        )
        .await;

        let message = client(&server).get_message("m1", FieldSpec::from(["annotations"])).await.unwrap();
        let message = message.found().unwrap();
        assert_eq!(message["annotations"][0], json!({"type": "generic", "text": "hi"}));
    }

    #[tokio::test]
    async fn reject_policy_fails_before_any_request() {
        let server = MockServer::start().await;
        let client = client(&server).with_field_policy(RequiredFieldPolicy::Reject);

        let err = client.get_me(FieldSpec::from(["displayName"])).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidFieldSpec(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_message_wraps_text_in_app_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/spaces/s1/messages"))
            .and(body_partial_json(json!({
                "type": "appMessage",
                "version": "1",
                "annotations": [{"type": "generic", "text": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "m9"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).send_message("s1", "hello").await.unwrap();
        assert_eq!(body["id"], "m9");
    }

    #[tokio::test]
    async fn send_synchronous_message_uses_conversation_id() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {"createMessage": {"message": {"id": "m"}}}})).await;

        client(&server).send_synchronous_message("s1", "hey").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            graphql_body(&requests[0])["variables"],
            json!({"input": {"conversationId": "s1", "content": "hey"}})
        );
    }

    #[tokio::test]
    async fn add_member_picks_update_space() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {"updateSpace": {"memberIdsChanged": ["u2"]}}})).await;

        let result = client(&server).add_member("s1", &["u2".to_string()]).await.unwrap();
        assert_eq!(result, Picked::Found(json!({"memberIdsChanged": ["u2"]})));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(graphql_body(&requests[0])["variables"]["input"]["memberOperation"], "ADD");
    }

    #[tokio::test]
    async fn add_message_focus_sends_offsets() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {"addMessageFocus": {"message": {"id": "m1"}}}})).await;

        let message = json!({"messageId": "m1", "content": "please deploy now"});
        let request = FocusRequest {
            phrase: "deploy".into(),
            lens: "Deploy".into(),
            category: "ops".into(),
            actions: vec!["deploy".into()],
            ..FocusRequest::default()
        };
        client(&server).add_message_focus(&message, request).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let focus = &graphql_body(&requests[0])["variables"]["input"]["messageFocus"];
        assert_eq!(focus["start"], 7);
        assert_eq!(focus["end"], 13);
        assert_eq!(focus["payload"], "");
        assert_eq!(focus["hidden"], false);
    }

    #[tokio::test]
    async fn targeted_message_splits_annotations_and_attachments() {
        let server = MockServer::start().await;
        mount_graphql(&server, json!({"data": {"createTargetedMessage": {"successful": true}}})).await;

        let target = ActionTarget { conversation_id: "c1".into(), target_dialog_id: "d1".into() };
        let items = vec![
            generic("Title", "Body", vec![]),
            card("Card", "Sub", "Text", vec![], None).unwrap(),
        ];
        client(&server).send_targeted_message("u1", target, items).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let input = &graphql_body(&requests[0])["variables"]["input"];
        assert_eq!(input["targetUserId"], "u1");
        assert_eq!(input["annotations"].as_array().unwrap().len(), 1);
        assert_eq!(input["attachments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_configuration_data_uses_app_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/apps/app-1/configurationData/cfg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"setting": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server).get_configuration_data("cfg").await.unwrap();
        assert_eq!(data, json!({"setting": 1}));
    }

    #[tokio::test]
    async fn get_file_follows_redirect_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/api/v1/files/file/f1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{"urls": {"redirect_download": format!("{}/download/f1", server.uri())}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/download/f1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"contents".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).get_file("f1").await.unwrap(), b"contents".to_vec());
    }

    #[tokio::test]
    async fn get_file_without_download_url_is_missing_property() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entries": []})))
            .mount(&server)
            .await;

        let err = client(&server).get_file("f1").await.unwrap_err();
        assert!(matches!(err, SdkError::MissingProperty(_)));
    }

    #[tokio::test]
    async fn send_file_measures_image_dimensions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/spaces/s1/files"))
            .and(query_param("dim", "4x2"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "file"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let image = dir.path().join("chart.png");
        ImageBuffer::<Rgb<u8>, _>::new(4, 2).save(&image).unwrap();

        let body = client(&server).send_file("s1", &image, None).await.unwrap();
        assert_eq!(body["id"], "file");

        let requests = server.received_requests().await.unwrap();
        let multipart = String::from_utf8_lossy(&requests[0].body).to_lowercase();
        assert!(multipart.contains("name=\"file\"; filename=\"chart.png\""));
        assert!(multipart.contains("content-type: image/png"));
    }

    #[tokio::test]
    async fn send_file_without_image_has_no_dim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/spaces/s1/files"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let body = client(&server).send_file("s1", &file, None).await.unwrap();
        assert_eq!(body, Value::Null);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn upload_photo_is_sent_as_jpeg() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/photos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let photo = dir.path().join("me.jpg");
        std::fs::write(&photo, [0xFFu8, 0xD8, 0xFF]).unwrap();

        client(&server).upload_photo(&photo).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let multipart = String::from_utf8_lossy(&requests[0].body).to_lowercase();
        assert!(multipart.contains("content-type: image/jpeg"));
    }

    #[tokio::test]
    async fn connect_with_token_skips_acquisition() {
        let client = WorkspaceClient::connect(SdkConfig::with_token("pre-issued")).await.unwrap();
        assert!(client.token_state().is_none());
    }

    #[tokio::test]
    async fn connect_rejects_malformed_credentials_without_network() {
        let server = MockServer::start().await;
        let config = SdkConfig { base_url: server.uri(), ..SdkConfig::with_credentials("short", "short") };

        let err = WorkspaceClient::connect(config).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidCredentialFormat(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
