use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::config::Config;
use super::multipart::MultipartForm;
use super::session::SessionContext;
use super::types::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    /// The backend answered with a readable `{message}` / `{error}` body
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("HTTP {status}")]
    Status { status: u16 },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Could not read file: {0}")]
    File(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Best-effort message from an error body, falling back to the status.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<serde_json::Value>,
            error: Option<serde_json::Value>,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| {
                [b.message, b.error]
                    .into_iter()
                    .flatten()
                    .find_map(|value| match value {
                        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                        serde_json::Value::Object(map) => map
                            .get("message")
                            .and_then(|m| m.as_str())
                            .map(str::to_string),
                        _ => None,
                    })
            });
        match message {
            Some(message) => ApiError::Server { status, message },
            None => ApiError::Status { status },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } | ApiError::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ApiError::Timeout
        } else if value.is_decode() {
            ApiError::Decode(value.to_string())
        } else if value.is_builder() {
            ApiError::InvalidRequest(value.to_string())
        } else {
            ApiError::Network(value.to_string())
        }
    }
}

impl From<super::repository::StorageError> for ApiError {
    fn from(value: super::repository::StorageError) -> Self {
        ApiError::Storage(value.to_string())
    }
}

/// Every backend call the app makes.
#[async_trait]
pub trait PartnerApi: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn send_otp(&self, phone: String) -> Result<MessageResponse, ApiError>;
    async fn verify_otp(&self, phone: String, otp: String) -> Result<LoginResponse, ApiError>;
    async fn send_signup_otp(&self, email: String) -> Result<MessageResponse, ApiError>;
    async fn forgot_password(&self, email: String) -> Result<MessageResponse, ApiError>;
    async fn register_partner(&self, form: MultipartForm) -> Result<MessageResponse, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;

    async fn offers(&self) -> Result<Vec<BankOffer>, ApiError>;
    async fn offer(&self, id: String) -> Result<BankOffer, ApiError>;
    async fn create_offer(&self, form: MultipartForm) -> Result<BankOffer, ApiError>;
    async fn update_offer(&self, id: String, form: MultipartForm) -> Result<BankOffer, ApiError>;
    async fn delete_offer(&self, id: String) -> Result<(), ApiError>;

    async fn commission_plan(&self) -> Result<CommissionPlan, ApiError>;
    async fn payout_detail(&self, lead_id: String) -> Result<PayoutDetail, ApiError>;
    async fn payout_history(&self) -> Result<Vec<MonthlyBreakdown>, ApiError>;
}

/// REST implementation.
///
/// JSON requests go through `json`, which sends `Content-Type:
/// application/json` by default. Multipart requests go through `bare`,
/// which has no default headers so reqwest can set the boundary itself.
pub struct HttpApi {
    config: Config,
    json: Client,
    bare: Client,
    session: SessionContext,
}

impl HttpApi {
    pub fn new(config: Config, session: SessionContext) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let json = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;
        let bare = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            config,
            json,
            bare,
            session,
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.json.request(method, self.config.url(path)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    async fn post_message(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<MessageResponse, ApiError> {
        let response = self.request(Method::POST, path).json(&body).send().await?;
        let bytes = checked_body(response).await?;
        Ok(message_or_default(path, &bytes))
    }

    async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: MultipartForm,
        timeout: Option<Duration>,
    ) -> Result<T, ApiError> {
        let form = form.into_form().await?;
        let mut builder = self
            .authorize(self.bare.request(method, self.config.url(path)))
            .multipart(form);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        decode(builder.send().await?).await
    }
}

async fn checked_body(response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status.as_u16(), &bytes));
    }
    Ok(bytes.to_vec())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = checked_body(response).await?;
    serde_json::from_slice::<Envelope<T>>(&bytes)
        .map(Envelope::into_inner)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Message-only endpoints succeed on any 2xx; a body we cannot read just
/// means there is no message to show.
fn message_or_default(path: &str, bytes: &[u8]) -> MessageResponse {
    match serde_json::from_slice::<Envelope<MessageResponse>>(bytes) {
        Ok(envelope) => envelope.into_inner(),
        Err(e) => {
            log::warn!("Unreadable response body from {path}: {e}");
            MessageResponse::default()
        }
    }
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl PartnerApi for HttpApi {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.post("auth/login", &body).await
    }

    async fn send_otp(&self, phone: String) -> Result<MessageResponse, ApiError> {
        self.post_message("send-otp", serde_json::json!({ "phone": phone }))
            .await
    }

    async fn verify_otp(&self, phone: String, otp: String) -> Result<LoginResponse, ApiError> {
        self.post("verify-otp", &serde_json::json!({ "phone": phone, "otp": otp }))
            .await
    }

    async fn send_signup_otp(&self, email: String) -> Result<MessageResponse, ApiError> {
        // the deployed route really is spelled `send-opt`
        self.post_message("auth/send-opt", serde_json::json!({ "email": email }))
            .await
    }

    async fn forgot_password(&self, email: String) -> Result<MessageResponse, ApiError> {
        self.post_message("auth/forgot-password", serde_json::json!({ "email": email }))
            .await
    }

    async fn register_partner(&self, form: MultipartForm) -> Result<MessageResponse, ApiError> {
        let timeout = Some(self.config.registration_timeout);
        self.multipart(Method::POST, "partner/create", form, timeout)
            .await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("auth/me").await
    }

    async fn offers(&self) -> Result<Vec<BankOffer>, ApiError> {
        self.get("offers/get-all").await
    }

    async fn offer(&self, id: String) -> Result<BankOffer, ApiError> {
        self.get(&format!("offers/{}", segment(&id))).await
    }

    async fn create_offer(&self, form: MultipartForm) -> Result<BankOffer, ApiError> {
        self.multipart(Method::POST, "offers/create", form, None)
            .await
    }

    async fn update_offer(&self, id: String, form: MultipartForm) -> Result<BankOffer, ApiError> {
        let path = format!("offers/{}/edit", segment(&id));
        self.multipart(Method::PUT, &path, form, None).await
    }

    async fn delete_offer(&self, id: String) -> Result<(), ApiError> {
        let path = format!("offers/{}", segment(&id));
        let response = self.request(Method::DELETE, &path).send().await?;
        checked_body(response).await.map(|_| ())
    }

    async fn commission_plan(&self) -> Result<CommissionPlan, ApiError> {
        self.get("commission/plan").await
    }

    async fn payout_detail(&self, lead_id: String) -> Result<PayoutDetail, ApiError> {
        self.get(&format!("commission/payout/{}", segment(&lead_id)))
            .await
    }

    async fn payout_history(&self) -> Result<Vec<MonthlyBreakdown>, ApiError> {
        self.get("commission/payout-history").await
    }
}

/// What reducers talk to. Builds forms from drafts and logs failures.
#[derive(Clone)]
pub struct Model {
    pub url: String,
    client: Arc<dyn PartnerApi>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("url", &self.url).finish()
    }
}

impl Model {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, ApiError> {
        let client = HttpApi::new(config.clone(), session)?;
        Ok(Self::with_client(config.base_url.clone(), Arc::new(client)))
    }

    pub fn with_client(url: String, client: Arc<dyn PartnerApi>) -> Self {
        Self { url, client }
    }

    pub async fn login(&self, email: String, password: String) -> Result<LoginResponse, ApiError> {
        log::trace!("Login");
        self.client
            .login(LoginRequest { email, password })
            .await
            .log_error("login")
    }

    pub async fn send_otp(&self, phone: String) -> Result<MessageResponse, ApiError> {
        log::trace!("Send OTP");
        self.client.send_otp(phone).await.log_error("send_otp")
    }

    pub async fn verify_otp(&self, phone: String, otp: String) -> Result<LoginResponse, ApiError> {
        log::trace!("Verify OTP");
        self.client
            .verify_otp(phone, otp.trim().to_string())
            .await
            .log_error("verify_otp")
    }

    pub async fn send_signup_otp(&self, email: String) -> Result<MessageResponse, ApiError> {
        self.client
            .send_signup_otp(email)
            .await
            .log_error("send_signup_otp")
    }

    pub async fn forgot_password(&self, email: String) -> Result<MessageResponse, ApiError> {
        self.client
            .forgot_password(email)
            .await
            .log_error("forgot_password")
    }

    pub async fn register_partner(
        &self,
        registration: PartnerRegistration,
    ) -> Result<MessageResponse, ApiError> {
        log::trace!("Register Partner");
        let image = registration.profile_image.clone();
        let form = MultipartForm::from_record(&registration, [("profileImage", image)])?;
        self.client
            .register_partner(form)
            .await
            .log_error("register_partner")
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.current_user().await.log_error("current_user")
    }

    pub async fn offers(&self) -> Result<Vec<BankOffer>, ApiError> {
        log::trace!("Offers");
        let offers = self.client.offers().await.log_error("offers")?;
        log::trace!("offers arrived {}", offers.len());
        Ok(offers)
    }

    pub async fn offer(&self, id: String) -> Result<BankOffer, ApiError> {
        self.client.offer(id).await.log_error("offer")
    }

    pub async fn create_offer(&self, draft: OfferDraft) -> Result<BankOffer, ApiError> {
        log::trace!("Create Offer");
        let image = draft.bank_image.clone();
        let form = MultipartForm::from_record(&draft, [("bankImage", image)])?;
        self.client
            .create_offer(form)
            .await
            .log_error("create_offer")
    }

    pub async fn update_offer(&self, id: String, draft: OfferDraft) -> Result<BankOffer, ApiError> {
        log::trace!("Update Offer {id}");
        let image = draft.bank_image.clone();
        let form = MultipartForm::from_record(&draft, [("bankImage", image)])?;
        self.client
            .update_offer(id, form)
            .await
            .log_error("update_offer")
    }

    /// Returns the id on success so the reducer knows what to remove
    pub async fn delete_offer(&self, id: String) -> Result<String, ApiError> {
        log::trace!("Delete Offer {id}");
        self.client
            .delete_offer(id.clone())
            .await
            .map(|_| id)
            .log_error("delete_offer")
    }

    pub async fn commission_plan(&self) -> Result<CommissionPlan, ApiError> {
        self.client
            .commission_plan()
            .await
            .log_error("commission_plan")
    }

    pub async fn payout_detail(&self, lead_id: String) -> Result<PayoutDetail, ApiError> {
        self.client
            .payout_detail(lead_id)
            .await
            .log_error("payout_detail")
    }

    pub async fn payout_history(&self) -> Result<Vec<MonthlyBreakdown>, ApiError> {
        self.client
            .payout_history()
            .await
            .log_error("payout_history")
    }
}

trait ResultExt {
    fn log_error(self, call: &'static str) -> Self;
}

impl<T> ResultExt for Result<T, ApiError> {
    fn log_error(self, call: &'static str) -> Self {
        if let Err(ref e) = self {
            log::error!("API Error: {call} {e:?}");
        }
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_preferred() {
        let error = ApiError::from_response(400, br#"{"message": "Invalid OTP"}"#);
        assert_eq!(error.to_string(), "Invalid OTP");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn error_field_is_used_when_message_is_missing() {
        let error = ApiError::from_response(409, br#"{"success": false, "error": "Offer exists"}"#);
        assert_eq!(
            error,
            ApiError::Server {
                status: 409,
                message: "Offer exists".into()
            }
        );

        let nested = ApiError::from_response(422, br#"{"error": {"message": "Bad image"}}"#);
        assert_eq!(nested.to_string(), "Bad image");
    }

    #[test]
    fn unreadable_bodies_fall_back_to_status() {
        assert_eq!(
            ApiError::from_response(502, b"<html>Bad Gateway</html>").to_string(),
            "HTTP 502"
        );
        assert_eq!(
            ApiError::from_response(500, br#"{"message": ""}"#),
            ApiError::Status { status: 500 }
        );
        assert!(ApiError::from_response(401, b"").is_unauthorized());
    }

    #[test]
    fn message_bodies_tolerate_empty_and_plain_text() {
        assert_eq!(
            message_or_default("send-otp", br#"{"message": "OTP sent to 98xxxx"}"#).message,
            Some("OTP sent to 98xxxx".to_string())
        );
        assert_eq!(
            message_or_default("send-otp", b"OK"),
            MessageResponse::default()
        );
        assert_eq!(message_or_default("send-otp", b""), MessageResponse::default());
    }

    #[tokio::test]
    async fn model_builds_forms_from_drafts() {
        let api = Arc::new(mock::MockApi::default());
        mock::reply(&api.offer, Ok(BankOffer::default()));
        let model = Model::with_client("http://test".into(), api.clone());

        let draft = OfferDraft {
            bank_name: Some("SBI".into()),
            bank_image: Some(super::super::multipart::FileSource::Url(
                "https://cdn.example.com/sbi.png".into(),
            )),
            eligibility: Some(Eligibility {
                min_age: Some(21),
                ..Default::default()
            }),
            ..Default::default()
        };
        model.create_offer(draft).await.unwrap();

        let forms = api.forms.lock().unwrap();
        assert_eq!(forms[0].text("bankName"), Some("SBI"));
        assert_eq!(forms[0].text("eligibility[minAge]"), Some("21"));
        assert!(forms[0].get("bankImage").is_some());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_id() {
        let api = Arc::new(mock::MockApi::default());
        mock::reply(&api.deleted, Ok(()));
        let model = Model::with_client("http://test".into(), api);
        assert_eq!(model.delete_offer("a".into()).await, Ok("a".to_string()));
    }
}
