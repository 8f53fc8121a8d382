use crate::environment::types::{LoginResponse, MessageResponse, PartnerRegistration, Session, User};
use crate::environment::{ApiError, Environment};
use crate::store::{Effect, Lifecycle, Ticket};

pub struct AuthReducer;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AuthRequest {
    /// Login, OTP verification and session restore all decide who is signed
    /// in, so the latest of them supersedes the others.
    Session,
    SendOtp,
    SignupOtp,
    ForgotPassword,
    Register,
}

type Reply<T> = (Ticket<AuthRequest>, Result<T, ApiError>);

#[derive(Debug)]
pub enum AuthAction {
    Login { email: String, password: String },
    LoggedIn(Reply<LoginResponse>),
    SendOtp { phone: String },
    OtpSent(Reply<MessageResponse>),
    VerifyOtp { phone: String, otp: String },
    OtpVerified(Reply<LoginResponse>),
    /// Sign-up OTP by email
    SendSignupOtp { email: String },
    SignupOtpSent(Reply<MessageResponse>),
    ForgotPassword { email: String },
    ResetRequested(Reply<MessageResponse>),
    RegisterPartner(PartnerRegistration),
    Registered(Reply<MessageResponse>),
    /// A token read from storage at start-up
    RestoreSession(String),
    RetrievedUser(Reply<User>),
    SaveCredentials,
    Logout,
    ClearMessages,
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct AuthState {
    pub session: Session,
    pub otp_sent: bool,
    pub signup_otp_sent: bool,
    pub registered: bool,
    pub status: Lifecycle<AuthRequest>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }
}

pub fn reduce(
    action: AuthAction,
    state: &mut AuthState,
    environment: &Environment,
) -> Effect<AuthAction> {
    log::trace!("{action:?}");
    let model = environment.model.clone();
    match action {
        AuthAction::Login { email, password } => {
            let ticket = state.status.pending(AuthRequest::Session);
            Effect::future(
                async move { model.login(email, password).await },
                move |result| AuthAction::LoggedIn((ticket, result)),
            )
        }
        AuthAction::LoggedIn((ticket, result)) | AuthAction::OtpVerified((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(response) => {
                    state.session = Session::authenticated(response.token, response.user);
                    if let Some(message) = response.message {
                        state.status.succeed(message);
                    }
                    Effect::action(AuthAction::SaveCredentials)
                }
                Err(e) => {
                    state.status.reject(e);
                    Effect::NONE
                }
            }
        }
        AuthAction::SendOtp { phone } => {
            state.otp_sent = false;
            let ticket = state.status.pending(AuthRequest::SendOtp);
            Effect::future(
                async move { model.send_otp(phone).await },
                move |result| AuthAction::OtpSent((ticket, result)),
            )
        }
        AuthAction::OtpSent((ticket, result)) => {
            if settle_message(state, &ticket, result, "OTP sent").is_some() {
                state.otp_sent = true;
            }
            Effect::NONE
        }
        AuthAction::VerifyOtp { phone, otp } => {
            let ticket = state.status.pending(AuthRequest::Session);
            Effect::future(
                async move { model.verify_otp(phone, otp).await },
                move |result| AuthAction::OtpVerified((ticket, result)),
            )
        }
        AuthAction::SendSignupOtp { email } => {
            state.signup_otp_sent = false;
            let ticket = state.status.pending(AuthRequest::SignupOtp);
            Effect::future(
                async move { model.send_signup_otp(email).await },
                move |result| AuthAction::SignupOtpSent((ticket, result)),
            )
        }
        AuthAction::SignupOtpSent((ticket, result)) => {
            if settle_message(state, &ticket, result, "OTP sent").is_some() {
                state.signup_otp_sent = true;
            }
            Effect::NONE
        }
        AuthAction::ForgotPassword { email } => {
            let ticket = state.status.pending(AuthRequest::ForgotPassword);
            Effect::future(
                async move { model.forgot_password(email).await },
                move |result| AuthAction::ResetRequested((ticket, result)),
            )
        }
        AuthAction::ResetRequested((ticket, result)) => {
            settle_message(state, &ticket, result, "Password reset instructions sent");
            Effect::NONE
        }
        AuthAction::RegisterPartner(registration) => {
            state.registered = false;
            let ticket = state.status.pending(AuthRequest::Register);
            Effect::future(
                async move { model.register_partner(registration).await },
                move |result| AuthAction::Registered((ticket, result)),
            )
        }
        AuthAction::Registered((ticket, result)) => {
            if settle_message(state, &ticket, result, "Registration submitted").is_some() {
                state.registered = true;
            }
            Effect::NONE
        }
        AuthAction::RestoreSession(token) => {
            environment.session.set_token(Some(token.clone()));
            state.session = Session::authenticated(token, None);
            let ticket = state.status.pending(AuthRequest::Session);
            Effect::future(
                async move { model.current_user().await },
                move |result| AuthAction::RetrievedUser((ticket, result)),
            )
        }
        AuthAction::RetrievedUser((ticket, result)) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(user) => state.session.user = Some(user),
                Err(e) if e.is_unauthorized() => {
                    log::info!("Stored session was rejected, logging out");
                    state.status.reject(e);
                    return Effect::action(AuthAction::Logout);
                }
                Err(e) => state.status.reject(e),
            }
            Effect::NONE
        }
        AuthAction::SaveCredentials => {
            let Some(token) = state.session.token.clone() else {
                return Effect::NONE;
            };
            environment.session.set_token(Some(token.clone()));
            if let Err(e) = environment.repository.set_token(&token) {
                log::error!("Could not persist token: {e:?}");
                state.status.reject(e);
            }
            Effect::NONE
        }
        AuthAction::Logout => {
            state.session = Session::default();
            state.otp_sent = false;
            state.signup_otp_sent = false;
            environment.session.set_token(None);
            state.status.abandon(&AuthRequest::Session);
            if let Err(e) = environment.repository.clear_token() {
                log::error!("Could not remove token: {e:?}");
                state.status.reject(e);
            }
            Effect::NONE
        }
        AuthAction::ClearMessages => {
            state.status.clear_messages();
            Effect::NONE
        }
    }
}

/// Shared completion for the endpoints that only answer with a message.
/// Returns the response when it was current and successful.
fn settle_message(
    state: &mut AuthState,
    ticket: &Ticket<AuthRequest>,
    result: Result<MessageResponse, ApiError>,
    fallback: &str,
) -> Option<MessageResponse> {
    if !state.status.settle(ticket) {
        return None;
    }
    match result {
        Ok(response) => {
            let message = response.message.clone();
            state
                .status
                .succeed(message.unwrap_or_else(|| fallback.to_string()));
            Some(response)
        }
        Err(e) => {
            state.status.reject(e);
            None
        }
    }
}
