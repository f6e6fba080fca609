use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::application::services::IvrEngine;
use crate::application::services::ivr_engine::{CallInput, IvrError, VoiceResponse};
use crate::infrastructure::channels::TwilioSignatureValidator;
use crate::infrastructure::channels::twilio::SIGNATURE_HEADER;
use crate::presentation::http::dto::{error_response, ok_response};
use crate::presentation::http::twiml;

/// Telephony callbacks. Bodies are form encoded; responses are TwiML.
pub struct IvrHandler {
    engine: Arc<IvrEngine>,
    validator: TwilioSignatureValidator,
    public_base_url: String,
}

type FormParams = Vec<(String, String)>;

fn param<'a>(params: &'a FormParams, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

fn voice(result: Result<VoiceResponse, IvrError>) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "IVR callback failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "IVR_FAILED", e);
        }
    };

    match twiml::render(&response) {
        Ok(xml) => ([(header::CONTENT_TYPE, twiml::CONTENT_TYPE)], xml).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "TWIML_FAILED", e),
    }
}

impl IvrHandler {
    pub fn new(engine: Arc<IvrEngine>, validator: TwilioSignatureValidator, public_base_url: String) -> Self {
        Self {
            engine,
            validator,
            public_base_url,
        }
    }

    /// Rebuilds the URL the platform signed from the public base URL.
    fn signed_url(&self, uri: &Uri) -> String {
        let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        format!("{}{}", self.public_base_url, path)
    }

    fn authenticate(&self, uri: &Uri, headers: &HeaderMap, params: &FormParams) -> Result<(), Response> {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

        self.validator
            .validate(&self.signed_url(uri), params, signature)
            .map_err(|e| {
                warn!(path = uri.path(), "Rejected IVR callback with invalid signature");
                error_response(StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE", e)
            })
    }

    pub async fn voice(
        State(handler): State<Arc<IvrHandler>>,
        uri: Uri,
        headers: HeaderMap,
        Form(params): Form<FormParams>,
    ) -> Response {
        if let Err(rejection) = handler.authenticate(&uri, &headers, &params) {
            return rejection;
        }
        let (Some(call_sid), Some(from), Some(to)) =
            (param(&params, "CallSid"), param(&params, "From"), param(&params, "To"))
        else {
            return error_response(StatusCode::BAD_REQUEST, "MISSING_PARAMETERS", "CallSid, From and To are required");
        };

        voice(handler.engine.start_call(call_sid, from, to).await)
    }

    pub async fn gather(
        State(handler): State<Arc<IvrHandler>>,
        uri: Uri,
        headers: HeaderMap,
        Form(params): Form<FormParams>,
    ) -> Response {
        if let Err(rejection) = handler.authenticate(&uri, &headers, &params) {
            return rejection;
        }
        let Some(call_sid) = param(&params, "CallSid") else {
            return error_response(StatusCode::BAD_REQUEST, "MISSING_PARAMETERS", "CallSid is required");
        };

        let input = CallInput {
            digits: param(&params, "Digits").map(str::to_string),
            speech: param(&params, "SpeechResult").map(str::to_string),
        };
        voice(handler.engine.handle_input(call_sid, input).await)
    }

    pub async fn status(
        State(handler): State<Arc<IvrHandler>>,
        uri: Uri,
        headers: HeaderMap,
        Form(params): Form<FormParams>,
    ) -> Response {
        if let Err(rejection) = handler.authenticate(&uri, &headers, &params) {
            return rejection;
        }
        let (Some(call_sid), Some(call_status)) = (param(&params, "CallSid"), param(&params, "CallStatus")) else {
            return error_response(StatusCode::BAD_REQUEST, "MISSING_PARAMETERS", "CallSid and CallStatus are required");
        };

        match handler.engine.end_call(call_sid, call_status).await {
            Ok(session) => ok_response(
                StatusCode::OK,
                serde_json::json!({
                    "call_sid": call_sid,
                    "state": session.as_ref().map(|s| s.state().as_str()),
                    "duration_seconds": session.as_ref().and_then(|s| s.duration_seconds()),
                }),
            ),
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "IVR_FAILED", e),
        }
    }
}
