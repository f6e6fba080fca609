pub mod messenger;
pub mod meta;
pub mod twilio;
pub mod web;
pub mod whatsapp;

pub use messenger::MessengerAdapter;
pub use meta::{GraphApiClient, MetaSignatureVerifier};
pub use twilio::TwilioSignatureValidator;
pub use web::WebWidgetAdapter;
pub use whatsapp::WhatsAppAdapter;
