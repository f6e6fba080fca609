//! Renders voice responses as TwiML.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::application::services::ivr_engine::{VoiceResponse, VoiceVerb};
use crate::domain::value_objects::Language;

pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Debug, thiserror::Error)]
#[error("TwiML rendering failed: {0}")]
pub struct TwimlError(String);

struct TwimlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl TwimlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), TwimlError> {
        self.writer
            .write_event(event)
            .map_err(|e| TwimlError(e.to_string()))
    }

    fn element(&mut self, start: BytesStart<'_>, text: &str) -> Result<(), TwimlError> {
        let end = start.to_end().into_owned();
        self.emit(Event::Start(start))?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.emit(Event::End(end))
    }

    fn say(&mut self, text: &str, language: Language) -> Result<(), TwimlError> {
        let say = BytesStart::new("Say").with_attributes([("language", language.voice_locale())]);
        self.element(say, text)
    }

    fn verb(&mut self, verb: &VoiceVerb) -> Result<(), TwimlError> {
        match verb {
            VoiceVerb::Say { text, language } => self.say(text, *language),
            VoiceVerb::Gather {
                action,
                timeout_secs,
                language,
                prompt,
            } => {
                let timeout = timeout_secs.to_string();
                let gather = BytesStart::new("Gather").with_attributes([
                    ("input", "dtmf speech"),
                    ("action", action.as_str()),
                    ("method", "POST"),
                    ("timeout", timeout.as_str()),
                    ("numDigits", "1"),
                    ("language", language.voice_locale()),
                    ("speechTimeout", "auto"),
                ]);
                let end = gather.to_end().into_owned();
                self.emit(Event::Start(gather))?;
                self.say(prompt, *language)?;
                self.emit(Event::End(end))
            }
            VoiceVerb::Redirect(url) => {
                let redirect = BytesStart::new("Redirect").with_attributes([("method", "POST")]);
                self.element(redirect, url)
            }
            VoiceVerb::Dial(number) => self.element(BytesStart::new("Dial"), number),
            VoiceVerb::Hangup => self.emit(Event::Empty(BytesStart::new("Hangup"))),
        }
    }

    fn finish(self) -> Result<String, TwimlError> {
        String::from_utf8(self.writer.into_inner().into_inner()).map_err(|e| TwimlError(e.to_string()))
    }
}

pub fn render(response: &VoiceResponse) -> Result<String, TwimlError> {
    let mut twiml = TwimlWriter::new();

    twiml.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let root = BytesStart::new("Response");
    let end = root.to_end().into_owned();
    twiml.emit(Event::Start(root))?;
    for verb in &response.verbs {
        twiml.verb(verb)?;
    }
    twiml.emit(Event::End(end))?;

    twiml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut names = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) | Event::Empty(e) => {
                    names.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap())
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        names
    }

    #[test]
    fn test_renders_menu_with_silence_redirect() {
        let response = VoiceResponse {
            verbs: vec![
                VoiceVerb::Gather {
                    action: "/ivr/gather".to_string(),
                    timeout_secs: 5,
                    language: Language::English,
                    prompt: "Press 1 for orders.".to_string(),
                },
                VoiceVerb::Redirect("/ivr/gather".to_string()),
            ],
        };

        let xml = render(&response).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(element_names(&xml), vec!["Response", "Gather", "Say", "Redirect"]);
        assert!(xml.contains("action=\"/ivr/gather\""));
        assert!(xml.contains("timeout=\"5\""));
        assert!(xml.contains("language=\"en-US\""));
    }

    #[test]
    fn test_escapes_text_and_renders_transfer() {
        let response = VoiceResponse {
            verbs: vec![
                VoiceVerb::Say {
                    text: "Tom & Jerry <shop>".to_string(),
                    language: Language::Bangla,
                },
                VoiceVerb::Dial("+8809611111111".to_string()),
                VoiceVerb::Hangup,
            ],
        };

        let xml = render(&response).unwrap();

        assert!(xml.contains("Tom &amp; Jerry &lt;shop&gt;"));
        assert!(xml.contains("<Dial>+8809611111111</Dial>"));
        assert!(xml.contains("<Hangup/>"));
        assert!(xml.contains("language=\"bn-BD\""));
    }
}
