//! TwiML rendering
//!
//! A `Prompt` becomes either a `<Gather>` that posts the caller's answer back
//! to the turn webhook, or a closing `<Say>` followed by `<Dial>` (hand-off)
//! or `<Hangup/>`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use hotel_voice_config::Settings;
use hotel_voice_core::{InputMode, Prompt};

use crate::ServerError;

/// Transport parameters of every `<Gather>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherOptions {
    /// Webhook the transport posts the gathered input to
    pub action: String,
    pub timeout_secs: u32,
    pub speech_timeout: String,
    /// Sent when the prompt has no digit limit
    pub finish_on_key: String,
}

impl GatherOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            action: settings.server.turn_path.clone(),
            timeout_secs: settings.gather.timeout_secs,
            speech_timeout: settings.gather.speech_timeout.clone(),
            finish_on_key: settings.dialogue.finish_on_key.clone(),
        }
    }
}

impl Default for GatherOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn input_attribute(mode: InputMode) -> Option<&'static str> {
    match mode {
        InputMode::Digits => Some("dtmf"),
        InputMode::Speech => Some("speech"),
        InputMode::Either => Some("dtmf speech"),
        InputMode::None => None,
    }
}

/// Render a prompt as a TwiML document
pub fn render(prompt: &Prompt, options: &GatherOptions) -> Result<String, ServerError> {
    let mut writer = Writer::new(Vec::new());

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new("Response")))?;

    match input_attribute(prompt.input).filter(|_| !prompt.terminate) {
        Some(input) => {
            let timeout = options.timeout_secs.to_string();
            let mut gather = BytesStart::new("Gather");
            gather.push_attribute(("input", input));
            gather.push_attribute(("action", options.action.as_str()));
            gather.push_attribute(("method", "POST"));
            gather.push_attribute(("timeout", timeout.as_str()));
            gather.push_attribute(("speechTimeout", options.speech_timeout.as_str()));

            let num_digits = prompt.max_digits.map(|n| n.to_string());
            match num_digits {
                Some(ref n) => gather.push_attribute(("numDigits", n.as_str())),
                None => gather.push_attribute(("finishOnKey", options.finish_on_key.as_str())),
            }

            emit(&mut writer, Event::Start(gather))?;
            say(&mut writer, prompt)?;
            emit(&mut writer, Event::End(BytesEnd::new("Gather")))?;

            // no input before the timeout: post an empty turn
            let mut redirect = BytesStart::new("Redirect");
            redirect.push_attribute(("method", "POST"));
            emit(&mut writer, Event::Start(redirect))?;
            emit(&mut writer, Event::Text(BytesText::new(&options.action)))?;
            emit(&mut writer, Event::End(BytesEnd::new("Redirect")))?;
        },
        None => {
            say(&mut writer, prompt)?;
            match prompt.transfer_to {
                Some(ref number) => {
                    emit(&mut writer, Event::Start(BytesStart::new("Dial")))?;
                    emit(&mut writer, Event::Text(BytesText::new(number)))?;
                    emit(&mut writer, Event::End(BytesEnd::new("Dial")))?;
                },
                None => emit(&mut writer, Event::Empty(BytesStart::new("Hangup")))?,
            }
        },
    }

    emit(&mut writer, Event::End(BytesEnd::new("Response")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| ServerError::Render(e.to_string()))
}

fn say(writer: &mut Writer<Vec<u8>>, prompt: &Prompt) -> Result<(), ServerError> {
    let mut say = BytesStart::new("Say");
    say.push_attribute(("voice", prompt.voice.as_str()));
    say.push_attribute(("language", prompt.locale.as_str()));
    emit(writer, Event::Start(say))?;
    emit(writer, Event::Text(BytesText::new(&prompt.text)))?;
    emit(writer, Event::End(BytesEnd::new("Say")))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ServerError> {
    writer
        .write_event(event)
        .map_err(|e| ServerError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(text: &str, input: InputMode, terminate: bool) -> Prompt {
        Prompt {
            text: text.to_string(),
            locale: "es-ES".to_string(),
            voice: "Polly.Lucia-Neural".to_string(),
            input,
            max_digits: None,
            terminate,
            transfer_to: None,
        }
    }

    #[test]
    fn test_gather_document() {
        let mut p = prompt("Hola", InputMode::Either, false);
        p.max_digits = Some(3);
        let xml = render(&p, &GatherOptions::default()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<Gather input=\"dtmf speech\" action=\"/voice/turn\" method=\"POST\" \
             timeout=\"5\" speechTimeout=\"auto\" numDigits=\"3\">"
        ));
        assert!(xml.contains("<Say voice=\"Polly.Lucia-Neural\" language=\"es-ES\">Hola</Say></Gather>"));
        assert!(xml.ends_with("<Redirect method=\"POST\">/voice/turn</Redirect></Response>"));
        assert!(!xml.contains("finishOnKey"));
    }

    #[test]
    fn test_open_gather_uses_finish_key() {
        let xml = render(&prompt("Go ahead", InputMode::Speech, false), &GatherOptions::default())
            .unwrap();
        assert!(xml.contains("input=\"speech\""));
        assert!(xml.contains("finishOnKey=\"#\""));
        assert!(!xml.contains("numDigits"));
    }

    #[test]
    fn test_hangup_document() {
        let xml = render(&prompt("Adiós", InputMode::None, true), &GatherOptions::default()).unwrap();
        assert!(!xml.contains("<Gather"));
        assert!(xml.ends_with("<Say voice=\"Polly.Lucia-Neural\" language=\"es-ES\">Adiós</Say><Hangup/></Response>"));
    }

    #[test]
    fn test_transfer_dials_staff() {
        let mut p = prompt("Connecting you", InputMode::None, true);
        p.transfer_to = Some("+15551230000".into());
        let xml = render(&p, &GatherOptions::default()).unwrap();
        assert!(xml.contains("<Dial>+15551230000</Dial>"));
        assert!(!xml.contains("<Hangup/>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render(&prompt("Fish & chips <now>", InputMode::Either, false), &GatherOptions::default())
            .unwrap();
        assert!(xml.contains("Fish &amp; chips &lt;now&gt;"));
    }

    #[test]
    fn test_options_follow_settings() {
        let mut settings = Settings::default();
        settings.server.turn_path = "/hooks/turn".into();
        settings.gather.timeout_secs = 8;
        let options = GatherOptions::from_settings(&settings);
        assert_eq!(options.action, "/hooks/turn");
        assert_eq!(options.timeout_secs, 8);
    }
}
