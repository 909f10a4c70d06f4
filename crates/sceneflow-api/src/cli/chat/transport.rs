//! Terminal transport: prints bot replies and keyboards to the chat screen.

use std::io::Write;
use std::sync::{Arc, Mutex};

use console::style;
use dashmap::DashMap;
use rustyline_async::SharedWriter;
use sceneflow_core::transport::Transport;
use sceneflow_types::conversation::PeerId;
use sceneflow_types::error::TransportError;
use sceneflow_types::keyboard::{Button, ButtonColor, Keyboard};

/// Writes replies through a `SharedWriter` and remembers the last keyboard
/// per conversation so `#N` can press its buttons.
#[derive(Clone)]
pub struct TerminalTransport {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    keyboards: Arc<DashMap<PeerId, Keyboard>>,
}

impl TerminalTransport {
    pub fn new(writer: SharedWriter) -> Self {
        Self::with_writer(Box::new(writer))
    }

    fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(writer)),
            keyboards: Arc::new(DashMap::new()),
        }
    }

    /// The last non-empty keyboard shown to `peer`.
    pub fn last_keyboard(&self, peer: &PeerId) -> Option<Keyboard> {
        self.keyboards.get(peer).map(|kb| kb.value().clone())
    }

    /// Button `number` (1-based, row-major) of the last keyboard shown to `peer`.
    pub fn button(&self, peer: &PeerId, number: usize) -> Option<Button> {
        let keyboard = self.keyboards.get(peer)?;
        keyboard.button(number.checked_sub(1)?).cloned()
    }

    fn write(&self, peer: &PeerId, body: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
        let mut text = format!("  {} {}\n", style("Bot >").cyan().bold(), body);
        if !keyboard.is_empty() {
            text.push_str(&render_keyboard(keyboard));
            // An empty keyboard leaves the previous one in place.
            self.keyboards.insert(peer.clone(), keyboard.clone());
        }

        let mut out = self.out.lock().map_err(|_| TransportError::Closed)?;
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| TransportError::SendFailed {
                peer: peer.to_string(),
                reason: e.to_string(),
            })
    }
}

fn styled_label(button: &Button) -> String {
    let label = format!("[{}]", button.text);
    match button.color {
        ButtonColor::Primary => style(label).blue().bold().to_string(),
        ButtonColor::Secondary => style(label).white().to_string(),
        ButtonColor::Positive => style(label).green().bold().to_string(),
        ButtonColor::Negative => style(label).red().bold().to_string(),
    }
}

/// One line per keyboard row, buttons numbered row-major from 1.
pub fn render_keyboard(keyboard: &Keyboard) -> String {
    let mut number = 0;
    let mut rendered = String::new();
    for row in &keyboard.rows {
        rendered.push_str("       ");
        for button in row {
            number += 1;
            rendered.push_str(&format!("{} {}  ", style(format!("#{number}")).dim(), styled_label(button)));
        }
        rendered.push('\n');
    }
    rendered
}

impl Transport for TerminalTransport {
    async fn send_text(
        &self,
        peer: &PeerId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.write(peer, text, keyboard)
    }

    async fn send_image(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        let body = format!("{} {}", style("[image]").magenta(), style(source).underlined());
        self.write(peer, &body, keyboard)
    }

    async fn send_image_with_text(
        &self,
        peer: &PeerId,
        text: &str,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        let body = format!(
            "{text}\n        {} {}",
            style("[image]").magenta(),
            style(source).underlined()
        );
        self.write(peer, &body, keyboard)
    }

    async fn send_video(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        let body = format!("{} {}", style("[video]").cyan(), style(source).underlined());
        self.write(peer, &body, keyboard)
    }
}

#[cfg(test)]
mod tests {
    use sceneflow_types::keyboard::ButtonSpec;
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn keyboard() -> Keyboard {
        Keyboard {
            one_time: false,
            rows: vec![
                vec![ButtonSpec::new("hello").into(), ButtonSpec::new("help").into()],
                vec![ButtonSpec::new("shout")
                    .payload(json!({"command": "shout"}))
                    .into()],
            ],
        }
    }

    #[tokio::test]
    async fn test_keyboard_remembered_for_button_presses() {
        let capture = Capture::default();
        let transport = TerminalTransport::with_writer(Box::new(capture.clone()));
        let peer = PeerId::from("local");

        transport.send_text(&peer, "hi", &keyboard()).await.unwrap();
        transport.send_text(&peer, "no keyboard", &Keyboard::empty()).await.unwrap();

        assert_eq!(transport.button(&peer, 1).unwrap().text, "hello");
        let shout = transport.button(&peer, 3).unwrap();
        assert_eq!(shout.payload, Some(json!({"command": "shout"})));
        assert!(transport.button(&peer, 0).is_none());
        assert!(transport.button(&peer, 4).is_none());

        let printed = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("hi"));
        assert!(printed.contains("no keyboard"));
    }

    #[test]
    fn test_render_numbers_buttons_row_major() {
        console::set_colors_enabled(false);
        let rendered = render_keyboard(&keyboard());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("#1 [hello]") && lines[0].contains("#2 [help]"));
        assert!(lines[1].contains("#3 [shout]"));
    }

    #[tokio::test]
    async fn test_video_printed_with_marker() {
        console::set_colors_enabled(false);
        let capture = Capture::default();
        let transport = TerminalTransport::with_writer(Box::new(capture.clone()));
        let peer = PeerId::from("local");

        transport.send_video(&peer, "clip.mp4", &keyboard()).await.unwrap();

        let printed = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("[video] clip.mp4"));
        assert_eq!(transport.button(&peer, 2).unwrap().text, "help");
    }
}
