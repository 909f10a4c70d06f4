//! Built-in demo bot: an echo scene with a few global commands.
//!
//! Exercises every routing path: `hello`/`help`/`image`/`video` are global commands,
//! the `shout` button carries a payload intent the `main` scene handles
//! itself, and any other text is echoed back by the scene.

use sceneflow_core::command::CommandHandler;
use sceneflow_core::dispatch::{Context, DispatcherBuilder};
use sceneflow_core::scene::Scene;
use sceneflow_types::error::EngineError;
use sceneflow_types::keyboard::{ButtonColor, ButtonSpec};
use serde_json::json;

const MAIN: &str = "main";
const LAST_MESSAGE: &str = "last_message";
const DEMO_VIDEO: &str = "https://samplelib.com/lib/preview/mp4/sample-5s.mp4";

/// Register the demo scenes, commands and keyboards.
pub fn configure(builder: &mut DispatcherBuilder) -> Result<(), EngineError> {
    builder
        .keyboard_rows(
            MAIN,
            vec![
                vec![
                    ButtonSpec::new("hello"),
                    ButtonSpec::new("help").color(ButtonColor::Secondary),
                ],
                vec![
                    ButtonSpec::new("image").color(ButtonColor::Positive),
                    ButtonSpec::new("shout")
                        .color(ButtonColor::Negative)
                        .payload(json!({"command": "shout"})),
                ],
            ],
        )?
        .scene(MAIN, EchoScene)?
        .command(["hello", "привет"], Hello)?
        .command(["help", "помощь", "?"], Help)?
        .command(["image", "картинка"], Image)?
        .command(["video", "видео"], Video)?
        .command(["start", "restart"], Restart)?;
    Ok(())
}

/// Echoes every message; the `shout` intent repeats the last one in capitals.
pub struct EchoScene;

impl Scene for EchoScene {
    async fn enter(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.clear_user_data();
        ctx.reply("Hi! I'm an echo bot. Write me anything.", Some(MAIN)).await
    }

    async fn handle(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        if ctx.intent().is_some_and(|intent| intent.command == "shout") {
            let reply = match ctx.user_data::<String>(LAST_MESSAGE) {
                Some(last) => format!("{}!", last.to_uppercase()),
                None => "Nothing to shout yet.".to_string(),
            };
            return ctx.reply(&reply, None).await;
        }

        let text = ctx.text().unwrap_or_default();
        ctx.set_user_data(LAST_MESSAGE, &text)?;
        ctx.reply(&format!("You wrote: {text}"), None).await
    }

    fn actions(&self) -> &[&str] {
        &["shout"]
    }
}

struct Hello;

impl CommandHandler for Hello {
    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.reply("Hello! Write me something and I'll repeat it.", None).await
    }
}

struct Help;

impl CommandHandler for Help {
    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.reply(
            "Commands:\n  hello - start a conversation\n  help - show this message\n  image - a random picture\n  video - a short clip\n  restart - back to the start",
            Some(MAIN),
        )
        .await
    }
}

struct Image;

impl CommandHandler for Image {
    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.send_image("https://picsum.photos/400/300", None).await
    }
}

struct Video;

impl CommandHandler for Video {
    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.send_video(DEMO_VIDEO, Some(MAIN)).await
    }
}

struct Restart;

impl CommandHandler for Restart {
    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        ctx.enter(MAIN).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use sceneflow_core::dispatch::{DispatchOutcome, Dispatcher};
    use sceneflow_core::persistence::BoxDocumentStore;
    use sceneflow_core::transport::{BoxTransport, Transport};
    use sceneflow_infra::memory::MemoryDocumentStore;
    use sceneflow_types::config::EngineConfig;
    use sceneflow_types::conversation::PeerId;
    use sceneflow_types::error::TransportError;
    use sceneflow_types::event::InboundEvent;
    use sceneflow_types::keyboard::Keyboard;

    use super::*;

    #[derive(Clone, Default)]
    struct Replies(Arc<Mutex<Vec<(String, Keyboard)>>>);

    impl Replies {
        fn last(&self) -> (String, Keyboard) {
            self.0.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Replies {
        async fn send_text(&self, _peer: &PeerId, text: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
            self.0.lock().unwrap().push((text.to_string(), keyboard.clone()));
            Ok(())
        }

        async fn send_image(&self, _peer: &PeerId, source: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
            self.0.lock().unwrap().push((source.to_string(), keyboard.clone()));
            Ok(())
        }

        async fn send_image_with_text(
            &self,
            _peer: &PeerId,
            text: &str,
            _source: &str,
            keyboard: &Keyboard,
        ) -> Result<(), TransportError> {
            self.0.lock().unwrap().push((text.to_string(), keyboard.clone()));
            Ok(())
        }

        async fn send_video(&self, _peer: &PeerId, source: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
            self.0.lock().unwrap().push((source.to_string(), keyboard.clone()));
            Ok(())
        }
    }

    fn demo(replies: &Replies) -> Dispatcher {
        let mut builder = Dispatcher::builder(
            EngineConfig::default(),
            BoxDocumentStore::new(MemoryDocumentStore::new()),
            BoxTransport::new(replies.clone()),
        );
        configure(&mut builder).unwrap();
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_first_message_greets_with_keyboard() {
        let replies = Replies::default();
        let bot = demo(&replies);

        let outcome = bot.dispatch(InboundEvent::text("1", "yo")).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::EnteredInitial);
        let (text, keyboard) = replies.last();
        assert!(text.starts_with("Hi!"));
        assert_eq!(keyboard.rows.len(), 2);
        assert_eq!(keyboard.button(3).unwrap().text, "shout");
    }

    #[tokio::test]
    async fn test_echo_then_shout() {
        let replies = Replies::default();
        let bot = demo(&replies);
        bot.dispatch(InboundEvent::text("1", "start")).await.unwrap();

        bot.dispatch(InboundEvent::text("1", "pizza please")).await.unwrap();
        assert_eq!(replies.last().0, "You wrote: pizza please");

        let press = InboundEvent::text("1", "shout").with_payload(json!({"command": "shout"}));
        assert_eq!(bot.dispatch(press).await.unwrap(), DispatchOutcome::PayloadRouted);
        assert_eq!(replies.last().0, "PIZZA PLEASE!");
    }

    #[tokio::test]
    async fn test_russian_alias_runs_command() {
        let replies = Replies::default();
        let bot = demo(&replies);
        bot.dispatch(InboundEvent::text("1", "start")).await.unwrap();

        let outcome = bot.dispatch(InboundEvent::text("1", "ПОМОЩЬ")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::CommandHandled("помощь".to_string()));
        assert!(replies.last().0.starts_with("Commands:"));
    }

    #[tokio::test]
    async fn test_video_command_sends_clip_with_keyboard() {
        let replies = Replies::default();
        let bot = demo(&replies);
        bot.dispatch(InboundEvent::text("1", "start")).await.unwrap();

        let outcome = bot.dispatch(InboundEvent::text("1", "Видео")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::CommandHandled("видео".to_string()));
        let (source, keyboard) = replies.last();
        assert_eq!(source, DEMO_VIDEO);
        assert_eq!(keyboard.rows.len(), 2);
    }
}
