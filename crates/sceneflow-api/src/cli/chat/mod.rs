//! Interactive terminal chat against the built-in demo bot.
//!
//! Every line typed is delivered to the dispatcher as an inbound text event;
//! replies are printed through a terminal transport. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod commands;
pub mod demo;
pub mod input;
pub mod loop_runner;
pub mod transport;
