#![forbid(unsafe_code)]

pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod event_source;
pub mod notification;
pub mod player;
pub mod playing_info;
pub mod snapshot;
pub mod visited;
pub mod voice_sink;

pub mod helper;
pub mod pattern;
pub mod period_helper;
pub mod sequence;

pub mod dss;
pub mod fc;

pub mod prelude;
