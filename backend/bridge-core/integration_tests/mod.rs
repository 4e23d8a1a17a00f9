mod config;
mod dispatch;
mod error;
mod helpers;
