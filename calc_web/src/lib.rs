//! # calc_web - Beltworks web front end
//!
//! Server-rendered calculator pages, the shaft geometry editor and a small
//! JSON API, all driven by `calc_core`. The shaft editor needs no
//! JavaScript: every button posts the form and the server replays the
//! action on a freshly attached editor.

pub mod assets;
pub mod config;
pub mod pages;
pub mod server;
pub mod shaft_form;

pub use config::WebSettings;
pub use server::{router, run_http_server, serve};
