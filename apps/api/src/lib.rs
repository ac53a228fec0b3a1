//! CV converter: turns a PDF or DOCX résumé into the branded Maltem DOCX.
//!
//! Text is extracted from the upload, structured into a [`models::cv::CvRecord`]
//! by a chat-completion model, then rendered by [`render`] on top of the
//! small WordprocessingML layer in [`docx`].

pub mod config;
pub mod docx;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod state;
pub mod structuring;
