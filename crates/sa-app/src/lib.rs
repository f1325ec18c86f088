//! HTTP backend for producing short-form videos: generative-AI image and
//! video jobs, story prompts, simulated LoRA training, exports and the
//! document stores behind the editor (projects, templates, saved prompts,
//! provider keys).

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod projects;
pub mod prompts;
pub mod settings;
pub mod templates;
pub mod training;
pub mod uploads;
