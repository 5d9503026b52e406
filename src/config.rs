//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binary. Defaults are provided for convenience during development.
//! The Gemini credential is captured here once and handed to the client at
//! construction; nothing reads it ad hoc per request.
use std::env;
use dotenv;

pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub public_dir: String,
    pub output_dir: String,
    pub api_host: String,
    pub api_port: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Config {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image-preview".to_string()),
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "public/outputs".to_string()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("FLASK_PORT").unwrap_or_else(|_| "5000".to_string()),
        })
    }

    /// Print the effective configuration. The credential itself is never
    /// echoed, only whether it is present.
    pub fn print_env_vars() {
        println!(
            "GEMINI_API_KEY: {}",
            if env::var("GEMINI_API_KEY").map(|k| !k.trim().is_empty()).unwrap_or(false) {
                "<set>"
            } else {
                "<unset>"
            }
        );
        println!("GEMINI_BASE_URL: {}", env::var("GEMINI_BASE_URL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("GEMINI_MODEL: {}", env::var("GEMINI_MODEL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("PUBLIC_DIR: {}", env::var("PUBLIC_DIR").unwrap_or_else(|_| "<unset>".to_string()));
        println!("OUTPUT_DIR: {}", env::var("OUTPUT_DIR").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_HOST: {}", env::var("API_HOST").unwrap_or_else(|_| "<unset>".to_string()));
        println!("FLASK_PORT: {}", env::var("FLASK_PORT").unwrap_or_else(|_| "<unset>".to_string()));
    }
}
