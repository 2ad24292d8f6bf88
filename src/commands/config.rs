use anyhow::Result;
use log::{debug, warn};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue},
};

use std::path::PathBuf;

use crate::{
    gemini::{GeminiClient, GenerateContent},
    runtime::{Runtime, default_out_dir},
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variables searched for the API key, in order.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub struct Config<R: Runtime, G: GenerateContent> {
    pub runtime: R,
    pub gemini: G,
    pub out_dir: PathBuf,
}

impl<R: Runtime> Config<R, GeminiClient> {
    pub fn new(
        runtime: R,
        api_url: Option<String>,
        model: Option<String>,
        out_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        match API_KEY_VARS.iter().find_map(|var| {
            runtime
                .env_var(var)
                .ok()
                .filter(|key| !key.is_empty())
                .map(|key| (*var, key))
        }) {
            Some((var, key)) => {
                let mut value = HeaderValue::from_str(&key)?;
                value.set_sensitive(true);
                headers.insert(API_KEY_HEADER, value);
                debug!("Using {} for authentication: {}", var, mask(&key));
            }
            None => warn!("Neither GEMINI_API_KEY nor API_KEY is set; requests will be rejected"),
        }

        let client = Client::builder()
            .user_agent("opus-cli")
            .default_headers(headers)
            .build()?;

        let gemini = GeminiClient::new(client, api_url, model);
        let out_dir = match out_dir {
            Some(dir) => dir,
            None => default_out_dir(&runtime)?,
        };
        debug!("Writing exports to {}", out_dir.display());

        Ok(Self {
            runtime,
            gemini,
            out_dir,
        })
    }
}

/// Keeps the first and last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
