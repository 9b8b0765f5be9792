use serde::Deserialize;

use hypr_api_env::{SupabaseEnv, filter_empty, string_to_u64};

const DEFAULT_PORT: u64 = 3000;

fn default_port() -> u64 {
    DEFAULT_PORT
}

#[derive(Clone, Deserialize)]
pub struct Env {
    #[serde(default = "default_port", deserialize_with = "string_to_u64")]
    pub port: u64,
    #[serde(default, deserialize_with = "filter_empty")]
    pub sentry_dsn: Option<String>,

    #[serde(flatten)]
    pub supabase: SupabaseEnv,
    #[serde(flatten)]
    pub chat_relay: hypr_chat_relay::Env,
}

impl Env {
    pub fn load() -> Result<Self, envy::Error> {
        let _ = dotenvy::dotenv();
        envy::from_env()
    }
}
