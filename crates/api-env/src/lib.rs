use serde::Deserialize;

pub fn filter_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

pub fn string_to_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[derive(Clone, Deserialize)]
pub struct SupabaseEnv {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    /// Secret used to sign session JWTs for this project.
    pub supabase_jwt_secret: String,
}

#[derive(Clone, Deserialize)]
pub struct OpenAIEnv {
    pub openai_api_key: String,
    #[serde(default, deserialize_with = "filter_empty")]
    pub openai_base_url: Option<String>,
}
