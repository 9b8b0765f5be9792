use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
}

/// Thin PostgREST client for a Supabase project.
#[derive(Clone)]
pub struct SupabaseDb {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseDb {
    pub fn new(client: reqwest::Client, supabase_url: &str, service_role_key: &str) -> Self {
        Self {
            client,
            base_url: supabase_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    fn auth_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("apikey", &self.service_role_key)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Inserts `rows` into `table`, overwriting rows whose `on_conflict`
    /// columns (the primary key when `None`) already exist.
    pub async fn upsert<T>(&self, table: &str, rows: &T, on_conflict: Option<&str>) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let url = match on_conflict {
            Some(columns) => format!(
                "{}?on_conflict={}",
                self.table_url(table),
                urlencoding::encode(columns)
            ),
            None => self.table_url(table),
        };

        let response = self
            .auth_headers(self.client.post(&url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "failed to upsert into {table}: {status} {body}"
            )));
        }

        tracing::debug!(table = %table, "supabase_upsert_ok");
        Ok(())
    }

    /// Calls a database function exposed under `/rest/v1/rpc/{function}`.
    pub async fn rpc<A, R>(&self, function: &str, args: &A) -> Result<R, Error>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .auth_headers(
                self.client
                    .post(format!("{}/rest/v1/rpc/{function}", self.base_url)),
            )
            .header("Accept", "application/json")
            .json(args)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "rpc {function} failed: {status} {body}"
            )));
        }

        Ok(response.json().await?)
    }
}
