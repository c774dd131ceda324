use std::cmp::Ordering;

use serde::Deserialize;
use tracing::{event, instrument, Level};

use super::{endpoint, ProviderError};

const PROVIDER: &str = "Mee6";
const PAGE_SIZE: &str = "1000";

/// Reads experience points from the Mee6 levels leaderboard.
#[derive(Debug, Clone)]
pub struct LevelsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct Leaderboard {
    #[serde(default)]
    players: Vec<Player>,
}

#[derive(Deserialize)]
struct Player {
    id: String,
    xp: u64,
}

impl LevelsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Experience of `user_id` in `guild_id`, `None` when the user is not on the first leaderboard page.
    #[instrument(level = "debug", name = "providers.levels.user_xp", skip(self))]
    pub async fn user_xp(&self, guild_id: u64, user_id: u64) -> Result<Option<u64>, ProviderError> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &format!("api/plugins/levels/leaderboard/{guild_id}")))
            .query(&[("page", "0"), ("limit", PAGE_SIZE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16().to_string();
            event!(Level::DEBUG, %code, "Leaderboard request failed");

            return Err(ProviderError::Status { code, message: "The leaderboard of this server is not public.".into() });
        }

        let body: serde_json::Value = response.json().await?;
        let leaderboard: Leaderboard =
            serde_json::from_value(body).map_err(|e| ProviderError::malformed(PROVIDER, e))?;

        let user_id = user_id.to_string();

        Ok(leaderboard.players.into_iter().find(|p| p.id == user_id).map(|p| p.xp))
    }
}

/// How the experience of `first` compares to `second`, as a sentence.
pub fn compare_xp(first: (&str, u64), second: (&str, u64)) -> String {
    let (first_name, first_xp) = first;
    let (second_name, second_xp) = second;

    match first_xp.cmp(&second_xp) {
        Ordering::Greater => format!("{first_name} has {} more XP than {second_name}.", first_xp - second_xp),
        Ordering::Less => format!("{second_name} has {} more XP than {first_name}.", second_xp - first_xp),
        Ordering::Equal => format!("{first_name} and {second_name} have exactly the same XP."),
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[rstest]
    #[case(("alice", 1500), ("bob", 1000), "alice has 500 more XP than bob.")]
    #[case(("alice", 10), ("bob", 25), "bob has 15 more XP than alice.")]
    #[case(("alice", 7), ("bob", 7), "alice and bob have exactly the same XP.")]
    fn compares_experience(#[case] first: (&str, u64), #[case] second: (&str, u64), #[case] expected: &str) {
        assert_eq!(compare_xp(first, second), expected);
    }

    #[tokio::test]
    async fn finds_user_on_leaderboard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugins/levels/leaderboard/42"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "players": [
                    { "id": "100", "username": "alice", "xp": 1500, "level": 5 },
                    { "id": "200", "username": "bob", "xp": 800, "level": 3 }
                ]
            })))
            .mount(&server)
            .await;

        let client = LevelsClient::new(reqwest::Client::new(), server.uri());

        assert_eq!(client.user_xp(42, 200).await.unwrap(), Some(800));
        assert_eq!(client.user_xp(42, 300).await.unwrap(), None);
    }

    #[tokio::test]
    async fn private_leaderboard_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "Unauthorized" } })))
            .mount(&server)
            .await;

        let client = LevelsClient::new(reqwest::Client::new(), server.uri());

        assert!(matches!(client.user_xp(42, 200).await, Err(ProviderError::Status { ref code, .. }) if code == "401"));
    }
}
