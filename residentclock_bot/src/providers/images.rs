use serde::Deserialize;
use tracing::instrument;

use super::{endpoint, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animal {
    Cat,
    Dog,
}

impl Animal {
    fn provider(&self) -> &'static str {
        match self {
            Animal::Cat => "TheCatAPI",
            Animal::Dog => "TheDogAPI",
        }
    }
}

/// Random animal pictures from TheCatAPI and TheDogAPI. Both share the same api.
#[derive(Debug, Clone)]
pub struct ImageClient {
    http: reqwest::Client,
    cat_url: String,
    dog_url: String,
}

#[derive(Deserialize)]
struct Image {
    url: String,
}

impl ImageClient {
    pub fn new(http: reqwest::Client, cat_url: impl Into<String>, dog_url: impl Into<String>) -> Self {
        Self { http, cat_url: cat_url.into(), dog_url: dog_url.into() }
    }

    /// Url of a random picture of `animal`.
    #[instrument(level = "debug", name = "providers.images.random", skip(self))]
    pub async fn random(&self, animal: Animal) -> Result<String, ProviderError> {
        let base_url = match animal {
            Animal::Cat => &self.cat_url,
            Animal::Dog => &self.dog_url,
        };

        let response = self
            .http
            .get(endpoint(base_url, "v1/images/search"))
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let images: Vec<Image> =
            serde_json::from_value(body).map_err(|e| ProviderError::malformed(animal.provider(), e))?;

        images.into_iter().next().map(|image| image.url).ok_or(ProviderError::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn picks_the_first_image() {
        let cats = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "a1", "url": "https://cdn2.thecatapi.com/images/a1.jpg", "width": 500, "height": 400 }
            ])))
            .mount(&cats)
            .await;

        let client = ImageClient::new(reqwest::Client::new(), cats.uri(), "http://localhost:1");

        assert_eq!(client.random(Animal::Cat).await.unwrap(), "https://cdn2.thecatapi.com/images/a1.jpg");
    }

    #[tokio::test]
    async fn empty_search_means_no_result() {
        let dogs = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&dogs)
            .await;

        let client = ImageClient::new(reqwest::Client::new(), "http://localhost:1", dogs.uri());

        assert!(matches!(client.random(Animal::Dog).await, Err(ProviderError::NoResult)));
    }
}
