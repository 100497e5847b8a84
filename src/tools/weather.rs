//! Weather lookup via the wttr.in plain-text API.

use std::path::Path;

use async_trait::async_trait;

use super::Tool;

/// Current weather for a city.
pub struct GetWeather;

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Look up the current weather for a city. Input: the city name."
    }

    async fn invoke(&self, input: &str, _workspace: &Path) -> anyhow::Result<String> {
        let city = input.trim();
        if city.is_empty() {
            anyhow::bail!("missing city name");
        }

        let url = format!(
            "https://wttr.in/{}?format=%C+%t",
            urlencoding::encode(&city.to_lowercase())
        );

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; Stepline/1.0)")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let conditions = response.text().await?;
        Ok(format!(
            "The current weather of {} is {}",
            city,
            conditions.trim()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_city_is_rejected() {
        let err = GetWeather.invoke("  ", Path::new(".")).await.unwrap_err();
        assert!(err.to_string().contains("missing city name"));
    }
}
