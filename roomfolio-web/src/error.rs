use thiserror::Error;

/// Everything that can stop the experience from reaching a rendered room.
///
/// Payloads are plain strings so the error can be cloned into the status,
/// passed through events and handed to JavaScript listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExperienceError {
    #[error("invalid site configuration: {0}")]
    Config(String),

    #[error("failed to load asset `{name}`: {reason}")]
    Asset { name: String, reason: String },

    #[error("failed to decode model: {0}")]
    Model(String),

    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("render failure: {0}")]
    Render(String),

    #[error("page is missing {0}")]
    Dom(String),
}

impl ExperienceError {
    pub fn asset(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Asset {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for ExperienceError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for ExperienceError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<gltf::Error> for ExperienceError {
    fn from(e: gltf::Error) -> Self {
        Self::Model(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_message_names_asset() {
        let e = ExperienceError::asset("room", "HTTP 404");
        assert_eq!(e.to_string(), "failed to load asset `room`: HTTP 404");
    }

    #[test]
    fn test_toml_error_becomes_config() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        assert!(matches!(ExperienceError::from(err), ExperienceError::Config(_)));
    }
}
