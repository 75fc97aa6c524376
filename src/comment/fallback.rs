use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("Failed to read fallback message: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Fallback message is empty")]
    Empty,
}

/// Static comment posted when generation fails. Loaded once at startup.
#[derive(Debug, Clone)]
pub struct FallbackMessage {
    text: String,
}

impl FallbackMessage {
    pub fn new(text: impl Into<String>) -> Result<Self, FallbackError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FallbackError::Empty);
        }
        Ok(Self { text })
    }

    pub fn load(path: &Path) -> Result<Self, FallbackError> {
        Self::new(fs::read_to_string(path)?)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keeps_text_verbatim() {
        let path = std::env::temp_dir().join(format!("pr-greeter-fallback-{}.md", std::process::id()));
        std::fs::write(&path, "Thanks for the PR!\n").unwrap();

        let message = FallbackMessage::load(&path).unwrap();
        assert_eq!(message.as_str(), "Thanks for the PR!\n");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_blank_message_is_rejected() {
        assert!(matches!(FallbackMessage::new("  \n"), Err(FallbackError::Empty)));
    }

    #[test]
    fn test_missing_file() {
        let err = FallbackMessage::load(Path::new("/definitely/not/here.md")).unwrap_err();
        assert!(matches!(err, FallbackError::FileRead(_)));
    }
}
