pub const DEFAULT_MODELS: [&str; 5] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("model candidate list is empty")]
pub struct EmptyCandidateList;

/// Ordered, non-empty list of model names tried one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
    pub fn new(models: Vec<String>) -> Result<Self, EmptyCandidateList> {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        if models.is_empty() {
            return Err(EmptyCandidateList);
        }
        Ok(Self(models))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self(DEFAULT_MODELS.iter().map(|m| m.to_string()).collect())
    }
}

/// Text produced by the first model that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub text: String,
    pub model: String,
}
