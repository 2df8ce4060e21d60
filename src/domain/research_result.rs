#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult {
    pub content: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl ResearchResult {
    pub fn new(content: impl Into<String>, citations: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            citations,
            model: model.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
