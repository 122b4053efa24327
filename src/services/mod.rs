pub mod llm;

pub use llm::{LLMAnalysisRequestTrait, LLMAnalysisResponseTrait, LLMAnalysisResult, LLMError, LLMScenario, LLMService, LLMServiceImpl};
