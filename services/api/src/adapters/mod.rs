pub mod report_llm;
pub mod seed;
pub mod store;

pub use report_llm::OpenAiReportAdapter;
pub use seed::SeedData;
pub use store::MemoryStore;
