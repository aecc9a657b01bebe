pub mod db;
pub mod deepseek;
pub mod gemini;
pub mod memory;
pub mod openai;
pub mod youtube;

pub use db::DbAdapter;
pub use deepseek::DeepSeekAdapter;
pub use gemini::GeminiAdapter;
pub use memory::InMemoryStore;
pub use openai::OpenAiAdapter;
pub use youtube::YouTubeAdapter;
