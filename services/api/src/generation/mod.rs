pub mod course;
pub mod fallback;
pub mod lesson;
pub mod translate;

pub use course::generate_course_outline;
pub use fallback::FallbackOrchestrator;
pub use lesson::generate_lesson_body;
pub use translate::translate;
