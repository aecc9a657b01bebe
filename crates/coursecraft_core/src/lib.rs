pub mod domain;
pub mod normalize;
pub mod ports;

pub use domain::{
    ContentBlock, Course, CourseOutline, Lesson, LessonBody, LessonPatch, Module, ModuleOutline,
    VideoResult,
};
pub use ports::{
    CourseStore, GenerationProvider, GenerationRequest, PortError, PortResult, VideoSearchService,
};
