pub mod rest;
pub mod state;

// Re-export the handlers so the binary that builds the router can reach them
// without spelling out the module path each time.
pub use rest::{
    delete_course_handler, generate_course_handler, generate_lesson_handler, get_course_handler,
    get_lesson_handler, list_courses_handler, list_saved_handler, save_course_handler,
    search_videos_handler, toggle_complete_handler, translate_handler, unsave_course_handler,
    update_lesson_handler,
};
