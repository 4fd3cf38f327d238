pub mod resume;
pub mod section;
pub mod template;
pub mod user;
