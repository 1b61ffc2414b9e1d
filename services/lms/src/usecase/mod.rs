pub mod assignment;
pub mod auth;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod file;
pub mod names;
pub mod note;
pub mod submission;
pub mod user;
