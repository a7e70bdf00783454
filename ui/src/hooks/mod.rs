pub mod use_post;

pub use use_post::{PostState, UsePostHandle, UsePostOptions, use_post};
