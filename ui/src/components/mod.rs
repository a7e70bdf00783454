pub mod post_form;
pub mod post_status;

pub use post_form::PostForm;
pub use post_status::PostStatusView;
