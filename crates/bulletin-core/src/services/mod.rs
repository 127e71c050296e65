//! Services - the listing, authoring and administration policy built on the ports.

mod authoring;
mod feed;
mod groups;

pub use authoring::{AuthoringOutcome, AuthoringService, FormView, Redirect, Submission};
pub use feed::{AuthorFeed, FeedService, GroupFeed, PostDetail};
pub use groups::GroupAdminService;
