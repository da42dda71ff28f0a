//! Domain entities - the core business objects.

mod engagement;
mod feed;
mod follow;
mod page;
pub mod placeholder;
mod post;
mod profile;

pub use engagement::{Comment, Like};
pub use feed::{FeedItem, FeedMode, FeedPage, FeedRequest};
pub use follow::{FollowCounts, FollowEdge};
pub use page::{Cursor, PostPage, ProfilePage};
pub use post::{NewPost, Post, PostUpdate};
pub use profile::{AuthorInfo, NewProfile, Profile, ProfileUpdate};
