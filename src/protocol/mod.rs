pub mod opus_header;

pub use opus_header::{CommentHeader, IdHeader, comment_header, id_header};
