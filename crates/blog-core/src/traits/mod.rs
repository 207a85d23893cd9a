//! Port traits implemented by the REST adapter

mod ports;

pub use ports::{
    AccountApi, AuthGrant, CommentApi, PageSource, PortResult, PostApi, ReactionApi,
};
