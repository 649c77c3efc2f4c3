//! The library code for the `tinyblog` static blog generator. A build has two
//! steps:
//!
//! 1. Parsing posts from `*.md` files on disk ([`crate::post`]). Each post
//!    body goes through the markup converter ([`crate::markdown`]), which
//!    splits the text into blocks ([`crate::block`]), renders each block
//!    ([`crate::htmlrenderer`]) and transforms the inline formatting within
//!    it ([`crate::inline`]).
//! 2. Templating the posts and the index page and writing them to disk
//!    ([`crate::write`]) with a [`crate::theme::Theme`].
//!
//! [`crate::build`] ties the two together. [`crate::init`] scaffolds a new
//! blog and [`crate::serve`] previews the output locally.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod block;
pub mod build;
pub mod config;
pub mod htmlrenderer;
pub mod init;
pub mod inline;
pub mod markdown;
pub mod post;
pub mod serve;
pub mod theme;
pub mod value;
pub mod write;
