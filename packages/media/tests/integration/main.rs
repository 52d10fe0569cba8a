mod cache;
mod common;
mod default_picture;
mod picture;
mod sweep;
