pub mod hash;
pub mod html;
pub mod images;
pub mod jwt;
pub mod slug;
