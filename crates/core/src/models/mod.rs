pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod money;
pub mod product;
pub mod settings;
pub mod user;
pub mod wishlist;
