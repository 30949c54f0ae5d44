pub mod cart;
pub mod category;
pub mod family;
pub mod form;
pub mod ids;
pub mod member;
pub mod order;
pub mod personal;
pub mod product;
pub mod sink;
pub mod summary;
pub mod transaction;
