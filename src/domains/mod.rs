pub mod order;
pub mod product;
pub mod professional;
pub mod review;
pub mod user;
