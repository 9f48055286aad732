// Marketplace records shared by the data layer and the domain services

pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use order::{NewOrder, Order, OrderWithProduct};
pub use product::{NewProduct, Product, ProductChanges, Seller};
pub use review::{NewReview, RatingSummary, Review, ReviewAuthor, ReviewUpdate, ReviewWithAuthor};
pub use user::{CurrentUser, NewUser, User};
