pub mod entity;
pub mod invariants;

pub use entity::{
    provisional_category_id, Category, CategoryId, CategoryName, CategoryRecord, CategoryWithMeals,
};
pub use invariants::{validate_category, validate_category_name};
