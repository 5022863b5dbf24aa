pub mod compare;
pub mod sections;
