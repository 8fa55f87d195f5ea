pub mod carousel;
pub mod draft;
pub mod entities;
