mod multi_list;

pub use multi_list::{MultiList, ListHead};
