pub mod infinite_list;
pub mod visibility_marker;
