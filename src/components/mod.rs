pub mod activity_list;
pub mod cartography;
