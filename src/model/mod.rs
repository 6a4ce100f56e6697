pub mod row;
pub mod ticket;
