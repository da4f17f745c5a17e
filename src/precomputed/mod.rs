pub mod move_tables;
