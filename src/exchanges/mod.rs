pub mod coinex;
