pub mod maternal;
