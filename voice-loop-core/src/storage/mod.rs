pub mod capture_buffer;
