//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. CORS: permissive, browser clients on any origin
//! 2. Access logger: method, path, status

pub mod audit;
