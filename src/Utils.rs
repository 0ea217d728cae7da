//! different utility modules used throughout the project
/// logger setup: terminal and optional timestamped log file
pub mod logger;
/// parse document with structure like "key1: value1 \n key2: value2" into HashMap
pub mod task_parser;
/// a root finding job read from a task document
pub mod solver_task;
